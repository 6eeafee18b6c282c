pub mod correlator;
pub mod scorer;
pub mod validator;
