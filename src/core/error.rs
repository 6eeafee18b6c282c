use std::io;

#[derive(thiserror::Error, Debug)]
pub enum FusionError {
    #[error("config error: {0}")]
    Config(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<serde_json::Error> for FusionError {
    fn from(err: serde_json::Error) -> Self {
        FusionError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for FusionError {
    fn from(err: toml::de::Error) -> Self {
        FusionError::Config(err.to_string())
    }
}
