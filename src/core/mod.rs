//! Core data model and shared helpers.

pub mod error;
pub mod hash;
pub mod time;
pub mod types;
