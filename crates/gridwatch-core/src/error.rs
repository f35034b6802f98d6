//! Error types for the gridwatch system.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid anchor identifier: {0}")]
    InvalidAnchor(String),

    #[error("Invalid RSSI value: {0}")]
    InvalidRssi(String),

    #[error("Invalid device identifier: {0}")]
    InvalidDevice(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
