//! Error types for status tracking operations

use thiserror::Error;

/// Failures reported by the backing record store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Stored object is corrupt: {0}")]
    Corrupt(String),

    #[error("Store I/O error: {0}")]
    Io(String),
}

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Stanza error: {0}")]
    Stanza(String),

    #[error("Record error: {0}")]
    Record(String),

    #[error("Logging error: {0}")]
    Logging(String),
}

impl From<config::ConfigError> for StatusError {
    fn from(err: config::ConfigError) -> Self {
        StatusError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StatusError>;
