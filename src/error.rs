//! Error types for shardstore

use thiserror::Error;

/// Result type alias for shardstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in shardstore operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A bucket or object does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid bucket name: {0:?}")]
    InvalidBucketName(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this is the "does not exist" failure a front end reports as a miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
            Error::Json(_) => "json",
            Error::NotFound(_) => "not_found",
            Error::InvalidBucketName(_) => "invalid_bucket_name",
            Error::Config(_) => "config",
        }
    }
}
