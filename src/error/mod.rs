// Error types for the prediction cache
// Author: kelexine (https://github.com/kelexine)

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Storage medium unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Storage quota exceeded: needed {needed} bytes, quota {quota} bytes")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Corrupt cache entry: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to encode cache entry: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),
}

impl CacheError {
    /// Whether this error means the medium itself could not be used
    /// (as opposed to a single bad entry).
    pub fn is_medium_failure(&self) -> bool {
        matches!(
            self,
            CacheError::StoreUnavailable(_) | CacheError::QuotaExceeded { .. } | CacheError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
