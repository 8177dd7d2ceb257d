//! Storage error types.
//!
//! Returned by [`crate::KeyValueStorage`] backends; [`crate::ChatStorage`] logs and swallows them.

use thiserror::Error;

/// Errors that can occur when using storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
