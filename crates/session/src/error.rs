//! Session error types

use thiserror::Error;

/// Errors raised by a [`KeyValueStore`](crate::storage::KeyValueStore)
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
