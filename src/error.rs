//! Error types for the file cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key absent from memory and disk
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Key resolves to a directory
    #[error("Item is a directory: {0}")]
    IsDirectory(String),

    /// Content exceeds the per-item size ceiling
    #[error("Item is too large: {key} ({size} bytes, max {max_size})")]
    TooLarge {
        key: String,
        size: u64,
        max_size: u64,
    },

    /// Key cannot be used as a path inside the namespace
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Namespace is not a single directory name
    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),

    /// Cache was shut down or destroyed
    #[error("Cache is closed")]
    Closed,

    /// Value could not be serialized
    #[error("Failed to encode value: {0}")]
    Encode(#[source] serde_json::Error),

    /// Stored bytes could not be deserialized
    #[error("Failed to decode value: {0}")]
    Decode(#[source] serde_json::Error),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Returns true for a cache miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
