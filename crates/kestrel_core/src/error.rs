//! Error types for kestrel_core

use thiserror::Error;

/// Errors raised by core storage primitives
#[derive(Error, Debug)]
pub enum CoreError {
    /// Reading or writing a snapshot file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot could not be encoded or decoded
    #[error("Snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A key is not usable by the backend (empty, or escapes the storage root)
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Result type for kestrel_core operations
pub type Result<T> = std::result::Result<T, CoreError>;
