//! Error types for kestrel_toast

use thiserror::Error;

/// Errors raised by the toast engine
///
/// Unknown ids on `update`/`remove` are not errors; those calls are silent no-ops.
#[derive(Error, Debug)]
pub enum ToastError {
    /// A string did not name a known enum value
    #[error("Unknown {kind}: {value:?}")]
    UnknownValue { kind: &'static str, value: String },

    /// A config file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// A config file could not be parsed
    #[error("Invalid toast config: {0}")]
    Config(#[from] toml::de::Error),

    /// Snapshot storage failed
    #[error("Toast persistence failed: {0}")]
    Persist(#[from] kestrel_core::CoreError),
}

/// Result type for kestrel_toast operations
pub type Result<T> = std::result::Result<T, ToastError>;
