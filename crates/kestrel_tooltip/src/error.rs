//! Error types for kestrel_tooltip

use thiserror::Error;

/// Errors raised by the tooltip engine
#[derive(Error, Debug)]
pub enum TooltipError {
    /// A string did not name a known enum value
    #[error("Unknown {kind}: {value:?}")]
    UnknownValue { kind: &'static str, value: String },

    /// A config file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// A config file could not be parsed
    #[error("Invalid tooltip config: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for kestrel_tooltip operations
pub type Result<T> = std::result::Result<T, TooltipError>;
