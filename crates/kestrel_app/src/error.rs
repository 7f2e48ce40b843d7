//! Error types for kestrel_app

use thiserror::Error;

/// Errors raised while building or querying an application root
#[derive(Error, Debug)]
pub enum AppError {
    /// A service was requested from a context that was built without it
    #[error("No {0} provider: build the AppContext with it enabled before calling use_{0}")]
    MissingProvider(&'static str),

    /// The config file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid
    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),

    /// Toast engine error
    #[error(transparent)]
    Toast(#[from] kestrel_toast::ToastError),

    /// Tooltip engine error
    #[error(transparent)]
    Tooltip(#[from] kestrel_tooltip::TooltipError),
}

/// Result type for kestrel_app operations
pub type Result<T> = std::result::Result<T, AppError>;
