//! Host feedback capabilities
//!
//! Clipboard and haptics depend on the environment and are frequently missing
//! (headless runs, desktop without a vibration motor). Callers treat every
//! failure here as non-fatal: log it and carry on with the action.

use thiserror::Error;

/// Why a feedback request could not be honoured
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedbackError {
    /// The host has no such capability
    #[error("{0} is not available on this host")]
    Unavailable(&'static str),

    /// The capability exists but the request failed
    #[error("{capability} failed: {reason}")]
    Failed {
        capability: &'static str,
        reason: String,
    },
}

/// Clipboard and vibration access provided by the host
pub trait Feedback: Send + Sync {
    fn copy_to_clipboard(&self, text: &str) -> Result<(), FeedbackError>;

    fn vibrate(&self, duration_ms: u32) -> Result<(), FeedbackError>;
}

/// Host without clipboard or haptics
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFeedback;

impl Feedback for NoopFeedback {
    fn copy_to_clipboard(&self, _text: &str) -> Result<(), FeedbackError> {
        Err(FeedbackError::Unavailable("clipboard"))
    }

    fn vibrate(&self, _duration_ms: u32) -> Result<(), FeedbackError> {
        Err(FeedbackError::Unavailable("vibration"))
    }
}
