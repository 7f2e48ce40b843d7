//! Kestrel Toast Engine
//!
//! Headless notification state: what toasts exist, where they stack, and when
//! they go away. A renderer reads buckets (via [`Toaster::toasts`] or the
//! [`ToastEvent`] stream) and forwards hover/click input back.
//!
//! # Features
//!
//! - **Position Buckets**: Six ordered stacks with a per-bucket cap (oldest evicted first)
//! - **Dedupe**: Identical adds at the same position within 500ms collapse into one
//! - **Lifecycle Timers**: Auto-dismiss with pause/resume on hover
//! - **Prevent Close**: Refused removals raise a short shake signal instead
//! - **Promise Toasts**: One loading toast that settles into success or error
//! - **Persistence**: Optional snapshot of the buckets in a key-value backend

pub mod api;
pub mod config;
pub mod controller;
pub mod dedupe;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod persist;
pub mod promise;
pub mod store;
pub mod types;

pub use config::{ToastDefaults, ToastSettings, ToasterConfig};
pub use controller::{OnAddCallback, OnRemoveCallback, RemoveOutcome, Toaster, ToasterBuilder};
pub use error::{Result, ToastError};
pub use events::{RemoveReason, ToastEvent};
pub use lifecycle::ToastPhase;
pub use persist::{Persistence, PERSIST_KEY};
pub use promise::{Message, PromiseMessages};
pub use store::ToastStore;
pub use types::{
    Orientation, Progress, Severity, ToastAction, ToastAnimation, ToastIcon, ToastId, ToastKind,
    ToastOptions, ToastPosition, ToastRecord, Variant,
};
