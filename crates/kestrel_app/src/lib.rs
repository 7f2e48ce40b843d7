//! Kestrel Application Root
//!
//! Glue between the engines and an application: one [`AppContext`] per root,
//! built from a `kestrel.toml` [`AppConfig`], owning the toaster and the
//! tooltip manager and driving both from a single `tick()`.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use kestrel_app::{AppConfig, AppContext};
//! use kestrel_core::{ManualClock, Rect};
//! use kestrel_toast::ToastOptions;
//! use kestrel_tooltip::LayoutHost;
//!
//! struct Window;
//!
//! impl LayoutHost for Window {
//!     fn viewport(&self) -> Rect {
//!         Rect::new(0.0, 0.0, 800.0, 600.0)
//!     }
//!
//!     fn document_root(&self) -> u64 {
//!         0
//!     }
//! }
//!
//! let app = AppContext::builder(Arc::new(Window))
//!     .clock(Arc::new(ManualClock::new()))
//!     .config(AppConfig::from_toml("[toaster]\nmax = 3").unwrap())
//!     .build();
//!
//! let toaster = app.use_toast().unwrap();
//! toaster.add(ToastOptions::titled("Hello"));
//! app.tick();
//! ```

pub mod config;
pub mod context;
pub mod error;

pub use config::{AppConfig, CONFIG_FILE};
pub use context::{AppContext, AppContextBuilder};
pub use error::{AppError, Result};
