//! Kestrel Core Runtime
//!
//! This crate provides the foundational primitives shared by the Kestrel engines:
//!
//! - **Clock**: Injected time source (`SystemClock` in apps, `ManualClock` in tests)
//! - **Timer Queue**: Single-shot timers driven by `tick()`, with versioned keys so
//!   cancelled or stale timers can never fire
//! - **State Machines**: `StateTransitions` for small event-driven FSMs
//! - **Emitter**: Subscribe/notify channel for state observed by a renderer
//! - **Geometry**: Points, sizes and rectangles for positioning
//! - **Key-Value Snapshots**: Best-effort persistence backends
//! - **Feedback**: Host capabilities (clipboard, vibration) that may be missing
//!
//! # Example
//!
//! ```rust
//! use kestrel_core::clock::{Clock, ManualClock};
//! use kestrel_core::timer::TimerQueue;
//!
//! let clock = ManualClock::new();
//! let mut timers = TimerQueue::new();
//! timers.schedule(clock.now_ms(), 300, "hide");
//!
//! clock.advance(300);
//! let fired = timers.pop_expired(clock.now_ms());
//! assert_eq!(fired.map(|t| t.payload), Some("hide"));
//! ```

pub mod clock;
pub mod emitter;
pub mod error;
pub mod feedback;
pub mod fsm;
pub mod geometry;
pub mod kv;
pub mod timer;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use emitter::{Emitter, Subscription};
pub use error::{CoreError, Result};
pub use feedback::{Feedback, FeedbackError, NoopFeedback};
pub use fsm::StateTransitions;
pub use geometry::{Point, Rect, Size};
pub use kv::{load_json, store_json, FileKv, KvBackend, MemoryKv};
pub use timer::{ExpiredTimer, TimerId, TimerQueue};
