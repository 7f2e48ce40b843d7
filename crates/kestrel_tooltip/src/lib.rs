//! Kestrel Tooltip Engine
//!
//! Headless tooltips: the engine decides when a tooltip is open and where it
//! goes, a host renderer draws it.
//!
//! - **Scheduler**: show/hide debounce and auto-hide duration per tooltip
//! - **Positioning**: 12 placements, manual formulas or offset → flip → shift
//! - **Auto-update**: recompute on resize, scroll and mutations while open
//! - **Coordinator**: singleton and group exclusivity with a grace window
//! - **Attach**: one-call binding of a tooltip to an element
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use kestrel_core::{ManualClock, Rect};
//! use kestrel_tooltip::{LayoutHost, Reference, TooltipManager, TooltipOptions, VirtualElement};
//!
//! struct Window;
//!
//! impl LayoutHost for Window {
//!     fn viewport(&self) -> Rect {
//!         Rect::new(0.0, 0.0, 1280.0, 720.0)
//!     }
//!
//!     fn document_root(&self) -> u64 {
//!         0
//!     }
//! }
//!
//! let manager = TooltipManager::new(Arc::new(Window), Arc::new(ManualClock::new()));
//! let id = manager.mount(TooltipOptions::new().content("Copy"));
//! manager.set_reference(id, Reference::from(VirtualElement::new(Rect::new(40.0, 40.0, 24.0, 24.0))));
//!
//! manager.show(id);
//! assert!(manager.is_open(id));
//! ```

pub mod attach;
pub mod auto_update;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod host;
pub mod manager;
pub mod position;
pub mod scheduler;
pub mod types;

pub use attach::{attach, AttachHandle, TooltipBinding};
pub use auto_update::{AutoUpdateRegistry, RepositionQueue};
pub use config::{TooltipConfig, TooltipSettings};
pub use coordinator::{Coordinator, ScopeKey};
pub use error::{Result, TooltipError};
pub use events::TooltipEvent;
pub use host::{
    ElementKey, ElementRef, HostEvent, LayoutHost, Overflow, Reference, VirtualElement,
};
pub use manager::{TooltipId, TooltipManager, TooltipState};
pub use position::{ComputedPosition, PositionRequest};
pub use scheduler::TooltipPhase;
pub use types::{
    Alignment, Boundary, Delay, Offset, Placement, Side, Strategy, Teleport, TooltipOptions,
    Trigger, TriggerSet,
};
