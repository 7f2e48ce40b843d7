//! Event-driven state machines
//!
//! States are small `Copy` enums. Events are plain `u32` constants grouped in a
//! per-machine module, so several machines can share one dispatch path.
//!
//! # Example
//!
//! ```
//! use kestrel_core::StateTransitions;
//!
//! mod door_events {
//!     pub const OPEN: u32 = 1;
//!     pub const CLOSE: u32 = 2;
//! }
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
//! enum Door {
//!     Open,
//!     Closed,
//! }
//!
//! impl StateTransitions for Door {
//!     fn on_event(&self, event: u32) -> Option<Self> {
//!         match (self, event) {
//!             (Door::Closed, door_events::OPEN) => Some(Door::Open),
//!             (Door::Open, door_events::CLOSE) => Some(Door::Closed),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let mut door = Door::Closed;
//! assert!(door.apply(door_events::OPEN));
//! assert_eq!(door, Door::Open);
//! assert!(!door.apply(door_events::OPEN));
//! ```

use std::hash::Hash;

/// A state that knows its own transitions
pub trait StateTransitions:
    Clone + Copy + PartialEq + Eq + Hash + Send + Sync + std::fmt::Debug + 'static
{
    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: u32) -> Option<Self>;

    /// Apply `event` in place, returning whether the state changed
    fn apply(&mut self, event: u32) -> bool {
        match self.on_event(event) {
            Some(next) => {
                *self = next;
                true
            }
            None => false,
        }
    }
}
