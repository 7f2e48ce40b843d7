//! Notifications published by the [`Toaster`](crate::Toaster)

use crate::types::{ToastId, ToastRecord};

/// Why a toast left its bucket
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoveReason {
    /// `remove`/`dismiss` or an action that dismisses
    Dismissed,
    /// Auto-dismiss countdown ran out
    Expired,
    /// Pushed out by a newer toast in a full bucket
    Evicted,
    /// `clear()`
    Cleared,
}

/// Toast state changes, delivered after the controller lock is released
#[derive(Clone, Debug)]
pub enum ToastEvent {
    Added(ToastRecord),
    Updated(ToastRecord),
    Removed { id: ToastId, reason: RemoveReason },
    /// `remove` refused because the toast has `prevent_close`
    ClosePrevented { id: ToastId },
    ShakeStarted { id: ToastId },
    ShakeEnded { id: ToastId },
    Paused { id: ToastId, remaining_ms: u64 },
    Resumed { id: ToastId },
    /// All buckets emptied; `Removed` events for each toast precede this
    Cleared { count: usize },
}

impl ToastEvent {
    /// Toast this event concerns, if any
    pub fn toast_id(&self) -> Option<&ToastId> {
        match self {
            ToastEvent::Added(record) | ToastEvent::Updated(record) => Some(&record.id),
            ToastEvent::Removed { id, .. }
            | ToastEvent::ClosePrevented { id }
            | ToastEvent::ShakeStarted { id }
            | ToastEvent::ShakeEnded { id }
            | ToastEvent::Paused { id, .. }
            | ToastEvent::Resumed { id } => Some(id),
            ToastEvent::Cleared { .. } => None,
        }
    }

    /// Whether the bucket contents changed
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            ToastEvent::Added(_)
                | ToastEvent::Updated(_)
                | ToastEvent::Removed { .. }
                | ToastEvent::Cleared { .. }
        )
    }
}
