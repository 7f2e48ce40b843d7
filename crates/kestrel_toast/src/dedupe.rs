//! Duplicate suppression
//!
//! Remembers recent `(position, title, description)` adds. A repeat inside the
//! window resolves to the first toast's id instead of creating a new one.

use std::collections::VecDeque;

use crate::types::{ToastId, ToastPosition};

#[derive(Clone, Debug)]
struct DedupeEntry {
    position: ToastPosition,
    title: Option<String>,
    description: Option<String>,
    at_ms: u64,
    id: ToastId,
}

/// Sliding window of recent adds
#[derive(Clone, Debug)]
pub struct DedupeWindow {
    window_ms: u64,
    entries: VecDeque<DedupeEntry>,
}

impl DedupeWindow {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            entries: VecDeque::new(),
        }
    }

    /// Id of a matching add still inside the window
    pub fn lookup(
        &mut self,
        position: ToastPosition,
        title: Option<&str>,
        description: Option<&str>,
        now_ms: u64,
    ) -> Option<ToastId> {
        self.prune(now_ms);
        self.entries
            .iter()
            .find(|e| {
                e.position == position
                    && e.title.as_deref() == title
                    && e.description.as_deref() == description
            })
            .map(|e| e.id.clone())
    }

    pub fn record(
        &mut self,
        position: ToastPosition,
        title: Option<String>,
        description: Option<String>,
        id: ToastId,
        now_ms: u64,
    ) {
        self.entries.push_back(DedupeEntry {
            position,
            title,
            description,
            at_ms: now_ms,
            id,
        });
    }

    /// Drop every entry that resolves to `id`, once that toast is gone
    pub fn forget(&mut self, id: &ToastId) {
        self.entries.retain(|e| &e.id != id);
    }

    /// Forget entries older than the window
    fn prune(&mut self, now_ms: u64) {
        while let Some(front) = self.entries.front() {
            if now_ms.saturating_sub(front.at_ms) >= self.window_ms {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
