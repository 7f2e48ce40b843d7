//! Auto-update watcher
//!
//! While a tooltip is open it listens for window resize, window scroll, scroll
//! of each scrollable ancestor of its reference (plus the document root), and
//! mutations under the reference element. Matching host events only enqueue a
//! reposition; the manager computes positions on the next flush, once per
//! tooltip no matter how many events arrived.

use std::sync::Arc;

use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::host::{scroll_parents, ElementKey, ElementRef, HostEvent, Reference};
use crate::manager::TooltipId;

struct Registration {
    scroll_targets: SmallVec<[ElementKey; 8]>,
    /// Subtree observed for mutations, absent for virtual references
    observed: Option<Arc<dyn ElementRef>>,
}

/// Listener table for open tooltips
#[derive(Default)]
pub struct AutoUpdateRegistry {
    registrations: FxHashMap<TooltipId, Registration>,
    /// Scroll container -> tooltips listening on it
    scroll_listeners: FxHashMap<ElementKey, IndexSet<TooltipId>>,
}

impl AutoUpdateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching for `id`, replacing any earlier registration
    pub fn register(&mut self, id: TooltipId, reference: &Reference, document_root: ElementKey) {
        self.unregister(id);

        let mut scroll_targets = match reference.element() {
            Some(element) => scroll_parents(element.as_ref()),
            None => SmallVec::new(),
        };
        if !scroll_targets.contains(&document_root) {
            scroll_targets.push(document_root);
        }

        for key in &scroll_targets {
            self.scroll_listeners.entry(*key).or_default().insert(id);
        }

        tracing::debug!(
            "AutoUpdateRegistry::register - {:?} watching {} scroll targets",
            id,
            scroll_targets.len()
        );

        self.registrations.insert(
            id,
            Registration {
                scroll_targets,
                observed: reference.element().cloned(),
            },
        );
    }

    /// Stop watching for `id`; returns whether anything was registered
    pub fn unregister(&mut self, id: TooltipId) -> bool {
        let Some(registration) = self.registrations.remove(&id) else {
            return false;
        };
        for key in registration.scroll_targets {
            if let Some(listeners) = self.scroll_listeners.get_mut(&key) {
                listeners.shift_remove(&id);
                if listeners.is_empty() {
                    self.scroll_listeners.remove(&key);
                }
            }
        }
        true
    }

    pub fn is_registered(&self, id: TooltipId) -> bool {
        self.registrations.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Scroll containers with at least one listener
    pub fn scroll_target_count(&self) -> usize {
        self.scroll_listeners.len()
    }

    /// Tooltips that must be repositioned because of `event`
    pub fn targets(&self, event: &HostEvent) -> SmallVec<[TooltipId; 4]> {
        match event {
            HostEvent::Resize | HostEvent::WindowScroll => {
                self.registrations.keys().copied().collect()
            }
            HostEvent::ElementScroll(key) => self
                .scroll_listeners
                .get(key)
                .map(|ids| ids.iter().copied().collect())
                .unwrap_or_default(),
            HostEvent::Mutation(key) => self
                .registrations
                .iter()
                .filter(|(_, reg)| {
                    reg.observed
                        .as_ref()
                        .is_some_and(|element| element.contains(*key))
                })
                .map(|(id, _)| *id)
                .collect(),
            _ => SmallVec::new(),
        }
    }
}

impl std::fmt::Debug for AutoUpdateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoUpdateRegistry")
            .field("registrations", &self.registrations.len())
            .field("scroll_targets", &self.scroll_listeners.len())
            .finish()
    }
}

/// Tooltips waiting for a position recompute
///
/// Insertion-ordered and deduplicated, so repeated requests coalesce.
#[derive(Debug, Default)]
pub struct RepositionQueue {
    pending: IndexSet<TooltipId>,
}

impl RepositionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when `id` was already queued
    pub fn request(&mut self, id: TooltipId) -> bool {
        self.pending.insert(id)
    }

    pub fn discard(&mut self, id: TooltipId) {
        self.pending.shift_remove(&id);
    }

    pub fn drain(&mut self) -> Vec<TooltipId> {
        self.pending.drain(..).collect()
    }

    pub fn contains(&self, id: TooltipId) -> bool {
        self.pending.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::FakeElement;
    use crate::host::{Overflow, VirtualElement};
    use kestrel_core::Rect;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<TooltipId> {
        let mut map: SlotMap<TooltipId, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    fn tree() -> (Arc<FakeElement>, Arc<FakeElement>, Arc<FakeElement>) {
        let root = FakeElement::root(1, Rect::new(0.0, 0.0, 800.0, 600.0));
        let list = FakeElement::child(
            &root,
            2,
            Rect::new(0.0, 0.0, 300.0, 300.0),
            (Overflow::Visible, Overflow::Auto),
        );
        let button = FakeElement::child(
            &list,
            3,
            Rect::new(10.0, 10.0, 60.0, 20.0),
            (Overflow::Visible, Overflow::Visible),
        );
        let icon = FakeElement::child(
            &button,
            4,
            Rect::new(12.0, 12.0, 16.0, 16.0),
            (Overflow::Visible, Overflow::Visible),
        );
        (list, button, icon)
    }

    #[test]
    fn test_register_scroll_parents_and_root() {
        let ids = ids(1);
        let (_list, button, _icon) = tree();
        let mut registry = AutoUpdateRegistry::new();
        registry.register(ids[0], &Reference::Element(button), 0);

        assert_eq!(registry.targets(&HostEvent::ElementScroll(2)).as_slice(), &[ids[0]]);
        assert_eq!(registry.targets(&HostEvent::ElementScroll(0)).as_slice(), &[ids[0]]);
        assert!(registry.targets(&HostEvent::ElementScroll(3)).is_empty());
        assert_eq!(registry.targets(&HostEvent::Resize).len(), 1);
    }

    #[test]
    fn test_mutation_inside_reference_subtree() {
        let ids = ids(1);
        let (_list, button, _icon) = tree();
        let mut registry = AutoUpdateRegistry::new();
        registry.register(ids[0], &Reference::Element(button), 0);

        assert_eq!(registry.targets(&HostEvent::Mutation(4)).as_slice(), &[ids[0]]);
        assert!(registry.targets(&HostEvent::Mutation(2)).is_empty());
    }

    #[test]
    fn test_unregister_removes_every_listener() {
        let ids = ids(2);
        let (_list, button, _icon) = tree();
        let mut registry = AutoUpdateRegistry::new();
        registry.register(ids[0], &Reference::Element(button), 0);
        registry.register(
            ids[1],
            &Reference::Virtual(VirtualElement::new(Rect::new(0.0, 0.0, 1.0, 1.0))),
            0,
        );

        assert!(registry.unregister(ids[0]));
        assert!(!registry.unregister(ids[0]));
        assert!(registry.targets(&HostEvent::ElementScroll(2)).is_empty());
        assert_eq!(registry.scroll_target_count(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_queue_coalesces() {
        let ids = ids(2);
        let mut queue = RepositionQueue::new();
        assert!(queue.request(ids[0]));
        assert!(queue.request(ids[1]));
        assert!(!queue.request(ids[0]));
        queue.discard(ids[1]);
        assert_eq!(queue.drain(), vec![ids[0]]);
        assert!(queue.is_empty());
    }
}
