//! Subscribe/notify channel
//!
//! Engines never assume a rendering technology. Whatever draws toasts or
//! tooltips subscribes to an [`Emitter`] and re-reads the engine's snapshot when
//! notified.
//!
//! Listeners are cloned out of the registry before being called, so a listener
//! may subscribe, unsubscribe, or call back into the engine that emitted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;
type ListenerList<E> = RwLock<Vec<(u64, Listener<E>)>>;

/// Broadcasts events to every registered listener, in subscription order
pub struct Emitter<E> {
    listeners: Arc<ListenerList<E>>,
    next_id: AtomicU64,
}

impl<E: 'static> Emitter<E> {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(RwLock::new(Vec::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a listener
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(listener)));

        let weak: Weak<ListenerList<E>> = Arc::downgrade(&self.listeners);
        Subscription {
            id,
            detach: Some(Box::new(move |id| {
                if let Some(listeners) = weak.upgrade() {
                    listeners
                        .write()
                        .unwrap_or_else(|e| e.into_inner())
                        .retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    /// Deliver an event to every listener
    pub fn emit(&self, event: &E) {
        let listeners: Vec<Listener<E>> = self
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        for listener in listeners {
            listener(event);
        }
    }

    /// Deliver a batch of events in order
    pub fn emit_all(&self, events: &[E]) {
        for event in events {
            self.emit(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl<E: 'static> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field(
                "listeners",
                &self
                    .listeners
                    .read()
                    .map(|l| l.len())
                    .unwrap_or_default(),
            )
            .finish()
    }
}

/// Handle returned by [`Emitter::subscribe`]
///
/// The listener stays registered until [`Subscription::cancel`] is called.
/// Dropping the handle does not unsubscribe.
pub struct Subscription {
    id: u64,
    detach: Option<Box<dyn FnOnce(u64) + Send + Sync>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remove the listener. Safe to call after the emitter is gone.
    pub fn cancel(mut self) {
        if let Some(detach) = self.detach.take() {
            detach(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_emit_reaches_all_listeners_in_order() {
        let emitter = Emitter::<u32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let a = Arc::clone(&seen);
        emitter.subscribe(move |e| a.lock().unwrap().push(("a", *e)));
        let b = Arc::clone(&seen);
        emitter.subscribe(move |e| b.lock().unwrap().push(("b", *e)));

        emitter.emit(&7);
        assert_eq!(*seen.lock().unwrap(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_cancel_removes_listener() {
        let emitter = Emitter::<u32>::new();
        let count = Arc::new(AtomicU64::new(0));

        let c = Arc::clone(&count);
        let sub = emitter.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        emitter.emit(&1);
        sub.cancel();
        emitter.emit(&2);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn test_listener_can_subscribe_while_emitting() {
        let emitter = Arc::new(Emitter::<u32>::new());
        let inner = Arc::clone(&emitter);
        emitter.subscribe(move |_| {
            inner.subscribe(|_| {});
        });

        emitter.emit(&1);
        assert_eq!(emitter.listener_count(), 2);
    }

    #[test]
    fn test_cancel_after_emitter_dropped() {
        let emitter = Emitter::<u32>::new();
        let sub = emitter.subscribe(|_| {});
        drop(emitter);
        sub.cancel();
    }
}
