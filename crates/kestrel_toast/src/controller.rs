//! Toast controller
//!
//! [`Toaster`] is the one service object that owns every toast. It is a cheap
//! `Clone` handle around `Arc<Mutex<ToasterInner>>`; each public call takes the
//! lock once, mutates, collects the resulting [`ToastEvent`]s in an outbox, and
//! only then (lock released) runs hooks and subscribers. A subscriber may call
//! back into the toaster without deadlocking.
//!
//! Time never advances on its own: the host calls [`Toaster::tick`] from its frame
//! loop (or a tokio interval), which fires every due lifecycle timer.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use kestrel_core::ManualClock;
//! use kestrel_toast::{ToastOptions, Toaster};
//!
//! let clock = Arc::new(ManualClock::new());
//! let toaster = Toaster::builder(clock.clone()).build();
//!
//! let id = toaster.add(ToastOptions::titled("Saved").duration_ms(3000));
//! assert!(toaster.is_active(&id));
//!
//! clock.advance(3000);
//! toaster.tick();
//! assert!(!toaster.is_active(&id));
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use kestrel_core::{Emitter, Feedback, NoopFeedback, SharedClock, Subscription, TimerId, TimerQueue};
use rustc_hash::FxHashMap;

use crate::config::ToastSettings;
use crate::dedupe::DedupeWindow;
use crate::events::{RemoveReason, ToastEvent};
use crate::lifecycle::{Lifecycle, TimerTask, ToastPhase};
use crate::persist::Persistence;
use crate::store::ToastStore;
use crate::types::{ToastId, ToastOptions, ToastPosition, ToastRecord};

/// Called with every toast that enters a bucket
pub type OnAddCallback = Arc<dyn Fn(&ToastRecord) + Send + Sync>;

/// Called with the id of every toast that leaves a bucket
pub type OnRemoveCallback = Arc<dyn Fn(&ToastId) + Send + Sync>;

/// Result of a [`Toaster::remove`] call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// The toast has `prevent_close`; it stays and shakes
    Prevented,
    NotFound,
}

// =============================================================================
// ToasterInner
// =============================================================================

/// State behind the [`Toaster`] lock
pub struct ToasterInner {
    settings: ToastSettings,
    store: ToastStore,
    dedupe: DedupeWindow,
    timers: TimerQueue<TimerTask>,
    lifecycles: FxHashMap<ToastId, Lifecycle>,
    /// Shake timers for toasts that refused to close
    shaking: FxHashMap<ToastId, TimerId>,
    next_id: u64,
    outbox: Vec<ToastEvent>,
}

impl ToasterInner {
    fn new(settings: ToastSettings) -> Self {
        let dedupe = DedupeWindow::new(settings.toaster.dedupe_window_ms);
        Self {
            settings,
            store: ToastStore::new(),
            dedupe,
            timers: TimerQueue::new(),
            lifecycles: FxHashMap::default(),
            shaking: FxHashMap::default(),
            next_id: 1,
            outbox: Vec::new(),
        }
    }

    fn take_outbox(&mut self) -> Vec<ToastEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn generate_id(&mut self) -> ToastId {
        loop {
            let id = ToastId::Num(self.next_id);
            self.next_id += 1;
            if !self.store.contains(&id) {
                return id;
            }
        }
    }

    fn add(&mut self, options: ToastOptions, now_ms: u64, dedupe: bool) -> ToastId {
        if let Some(id) = options.id.clone() {
            if self.store.contains(&id) {
                tracing::debug!("Toaster::add - id {} exists, updating in place", id);
                self.update(&id, options, now_ms);
                return id;
            }
        }

        let position = options.position.unwrap_or(self.settings.toast.position);

        if dedupe {
            if let Some(existing) = self.dedupe.lookup(
                position,
                options.title.as_deref(),
                options.description.as_deref(),
                now_ms,
            ) {
                tracing::debug!("Toaster::add - duplicate of {} suppressed", existing);
                return existing;
            }
        }

        let id = match options.id.clone() {
            Some(id) => id,
            None => self.generate_id(),
        };

        let record = ToastRecord::from_options(id.clone(), options, &self.settings.toast, now_ms);
        self.dedupe.record(
            position,
            record.title.clone(),
            record.description.clone(),
            id.clone(),
            now_ms,
        );

        let lifecycle = Lifecycle::start(
            id.clone(),
            record.duration_ms,
            record.auto_dismisses(),
            now_ms,
            &mut self.timers,
        );
        self.lifecycles.insert(id.clone(), lifecycle);
        self.store.push(record.clone());

        tracing::debug!(
            "Toaster::add - {} in {} (duration {}ms)",
            id,
            position,
            record.duration_ms
        );

        for evicted in self
            .store
            .evict_overflow(position, self.settings.toaster.max.max(1))
        {
            tracing::debug!("Toaster::add - evicting {} from {}", evicted.id, position);
            self.forget(&evicted.id);
            self.outbox.push(ToastEvent::Removed {
                id: evicted.id,
                reason: RemoveReason::Evicted,
            });
        }

        self.outbox.push(ToastEvent::Added(record));
        id
    }

    fn update(&mut self, id: &ToastId, patch: ToastOptions, now_ms: u64) -> bool {
        let Some(record) = self.store.find_mut(id) else {
            tracing::debug!("Toaster::update - unknown id {}", id);
            return false;
        };

        let effect = record.apply(patch);
        let record = record.clone();

        if effect.timing_changed {
            if let Some(lifecycle) = self.lifecycles.get_mut(id) {
                lifecycle.restart(
                    record.duration_ms,
                    record.auto_dismisses(),
                    now_ms,
                    &mut self.timers,
                );
            }
        }

        self.outbox.push(ToastEvent::Updated(record));
        true
    }

    fn remove(&mut self, id: &ToastId, reason: RemoveReason, now_ms: u64) -> RemoveOutcome {
        let Some(record) = self.store.find(id) else {
            return RemoveOutcome::NotFound;
        };

        if record.prevent_close {
            tracing::debug!("Toaster::remove - {} has prevent_close", id);
            self.outbox.push(ToastEvent::ClosePrevented { id: id.clone() });
            self.start_shake(id, now_ms);
            return RemoveOutcome::Prevented;
        }

        if let Some(lifecycle) = self.lifecycles.get_mut(id) {
            lifecycle.close(&mut self.timers);
        }
        self.store.take(id);
        self.forget(id);

        tracing::debug!("Toaster::remove - {} ({:?})", id, reason);
        self.outbox.push(ToastEvent::Removed {
            id: id.clone(),
            reason,
        });
        RemoveOutcome::Removed
    }

    fn clear(&mut self) {
        let removed = self.store.drain_all();
        let count = removed.len();
        for record in removed {
            self.forget(&record.id);
            self.outbox.push(ToastEvent::Removed {
                id: record.id,
                reason: RemoveReason::Cleared,
            });
        }
        self.dedupe.clear();
        tracing::debug!("Toaster::clear - removed {} toasts", count);
        self.outbox.push(ToastEvent::Cleared { count });
    }

    /// Cancel every timer tied to `id` and drop its lifecycle
    fn forget(&mut self, id: &ToastId) {
        self.dedupe.forget(id);
        if let Some(mut lifecycle) = self.lifecycles.remove(id) {
            lifecycle.finish(&mut self.timers);
        }
        if let Some(timer) = self.shaking.remove(id) {
            self.timers.cancel(timer);
        }
    }

    fn start_shake(&mut self, id: &ToastId, now_ms: u64) {
        if let Some(previous) = self.shaking.remove(id) {
            self.timers.cancel(previous);
        }
        let timer = self.timers.schedule(
            now_ms,
            self.settings.toaster.shake_ms,
            TimerTask::EndShake(id.clone()),
        );
        self.shaking.insert(id.clone(), timer);
        self.outbox.push(ToastEvent::ShakeStarted { id: id.clone() });
    }

    fn pause(&mut self, id: &ToastId, now_ms: u64) -> bool {
        let Some(lifecycle) = self.lifecycles.get_mut(id) else {
            return false;
        };
        if !lifecycle.pause(now_ms, &mut self.timers) {
            return false;
        }
        let remaining_ms = lifecycle.remaining(now_ms).unwrap_or(0);
        tracing::debug!("Toaster::pause - {} with {}ms left", id, remaining_ms);
        self.outbox.push(ToastEvent::Paused {
            id: id.clone(),
            remaining_ms,
        });
        true
    }

    fn resume(&mut self, id: &ToastId, now_ms: u64) -> bool {
        let Some(lifecycle) = self.lifecycles.get_mut(id) else {
            return false;
        };
        if !lifecycle.resume(now_ms, &mut self.timers) {
            return false;
        }
        tracing::debug!("Toaster::resume - {}", id);
        self.outbox.push(ToastEvent::Resumed { id: id.clone() });
        true
    }

    fn tick(&mut self, now_ms: u64) {
        while let Some(expired) = self.timers.pop_expired(now_ms) {
            match expired.payload {
                TimerTask::Expire(id) => {
                    let live = self
                        .lifecycles
                        .get_mut(&id)
                        .filter(|lifecycle| lifecycle.owns_timer(expired.id));
                    let Some(lifecycle) = live else {
                        continue;
                    };
                    if lifecycle.expire() {
                        self.remove(&id, RemoveReason::Expired, expired.deadline_ms);
                    }
                }
                TimerTask::EndShake(id) => {
                    if self.shaking.get(&id) == Some(&expired.id) {
                        self.shaking.remove(&id);
                        self.outbox.push(ToastEvent::ShakeEnded { id });
                    }
                }
            }
        }
    }

    fn unmount(&mut self, id: &ToastId) -> bool {
        let mut found = false;
        if let Some(lifecycle) = self.lifecycles.get_mut(id) {
            lifecycle.detach(&mut self.timers);
            found = true;
        }
        if let Some(timer) = self.shaking.remove(id) {
            self.timers.cancel(timer);
            found = true;
        }
        found
    }

    fn restore(&mut self, mut snapshot: ToastStore, now_ms: u64) {
        for mut record in snapshot.drain_all() {
            if self.store.contains(&record.id) {
                continue;
            }
            if let ToastId::Num(n) = record.id {
                self.next_id = self.next_id.max(n + 1);
            }
            record.created_at_ms = now_ms;
            let lifecycle = Lifecycle::start(
                record.id.clone(),
                record.duration_ms,
                record.auto_dismisses(),
                now_ms,
                &mut self.timers,
            );
            self.lifecycles.insert(record.id.clone(), lifecycle);
            let position = record.position;
            self.store.push(record);
            for evicted in self
                .store
                .evict_overflow(position, self.settings.toaster.max.max(1))
            {
                self.forget(&evicted.id);
            }
        }
        tracing::debug!("Toaster::restore - {} toasts restored", self.store.len());
    }
}

// =============================================================================
// Toaster
// =============================================================================

/// Shared toast controller
#[derive(Clone)]
pub struct Toaster {
    inner: Arc<Mutex<ToasterInner>>,
    clock: SharedClock,
    events: Arc<Emitter<ToastEvent>>,
    on_add: Option<OnAddCallback>,
    on_remove: Option<OnRemoveCallback>,
    feedback: Arc<dyn Feedback>,
    persistence: Option<Persistence>,
}

impl Toaster {
    /// Controller with default settings
    pub fn new(clock: SharedClock) -> Self {
        Self::builder(clock).build()
    }

    pub fn builder(clock: SharedClock) -> ToasterBuilder {
        ToasterBuilder::new(clock)
    }

    fn lock(&self) -> MutexGuard<'_, ToasterInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `f` under the lock, then publish whatever it queued
    fn with_inner<R>(&self, f: impl FnOnce(&mut ToasterInner, u64) -> R) -> R {
        let now = self.clock.now_ms();
        let (result, events) = {
            let mut inner = self.lock();
            let result = f(&mut inner, now);
            (result, inner.take_outbox())
        };
        self.dispatch(events);
        result
    }

    fn dispatch(&self, events: Vec<ToastEvent>) {
        if events.is_empty() {
            return;
        }
        let mutated = events.iter().any(ToastEvent::is_mutation);

        for event in &events {
            match event {
                ToastEvent::Added(record) => {
                    if let Some(on_add) = &self.on_add {
                        on_add(record);
                    }
                }
                ToastEvent::Removed { id, .. } => {
                    if let Some(on_remove) = &self.on_remove {
                        on_remove(id);
                    }
                }
                _ => {}
            }
            self.events.emit(event);
        }

        if mutated {
            if let Some(persistence) = &self.persistence {
                let snapshot = self.lock().store.clone();
                persistence.save(&snapshot);
            }
        }
    }

    /// Add a toast, returning its id
    ///
    /// An explicit id that already exists updates that toast instead. An add
    /// identical to a recent one at the same position returns the earlier id.
    pub fn add(&self, options: ToastOptions) -> ToastId {
        self.with_inner(|inner, now| inner.add(options, now, true))
    }

    /// Add without the duplicate check, so every call creates a toast
    pub(crate) fn add_unique(&self, options: ToastOptions) -> ToastId {
        self.with_inner(|inner, now| inner.add(options, now, false))
    }

    /// Merge `patch` into an existing toast. Unknown ids are ignored.
    pub fn update(&self, id: &ToastId, patch: ToastOptions) -> bool {
        self.with_inner(|inner, now| inner.update(id, patch, now))
    }

    pub fn remove(&self, id: &ToastId) -> RemoveOutcome {
        self.with_inner(|inner, now| inner.remove(id, RemoveReason::Dismissed, now))
    }

    /// Alias of [`remove`](Self::remove)
    pub fn dismiss(&self, id: &ToastId) -> RemoveOutcome {
        self.remove(id)
    }

    /// Remove every toast, `prevent_close` included
    pub fn clear(&self) {
        self.with_inner(|inner, _| inner.clear())
    }

    pub fn is_active(&self, id: &ToastId) -> bool {
        self.lock().store.contains(id)
    }

    /// Suspend a toast's countdown (pointer entered it)
    pub fn pause(&self, id: &ToastId) -> bool {
        self.with_inner(|inner, now| inner.pause(id, now))
    }

    /// Continue a suspended countdown (pointer left it)
    pub fn resume(&self, id: &ToastId) -> bool {
        self.with_inner(|inner, now| inner.resume(id, now))
    }

    /// Fire every due timer. Call once per frame.
    pub fn tick(&self) {
        self.with_inner(|inner, now| inner.tick(now))
    }

    /// Cancel a toast's timers when its view goes away
    ///
    /// The record stays in its bucket; it just never expires or stops shaking.
    pub fn unmount(&self, id: &ToastId) -> bool {
        let found = self.lock().unmount(id);
        if found {
            tracing::debug!("Toaster::unmount - timers for {} cancelled", id);
        }
        found
    }

    /// Cancel every pending timer (provider torn down)
    pub fn shutdown(&self) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        for lifecycle in inner.lifecycles.values_mut() {
            lifecycle.detach(&mut inner.timers);
        }
        inner.timers.clear();
        inner.shaking.clear();
        tracing::debug!("Toaster::shutdown - all timers cancelled");
    }

    /// Earliest pending timer deadline, for hosts that sleep between frames
    pub fn next_deadline(&self) -> Option<u64> {
        self.lock().timers.next_deadline()
    }

    /// Run action `index` of a toast
    ///
    /// Clipboard and vibration failures are logged; the callback still runs.
    pub fn invoke_action(&self, id: &ToastId, index: usize) -> bool {
        let action = {
            let inner = self.lock();
            inner
                .store
                .find(id)
                .and_then(|record| record.action_at(index))
                .cloned()
        };
        let Some(action) = action else {
            return false;
        };

        if let Some(text) = &action.copy_text {
            if let Err(e) = self.feedback.copy_to_clipboard(text) {
                tracing::warn!("Toaster::invoke_action - clipboard: {}", e);
            }
        }
        if let Some(duration_ms) = action.vibrate_ms {
            if let Err(e) = self.feedback.vibrate(duration_ms) {
                tracing::warn!("Toaster::invoke_action - vibrate: {}", e);
            }
        }

        (action.on_click)();

        if action.dismiss {
            self.remove(id);
        }
        true
    }

    pub fn get(&self, id: &ToastId) -> Option<ToastRecord> {
        self.lock().store.find(id).cloned()
    }

    /// Toasts at `position`, in display order
    pub fn toasts(&self, position: ToastPosition) -> Vec<ToastRecord> {
        self.lock().store.bucket(position).to_vec()
    }

    /// Copy of every bucket
    pub fn snapshot(&self) -> ToastStore {
        self.lock().store.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().store.is_empty()
    }

    pub fn phase(&self, id: &ToastId) -> Option<ToastPhase> {
        self.lock().lifecycles.get(id).map(Lifecycle::phase)
    }

    /// Whether the close-refused signal is raised for `id`
    pub fn is_shaking(&self, id: &ToastId) -> bool {
        self.lock().shaking.contains_key(id)
    }

    /// Countdown left for `id`, `None` when it doesn't auto-dismiss
    pub fn remaining(&self, id: &ToastId) -> Option<u64> {
        let now = self.clock.now_ms();
        self.lock()
            .lifecycles
            .get(id)
            .and_then(|lifecycle| lifecycle.remaining(now))
    }

    pub fn settings(&self) -> ToastSettings {
        self.lock().settings.clone()
    }

    /// Receive every [`ToastEvent`]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ToastEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }
}

impl std::fmt::Debug for Toaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toaster")
            .field("toasts", &self.len())
            .field("listeners", &self.events.listener_count())
            .finish()
    }
}

// =============================================================================
// ToasterBuilder
// =============================================================================

/// Builder for [`Toaster`]
pub struct ToasterBuilder {
    clock: SharedClock,
    settings: ToastSettings,
    on_add: Option<OnAddCallback>,
    on_remove: Option<OnRemoveCallback>,
    feedback: Arc<dyn Feedback>,
    persistence: Option<Persistence>,
}

impl ToasterBuilder {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            settings: ToastSettings::default(),
            on_add: None,
            on_remove: None,
            feedback: Arc::new(NoopFeedback),
            persistence: None,
        }
    }

    pub fn settings(mut self, settings: ToastSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn on_add<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ToastRecord) + Send + Sync + 'static,
    {
        self.on_add = Some(Arc::new(callback));
        self
    }

    pub fn on_remove<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ToastId) + Send + Sync + 'static,
    {
        self.on_remove = Some(Arc::new(callback));
        self
    }

    /// Clipboard/vibration provider used by toast actions
    pub fn feedback(mut self, feedback: Arc<dyn Feedback>) -> Self {
        self.feedback = feedback;
        self
    }

    /// Snapshot storage. Only used when `toaster.persist` is enabled.
    pub fn persistence(mut self, persistence: Persistence) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn build(self) -> Toaster {
        let persistence = self
            .persistence
            .filter(|_| self.settings.toaster.persist);

        let mut inner = ToasterInner::new(self.settings);
        if let Some(snapshot) = persistence.as_ref().and_then(Persistence::restore) {
            inner.restore(snapshot, self.clock.now_ms());
        }

        Toaster {
            inner: Arc::new(Mutex::new(inner)),
            clock: self.clock,
            events: Arc::new(Emitter::new()),
            on_add: self.on_add,
            on_remove: self.on_remove,
            feedback: self.feedback,
            persistence,
        }
    }
}
