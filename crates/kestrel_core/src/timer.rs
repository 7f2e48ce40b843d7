//! Single-shot timer queue
//!
//! Timers are plain data: a deadline and a payload describing what should happen.
//! Nothing runs on its own. The owner calls [`TimerQueue::pop_expired`] from its
//! `tick()` and dispatches each payload itself, which keeps all state mutation on
//! the caller's thread and inside the caller's lock.
//!
//! Timer keys are versioned (`slotmap`), so cancelling an already-fired timer, or
//! a timer whose slot has been reused, is a no-op rather than cancelling somebody
//! else's timer.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a scheduled timer
    pub struct TimerId;
}

#[derive(Debug)]
struct TimerEntry<P> {
    deadline_ms: u64,
    /// Insertion sequence, breaks ties between equal deadlines
    seq: u64,
    payload: P,
}

/// A timer that reached its deadline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredTimer<P> {
    pub id: TimerId,
    /// The time the timer was due. Follow-up timers should be scheduled relative to this,
    /// not to the tick time, so coarse ticks don't accumulate drift.
    pub deadline_ms: u64,
    pub payload: P,
}

/// Ordered collection of pending single-shot timers
#[derive(Debug)]
pub struct TimerQueue<P> {
    timers: SlotMap<TimerId, TimerEntry<P>>,
    next_seq: u64,
}

impl<P> TimerQueue<P> {
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            next_seq: 0,
        }
    }

    /// Schedule `payload` to fire `delay_ms` after `now_ms`
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, payload: P) -> TimerId {
        self.schedule_at(now_ms.saturating_add(delay_ms), payload)
    }

    /// Schedule `payload` at an absolute deadline
    pub fn schedule_at(&mut self, deadline_ms: u64, payload: P) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.insert(TimerEntry {
            deadline_ms,
            seq,
            payload,
        })
    }

    /// Cancel a timer, returning its payload if it was still pending
    pub fn cancel(&mut self, id: TimerId) -> Option<P> {
        self.timers.remove(id).map(|entry| entry.payload)
    }

    /// Cancel every timer whose payload matches `predicate`
    pub fn cancel_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&P) -> bool,
    {
        let before = self.timers.len();
        self.timers.retain(|_, entry| !predicate(&entry.payload));
        before - self.timers.len()
    }

    /// Check whether a timer is still pending
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Deadline of a pending timer
    pub fn deadline(&self, id: TimerId) -> Option<u64> {
        self.timers.get(id).map(|entry| entry.deadline_ms)
    }

    /// Time left before a pending timer fires
    pub fn remaining(&self, id: TimerId, now_ms: u64) -> Option<u64> {
        self.deadline(id)
            .map(|deadline| deadline.saturating_sub(now_ms))
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.values().map(|entry| entry.deadline_ms).min()
    }

    /// Remove and return the earliest timer due at or before `now_ms`
    ///
    /// Call in a loop: a payload handler may schedule new timers that are
    /// themselves already due, and those must fire in deadline order too.
    pub fn pop_expired(&mut self, now_ms: u64) -> Option<ExpiredTimer<P>> {
        let id = self
            .timers
            .iter()
            .filter(|(_, entry)| entry.deadline_ms <= now_ms)
            .min_by_key(|(_, entry)| (entry.deadline_ms, entry.seq))
            .map(|(id, _)| id)?;

        let entry = self.timers.remove(id)?;
        Some(ExpiredTimer {
            id,
            deadline_ms: entry.deadline_ms,
            payload: entry.payload,
        })
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.timers.clear();
    }
}

impl<P> Default for TimerQueue<P> {
    fn default() -> Self {
        Self::new()
    }
}
