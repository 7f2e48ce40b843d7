//! Per-toast lifecycle
//!
//! Each live toast owns a [`Lifecycle`]: its [`ToastPhase`] plus the bookkeeping
//! needed to pause and resume the auto-dismiss countdown. The countdown itself is
//! a [`TimerQueue`] entry owned by the controller; this module only schedules and
//! cancels it.
//!
//! ```text
//! Persistent ──ARM──▶ Pending ◀──RESUME── Paused
//!      ▲                │  └──PAUSE──────▶   │
//!      └────DISARM──────┤                    │
//!                     EXPIRE/CLOSE ◀─────CLOSE
//!                       ▼
//!                    Closing ──REMOVED──▶ Removed
//! ```

use kestrel_core::{StateTransitions, TimerId, TimerQueue};

use crate::types::ToastId;

/// Toast lifecycle events
pub mod toast_events {
    /// Countdown armed (Persistent -> Pending)
    pub const ARM: u32 = 31001;
    /// Countdown disabled (Pending/Paused -> Persistent)
    pub const DISARM: u32 = 31002;
    /// Pointer entered the toast (Pending -> Paused)
    pub const PAUSE: u32 = 31003;
    /// Pointer left the toast (Paused -> Pending)
    pub const RESUME: u32 = 31004;
    /// Countdown reached zero (Pending -> Closing)
    pub const EXPIRE: u32 = 31005;
    /// Explicit close request (any live phase -> Closing)
    pub const CLOSE: u32 = 31006;
    /// Record left its bucket (Closing -> Removed, or any phase on clear)
    pub const REMOVED: u32 = 31007;
}

/// Where a toast is in its life
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToastPhase {
    /// No countdown: `duration == 0` or `prevent_close`
    Persistent,
    /// Counting down
    Pending,
    /// Countdown suspended
    Paused,
    /// Leaving its bucket
    Closing,
    /// Gone
    Removed,
}

impl StateTransitions for ToastPhase {
    fn on_event(&self, event: u32) -> Option<Self> {
        use toast_events::*;
        use ToastPhase::*;

        match (self, event) {
            (Persistent, ARM) => Some(Pending),
            (Pending, DISARM) | (Paused, DISARM) => Some(Persistent),

            (Pending, PAUSE) => Some(Paused),
            (Paused, RESUME) => Some(Pending),

            (Pending, EXPIRE) => Some(Closing),
            (Persistent, CLOSE) | (Pending, CLOSE) | (Paused, CLOSE) => Some(Closing),

            (Closing, REMOVED) => Some(Removed),
            // clear() and eviction skip the closing step
            (Persistent, REMOVED) | (Pending, REMOVED) | (Paused, REMOVED) => Some(Removed),

            _ => None,
        }
    }
}

/// Timer payloads owned by the controller
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimerTask {
    /// Auto-dismiss countdown finished
    Expire(ToastId),
    /// Close-refused shake signal ends
    EndShake(ToastId),
}

impl TimerTask {
    pub fn toast_id(&self) -> &ToastId {
        match self {
            TimerTask::Expire(id) | TimerTask::EndShake(id) => id,
        }
    }
}

/// Phase plus countdown bookkeeping for one toast
#[derive(Clone, Debug)]
pub struct Lifecycle {
    id: ToastId,
    phase: ToastPhase,
    /// Countdown left when last (re)started
    remaining_ms: u64,
    /// When the running countdown was scheduled
    started_at_ms: u64,
    timer: Option<TimerId>,
}

impl Lifecycle {
    /// Create the lifecycle for a new toast, arming the countdown if `duration_ms > 0`
    pub fn start(
        id: ToastId,
        duration_ms: u64,
        auto_dismiss: bool,
        now_ms: u64,
        timers: &mut TimerQueue<TimerTask>,
    ) -> Self {
        let mut lifecycle = Self {
            id,
            phase: ToastPhase::Persistent,
            remaining_ms: duration_ms,
            started_at_ms: now_ms,
            timer: None,
        };
        if auto_dismiss && duration_ms > 0 {
            lifecycle.arm(now_ms, timers);
        }
        lifecycle
    }

    pub fn phase(&self) -> ToastPhase {
        self.phase
    }

    pub fn timer(&self) -> Option<TimerId> {
        self.timer
    }

    /// Countdown left at `now_ms`, `None` for persistent toasts
    pub fn remaining(&self, now_ms: u64) -> Option<u64> {
        match self.phase {
            ToastPhase::Pending => {
                Some(self.remaining_ms.saturating_sub(now_ms.saturating_sub(self.started_at_ms)))
            }
            ToastPhase::Paused => Some(self.remaining_ms),
            _ => None,
        }
    }

    fn arm(&mut self, now_ms: u64, timers: &mut TimerQueue<TimerTask>) {
        if self.phase.apply(toast_events::ARM) {
            self.schedule(now_ms, timers);
        }
    }

    fn schedule(&mut self, now_ms: u64, timers: &mut TimerQueue<TimerTask>) {
        self.started_at_ms = now_ms;
        self.timer = Some(timers.schedule(
            now_ms,
            self.remaining_ms,
            TimerTask::Expire(self.id.clone()),
        ));
    }

    fn cancel_timer(&mut self, timers: &mut TimerQueue<TimerTask>) {
        if let Some(timer) = self.timer.take() {
            timers.cancel(timer);
        }
    }

    /// Suspend the countdown. Returns false when nothing was running.
    pub fn pause(&mut self, now_ms: u64, timers: &mut TimerQueue<TimerTask>) -> bool {
        if self.phase != ToastPhase::Pending {
            return false;
        }
        let elapsed = now_ms.saturating_sub(self.started_at_ms);
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
        self.cancel_timer(timers);
        self.phase.apply(toast_events::PAUSE)
    }

    /// Continue a paused countdown with the time that was left
    pub fn resume(&mut self, now_ms: u64, timers: &mut TimerQueue<TimerTask>) -> bool {
        if !self.phase.apply(toast_events::RESUME) {
            return false;
        }
        self.schedule(now_ms, timers);
        true
    }

    /// Start over with a new duration
    ///
    /// A paused toast stays paused with the full new duration banked.
    pub fn restart(
        &mut self,
        duration_ms: u64,
        auto_dismiss: bool,
        now_ms: u64,
        timers: &mut TimerQueue<TimerTask>,
    ) {
        self.cancel_timer(timers);
        self.remaining_ms = duration_ms;

        if !(auto_dismiss && duration_ms > 0) {
            self.phase.apply(toast_events::DISARM);
            return;
        }

        match self.phase {
            ToastPhase::Persistent => self.arm(now_ms, timers),
            ToastPhase::Pending => self.schedule(now_ms, timers),
            _ => {}
        }
    }

    /// Whether `timer` is this toast's live countdown
    ///
    /// Stale timers from an earlier countdown never match.
    pub fn owns_timer(&self, timer: TimerId) -> bool {
        self.timer == Some(timer)
    }

    /// The countdown fired
    pub fn expire(&mut self) -> bool {
        self.timer = None;
        self.phase.apply(toast_events::EXPIRE)
    }

    /// Begin an explicit close
    pub fn close(&mut self, timers: &mut TimerQueue<TimerTask>) -> bool {
        self.cancel_timer(timers);
        self.phase.apply(toast_events::CLOSE)
    }

    /// The record left its bucket
    pub fn finish(&mut self, timers: &mut TimerQueue<TimerTask>) {
        self.cancel_timer(timers);
        self.phase.apply(toast_events::REMOVED);
    }

    /// Drop the countdown without changing the phase (component unmounted)
    pub fn detach(&mut self, timers: &mut TimerQueue<TimerTask>) {
        self.cancel_timer(timers);
    }
}
