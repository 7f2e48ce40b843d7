//! Show/hide delay scheduler
//!
//! One [`DelayScheduler`] per tooltip tracks its [`TooltipPhase`] and the three
//! timers that can move it: the show debounce, the hide debounce, and the
//! auto-hide duration. Opening and closing are split from requesting them so
//! the manager can settle singleton/group ownership in between.
//!
//! ```text
//! Closed ──REQUEST_SHOW──▶ PendingShow ──SHOW_ELAPSED──▶ Open
//!   ▲  └──────────────OPEN_NOW────────────────────────▶ │ ▲
//!   │                                                    │ │ CANCEL_HIDE
//!   └──HIDE_ELAPSED── PendingHide ◀──REQUEST_HIDE────────┘ │
//!                          └───────────────────────────────┘
//! ```

use kestrel_core::{StateTransitions, TimerId, TimerQueue};

use crate::manager::{TooltipId, TooltipTask};

/// Scheduler events
pub mod tooltip_events {
    /// Show requested with a delay (Closed -> PendingShow)
    pub const REQUEST_SHOW: u32 = 32001;
    /// Show delay elapsed (PendingShow -> Open)
    pub const SHOW_ELAPSED: u32 = 32002;
    /// Open without waiting (Closed/PendingShow -> Open)
    pub const OPEN_NOW: u32 = 32003;
    /// Hide requested with a delay (Open -> PendingHide)
    pub const REQUEST_HIDE: u32 = 32004;
    /// Hide delay elapsed (PendingHide -> Closed)
    pub const HIDE_ELAPSED: u32 = 32005;
    /// Close without waiting (Open/PendingHide -> Closed)
    pub const CLOSE_NOW: u32 = 32006;
    /// Pending show abandoned (PendingShow -> Closed)
    pub const CANCEL_SHOW: u32 = 32007;
    /// Pending hide abandoned (PendingHide -> Open)
    pub const CANCEL_HIDE: u32 = 32008;
}

/// Visibility state of one tooltip
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TooltipPhase {
    #[default]
    Closed,
    PendingShow,
    Open,
    PendingHide,
}

impl TooltipPhase {
    /// Visible to the user (a pending hide is still on screen)
    pub fn is_open(self) -> bool {
        matches!(self, TooltipPhase::Open | TooltipPhase::PendingHide)
    }
}

impl StateTransitions for TooltipPhase {
    fn on_event(&self, event: u32) -> Option<Self> {
        use tooltip_events::*;
        use TooltipPhase::*;

        match (self, event) {
            (Closed, REQUEST_SHOW) => Some(PendingShow),
            (PendingShow, SHOW_ELAPSED) => Some(Open),
            (Closed, OPEN_NOW) | (PendingShow, OPEN_NOW) => Some(Open),
            (PendingShow, CANCEL_SHOW) => Some(Closed),

            (Open, REQUEST_HIDE) => Some(PendingHide),
            (PendingHide, HIDE_ELAPSED) => Some(Closed),
            (Open, CLOSE_NOW) | (PendingHide, CLOSE_NOW) => Some(Closed),
            (PendingHide, CANCEL_HIDE) => Some(Open),

            _ => None,
        }
    }
}

/// Outcome of a show request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShowRequest {
    /// Already open (a pending hide was cancelled if there was one)
    Ignored,
    /// Debounce timer started. `fresh` is false when an earlier pending show was restarted.
    Scheduled { fresh: bool },
    /// No delay: the caller should open now
    Ready,
}

/// Outcome of a hide request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HideRequest {
    /// Already closed or already hiding
    Ignored,
    /// A pending show was dropped before the tooltip ever opened
    Cancelled,
    Scheduled,
    /// No delay: the caller should close now
    Ready,
}

/// Which timer fired
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    Show,
    Hide,
    Duration,
}

/// Per-tooltip phase plus its pending timers
#[derive(Debug, Default)]
pub struct DelayScheduler {
    phase: TooltipPhase,
    show_timer: Option<TimerId>,
    hide_timer: Option<TimerId>,
    duration_timer: Option<TimerId>,
}

impl DelayScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TooltipPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase.is_open()
    }

    fn cancel(slot: &mut Option<TimerId>, timers: &mut TimerQueue<TooltipTask>) {
        if let Some(timer) = slot.take() {
            timers.cancel(timer);
        }
    }

    pub fn request_show(
        &mut self,
        id: TooltipId,
        delay_ms: u64,
        now_ms: u64,
        timers: &mut TimerQueue<TooltipTask>,
    ) -> ShowRequest {
        match self.phase {
            TooltipPhase::Open => ShowRequest::Ignored,
            TooltipPhase::PendingHide => {
                Self::cancel(&mut self.hide_timer, timers);
                self.phase.apply(tooltip_events::CANCEL_HIDE);
                ShowRequest::Ignored
            }
            TooltipPhase::PendingShow | TooltipPhase::Closed => {
                let fresh = self.phase == TooltipPhase::Closed;
                Self::cancel(&mut self.show_timer, timers);
                if delay_ms == 0 {
                    return ShowRequest::Ready;
                }
                self.phase.apply(tooltip_events::REQUEST_SHOW);
                self.show_timer = Some(timers.schedule(now_ms, delay_ms, TooltipTask::Show(id)));
                ShowRequest::Scheduled { fresh }
            }
        }
    }

    /// Move to `Open`, arming the auto-hide when `duration_ms > 0`
    pub fn open(
        &mut self,
        id: TooltipId,
        duration_ms: u64,
        now_ms: u64,
        timers: &mut TimerQueue<TooltipTask>,
    ) -> bool {
        Self::cancel(&mut self.show_timer, timers);
        if !self.phase.apply(tooltip_events::OPEN_NOW) {
            return false;
        }
        if duration_ms > 0 {
            self.duration_timer =
                Some(timers.schedule(now_ms, duration_ms, TooltipTask::AutoHide(id)));
        }
        true
    }

    pub fn request_hide(
        &mut self,
        id: TooltipId,
        delay_ms: u64,
        now_ms: u64,
        timers: &mut TimerQueue<TooltipTask>,
    ) -> HideRequest {
        match self.phase {
            TooltipPhase::Closed | TooltipPhase::PendingHide => HideRequest::Ignored,
            TooltipPhase::PendingShow => {
                Self::cancel(&mut self.show_timer, timers);
                self.phase.apply(tooltip_events::CANCEL_SHOW);
                HideRequest::Cancelled
            }
            TooltipPhase::Open => {
                // The auto-hide stays armed through a pending hide; `close` drops it
                if delay_ms == 0 {
                    return HideRequest::Ready;
                }
                self.phase.apply(tooltip_events::REQUEST_HIDE);
                self.hide_timer = Some(timers.schedule(now_ms, delay_ms, TooltipTask::Hide(id)));
                HideRequest::Scheduled
            }
        }
    }

    /// Abandon a pending hide, staying open
    pub fn cancel_hide(&mut self, timers: &mut TimerQueue<TooltipTask>) -> bool {
        Self::cancel(&mut self.hide_timer, timers);
        self.phase.apply(tooltip_events::CANCEL_HIDE)
    }

    /// Move to `Closed`, dropping every timer
    pub fn close(&mut self, timers: &mut TimerQueue<TooltipTask>) -> bool {
        self.cancel_all(timers);
        self.phase.apply(tooltip_events::CLOSE_NOW)
    }

    /// Check that `timer` is the live timer of `kind`, consuming it
    ///
    /// Timers cancelled or replaced earlier return false.
    pub fn take_due(&mut self, kind: TimerKind, timer: TimerId) -> bool {
        let slot = match kind {
            TimerKind::Show => &mut self.show_timer,
            TimerKind::Hide => &mut self.hide_timer,
            TimerKind::Duration => &mut self.duration_timer,
        };
        if *slot == Some(timer) {
            *slot = None;
            true
        } else {
            false
        }
    }

    pub fn cancel_all(&mut self, timers: &mut TimerQueue<TooltipTask>) {
        Self::cancel(&mut self.show_timer, timers);
        Self::cancel(&mut self.hide_timer, timers);
        Self::cancel(&mut self.duration_timer, timers);
    }

    pub fn has_pending_timers(&self) -> bool {
        self.show_timer.is_some() || self.hide_timer.is_some() || self.duration_timer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn tooltip_id() -> TooltipId {
        let mut ids: SlotMap<TooltipId, ()> = SlotMap::with_key();
        ids.insert(())
    }

    #[test]
    fn test_zero_delay_is_ready() {
        let mut timers = TimerQueue::new();
        let mut scheduler = DelayScheduler::new();
        let id = tooltip_id();

        assert_eq!(scheduler.request_show(id, 0, 0, &mut timers), ShowRequest::Ready);
        assert_eq!(scheduler.phase(), TooltipPhase::Closed);
        assert!(scheduler.open(id, 0, 0, &mut timers));
        assert!(scheduler.is_open());
        assert!(timers.is_empty());
    }

    #[test]
    fn test_delayed_show_fires_once() {
        let mut timers = TimerQueue::new();
        let mut scheduler = DelayScheduler::new();
        let id = tooltip_id();

        assert_eq!(
            scheduler.request_show(id, 200, 0, &mut timers),
            ShowRequest::Scheduled { fresh: true }
        );
        assert_eq!(
            scheduler.request_show(id, 200, 100, &mut timers),
            ShowRequest::Scheduled { fresh: false }
        );
        assert_eq!(timers.len(), 1);

        assert!(timers.pop_expired(200).is_none());
        let fired = timers.pop_expired(300).unwrap();
        assert!(scheduler.take_due(TimerKind::Show, fired.id));
        assert!(scheduler.open(id, 0, 300, &mut timers));
    }

    #[test]
    fn test_hide_during_pending_show_cancels() {
        let mut timers = TimerQueue::new();
        let mut scheduler = DelayScheduler::new();
        let id = tooltip_id();

        scheduler.request_show(id, 200, 0, &mut timers);
        assert_eq!(scheduler.request_hide(id, 0, 50, &mut timers), HideRequest::Cancelled);
        assert_eq!(scheduler.phase(), TooltipPhase::Closed);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_show_during_pending_hide_stays_open() {
        let mut timers = TimerQueue::new();
        let mut scheduler = DelayScheduler::new();
        let id = tooltip_id();

        scheduler.open(id, 0, 0, &mut timers);
        assert_eq!(scheduler.request_hide(id, 300, 10, &mut timers), HideRequest::Scheduled);
        assert_eq!(scheduler.phase(), TooltipPhase::PendingHide);
        assert!(scheduler.is_open());

        assert_eq!(scheduler.request_show(id, 0, 20, &mut timers), ShowRequest::Ignored);
        assert_eq!(scheduler.phase(), TooltipPhase::Open);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_cancelled_hide_keeps_duration_timer() {
        let mut timers = TimerQueue::new();
        let mut scheduler = DelayScheduler::new();
        let id = tooltip_id();

        scheduler.open(id, 1000, 0, &mut timers);
        assert_eq!(scheduler.request_hide(id, 300, 100, &mut timers), HideRequest::Scheduled);
        assert_eq!(scheduler.request_show(id, 0, 200, &mut timers), ShowRequest::Ignored);
        assert_eq!(scheduler.phase(), TooltipPhase::Open);
        assert_eq!(timers.next_deadline(), Some(1000));

        let fired = timers.pop_expired(1000).unwrap();
        assert!(scheduler.take_due(TimerKind::Duration, fired.id));
    }

    #[test]
    fn test_duration_timer_armed_on_open() {
        let mut timers = TimerQueue::new();
        let mut scheduler = DelayScheduler::new();
        let id = tooltip_id();

        scheduler.open(id, 1500, 100, &mut timers);
        assert_eq!(timers.next_deadline(), Some(1600));
        scheduler.close(&mut timers);
        assert!(timers.is_empty());
        assert!(!scheduler.has_pending_timers());
    }
}
