//! Singleton/group coordinator
//!
//! Every scope has at most one owner: the open tooltip that claimed it last.
//! Claiming an owned scope hands the previous owner back so the manager can
//! close it before recording the new one as open. Releasing can be deferred by
//! a grace window; while a scope is owned or in grace it counts as active, and
//! group members open without their show delay.

use kestrel_core::{TimerId, TimerQueue};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::manager::{TooltipId, TooltipTask};
use crate::types::TooltipOptions;

/// Exclusivity scope
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKey {
    /// Every singleton tooltip in the manager
    Global,
    /// Members of one named group
    Group(String),
}

impl ScopeKey {
    /// Scopes a tooltip with `options` takes part in
    pub fn for_options(options: &TooltipOptions) -> SmallVec<[ScopeKey; 2]> {
        let mut scopes = SmallVec::new();
        if options.singleton {
            scopes.push(ScopeKey::Global);
        }
        if let Some(group) = &options.group {
            scopes.push(ScopeKey::Group(group.clone()));
        }
        scopes
    }
}

#[derive(Debug, Default)]
struct ScopeState {
    owner: Option<TooltipId>,
    release_timer: Option<TimerId>,
}

/// Ownership registry keyed by scope
#[derive(Debug, Default)]
pub struct Coordinator {
    scopes: FxHashMap<ScopeKey, ScopeState>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id` as the owner of `scope`
    ///
    /// Returns the previous owner when it was a different tooltip. A pending
    /// release is cancelled.
    pub fn register_show(
        &mut self,
        scope: &ScopeKey,
        id: TooltipId,
        timers: &mut TimerQueue<TooltipTask>,
    ) -> Option<TooltipId> {
        let state = self.scopes.entry(scope.clone()).or_default();
        if let Some(timer) = state.release_timer.take() {
            timers.cancel(timer);
        }
        let previous = state.owner.replace(id);
        tracing::debug!("Coordinator::register_show - {:?} owned by {:?}", scope, id);
        previous.filter(|prev| *prev != id)
    }

    /// Give up `scope` if `id` still owns it
    ///
    /// With `grace_ms == 0` ownership ends now, otherwise a release timer is
    /// armed and the scope stays active until it fires.
    pub fn register_hide(
        &mut self,
        scope: &ScopeKey,
        id: TooltipId,
        grace_ms: u64,
        now_ms: u64,
        timers: &mut TimerQueue<TooltipTask>,
    ) -> bool {
        let Some(state) = self.scopes.get_mut(scope) else {
            return false;
        };
        if state.owner != Some(id) {
            return false;
        }

        if grace_ms == 0 {
            if let Some(timer) = state.release_timer.take() {
                timers.cancel(timer);
            }
            self.scopes.remove(scope);
            tracing::debug!("Coordinator::register_hide - {:?} released", scope);
            return true;
        }

        if let Some(timer) = state.release_timer.take() {
            timers.cancel(timer);
        }
        state.release_timer =
            Some(timers.schedule(now_ms, grace_ms, TooltipTask::Release(scope.clone())));
        tracing::debug!(
            "Coordinator::register_hide - {:?} releasing in {}ms",
            scope,
            grace_ms
        );
        true
    }

    /// Release timer fired; stale timers are ignored
    pub fn release(&mut self, scope: &ScopeKey, timer: TimerId) -> bool {
        let due = self
            .scopes
            .get(scope)
            .is_some_and(|state| state.release_timer == Some(timer));
        if due {
            self.scopes.remove(scope);
            tracing::debug!("Coordinator::release - {:?} released after grace", scope);
        }
        due
    }

    /// Owned, or released less than a grace window ago
    pub fn is_active(&self, scope: &ScopeKey) -> bool {
        self.scopes
            .get(scope)
            .is_some_and(|state| state.owner.is_some())
    }

    pub fn owner(&self, scope: &ScopeKey) -> Option<TooltipId> {
        self.scopes.get(scope).and_then(|state| state.owner)
    }

    /// Drop `id` from every scope it owns, without grace
    pub fn forget(&mut self, id: TooltipId, timers: &mut TimerQueue<TooltipTask>) {
        self.scopes.retain(|_, state| {
            if state.owner != Some(id) {
                return true;
            }
            if let Some(timer) = state.release_timer.take() {
                timers.cancel(timer);
            }
            false
        });
    }

    pub fn clear(&mut self, timers: &mut TimerQueue<TooltipTask>) {
        for (_, state) in self.scopes.drain() {
            if let Some(timer) = state.release_timer {
                timers.cancel(timer);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<TooltipId> {
        let mut map: SlotMap<TooltipId, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn test_register_show_returns_previous_owner() {
        let ids = ids(2);
        let mut timers = TimerQueue::new();
        let mut coordinator = Coordinator::new();

        assert_eq!(coordinator.register_show(&ScopeKey::Global, ids[0], &mut timers), None);
        assert_eq!(coordinator.register_show(&ScopeKey::Global, ids[0], &mut timers), None);
        assert_eq!(
            coordinator.register_show(&ScopeKey::Global, ids[1], &mut timers),
            Some(ids[0])
        );
        assert_eq!(coordinator.owner(&ScopeKey::Global), Some(ids[1]));
    }

    #[test]
    fn test_hide_by_non_owner_is_ignored() {
        let ids = ids(2);
        let mut timers = TimerQueue::new();
        let mut coordinator = Coordinator::new();

        coordinator.register_show(&ScopeKey::Global, ids[1], &mut timers);
        assert!(!coordinator.register_hide(&ScopeKey::Global, ids[0], 0, 0, &mut timers));
        assert_eq!(coordinator.owner(&ScopeKey::Global), Some(ids[1]));
    }

    #[test]
    fn test_group_grace_keeps_scope_active() {
        let ids = ids(2);
        let group = ScopeKey::Group("toolbar".into());
        let mut timers = TimerQueue::new();
        let mut coordinator = Coordinator::new();

        coordinator.register_show(&group, ids[0], &mut timers);
        assert!(coordinator.register_hide(&group, ids[0], 500, 1000, &mut timers));
        assert!(coordinator.is_active(&group));

        let fired = timers.pop_expired(1500).unwrap();
        assert_eq!(fired.payload, TooltipTask::Release(group.clone()));
        assert!(coordinator.release(&group, fired.id));
        assert!(!coordinator.is_active(&group));
    }

    #[test]
    fn test_claim_during_grace_cancels_release() {
        let ids = ids(2);
        let group = ScopeKey::Group("toolbar".into());
        let mut timers = TimerQueue::new();
        let mut coordinator = Coordinator::new();

        coordinator.register_show(&group, ids[0], &mut timers);
        coordinator.register_hide(&group, ids[0], 500, 0, &mut timers);
        coordinator.register_show(&group, ids[1], &mut timers);

        assert!(timers.is_empty());
        assert_eq!(coordinator.owner(&group), Some(ids[1]));
    }

    #[test]
    fn test_scopes_from_options() {
        let options = TooltipOptions::new().singleton(true).group("nav");
        let scopes = ScopeKey::for_options(&options);
        assert_eq!(
            scopes.as_slice(),
            &[ScopeKey::Global, ScopeKey::Group("nav".into())]
        );
        assert!(ScopeKey::for_options(&TooltipOptions::new()).is_empty());
    }
}
