//! Application root
//!
//! An [`AppContext`] is built once per application root and owns the shared
//! registries: the [`Toaster`] (optional, like a provider that may be left out)
//! and the [`TooltipManager`]. Components receive the context and look services
//! up through it.

use std::sync::Arc;

use kestrel_core::{Feedback, KvBackend, SharedClock, SystemClock};
use kestrel_toast::{Persistence, Toaster};
use kestrel_tooltip::{LayoutHost, TooltipManager};

use crate::config::AppConfig;
use crate::error::{AppError, Result};

/// Shared services of one application root
#[derive(Clone)]
pub struct AppContext {
    clock: SharedClock,
    config: AppConfig,
    toaster: Option<Toaster>,
    tooltips: TooltipManager,
}

impl AppContext {
    pub fn builder(host: Arc<dyn LayoutHost>) -> AppContextBuilder {
        AppContextBuilder::new(host)
    }

    /// The toaster, or [`AppError::MissingProvider`] when the root has none
    pub fn use_toast(&self) -> Result<Toaster> {
        self.toaster
            .clone()
            .ok_or(AppError::MissingProvider("toast"))
    }

    pub fn toaster(&self) -> Option<&Toaster> {
        self.toaster.as_ref()
    }

    pub fn tooltips(&self) -> &TooltipManager {
        &self.tooltips
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Fire due timers in both engines
    pub fn tick(&self) {
        if let Some(toaster) = &self.toaster {
            toaster.tick();
        }
        self.tooltips.tick();
    }

    /// Earliest timer deadline across both engines
    pub fn next_deadline(&self) -> Option<u64> {
        let toast = self.toaster.as_ref().and_then(Toaster::next_deadline);
        let tooltip = self.tooltips.next_deadline();
        match (toast, tooltip) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Cancel every pending timer; nothing fires afterwards
    pub fn shutdown(&self) {
        if let Some(toaster) = &self.toaster {
            toaster.shutdown();
        }
        for id in self.tooltips.open_tooltips() {
            self.tooltips.unmount(id);
        }
        tracing::debug!("AppContext::shutdown - timers cancelled");
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("toaster", &self.toaster.is_some())
            .field("tooltips", &self.tooltips)
            .finish()
    }
}

// =============================================================================
// AppContextBuilder
// =============================================================================

/// Builder for [`AppContext`]
pub struct AppContextBuilder {
    host: Arc<dyn LayoutHost>,
    clock: Option<SharedClock>,
    config: AppConfig,
    with_toaster: bool,
    feedback: Option<Arc<dyn Feedback>>,
    storage: Option<Arc<dyn KvBackend>>,
}

impl AppContextBuilder {
    pub fn new(host: Arc<dyn LayoutHost>) -> Self {
        Self {
            host,
            clock: None,
            config: AppConfig::default(),
            with_toaster: true,
            feedback: None,
            storage: None,
        }
    }

    /// Time source, the system clock by default
    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Leave the toast provider out of this root
    pub fn without_toaster(mut self) -> Self {
        self.with_toaster = false;
        self
    }

    pub fn feedback(mut self, feedback: Arc<dyn Feedback>) -> Self {
        self.feedback = Some(feedback);
        self
    }

    /// Backend for toast snapshots, used when `toaster.persist` is set
    pub fn storage(mut self, storage: Arc<dyn KvBackend>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn build(self) -> AppContext {
        let clock = self.clock.unwrap_or_else(SystemClock::shared);

        let toaster = self.with_toaster.then(|| {
            let mut builder = Toaster::builder(clock.clone()).settings(self.config.toast_settings());
            if let Some(feedback) = self.feedback.clone() {
                builder = builder.feedback(feedback);
            }
            if let Some(storage) = self.storage.clone() {
                builder = builder.persistence(Persistence::new(storage));
            }
            builder.build()
        });

        let tooltips =
            TooltipManager::with_config(self.host, clock.clone(), self.config.tooltip.clone());

        tracing::debug!(
            "AppContextBuilder::build - toaster: {}, tooltip strategy: {:?}",
            toaster.is_some(),
            self.config.tooltip.strategy
        );

        AppContext {
            clock,
            config: self.config,
            toaster,
            tooltips,
        }
    }
}
