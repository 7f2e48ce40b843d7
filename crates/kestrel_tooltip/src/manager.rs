//! Tooltip manager
//!
//! One [`TooltipManager`] per application root owns every mounted tooltip. It
//! wires the pieces together:
//!
//! - input (pointer, focus, click, escape) goes through each tooltip's
//!   [`DelayScheduler`]
//! - opening claims the tooltip's singleton/group scopes in the [`Coordinator`],
//!   closing the previous owner first
//! - open tooltips are registered with the [`AutoUpdateRegistry`]; host layout
//!   events queue repositions that are computed on the next flush
//! - all timers live in one [`TimerQueue`] fired from [`TooltipManager::tick`]
//!
//! Every public call locks once and collects [`TooltipEvent`]s in an outbox;
//! listeners run after the lock is released.

use std::sync::{Arc, Mutex, MutexGuard};

use kestrel_core::{Clock, Emitter, Rect, SharedClock, Subscription, TimerQueue};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::auto_update::{AutoUpdateRegistry, RepositionQueue};
use crate::config::TooltipConfig;
use crate::coordinator::{Coordinator, ScopeKey};
use crate::events::TooltipEvent;
use crate::host::{clipping_rect, ElementKey, ElementRef, HostEvent, LayoutHost, Reference};
use crate::position::{self, ComputedPosition, PositionRequest};
use crate::scheduler::{DelayScheduler, HideRequest, ShowRequest, TimerKind, TooltipPhase};
use crate::types::{Boundary, Offset, Placement, Teleport, Trigger, TooltipOptions};

new_key_type! {
    /// Handle to a mounted tooltip
    pub struct TooltipId;
}

/// Timer payloads
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TooltipTask {
    Show(TooltipId),
    Hide(TooltipId),
    AutoHide(TooltipId),
    Release(ScopeKey),
}

/// Renderer-facing view of one tooltip
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipState {
    pub id: TooltipId,
    pub phase: TooltipPhase,
    pub is_open: bool,
    /// Placement asked for
    pub placement: Placement,
    /// Placement in use after flipping
    pub actual_placement: Placement,
    pub position: Option<ComputedPosition>,
    pub content: Option<String>,
    pub title: Option<String>,
    pub teleport: Teleport,
}

// =============================================================================
// Instance
// =============================================================================

struct TooltipInstance {
    options: TooltipOptions,
    scheduler: DelayScheduler,
    reference: Option<Reference>,
    content: Option<Arc<dyn ElementRef>>,
    placement: Placement,
    actual_placement: Placement,
    position: Option<ComputedPosition>,
    /// Last controlled value seen or reported
    model_value: Option<bool>,
    /// Order of the latest open, for escape handling
    opened_seq: u64,
    over_trigger: bool,
    over_content: bool,
}

impl TooltipInstance {
    fn new(options: TooltipOptions, config: &TooltipConfig) -> Self {
        let placement = options.placement.unwrap_or(config.placement);
        Self {
            options,
            scheduler: DelayScheduler::new(),
            reference: None,
            content: None,
            placement,
            actual_placement: placement,
            position: None,
            model_value: None,
            opened_seq: 0,
            over_trigger: false,
            over_content: false,
        }
    }

    fn show_delay(&self, config: &TooltipConfig) -> u64 {
        self.options
            .delay
            .map(|delay| delay.show_ms())
            .unwrap_or(config.show_delay)
    }

    fn hide_delay(&self, config: &TooltipConfig) -> u64 {
        self.options
            .delay
            .map(|delay| delay.hide_ms())
            .unwrap_or(config.hide_delay)
    }

    fn scopes(&self) -> SmallVec<[ScopeKey; 2]> {
        ScopeKey::for_options(&self.options)
    }

    fn is_open(&self) -> bool {
        self.scheduler.is_open()
    }

    /// Whether `key` is the trigger or the content, or inside either
    fn owns_element(&self, key: ElementKey) -> bool {
        self.reference
            .as_ref()
            .is_some_and(|reference| reference.contains(key))
            || self
                .content
                .as_ref()
                .is_some_and(|content| content.contains(key))
    }

    fn state(&self, id: TooltipId) -> TooltipState {
        TooltipState {
            id,
            phase: self.scheduler.phase(),
            is_open: self.is_open(),
            placement: self.placement,
            actual_placement: self.actual_placement,
            position: self.position,
            content: self.options.content.clone(),
            title: self.options.title.clone(),
            teleport: self.options.teleport.clone(),
        }
    }
}

// =============================================================================
// TooltipManagerInner
// =============================================================================

/// Shared state behind a [`TooltipManager`]
pub struct TooltipManagerInner {
    config: TooltipConfig,
    host: Arc<dyn LayoutHost>,
    instances: SlotMap<TooltipId, TooltipInstance>,
    timers: TimerQueue<TooltipTask>,
    coordinator: Coordinator,
    registry: AutoUpdateRegistry,
    queue: RepositionQueue,
    open_seq: u64,
    outbox: Vec<TooltipEvent>,
}

impl TooltipManagerInner {
    fn new(config: TooltipConfig, host: Arc<dyn LayoutHost>) -> Self {
        Self {
            config,
            host,
            instances: SlotMap::with_key(),
            timers: TimerQueue::new(),
            coordinator: Coordinator::new(),
            registry: AutoUpdateRegistry::new(),
            queue: RepositionQueue::new(),
            open_seq: 0,
            outbox: Vec::new(),
        }
    }

    fn take_outbox(&mut self) -> Vec<TooltipEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn mount(&mut self, options: TooltipOptions, now_ms: u64) -> TooltipId {
        let default_open = options.default_open;
        let instance = TooltipInstance::new(options, &self.config);
        let id = self.instances.insert(instance);
        tracing::debug!("TooltipManager::mount - {:?}", id);

        if default_open {
            self.show_with_delay(id, 0, now_ms);
        }
        id
    }

    fn unmount(&mut self, id: TooltipId) -> bool {
        let Some(mut instance) = self.instances.remove(id) else {
            return false;
        };
        instance.scheduler.cancel_all(&mut self.timers);
        self.registry.unregister(id);
        self.queue.discard(id);
        self.coordinator.forget(id, &mut self.timers);
        self.outbox.retain(|event| event.id() != id);
        tracing::debug!("TooltipManager::unmount - {:?}", id);
        true
    }

    // -------------------------------------------------------------------------
    // Show / hide
    // -------------------------------------------------------------------------

    /// Show delay after group activity is taken into account
    fn effective_show_delay(&self, id: TooltipId) -> Option<u64> {
        let instance = self.instances.get(id)?;
        let group_active = instance.scopes().iter().any(|scope| {
            matches!(scope, ScopeKey::Group(_))
                && self.coordinator.is_active(scope)
                && self.coordinator.owner(scope) != Some(id)
        });
        if group_active {
            Some(0)
        } else {
            Some(instance.show_delay(&self.config))
        }
    }

    fn show(&mut self, id: TooltipId, now_ms: u64) {
        if let Some(delay) = self.effective_show_delay(id) {
            self.show_with_delay(id, delay, now_ms);
        }
    }

    fn show_with_delay(&mut self, id: TooltipId, delay_ms: u64, now_ms: u64) {
        let Some(instance) = self.instances.get_mut(id) else {
            return;
        };
        if instance.options.disabled {
            tracing::debug!("TooltipManager::show - {:?} is disabled", id);
            return;
        }

        match instance
            .scheduler
            .request_show(id, delay_ms, now_ms, &mut self.timers)
        {
            ShowRequest::Ignored | ShowRequest::Scheduled { fresh: false } => {}
            ShowRequest::Scheduled { fresh: true } => {
                self.outbox.push(TooltipEvent::BeforeShow { id });
            }
            ShowRequest::Ready => {
                if instance.scheduler.phase() == TooltipPhase::Closed {
                    self.outbox.push(TooltipEvent::BeforeShow { id });
                }
                self.open(id, now_ms);
            }
        }
    }

    /// Settle scope ownership, then move to `Open`
    fn open(&mut self, id: TooltipId, now_ms: u64) {
        let Some(scopes) = self.instances.get(id).map(TooltipInstance::scopes) else {
            return;
        };

        for scope in &scopes {
            if let Some(previous) = self.coordinator.register_show(scope, id, &mut self.timers) {
                if self.instances.get(previous).is_some_and(TooltipInstance::is_open) {
                    tracing::debug!(
                        "TooltipManager::open - {:?} replaces {:?} in {:?}",
                        id,
                        previous,
                        scope
                    );
                    self.close(previous, now_ms);
                }
            }
        }

        let Some(instance) = self.instances.get_mut(id) else {
            return;
        };
        let duration = instance.options.duration_ms;
        if !instance
            .scheduler
            .open(id, duration, now_ms, &mut self.timers)
        {
            return;
        }

        self.open_seq += 1;
        instance.opened_seq = self.open_seq;
        instance.model_value = Some(true);
        if let Some(reference) = instance.reference.clone() {
            self.registry
                .register(id, &reference, self.host.document_root());
        }

        tracing::debug!("TooltipManager::open - {:?} open", id);
        self.outbox.push(TooltipEvent::Show { id });
        self.outbox
            .push(TooltipEvent::ModelValue { id, open: true });
        self.update_position(id);
    }

    fn hide(&mut self, id: TooltipId, now_ms: u64) {
        let Some(delay) = self
            .instances
            .get(id)
            .map(|instance| instance.hide_delay(&self.config))
        else {
            return;
        };
        self.hide_with_delay(id, delay, now_ms);
    }

    fn hide_with_delay(&mut self, id: TooltipId, delay_ms: u64, now_ms: u64) {
        let Some(instance) = self.instances.get_mut(id) else {
            return;
        };

        match instance
            .scheduler
            .request_hide(id, delay_ms, now_ms, &mut self.timers)
        {
            HideRequest::Ignored => {}
            HideRequest::Cancelled => {
                tracing::debug!("TooltipManager::hide - {:?} pending show cancelled", id);
            }
            HideRequest::Scheduled => {
                self.outbox.push(TooltipEvent::BeforeHide { id });
            }
            HideRequest::Ready => self.close(id, now_ms),
        }
    }

    /// Move to `Closed`, stop watching layout and release scopes
    fn close(&mut self, id: TooltipId, now_ms: u64) {
        let Some(instance) = self.instances.get_mut(id) else {
            return;
        };
        let announced = instance.scheduler.phase() == TooltipPhase::PendingHide;
        if !instance.scheduler.close(&mut self.timers) {
            return;
        }
        instance.model_value = Some(false);
        let scopes = instance.scopes();

        if !announced {
            self.outbox.push(TooltipEvent::BeforeHide { id });
        }
        self.registry.unregister(id);
        self.queue.discard(id);

        for scope in &scopes {
            let grace = match scope {
                ScopeKey::Global => 0,
                ScopeKey::Group(_) => self.config.group_grace_ms,
            };
            self.coordinator
                .register_hide(scope, id, grace, now_ms, &mut self.timers);
        }

        tracing::debug!("TooltipManager::close - {:?} closed", id);
        self.outbox.push(TooltipEvent::Hide { id });
        self.outbox
            .push(TooltipEvent::ModelValue { id, open: false });
    }

    fn toggle(&mut self, id: TooltipId, now_ms: u64) {
        let Some(instance) = self.instances.get(id) else {
            return;
        };
        if instance.is_open() {
            self.hide(id, now_ms);
        } else {
            self.show(id, now_ms);
        }
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    fn pointer_enter_trigger(&mut self, id: TooltipId, now_ms: u64) {
        let Some(instance) = self.instances.get_mut(id) else {
            return;
        };
        instance.over_trigger = true;
        if instance.options.has_trigger(Trigger::Hover) {
            self.show(id, now_ms);
        }
    }

    fn pointer_leave_trigger(&mut self, id: TooltipId, now_ms: u64) {
        let Some(instance) = self.instances.get_mut(id) else {
            return;
        };
        instance.over_trigger = false;
        if !instance.options.has_trigger(Trigger::Hover) || instance.over_content {
            return;
        }

        if instance.options.interactive && instance.is_open() {
            // Leave time to travel from the trigger onto the content
            let delay = instance.hide_delay(&self.config) + self.config.interactive_grace_ms;
            self.hide_with_delay(id, delay, now_ms);
        } else {
            self.hide(id, now_ms);
        }
    }

    fn pointer_enter_content(&mut self, id: TooltipId) {
        let Some(instance) = self.instances.get_mut(id) else {
            return;
        };
        instance.over_content = true;
        if instance.options.interactive
            && instance.scheduler.phase() == TooltipPhase::PendingHide
        {
            instance.scheduler.cancel_hide(&mut self.timers);
            tracing::debug!("TooltipManager::pointer_enter_content - {:?} kept open", id);
        }
    }

    fn pointer_leave_content(&mut self, id: TooltipId, now_ms: u64) {
        let Some(instance) = self.instances.get_mut(id) else {
            return;
        };
        instance.over_content = false;
        if instance.options.interactive
            && instance.options.has_trigger(Trigger::Hover)
            && !instance.over_trigger
        {
            self.hide(id, now_ms);
        }
    }

    fn focus_in(&mut self, id: TooltipId, now_ms: u64) {
        if self
            .instances
            .get(id)
            .is_some_and(|instance| instance.options.has_trigger(Trigger::Focus))
        {
            self.show(id, now_ms);
        }
    }

    fn focus_out(&mut self, id: TooltipId, now_ms: u64) {
        if self
            .instances
            .get(id)
            .is_some_and(|instance| instance.options.has_trigger(Trigger::Focus))
        {
            self.hide(id, now_ms);
        }
    }

    fn click_trigger(&mut self, id: TooltipId, now_ms: u64) {
        if self
            .instances
            .get(id)
            .is_some_and(|instance| instance.options.has_trigger(Trigger::Click))
        {
            self.toggle(id, now_ms);
        }
    }

    /// Close the most recently opened tooltip that honours escape
    fn escape(&mut self, now_ms: u64) -> Option<TooltipId> {
        let target = self
            .instances
            .iter()
            .filter(|(_, instance)| instance.is_open() && instance.options.close_on_escape)
            .max_by_key(|(_, instance)| instance.opened_seq)
            .map(|(id, _)| id)?;
        tracing::debug!("TooltipManager::escape - closing {:?}", target);
        self.hide_with_delay(target, 0, now_ms);
        Some(target)
    }

    /// Close open tooltips the click landed outside of
    fn document_click(&mut self, target: Option<ElementKey>, now_ms: u64) {
        let outside: Vec<TooltipId> = self
            .instances
            .iter()
            .filter(|(_, instance)| {
                instance.is_open()
                    && instance.options.hide_on_click
                    && !target.is_some_and(|key| instance.owns_element(key))
            })
            .map(|(id, _)| id)
            .collect();

        for id in outside {
            tracing::debug!("TooltipManager::document_click - {:?} clicked outside", id);
            self.hide_with_delay(id, 0, now_ms);
        }
    }

    fn matching(&self, key: ElementKey, on_content: bool) -> Vec<TooltipId> {
        self.instances
            .iter()
            .filter(|(_, instance)| {
                if on_content {
                    instance.content.as_ref().is_some_and(|c| c.key() == key)
                } else {
                    instance.reference.as_ref().and_then(Reference::key) == Some(key)
                }
            })
            .map(|(id, _)| id)
            .collect()
    }

    fn handle_event(&mut self, event: HostEvent, now_ms: u64) {
        match event {
            HostEvent::Resize
            | HostEvent::WindowScroll
            | HostEvent::ElementScroll(_)
            | HostEvent::Mutation(_) => {
                for id in self.registry.targets(&event) {
                    self.queue.request(id);
                }
            }
            HostEvent::PointerEnter(key) => {
                for id in self.matching(key, false) {
                    self.pointer_enter_trigger(id, now_ms);
                }
                for id in self.matching(key, true) {
                    self.pointer_enter_content(id);
                }
            }
            HostEvent::PointerLeave(key) => {
                for id in self.matching(key, false) {
                    self.pointer_leave_trigger(id, now_ms);
                }
                for id in self.matching(key, true) {
                    self.pointer_leave_content(id, now_ms);
                }
            }
            HostEvent::Click(target) => {
                if let Some(key) = target {
                    let triggers: Vec<TooltipId> = self
                        .instances
                        .iter()
                        .filter(|(_, instance)| {
                            instance
                                .reference
                                .as_ref()
                                .is_some_and(|reference| reference.contains(key))
                        })
                        .map(|(id, _)| id)
                        .collect();
                    for id in triggers {
                        self.click_trigger(id, now_ms);
                    }
                }
                self.document_click(target, now_ms);
            }
            HostEvent::FocusIn(key) => {
                for id in self.matching(key, false) {
                    self.focus_in(id, now_ms);
                }
            }
            HostEvent::FocusOut(key) => {
                for id in self.matching(key, false) {
                    self.focus_out(id, now_ms);
                }
            }
            HostEvent::Escape => {
                self.escape(now_ms);
            }
        }
    }

    /// Apply an external open value, ignoring values already in effect
    fn set_model_value(&mut self, id: TooltipId, open: bool, now_ms: u64) {
        let Some(instance) = self.instances.get_mut(id) else {
            return;
        };
        if instance.model_value == Some(open) {
            return;
        }
        instance.model_value = Some(open);
        if open && !instance.is_open() {
            self.show_with_delay(id, 0, now_ms);
        } else if !open && instance.is_open() {
            self.hide_with_delay(id, 0, now_ms);
        }
    }

    // -------------------------------------------------------------------------
    // Binding
    // -------------------------------------------------------------------------

    fn set_reference(&mut self, id: TooltipId, reference: Option<Reference>) {
        let Some(instance) = self.instances.get_mut(id) else {
            return;
        };
        instance.reference = reference;
        if !instance.is_open() {
            return;
        }
        match instance.reference.clone() {
            Some(reference) => {
                self.registry
                    .register(id, &reference, self.host.document_root());
                self.queue.request(id);
            }
            None => {
                self.registry.unregister(id);
            }
        }
    }

    fn set_content(&mut self, id: TooltipId, content: Option<Arc<dyn ElementRef>>) {
        let Some(instance) = self.instances.get_mut(id) else {
            return;
        };
        instance.content = content;
        if instance.is_open() {
            self.queue.request(id);
        }
    }

    fn set_placement(&mut self, id: TooltipId, placement: Placement) {
        let Some(instance) = self.instances.get_mut(id) else {
            return;
        };
        instance.placement = placement;
        instance.options.placement = Some(placement);
        if instance.actual_placement != placement {
            instance.actual_placement = placement;
            self.outbox
                .push(TooltipEvent::PlacementChanged { id, placement });
        }
        if instance.is_open() {
            self.queue.request(id);
        }
    }

    fn set_options(&mut self, id: TooltipId, options: TooltipOptions, now_ms: u64) {
        let Some(instance) = self.instances.get_mut(id) else {
            return;
        };
        let placement = options.placement.unwrap_or(self.config.placement);
        let disabled = options.disabled;
        instance.options = options;
        if placement != instance.placement {
            self.set_placement(id, placement);
        } else if instance.is_open() {
            self.queue.request(id);
        }

        if disabled {
            self.hide_with_delay(id, 0, now_ms);
        }
    }

    // -------------------------------------------------------------------------
    // Positioning
    // -------------------------------------------------------------------------

    fn boundary_rect(instance: &TooltipInstance, viewport: Rect) -> Rect {
        match instance.options.boundary {
            Boundary::Viewport => viewport,
            Boundary::Rect(rect) => rect,
            Boundary::ClippingAncestors => instance
                .reference
                .as_ref()
                .and_then(Reference::element)
                .map(|element| clipping_rect(element.as_ref(), viewport))
                .unwrap_or(viewport),
        }
    }

    /// Compute now; returns false when reference or content is missing
    fn update_position(&mut self, id: TooltipId) -> bool {
        let viewport = self.host.viewport();
        let Some(instance) = self.instances.get_mut(id) else {
            return false;
        };
        let (Some(reference), Some(content)) = (&instance.reference, &instance.content) else {
            tracing::debug!(
                "TooltipManager::update_position - {:?} missing reference or content, keeping last position",
                id
            );
            return false;
        };

        let request = PositionRequest {
            reference: reference.bounding_rect(),
            content: content.layout_size(),
            placement: instance.placement,
            offset: instance
                .options
                .offset
                .unwrap_or(Offset::Main(self.config.offset)),
            flip: instance.options.flip,
            shift: instance.options.shift,
            viewport,
            boundary: Self::boundary_rect(instance, viewport),
        };
        let strategy = instance.options.strategy.unwrap_or(self.config.strategy);
        let computed = position::compute(strategy, &request);

        if computed.placement != instance.actual_placement {
            instance.actual_placement = computed.placement;
            self.outbox.push(TooltipEvent::PlacementChanged {
                id,
                placement: computed.placement,
            });
        }
        if instance.position != Some(computed) {
            instance.position = Some(computed);
            self.outbox.push(TooltipEvent::PositionUpdated {
                id,
                position: computed,
            });
        }
        true
    }

    fn flush_positions(&mut self) -> usize {
        let mut updated = 0;
        for id in self.queue.drain() {
            if self
                .instances
                .get(id)
                .is_some_and(TooltipInstance::is_open)
                && self.update_position(id)
            {
                updated += 1;
            }
        }
        updated
    }

    // -------------------------------------------------------------------------
    // Timers
    // -------------------------------------------------------------------------

    fn tick(&mut self, now_ms: u64) {
        while let Some(expired) = self.timers.pop_expired(now_ms) {
            match expired.payload {
                TooltipTask::Show(id) => {
                    let due = self
                        .instances
                        .get_mut(id)
                        .is_some_and(|i| i.scheduler.take_due(TimerKind::Show, expired.id));
                    if due {
                        self.open(id, now_ms);
                    }
                }
                TooltipTask::Hide(id) => {
                    let due = self
                        .instances
                        .get_mut(id)
                        .is_some_and(|i| i.scheduler.take_due(TimerKind::Hide, expired.id));
                    if due {
                        self.close(id, now_ms);
                    }
                }
                TooltipTask::AutoHide(id) => {
                    let due = self
                        .instances
                        .get_mut(id)
                        .is_some_and(|i| i.scheduler.take_due(TimerKind::Duration, expired.id));
                    if due {
                        tracing::debug!("TooltipManager::tick - {:?} duration elapsed", id);
                        // Also cuts short a pending hide
                        self.close(id, now_ms);
                    }
                }
                TooltipTask::Release(scope) => {
                    self.coordinator.release(&scope, expired.id);
                }
            }
        }
        self.flush_positions();
    }
}

// =============================================================================
// TooltipManager
// =============================================================================

/// Handle to the tooltip registry of one application root
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct TooltipManager {
    inner: Arc<Mutex<TooltipManagerInner>>,
    events: Arc<Emitter<TooltipEvent>>,
    clock: SharedClock,
}

impl TooltipManager {
    pub fn new(host: Arc<dyn LayoutHost>, clock: SharedClock) -> Self {
        Self::with_config(host, clock, TooltipConfig::default())
    }

    pub fn with_config(
        host: Arc<dyn LayoutHost>,
        clock: SharedClock,
        config: TooltipConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TooltipManagerInner::new(config, host))),
            events: Arc::new(Emitter::new()),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, TooltipManagerInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `f` under the lock, then deliver whatever it queued
    fn with_inner<R>(&self, f: impl FnOnce(&mut TooltipManagerInner, u64) -> R) -> R {
        let now = self.clock.now_ms();
        let (result, events) = {
            let mut inner = self.lock();
            let result = f(&mut inner, now);
            (result, inner.take_outbox())
        };
        self.events.emit_all(&events);
        result
    }

    /// Register a tooltip; it opens at once when `default_open` is set
    pub fn mount(&self, options: TooltipOptions) -> TooltipId {
        self.with_inner(|inner, now| inner.mount(options, now))
    }

    /// Destroy a tooltip, cancelling its timers and listeners without events
    pub fn unmount(&self, id: TooltipId) -> bool {
        self.with_inner(|inner, _| inner.unmount(id))
    }

    pub fn set_reference(&self, id: TooltipId, reference: impl Into<Option<Reference>>) {
        let reference = reference.into();
        self.with_inner(|inner, _| inner.set_reference(id, reference));
    }

    pub fn set_content(&self, id: TooltipId, content: Option<Arc<dyn ElementRef>>) {
        self.with_inner(|inner, _| inner.set_content(id, content));
    }

    /// Change the requested placement; the placement in use resets to it
    pub fn set_placement(&self, id: TooltipId, placement: Placement) {
        self.with_inner(|inner, _| inner.set_placement(id, placement));
    }

    /// Replace the options, keeping open state and bindings
    pub fn set_options(&self, id: TooltipId, options: TooltipOptions) {
        self.with_inner(|inner, now| inner.set_options(id, options, now));
    }

    pub fn show(&self, id: TooltipId) {
        self.with_inner(|inner, now| inner.show(id, now));
    }

    pub fn hide(&self, id: TooltipId) {
        self.with_inner(|inner, now| inner.hide(id, now));
    }

    pub fn toggle(&self, id: TooltipId) {
        self.with_inner(|inner, now| inner.toggle(id, now));
    }

    pub fn pointer_enter_trigger(&self, id: TooltipId) {
        self.with_inner(|inner, now| inner.pointer_enter_trigger(id, now));
    }

    pub fn pointer_leave_trigger(&self, id: TooltipId) {
        self.with_inner(|inner, now| inner.pointer_leave_trigger(id, now));
    }

    pub fn pointer_enter_content(&self, id: TooltipId) {
        self.with_inner(|inner, _| inner.pointer_enter_content(id));
    }

    pub fn pointer_leave_content(&self, id: TooltipId) {
        self.with_inner(|inner, now| inner.pointer_leave_content(id, now));
    }

    pub fn focus_in(&self, id: TooltipId) {
        self.with_inner(|inner, now| inner.focus_in(id, now));
    }

    pub fn focus_out(&self, id: TooltipId) {
        self.with_inner(|inner, now| inner.focus_out(id, now));
    }

    pub fn click_trigger(&self, id: TooltipId) {
        self.with_inner(|inner, now| inner.click_trigger(id, now));
    }

    /// Escape pressed; returns the tooltip that was closed
    pub fn escape(&self) -> Option<TooltipId> {
        self.with_inner(|inner, now| inner.escape(now))
    }

    pub fn document_click(&self, target: Option<ElementKey>) {
        self.with_inner(|inner, now| inner.document_click(target, now));
    }

    /// Route a host notification to the affected tooltips
    pub fn handle_event(&self, event: HostEvent) {
        self.with_inner(|inner, now| inner.handle_event(event, now));
    }

    /// Controlled open state from outside; only a changed value is applied
    pub fn set_model_value(&self, id: TooltipId, open: bool) {
        self.with_inner(|inner, now| inner.set_model_value(id, open, now));
    }

    /// Queue a recompute for the next flush
    pub fn request_reposition(&self, id: TooltipId) -> bool {
        let mut inner = self.lock();
        inner.instances.contains_key(id) && inner.queue.request(id)
    }

    /// Compute every queued position now; returns how many were updated
    pub fn flush_positions(&self) -> usize {
        self.with_inner(|inner, _| inner.flush_positions())
    }

    /// Compute one position immediately
    pub fn update_position(&self, id: TooltipId) -> bool {
        self.with_inner(|inner, _| inner.update_position(id))
    }

    /// Fire due timers, then flush queued repositions
    pub fn tick(&self) {
        self.with_inner(|inner, now| inner.tick(now));
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.lock().timers.next_deadline()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&TooltipEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(listener)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn contains(&self, id: TooltipId) -> bool {
        self.lock().instances.contains_key(id)
    }

    pub fn is_open(&self, id: TooltipId) -> bool {
        self.lock()
            .instances
            .get(id)
            .is_some_and(TooltipInstance::is_open)
    }

    pub fn phase(&self, id: TooltipId) -> Option<TooltipPhase> {
        self.lock()
            .instances
            .get(id)
            .map(|instance| instance.scheduler.phase())
    }

    pub fn state(&self, id: TooltipId) -> Option<TooltipState> {
        self.lock()
            .instances
            .get(id)
            .map(|instance| instance.state(id))
    }

    pub fn position(&self, id: TooltipId) -> Option<ComputedPosition> {
        self.lock()
            .instances
            .get(id)
            .and_then(|instance| instance.position)
    }

    pub fn actual_placement(&self, id: TooltipId) -> Option<Placement> {
        self.lock()
            .instances
            .get(id)
            .map(|instance| instance.actual_placement)
    }

    /// Open tooltips, oldest open first
    pub fn open_tooltips(&self) -> Vec<TooltipId> {
        let inner = self.lock();
        let mut open: Vec<(u64, TooltipId)> = inner
            .instances
            .iter()
            .filter(|(_, instance)| instance.is_open())
            .map(|(id, instance)| (instance.opened_seq, id))
            .collect();
        open.sort_unstable_by_key(|(seq, _)| *seq);
        open.into_iter().map(|(_, id)| id).collect()
    }

    pub fn scope_owner(&self, scope: &ScopeKey) -> Option<TooltipId> {
        self.lock().coordinator.owner(scope)
    }

    pub fn is_scope_active(&self, scope: &ScopeKey) -> bool {
        self.lock().coordinator.is_active(scope)
    }

    pub fn is_watching(&self, id: TooltipId) -> bool {
        self.lock().registry.is_registered(id)
    }

    pub fn pending_repositions(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn len(&self) -> usize {
        self.lock().instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().instances.is_empty()
    }

    pub fn config(&self) -> TooltipConfig {
        self.lock().config.clone()
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }
}

impl std::fmt::Debug for TooltipManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("TooltipManager")
            .field("tooltips", &inner.instances.len())
            .field("timers", &inner.timers.len())
            .field("registry", &inner.registry)
            .finish()
    }
}
