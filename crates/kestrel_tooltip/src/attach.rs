//! Attaching a tooltip to an element
//!
//! [`attach`] mounts a tooltip on an existing element in one call and returns
//! an [`AttachHandle`]. Dropping the handle unmounts the tooltip.
//!
//! ```ignore
//! let handle = attach(&manager, button, "Save changes");
//! handle.show();
//! handle.update(TooltipOptions::new().content("Saved").placement(Placement::Bottom));
//! drop(handle); // unmounted
//! ```

use std::sync::Arc;

use crate::host::{ElementRef, Reference};
use crate::manager::{TooltipId, TooltipManager};
use crate::types::{Teleport, TooltipOptions};

/// What to show: plain text or full options
#[derive(Clone, Debug, PartialEq)]
pub enum TooltipBinding {
    Content(String),
    Options(TooltipOptions),
}

impl TooltipBinding {
    /// Options with attached-tooltip defaults applied
    ///
    /// Attached content renders at the document root unless a target was given.
    fn into_options(self) -> TooltipOptions {
        let mut options = match self {
            TooltipBinding::Content(content) => TooltipOptions::new().content(content),
            TooltipBinding::Options(options) => options,
        };
        if options.teleport == Teleport::Inline {
            options.teleport = Teleport::Body;
        }
        options
    }
}

impl From<&str> for TooltipBinding {
    fn from(content: &str) -> Self {
        TooltipBinding::Content(content.to_string())
    }
}

impl From<String> for TooltipBinding {
    fn from(content: String) -> Self {
        TooltipBinding::Content(content)
    }
}

impl From<TooltipOptions> for TooltipBinding {
    fn from(options: TooltipOptions) -> Self {
        TooltipBinding::Options(options)
    }
}

/// Mount a tooltip anchored to `reference`
pub fn attach(
    manager: &TooltipManager,
    reference: impl Into<Reference>,
    binding: impl Into<TooltipBinding>,
) -> AttachHandle {
    let id = manager.mount(binding.into().into_options());
    manager.set_reference(id, reference.into());
    tracing::debug!("attach - mounted {:?}", id);
    AttachHandle {
        manager: manager.clone(),
        id,
        detached: false,
    }
}

/// Disposer for an attached tooltip
pub struct AttachHandle {
    manager: TooltipManager,
    id: TooltipId,
    detached: bool,
}

impl AttachHandle {
    pub fn id(&self) -> TooltipId {
        self.id
    }

    pub fn show(&self) {
        self.manager.show(self.id);
    }

    pub fn hide(&self) {
        self.manager.hide(self.id);
    }

    pub fn toggle(&self) {
        self.manager.toggle(self.id);
    }

    pub fn is_open(&self) -> bool {
        self.manager.is_open(self.id)
    }

    /// Re-bind with new text or options, keeping open state
    pub fn update(&self, binding: impl Into<TooltipBinding>) {
        self.manager
            .set_options(self.id, binding.into().into_options());
    }

    /// Element the renderer mounted the tooltip content into
    pub fn set_content_element(&self, content: Option<Arc<dyn ElementRef>>) {
        self.manager.set_content(self.id, content);
    }

    /// Unmount now instead of on drop
    pub fn detach(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.detached {
            self.detached = true;
            self.manager.unmount(self.id);
            tracing::debug!("AttachHandle - unmounted {:?}", self.id);
        }
    }
}

impl Drop for AttachHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for AttachHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachHandle")
            .field("id", &self.id)
            .field("detached", &self.detached)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::{FakeElement, FakeHost};
    use crate::host::VirtualElement;
    use crate::types::Placement;
    use kestrel_core::{ManualClock, Rect};

    fn manager() -> TooltipManager {
        TooltipManager::new(FakeHost::new(800.0, 600.0), Arc::new(ManualClock::new()))
    }

    #[test]
    fn test_string_binding_teleports_to_body() {
        let manager = manager();
        let button = FakeElement::root(5, Rect::new(10.0, 10.0, 50.0, 20.0));
        let handle = attach(&manager, button as Arc<dyn ElementRef>, "Save");

        let state = manager.state(handle.id()).unwrap();
        assert_eq!(state.content.as_deref(), Some("Save"));
        assert_eq!(state.teleport, Teleport::Body);
    }

    #[test]
    fn test_selector_teleport_is_kept() {
        let manager = manager();
        let anchor = VirtualElement::new(Rect::new(10.0, 10.0, 1.0, 1.0));
        let handle = attach(
            &manager,
            anchor,
            TooltipOptions::new().content("Hi").teleport("#portal"),
        );
        assert_eq!(
            manager.state(handle.id()).unwrap().teleport,
            Teleport::Selector("#portal".into())
        );
    }

    #[test]
    fn test_handle_controls_and_drop_unmounts() {
        let manager = manager();
        let anchor = VirtualElement::new(Rect::new(10.0, 10.0, 1.0, 1.0));
        let handle = attach(&manager, anchor, "Hi");
        let id = handle.id();

        handle.toggle();
        assert!(handle.is_open());
        handle.update(TooltipOptions::new().content("Bye").placement(Placement::Left));
        assert!(handle.is_open());
        assert_eq!(manager.state(id).unwrap().placement, Placement::Left);

        drop(handle);
        assert!(!manager.contains(id));
    }

    #[test]
    fn test_detach() {
        let manager = manager();
        let anchor = VirtualElement::new(Rect::new(10.0, 10.0, 1.0, 1.0));
        let handle = attach(&manager, anchor, "Hi");
        let id = handle.id();
        handle.detach();
        assert!(!manager.contains(id));
        assert!(manager.is_empty());
    }
}
