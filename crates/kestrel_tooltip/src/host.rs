//! Host abstractions
//!
//! The tooltip engine never touches a real element tree. The host renderer
//! exposes its elements through [`ElementRef`], its window through
//! [`LayoutHost`], and forwards input as [`HostEvent`]s.

use std::fmt;
use std::sync::{Arc, RwLock};

use kestrel_core::{Rect, Size};
use smallvec::SmallVec;

/// Stable identity of a host element
pub type ElementKey = u64;

/// CSS-like overflow behavior on one axis
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Clip,
    Auto,
    Scroll,
    Overlay,
}

impl Overflow {
    /// The element scrolls its content on this axis
    pub fn is_scrollable(self) -> bool {
        matches!(self, Overflow::Auto | Overflow::Scroll | Overflow::Overlay)
    }

    /// Content outside the element is cut off
    pub fn clips(self) -> bool {
        !matches!(self, Overflow::Visible)
    }
}

/// A host element a tooltip can be anchored to or rendered into
pub trait ElementRef: Send + Sync {
    fn key(&self) -> ElementKey;

    /// Bounds in viewport coordinates, transforms included
    fn bounding_rect(&self) -> Rect;

    /// Untransformed layout size
    fn layout_size(&self) -> Size;

    fn parent(&self) -> Option<Arc<dyn ElementRef>>;

    /// Overflow on the x and y axes
    fn overflow(&self) -> (Overflow, Overflow) {
        (Overflow::Visible, Overflow::Visible)
    }

    /// Whether `key` is this element or one of its descendants
    fn contains(&self, key: ElementKey) -> bool {
        self.key() == key
    }

    /// Still attached to the document
    fn is_connected(&self) -> bool {
        true
    }
}

/// Window-level facts from the host
pub trait LayoutHost: Send + Sync {
    /// Visible area in viewport coordinates
    fn viewport(&self) -> Rect;

    /// Key of the document root element, always treated as scrollable
    fn document_root(&self) -> ElementKey;
}

/// Ancestors of `element` that scroll on either axis, nearest first
pub fn scroll_parents(element: &dyn ElementRef) -> SmallVec<[ElementKey; 8]> {
    let mut parents = SmallVec::new();
    let mut current = element.parent();
    while let Some(node) = current {
        let (x, y) = node.overflow();
        if x.is_scrollable() || y.is_scrollable() {
            parents.push(node.key());
        }
        current = node.parent();
    }
    parents
}

/// Viewport intersected with every clipping ancestor of `element`
pub fn clipping_rect(element: &dyn ElementRef, viewport: Rect) -> Rect {
    let mut clip = viewport;
    let mut current = element.parent();
    while let Some(node) = current {
        let (x, y) = node.overflow();
        if x.clips() || y.clips() {
            match clip.intersection(&node.bounding_rect()) {
                Some(area) => clip = area,
                None => return viewport,
            }
        }
        current = node.parent();
    }
    clip
}

// =============================================================================
// References
// =============================================================================

/// A reference with geometry but no element behind it (cursor, text range, ...)
#[derive(Clone)]
pub struct VirtualElement {
    rect: Arc<RwLock<Rect>>,
}

impl VirtualElement {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect: Arc::new(RwLock::new(rect)),
        }
    }

    pub fn bounding_rect(&self) -> Rect {
        *self.rect.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Move the virtual rect; the owner should request a reposition
    pub fn set_rect(&self, rect: Rect) {
        *self.rect.write().unwrap_or_else(|e| e.into_inner()) = rect;
    }
}

impl fmt::Debug for VirtualElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualElement")
            .field("rect", &self.bounding_rect())
            .finish()
    }
}

/// What a tooltip is anchored to
#[derive(Clone)]
pub enum Reference {
    Element(Arc<dyn ElementRef>),
    Virtual(VirtualElement),
}

impl Reference {
    pub fn bounding_rect(&self) -> Rect {
        match self {
            Reference::Element(element) => element.bounding_rect(),
            Reference::Virtual(virtual_element) => virtual_element.bounding_rect(),
        }
    }

    pub fn element(&self) -> Option<&Arc<dyn ElementRef>> {
        match self {
            Reference::Element(element) => Some(element),
            Reference::Virtual(_) => None,
        }
    }

    pub fn key(&self) -> Option<ElementKey> {
        self.element().map(|element| element.key())
    }

    pub fn contains(&self, key: ElementKey) -> bool {
        self.element().is_some_and(|element| element.contains(key))
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Element(element) => f.debug_tuple("Element").field(&element.key()).finish(),
            Reference::Virtual(virtual_element) => {
                f.debug_tuple("Virtual").field(virtual_element).finish()
            }
        }
    }
}

impl From<Arc<dyn ElementRef>> for Reference {
    fn from(element: Arc<dyn ElementRef>) -> Self {
        Reference::Element(element)
    }
}

impl From<VirtualElement> for Reference {
    fn from(virtual_element: VirtualElement) -> Self {
        Reference::Virtual(virtual_element)
    }
}

// =============================================================================
// HostEvent
// =============================================================================

/// Input and layout notifications forwarded by the host
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEvent {
    Resize,
    WindowScroll,
    ElementScroll(ElementKey),
    /// Attributes or children changed somewhere under this element
    Mutation(ElementKey),
    PointerEnter(ElementKey),
    PointerLeave(ElementKey),
    /// Click with the innermost target element, `None` for empty space
    Click(Option<ElementKey>),
    FocusIn(ElementKey),
    FocusOut(ElementKey),
    Escape,
}


#[cfg(test)]
mod tests {
    use super::testing::FakeElement;
    use super::*;

    #[test]
    fn test_scroll_parents_nearest_first() {
        let root = FakeElement::root(1, Rect::new(0.0, 0.0, 800.0, 600.0));
        let panel = FakeElement::child(
            &root,
            2,
            Rect::new(0.0, 0.0, 400.0, 300.0),
            (Overflow::Hidden, Overflow::Auto),
        );
        let card = FakeElement::child(
            &panel,
            3,
            Rect::new(10.0, 10.0, 200.0, 100.0),
            (Overflow::Visible, Overflow::Visible),
        );
        let list = FakeElement::child(
            &card,
            4,
            Rect::new(10.0, 10.0, 200.0, 80.0),
            (Overflow::Scroll, Overflow::Visible),
        );
        let button = FakeElement::child(
            &list,
            5,
            Rect::new(20.0, 20.0, 40.0, 20.0),
            (Overflow::Visible, Overflow::Visible),
        );

        assert_eq!(scroll_parents(button.as_ref()).as_slice(), &[4, 2]);
        assert!(card.contains(5));
        assert!(!button.contains(3));
    }

    #[test]
    fn test_clipping_rect_intersects_clipping_ancestors() {
        let root = FakeElement::root(1, Rect::new(0.0, 0.0, 800.0, 600.0));
        let panel = FakeElement::child(
            &root,
            2,
            Rect::new(100.0, 100.0, 300.0, 200.0),
            (Overflow::Hidden, Overflow::Hidden),
        );
        let button = FakeElement::child(
            &panel,
            3,
            Rect::new(120.0, 120.0, 40.0, 20.0),
            (Overflow::Visible, Overflow::Visible),
        );

        let clip = clipping_rect(button.as_ref(), Rect::new(0.0, 0.0, 800.0, 600.0));
        assert_eq!(clip, Rect::new(100.0, 100.0, 300.0, 200.0));
    }

    #[test]
    fn test_virtual_reference_moves() {
        let virtual_element = VirtualElement::new(Rect::new(0.0, 0.0, 1.0, 1.0));
        let reference = Reference::from(virtual_element.clone());
        virtual_element.set_rect(Rect::new(50.0, 60.0, 1.0, 1.0));
        assert_eq!(reference.bounding_rect().origin.x, 50.0);
        assert!(reference.key().is_none());
    }
}
