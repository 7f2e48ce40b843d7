//! Tooltip manager behavior driven through a fake host and a manual clock

use std::sync::{Arc, Mutex, RwLock, Weak};

use kestrel_core::{Clock, ManualClock, Rect, Size};
use kestrel_tooltip::{
    Boundary, ElementKey, ElementRef, HostEvent, LayoutHost, Overflow, Placement, Reference,
    ScopeKey, Strategy, TooltipEvent, TooltipId, TooltipManager, TooltipOptions, TooltipPhase,
    Trigger, VirtualElement,
};

// =============================================================================
// Fake host
// =============================================================================

struct Node {
    key: ElementKey,
    rect: RwLock<Rect>,
    overflow: (Overflow, Overflow),
    parent: Option<Arc<Node>>,
    children: RwLock<Vec<Weak<Node>>>,
}

impl Node {
    fn new(parent: Option<&Arc<Node>>, key: ElementKey, rect: Rect, overflow: Overflow) -> Arc<Node> {
        let node = Arc::new(Node {
            key,
            rect: RwLock::new(rect),
            overflow: (overflow, overflow),
            parent: parent.cloned(),
            children: RwLock::new(Vec::new()),
        });
        if let Some(parent) = parent {
            parent.children.write().unwrap().push(Arc::downgrade(&node));
        }
        node
    }

    fn move_to(&self, rect: Rect) {
        *self.rect.write().unwrap() = rect;
    }
}

impl ElementRef for Node {
    fn key(&self) -> ElementKey {
        self.key
    }

    fn bounding_rect(&self) -> Rect {
        *self.rect.read().unwrap()
    }

    fn layout_size(&self) -> Size {
        self.rect.read().unwrap().size
    }

    fn parent(&self) -> Option<Arc<dyn ElementRef>> {
        self.parent.clone().map(|p| p as Arc<dyn ElementRef>)
    }

    fn overflow(&self) -> (Overflow, Overflow) {
        self.overflow
    }

    fn contains(&self, key: ElementKey) -> bool {
        self.key == key
            || self
                .children
                .read()
                .unwrap()
                .iter()
                .filter_map(Weak::upgrade)
                .any(|child| child.contains(key))
    }
}

struct Window;

impl LayoutHost for Window {
    fn viewport(&self) -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }

    fn document_root(&self) -> ElementKey {
        1
    }
}

const ROOT: ElementKey = 1;
const LIST: ElementKey = 2;

struct Page {
    clock: Arc<ManualClock>,
    manager: TooltipManager,
    log: Arc<Mutex<Vec<TooltipEvent>>>,
    root: Arc<Node>,
    list: Arc<Node>,
    nodes: Vec<Arc<Node>>,
}

impl Page {
    fn new() -> Self {
        let clock = Arc::new(ManualClock::new());
        let manager = TooltipManager::new(Arc::new(Window), clock.clone());
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        manager.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        let root = Node::new(None, ROOT, Rect::new(0.0, 0.0, 800.0, 600.0), Overflow::Visible);
        let list = Node::new(Some(&root), LIST, Rect::new(0.0, 0.0, 400.0, 600.0), Overflow::Auto);
        Self {
            clock,
            manager,
            log,
            root,
            list,
            nodes: Vec::new(),
        }
    }

    fn element(&mut self, key: ElementKey, rect: Rect) -> Arc<Node> {
        let node = Node::new(Some(&self.list), key, rect, Overflow::Visible);
        self.nodes.push(node.clone());
        node
    }

    /// Tooltip with trigger `key` and a 40x30 content element `key + 1000`
    fn tooltip(&mut self, key: ElementKey, rect: Rect, options: TooltipOptions) -> TooltipId {
        let trigger = self.element(key, rect);
        let content = Node::new(
            Some(&self.root),
            key + 1000,
            Rect::new(0.0, 0.0, 40.0, 30.0),
            Overflow::Visible,
        );
        self.nodes.push(content.clone());

        let id = self.manager.mount(options);
        self.manager.set_reference(id, Reference::Element(trigger));
        self.manager.set_content(id, Some(content));
        id
    }

    fn advance(&self, ms: u64) {
        self.clock.advance(ms);
        self.manager.tick();
    }

    fn events(&self) -> Vec<TooltipEvent> {
        self.log.lock().unwrap().clone()
    }

    fn clear_log(&self) {
        self.log.lock().unwrap().clear();
    }

    fn index_of(&self, wanted: &TooltipEvent) -> usize {
        self.events()
            .iter()
            .position(|event| event == wanted)
            .unwrap_or_else(|| panic!("missing {wanted:?}"))
    }
}

fn trigger_rect() -> Rect {
    Rect::new(100.0, 100.0, 80.0, 20.0)
}

// =============================================================================
// Positioning
// =============================================================================

#[test]
fn test_manual_flip_from_top_to_bottom() {
    let mut page = Page::new();
    let id = page.tooltip(10, Rect::new(100.0, 10.0, 80.0, 20.0), TooltipOptions::new());

    page.manager.show(id);

    let position = page.manager.position(id).unwrap();
    assert_eq!(position.placement, Placement::Bottom);
    assert_eq!((position.left, position.top), (120.0, 38.0));
    assert!(page.events().contains(&TooltipEvent::PlacementChanged {
        id,
        placement: Placement::Bottom
    }));
}

#[test]
fn test_middleware_with_virtual_reference() {
    let page = Page::new();
    let cursor = VirtualElement::new(Rect::new(790.0, 300.0, 1.0, 1.0));
    let content = Node::new(None, 99, Rect::new(0.0, 0.0, 120.0, 40.0), Overflow::Visible);

    let id = page.manager.mount(
        TooltipOptions::new()
            .placement(Placement::Bottom)
            .strategy(Strategy::Middleware)
            .boundary(Boundary::Viewport),
    );
    page.manager.set_reference(id, Reference::from(cursor.clone()));
    page.manager.set_content(id, Some(content));
    page.manager.show(id);

    let position = page.manager.position(id).unwrap();
    assert_eq!(position.placement, Placement::Bottom);
    assert_eq!(position.left, 680.0);
    assert_eq!(position.top, 309.0);

    cursor.set_rect(Rect::new(100.0, 300.0, 1.0, 1.0));
    assert!(page.manager.request_reposition(id));
    page.manager.flush_positions();
    assert_eq!(page.manager.position(id).unwrap().left, 40.5);
}

// =============================================================================
// Coordination
// =============================================================================

#[test]
fn test_singleton_closes_previous_before_opening_next() {
    let mut page = Page::new();
    let a = page.tooltip(10, trigger_rect(), TooltipOptions::new().singleton(true));
    let b = page.tooltip(
        20,
        Rect::new(300.0, 100.0, 80.0, 20.0),
        TooltipOptions::new().singleton(true),
    );

    page.manager.show(a);
    page.clear_log();
    page.manager.show(b);

    assert!(!page.manager.is_open(a));
    assert!(page.manager.is_open(b));
    assert_eq!(page.manager.scope_owner(&ScopeKey::Global), Some(b));

    let hide_a = page.index_of(&TooltipEvent::Hide { id: a });
    let closed_a = page.index_of(&TooltipEvent::ModelValue { id: a, open: false });
    let show_b = page.index_of(&TooltipEvent::Show { id: b });
    assert!(hide_a < show_b);
    assert!(closed_a < show_b);
}

#[test]
fn test_group_members_open_instantly_while_active() {
    let mut page = Page::new();
    let options = TooltipOptions::new().group("toolbar").delay(300u64);
    let a = page.tooltip(10, trigger_rect(), options.clone());
    let b = page.tooltip(20, Rect::new(300.0, 100.0, 80.0, 20.0), options.clone());
    let c = page.tooltip(30, Rect::new(500.0, 100.0, 80.0, 20.0), options);

    page.manager.handle_event(HostEvent::PointerEnter(10));
    assert_eq!(page.manager.phase(a), Some(TooltipPhase::PendingShow));
    page.advance(300);
    assert!(page.manager.is_open(a));

    // Moving straight to another member switches without waiting
    page.manager.handle_event(HostEvent::PointerLeave(10));
    page.advance(300);
    assert!(!page.manager.is_open(a));
    page.manager.handle_event(HostEvent::PointerEnter(20));
    assert!(page.manager.is_open(b));
    page.manager.handle_event(HostEvent::PointerLeave(20));
    page.advance(300);
    assert!(!page.manager.is_open(b));
    assert!(page.manager.is_scope_active(&ScopeKey::Group("toolbar".into())));

    // Once the grace window is over the delay applies again
    page.advance(500);
    assert!(!page.manager.is_scope_active(&ScopeKey::Group("toolbar".into())));
    page.manager.handle_event(HostEvent::PointerEnter(30));
    assert_eq!(page.manager.phase(c), Some(TooltipPhase::PendingShow));
}

// =============================================================================
// Teardown
// =============================================================================

#[test]
fn test_unmount_cancels_timers_and_listeners() {
    let mut page = Page::new();
    let id = page.tooltip(
        10,
        trigger_rect(),
        TooltipOptions::new().duration_ms(1000).group("menu"),
    );
    page.manager.show(id);
    assert!(page.manager.is_watching(id));
    page.manager.handle_event(HostEvent::Resize);

    assert!(page.manager.unmount(id));
    page.clear_log();

    page.manager.handle_event(HostEvent::ElementScroll(LIST));
    page.advance(5000);

    assert!(page.events().is_empty());
    assert_eq!(page.manager.next_deadline(), None);
    assert_eq!(page.manager.pending_repositions(), 0);
    assert!(!page.manager.is_watching(id));
    assert!(!page.manager.is_scope_active(&ScopeKey::Group("menu".into())));
    assert!(page.manager.is_empty());
}

#[test]
fn test_stale_show_timer_is_noop() {
    let mut page = Page::new();
    let id = page.tooltip(10, trigger_rect(), TooltipOptions::new().delay(300u64));

    page.manager.show(id);
    page.clock.advance(100);
    page.manager.hide(id);
    page.manager.show(id);

    page.advance(200);
    assert!(!page.manager.is_open(id));
    page.advance(200);
    assert!(page.manager.is_open(id));
}

// =============================================================================
// Input
// =============================================================================

#[test]
fn test_interactive_content_keeps_tooltip_open() {
    let mut page = Page::new();
    let id = page.tooltip(10, trigger_rect(), TooltipOptions::new().interactive(true));

    page.manager.handle_event(HostEvent::PointerEnter(10));
    assert!(page.manager.is_open(id));

    page.manager.handle_event(HostEvent::PointerLeave(10));
    assert_eq!(page.manager.phase(id), Some(TooltipPhase::PendingHide));
    page.advance(50);
    page.manager.handle_event(HostEvent::PointerEnter(1010));
    assert_eq!(page.manager.phase(id), Some(TooltipPhase::Open));

    page.advance(1000);
    assert!(page.manager.is_open(id));

    page.manager.handle_event(HostEvent::PointerLeave(1010));
    assert!(!page.manager.is_open(id));
}

#[test]
fn test_non_interactive_closes_on_trigger_leave() {
    let mut page = Page::new();
    let id = page.tooltip(10, trigger_rect(), TooltipOptions::new());

    page.manager.handle_event(HostEvent::PointerEnter(10));
    page.manager.handle_event(HostEvent::PointerLeave(10));
    assert!(!page.manager.is_open(id));
}

#[test]
fn test_escape_closes_most_recent_only() {
    let mut page = Page::new();
    let a = page.tooltip(10, trigger_rect(), TooltipOptions::new());
    let b = page.tooltip(20, Rect::new(300.0, 100.0, 80.0, 20.0), TooltipOptions::new());
    let c = page.tooltip(
        30,
        Rect::new(500.0, 100.0, 80.0, 20.0),
        TooltipOptions::new().close_on_escape(false),
    );

    page.manager.show(a);
    page.manager.show(b);
    page.manager.show(c);

    assert_eq!(page.manager.escape(), Some(b));
    assert!(page.manager.is_open(a));
    assert!(page.manager.is_open(c));

    page.manager.handle_event(HostEvent::Escape);
    assert!(!page.manager.is_open(a));
    assert_eq!(page.manager.escape(), None);
    assert_eq!(page.manager.open_tooltips(), vec![c]);
}

#[test]
fn test_click_outside_closes() {
    let mut page = Page::new();
    let a = page.tooltip(10, trigger_rect(), TooltipOptions::new());
    let b = page.tooltip(
        20,
        Rect::new(300.0, 100.0, 80.0, 20.0),
        TooltipOptions::new().hide_on_click(false),
    );
    page.manager.show(a);
    page.manager.show(b);

    // Inside a's content
    page.manager.handle_event(HostEvent::Click(Some(1010)));
    assert!(page.manager.is_open(a));

    page.manager.handle_event(HostEvent::Click(None));
    assert!(!page.manager.is_open(a));
    assert!(page.manager.is_open(b));
}

#[test]
fn test_click_trigger_with_other_triggers() {
    let mut page = Page::new();
    let id = page.tooltip(
        10,
        trigger_rect(),
        TooltipOptions::new().triggers([Trigger::Click, Trigger::Focus]),
    );

    page.manager.handle_event(HostEvent::PointerEnter(10));
    assert!(!page.manager.is_open(id));
    page.manager.handle_event(HostEvent::Click(Some(10)));
    assert!(page.manager.is_open(id));
    page.manager.handle_event(HostEvent::Click(Some(10)));
    assert!(!page.manager.is_open(id));
}

// =============================================================================
// Auto-update
// =============================================================================

#[test]
fn test_layout_events_coalesce_into_one_recompute() {
    let mut page = Page::new();
    let id = page.tooltip(10, trigger_rect(), TooltipOptions::new());
    page.manager.show(id);
    page.clear_log();

    page.manager.handle_event(HostEvent::Resize);
    page.manager.handle_event(HostEvent::ElementScroll(LIST));
    page.manager.handle_event(HostEvent::WindowScroll);
    page.manager.handle_event(HostEvent::ElementScroll(ROOT));
    assert_eq!(page.manager.pending_repositions(), 1);

    page.nodes[0].move_to(Rect::new(100.0, 200.0, 80.0, 20.0));
    page.advance(0);

    let updates: Vec<_> = page
        .events()
        .into_iter()
        .filter(|event| matches!(event, TooltipEvent::PositionUpdated { .. }))
        .collect();
    assert_eq!(updates.len(), 1);
    assert_eq!(page.manager.position(id).unwrap().top, 162.0);
}

#[test]
fn test_mutation_under_trigger_repositions() {
    let mut page = Page::new();
    let id = page.tooltip(10, trigger_rect(), TooltipOptions::new());
    let badge = Node::new(
        Some(&page.nodes[0]),
        11,
        Rect::new(160.0, 100.0, 10.0, 10.0),
        Overflow::Visible,
    );
    page.manager.show(id);

    page.manager.handle_event(HostEvent::Mutation(badge.key));
    assert_eq!(page.manager.pending_repositions(), 1);
    page.manager.flush_positions();

    page.manager.handle_event(HostEvent::Mutation(LIST));
    assert_eq!(page.manager.pending_repositions(), 0);
}

#[test]
fn test_closed_tooltip_stops_watching() {
    let mut page = Page::new();
    let id = page.tooltip(10, trigger_rect(), TooltipOptions::new());
    page.manager.show(id);
    assert!(page.manager.is_watching(id));

    page.manager.hide(id);
    assert!(!page.manager.is_watching(id));
    page.manager.handle_event(HostEvent::ElementScroll(LIST));
    assert_eq!(page.manager.pending_repositions(), 0);
    assert_eq!(page.clock.now_ms(), 0);
}
