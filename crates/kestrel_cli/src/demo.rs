//! Scripted demos
//!
//! A fake terminal window stands in for a renderer: it owns a tiny element
//! tree, forwards scripted input to the engines and logs every event they
//! broadcast. Timers run on the system clock, driven by a tokio interval.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::{Context, Result};
use kestrel_app::{AppConfig, AppContext};
use kestrel_core::{Rect, Size};
use kestrel_toast::{Message, PromiseMessages, RemoveOutcome, ToastEvent, ToastOptions};
use kestrel_tooltip::{
    attach, ElementKey, ElementRef, HostEvent, LayoutHost, Overflow, Placement, Reference,
    Strategy, TooltipEvent, TooltipOptions, VirtualElement,
};
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, info, warn};

/// How often the demo loop fires due timers
const FRAME: Duration = Duration::from_millis(16);

const WINDOW_WIDTH: f32 = 640.0;
const WINDOW_HEIGHT: f32 = 360.0;

const ROOT: ElementKey = 1;
const TOOLBAR: ElementKey = 2;
const BOLD: ElementKey = 10;
const ITALIC: ElementKey = 11;
const LINK: ElementKey = 12;
const BOLD_TIP: ElementKey = 110;

// =============================================================================
// Terminal host
// =============================================================================

struct TerminalWindow;

impl LayoutHost for TerminalWindow {
    fn viewport(&self) -> Rect {
        Rect::new(0.0, 0.0, WINDOW_WIDTH, WINDOW_HEIGHT)
    }

    fn document_root(&self) -> ElementKey {
        ROOT
    }
}

/// One box in the demo element tree
struct DemoElement {
    key: ElementKey,
    rect: RwLock<Rect>,
    overflow: Overflow,
    parent: Option<Arc<DemoElement>>,
}

impl DemoElement {
    fn root() -> Arc<Self> {
        Arc::new(Self {
            key: ROOT,
            rect: RwLock::new(Rect::new(0.0, 0.0, WINDOW_WIDTH, WINDOW_HEIGHT)),
            overflow: Overflow::Auto,
            parent: None,
        })
    }

    fn child(parent: &Arc<Self>, key: ElementKey, rect: Rect, overflow: Overflow) -> Arc<Self> {
        Arc::new(Self {
            key,
            rect: RwLock::new(rect),
            overflow,
            parent: Some(parent.clone()),
        })
    }

    fn move_by(&self, dx: f32, dy: f32) {
        let mut rect = self.rect.write().unwrap_or_else(|e| e.into_inner());
        rect.origin.x += dx;
        rect.origin.y += dy;
    }

    fn handle(self: &Arc<Self>) -> Arc<dyn ElementRef> {
        self.clone()
    }
}

impl ElementRef for DemoElement {
    fn key(&self) -> ElementKey {
        self.key
    }

    fn bounding_rect(&self) -> Rect {
        *self.rect.read().unwrap_or_else(|e| e.into_inner())
    }

    fn layout_size(&self) -> Size {
        self.bounding_rect().size
    }

    fn parent(&self) -> Option<Arc<dyn ElementRef>> {
        self.parent
            .as_ref()
            .map(|parent| parent.clone() as Arc<dyn ElementRef>)
    }

    fn overflow(&self) -> (Overflow, Overflow) {
        (self.overflow, self.overflow)
    }
}

// =============================================================================
// Driving
// =============================================================================

/// Tick both engines every frame for `budget`
async fn drive(app: &AppContext, budget: Duration) {
    let mut frames = interval(FRAME);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let started = tokio::time::Instant::now();
    while started.elapsed() < budget {
        frames.tick().await;
        app.tick();
    }
}

/// Tick until no timer is pending, giving up after `limit`
async fn drive_until_idle(app: &AppContext, limit: Duration) -> bool {
    let mut frames = interval(FRAME);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let started = tokio::time::Instant::now();
    loop {
        frames.tick().await;
        app.tick();
        if app.next_deadline().is_none() {
            return true;
        }
        if started.elapsed() >= limit {
            return false;
        }
    }
}

fn build_app(config: AppConfig, host: Arc<dyn LayoutHost>) -> AppContext {
    AppContext::builder(host).config(config).build()
}

// =============================================================================
// Toast demo
// =============================================================================

pub async fn toast(config: AppConfig) -> Result<()> {
    let app = build_app(config, Arc::new(TerminalWindow));
    let toaster = app.use_toast().context("Toast demo needs a toaster")?;

    let _events = toaster.subscribe(|event| match event {
        ToastEvent::Added(record) => info!(
            "+ [{}] {} {}",
            record.position,
            record.severity.as_str(),
            record.title.as_deref().unwrap_or("")
        ),
        ToastEvent::Updated(record) => info!(
            "~ {} {}",
            record.severity.as_str(),
            record.title.as_deref().unwrap_or("")
        ),
        ToastEvent::Removed { id, reason } => info!("- {} ({:?})", id, reason),
        ToastEvent::ClosePrevented { id } => warn!("! {} refused to close", id),
        other => debug!("{:?}", other),
    });

    info!("== success, then the same toast again inside the dedupe window");
    toaster.success("Saved", Some("All changes written"), None);
    toaster.success("Saved", Some("All changes written"), None);
    info!("   {} toast(s) showing", toaster.len());

    info!("== a toast that refuses to close");
    let pinned = toaster.add(
        ToastOptions::titled("Upload in progress")
            .persistent()
            .prevent_close(true),
    );
    if toaster.remove(&pinned) == RemoveOutcome::Prevented {
        drive(&app, Duration::from_millis(400)).await;
        toaster.update(&pinned, ToastOptions::new().prevent_close(false));
        toaster.remove(&pinned);
    }

    info!("== undo");
    let archived = toaster.undo(
        "Message archived",
        || info!("   undo pressed, message restored"),
        Some(ToastOptions::new().duration_ms(1500)),
    );
    drive(&app, Duration::from_millis(300)).await;
    toaster.invoke_action(&archived, 0);

    info!("== promise");
    let upload = async {
        sleep(Duration::from_millis(800)).await;
        Ok::<u32, String>(3)
    };
    let messages = PromiseMessages::new()
        .loading("Uploading files")
        .success(Message::with(|count: &u32| format!("Uploaded {count} files")))
        .error(Message::with(|err: &String| format!("Upload failed: {err}")));
    let (uploaded, _) = tokio::join!(
        toaster.promise(upload, messages),
        drive(&app, Duration::from_millis(1000))
    );
    match uploaded {
        Ok(count) => debug!("promise settled with {count}"),
        Err(err) => debug!("promise failed: {err}"),
    }

    info!("== waiting for auto-dismiss");
    if !drive_until_idle(&app, Duration::from_secs(10)).await {
        info!("   clearing {} remaining toast(s)", toaster.len());
        toaster.clear();
    }

    app.shutdown();
    Ok(())
}

// =============================================================================
// Tooltip demo
// =============================================================================

pub async fn tooltip(mut config: AppConfig) -> Result<()> {
    config.tooltip.show_delay = config.tooltip.show_delay.max(200);

    let app = build_app(config, Arc::new(TerminalWindow));
    let tooltips = app.tooltips().clone();

    let root = DemoElement::root();
    let toolbar = DemoElement::child(
        &root,
        TOOLBAR,
        Rect::new(0.0, 0.0, WINDOW_WIDTH, 48.0),
        Overflow::Auto,
    );
    let bold = DemoElement::child(&toolbar, BOLD, Rect::new(16.0, 8.0, 32.0, 32.0), Overflow::Visible);
    let italic = DemoElement::child(&toolbar, ITALIC, Rect::new(56.0, 8.0, 32.0, 32.0), Overflow::Visible);
    let link = DemoElement::child(&toolbar, LINK, Rect::new(96.0, 8.0, 32.0, 32.0), Overflow::Visible);
    let bold_tip = DemoElement::child(&root, BOLD_TIP, Rect::new(0.0, 0.0, 64.0, 24.0), Overflow::Visible);

    let _events = tooltips.subscribe(|event| match event {
        TooltipEvent::Show { id } => info!("show {:?}", id),
        TooltipEvent::Hide { id } => info!("hide {:?}", id),
        TooltipEvent::PlacementChanged { id, placement } => {
            info!("{:?} flipped to {}", id, placement)
        }
        TooltipEvent::PositionUpdated { id, position } => info!(
            "{:?} at ({:.1}, {:.1}) {}",
            id, position.left, position.top, position.placement
        ),
        other => debug!("{:?}", other),
    });

    // Toolbar buttons sit at the top edge, so "top" tooltips flip below
    let group = |content: &str| {
        TooltipOptions::new()
            .content(content)
            .placement(Placement::Top)
            .group("toolbar")
    };
    let bold_handle = attach(&tooltips, bold.handle(), group("Bold"));
    bold_handle.set_content_element(Some(bold_tip.handle()));
    let italic_handle = attach(&tooltips, italic.handle(), group("Italic"));
    let link_handle = attach(&tooltips, link.handle(), group("Insert link").interactive(true));

    info!("== hover Bold, wait out the show delay");
    tooltips.handle_event(HostEvent::PointerEnter(BOLD));
    drive(&app, Duration::from_millis(300)).await;

    info!("== slide to Italic: the group opens it without delay");
    tooltips.handle_event(HostEvent::PointerLeave(BOLD));
    tooltips.handle_event(HostEvent::PointerEnter(ITALIC));
    drive(&app, Duration::from_millis(50)).await;
    info!("   italic open: {}", italic_handle.is_open());

    info!("== scroll the toolbar: open tooltips follow");
    for element in [&toolbar, &bold, &italic, &link] {
        element.move_by(0.0, 12.0);
    }
    tooltips.handle_event(HostEvent::ElementScroll(TOOLBAR));
    drive(&app, Duration::from_millis(50)).await;

    info!("== click the link button, then escape");
    tooltips.handle_event(HostEvent::PointerLeave(ITALIC));
    tooltips.handle_event(HostEvent::PointerEnter(LINK));
    drive(&app, Duration::from_millis(100)).await;
    if let Some(id) = tooltips.escape() {
        info!("   escape closed {:?}", id);
    }
    tooltips.handle_event(HostEvent::PointerLeave(LINK));

    info!("== cursor tooltip on a virtual reference");
    let cursor = VirtualElement::new(Rect::new(600.0, 200.0, 1.0, 1.0));
    let follow = tooltips.mount(
        TooltipOptions::new()
            .content("x: 600, y: 200")
            .placement(Placement::Right)
            .strategy(Strategy::Middleware)
            .singleton(true)
            .duration_ms(1200),
    );
    tooltips.set_reference(follow, Reference::from(cursor.clone()));
    tooltips.show(follow);
    drive(&app, Duration::from_millis(300)).await;
    cursor.set_rect(Rect::new(320.0, 180.0, 1.0, 1.0));
    tooltips.request_reposition(follow);
    drive(&app, Duration::from_millis(50)).await;

    info!("== click on empty space");
    bold_handle.show();
    tooltips.handle_event(HostEvent::Click(None));

    drive_until_idle(&app, Duration::from_secs(5)).await;

    bold_handle.detach();
    italic_handle.detach();
    link_handle.detach();
    tooltips.unmount(follow);
    info!("== done, {} tooltip(s) left mounted", tooltips.len());

    app.shutdown();
    Ok(())
}
