//! Tooltip option types

use std::fmt;
use std::str::FromStr;

use kestrel_core::Rect;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::TooltipError;

// =============================================================================
// Placement
// =============================================================================

/// Side of the reference the tooltip sits on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Top and bottom stack along y
    pub fn is_vertical(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }
}

/// Cross-axis alignment within a side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Alignment {
    Center,
    Start,
    End,
}

/// Where the tooltip goes relative to its reference
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    #[default]
    Top,
    TopStart,
    TopEnd,
    Bottom,
    BottomStart,
    BottomEnd,
    Left,
    LeftStart,
    LeftEnd,
    Right,
    RightStart,
    RightEnd,
}

impl Placement {
    pub const ALL: [Placement; 12] = [
        Placement::Top,
        Placement::TopStart,
        Placement::TopEnd,
        Placement::Bottom,
        Placement::BottomStart,
        Placement::BottomEnd,
        Placement::Left,
        Placement::LeftStart,
        Placement::LeftEnd,
        Placement::Right,
        Placement::RightStart,
        Placement::RightEnd,
    ];

    pub fn new(side: Side, alignment: Alignment) -> Self {
        use Alignment::*;
        match (side, alignment) {
            (Side::Top, Center) => Placement::Top,
            (Side::Top, Start) => Placement::TopStart,
            (Side::Top, End) => Placement::TopEnd,
            (Side::Bottom, Center) => Placement::Bottom,
            (Side::Bottom, Start) => Placement::BottomStart,
            (Side::Bottom, End) => Placement::BottomEnd,
            (Side::Left, Center) => Placement::Left,
            (Side::Left, Start) => Placement::LeftStart,
            (Side::Left, End) => Placement::LeftEnd,
            (Side::Right, Center) => Placement::Right,
            (Side::Right, Start) => Placement::RightStart,
            (Side::Right, End) => Placement::RightEnd,
        }
    }

    pub fn side(self) -> Side {
        match self {
            Placement::Top | Placement::TopStart | Placement::TopEnd => Side::Top,
            Placement::Bottom | Placement::BottomStart | Placement::BottomEnd => Side::Bottom,
            Placement::Left | Placement::LeftStart | Placement::LeftEnd => Side::Left,
            Placement::Right | Placement::RightStart | Placement::RightEnd => Side::Right,
        }
    }

    pub fn alignment(self) -> Alignment {
        match self {
            Placement::TopStart
            | Placement::BottomStart
            | Placement::LeftStart
            | Placement::RightStart => Alignment::Start,
            Placement::TopEnd | Placement::BottomEnd | Placement::LeftEnd | Placement::RightEnd => {
                Alignment::End
            }
            _ => Alignment::Center,
        }
    }

    /// Same alignment on the opposite side (`top-start` → `bottom-start`)
    pub fn opposite(self) -> Placement {
        Placement::new(self.side().opposite(), self.alignment())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Placement::Top => "top",
            Placement::TopStart => "top-start",
            Placement::TopEnd => "top-end",
            Placement::Bottom => "bottom",
            Placement::BottomStart => "bottom-start",
            Placement::BottomEnd => "bottom-end",
            Placement::Left => "left",
            Placement::LeftStart => "left-start",
            Placement::LeftEnd => "left-end",
            Placement::Right => "right",
            Placement::RightStart => "right-start",
            Placement::RightEnd => "right-end",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Placement {
    type Err = TooltipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Placement::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| TooltipError::UnknownValue {
                kind: "placement",
                value: s.to_string(),
            })
    }
}

// =============================================================================
// Triggers
// =============================================================================

/// Input that opens a tooltip
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Hover,
    Click,
    Focus,
    /// Only `show`/`hide`/`toggle` calls
    Manual,
}

impl FromStr for Trigger {
    type Err = TooltipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hover" => Ok(Trigger::Hover),
            "click" => Ok(Trigger::Click),
            "focus" => Ok(Trigger::Focus),
            "manual" => Ok(Trigger::Manual),
            other => Err(TooltipError::UnknownValue {
                kind: "trigger",
                value: other.to_string(),
            }),
        }
    }
}

/// Any combination of triggers, hover by default
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerSet(SmallVec<[Trigger; 4]>);

impl TriggerSet {
    pub fn new(triggers: impl IntoIterator<Item = Trigger>) -> Self {
        let mut set = SmallVec::new();
        for trigger in triggers {
            if !set.contains(&trigger) {
                set.push(trigger);
            }
        }
        Self(set)
    }

    pub fn contains(&self, trigger: Trigger) -> bool {
        self.0.contains(&trigger)
    }

    pub fn iter(&self) -> impl Iterator<Item = Trigger> + '_ {
        self.0.iter().copied()
    }
}

impl Default for TriggerSet {
    fn default() -> Self {
        Self::new([Trigger::Hover])
    }
}

impl From<Trigger> for TriggerSet {
    fn from(trigger: Trigger) -> Self {
        Self::new([trigger])
    }
}

impl<const N: usize> From<[Trigger; N]> for TriggerSet {
    fn from(triggers: [Trigger; N]) -> Self {
        Self::new(triggers)
    }
}

// =============================================================================
// Delay / Offset
// =============================================================================

/// Show/hide debounce: one value for both, or separate values
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Delay {
    Both(u64),
    Split { show: u64, hide: u64 },
}

impl Delay {
    pub fn show_ms(self) -> u64 {
        match self {
            Delay::Both(ms) => ms,
            Delay::Split { show, .. } => show,
        }
    }

    pub fn hide_ms(self) -> u64 {
        match self {
            Delay::Both(ms) => ms,
            Delay::Split { hide, .. } => hide,
        }
    }
}

impl From<u64> for Delay {
    fn from(ms: u64) -> Self {
        Delay::Both(ms)
    }
}

/// Distance from the reference: main axis only, or `[main, cross]`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Offset {
    Main(f32),
    Axes([f32; 2]),
}

impl Offset {
    pub fn main_axis(self) -> f32 {
        match self {
            Offset::Main(main) => main,
            Offset::Axes([main, _]) => main,
        }
    }

    pub fn cross_axis(self) -> f32 {
        match self {
            Offset::Main(_) => 0.0,
            Offset::Axes([_, cross]) => cross,
        }
    }
}

impl From<f32> for Offset {
    fn from(main: f32) -> Self {
        Offset::Main(main)
    }
}

impl From<[f32; 2]> for Offset {
    fn from(axes: [f32; 2]) -> Self {
        Offset::Axes(axes)
    }
}

// =============================================================================
// Strategy / Teleport / Boundary
// =============================================================================

/// How coordinates are computed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Fixed formulas per placement, optional flip
    #[default]
    Manual,
    /// Offset, flip and shift passes against a boundary
    Middleware,
}

/// Where the renderer should mount the tooltip content
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Teleport {
    /// Next to the trigger
    #[default]
    Inline,
    /// At the document root
    Body,
    /// Inside the element matching a selector
    Selector(String),
}

impl From<&str> for Teleport {
    fn from(target: &str) -> Self {
        match target {
            "" | "inline" => Teleport::Inline,
            "body" => Teleport::Body,
            selector => Teleport::Selector(selector.to_string()),
        }
    }
}

/// Region the middleware keeps the tooltip inside
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Boundary {
    #[default]
    Viewport,
    Rect(Rect),
    /// Viewport clipped by every ancestor that clips its overflow
    ClippingAncestors,
}

// =============================================================================
// TooltipOptions
// =============================================================================

/// Per-tooltip options
///
/// `None` fields take the manager's configured default.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipOptions {
    pub content: Option<String>,
    pub title: Option<String>,
    pub placement: Option<Placement>,
    pub offset: Option<Offset>,
    pub flip: bool,
    pub shift: bool,
    pub strategy: Option<Strategy>,
    pub boundary: Boundary,
    pub triggers: TriggerSet,
    pub delay: Option<Delay>,
    /// Auto-hide after this many ms once open, 0 for never
    pub duration_ms: u64,
    pub interactive: bool,
    pub hide_on_click: bool,
    pub close_on_escape: bool,
    pub disabled: bool,
    pub default_open: bool,
    pub singleton: bool,
    pub group: Option<String>,
    pub teleport: Teleport,
}

impl Default for TooltipOptions {
    fn default() -> Self {
        Self {
            content: None,
            title: None,
            placement: None,
            offset: None,
            flip: true,
            shift: true,
            strategy: None,
            boundary: Boundary::Viewport,
            triggers: TriggerSet::default(),
            delay: None,
            duration_ms: 0,
            interactive: false,
            hide_on_click: true,
            close_on_escape: true,
            disabled: false,
            default_open: false,
            singleton: false,
            group: None,
            teleport: Teleport::Inline,
        }
    }
}

impl TooltipOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = Some(placement);
        self
    }

    pub fn offset(mut self, offset: impl Into<Offset>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    pub fn flip(mut self, flip: bool) -> Self {
        self.flip = flip;
        self
    }

    pub fn shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn triggers(mut self, triggers: impl Into<TriggerSet>) -> Self {
        self.triggers = triggers.into();
        self
    }

    pub fn delay(mut self, delay: impl Into<Delay>) -> Self {
        self.delay = Some(delay.into());
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn hide_on_click(mut self, hide_on_click: bool) -> Self {
        self.hide_on_click = hide_on_click;
        self
    }

    pub fn close_on_escape(mut self, close_on_escape: bool) -> Self {
        self.close_on_escape = close_on_escape;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn default_open(mut self, default_open: bool) -> Self {
        self.default_open = default_open;
        self
    }

    pub fn singleton(mut self, singleton: bool) -> Self {
        self.singleton = singleton;
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn teleport(mut self, teleport: impl Into<Teleport>) -> Self {
        self.teleport = teleport.into();
        self
    }

    pub fn has_trigger(&self, trigger: Trigger) -> bool {
        self.triggers.contains(trigger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_parts() {
        assert_eq!(Placement::TopStart.side(), Side::Top);
        assert_eq!(Placement::TopStart.alignment(), Alignment::Start);
        assert_eq!(Placement::TopStart.opposite(), Placement::BottomStart);
        assert_eq!(Placement::RightEnd.opposite(), Placement::LeftEnd);
        assert_eq!(Placement::Left.opposite(), Placement::Right);
    }

    #[test]
    fn test_placement_parse() {
        for placement in Placement::ALL {
            assert_eq!(placement.as_str().parse::<Placement>().unwrap(), placement);
        }
        assert!("middle".parse::<Placement>().is_err());
    }

    #[test]
    fn test_delay_forms() {
        let both: Delay = serde_json::from_str("200").unwrap();
        assert_eq!((both.show_ms(), both.hide_ms()), (200, 200));
        let split: Delay = serde_json::from_str(r#"{"show":100,"hide":300}"#).unwrap();
        assert_eq!((split.show_ms(), split.hide_ms()), (100, 300));
    }

    #[test]
    fn test_offset_forms() {
        let main: Offset = serde_json::from_str("12").unwrap();
        assert_eq!((main.main_axis(), main.cross_axis()), (12.0, 0.0));
        let axes: Offset = serde_json::from_str("[8, 4]").unwrap();
        assert_eq!((axes.main_axis(), axes.cross_axis()), (8.0, 4.0));
    }

    #[test]
    fn test_trigger_set_dedupes() {
        let set = TriggerSet::new([Trigger::Hover, Trigger::Focus, Trigger::Hover]);
        assert_eq!(set.iter().count(), 2);
        assert!(set.contains(Trigger::Focus));
        assert!(!set.contains(Trigger::Click));
        assert!(TriggerSet::default().contains(Trigger::Hover));
    }

    #[test]
    fn test_teleport_from_str() {
        assert_eq!(Teleport::from("body"), Teleport::Body);
        assert_eq!(Teleport::from("#portal"), Teleport::Selector("#portal".into()));
    }
}
