//! Toast data model
//!
//! [`ToastOptions`] is what callers pass to `add`/`update`: every field is optional
//! and unset fields fall back to the configured defaults (on `add`) or are left
//! untouched (on `update`). [`ToastRecord`] is the fully-resolved toast stored in a
//! position bucket.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::ToastDefaults;
use crate::error::ToastError;

// =============================================================================
// ToastId
// =============================================================================

/// Toast identifier, either caller-supplied text or a generated number
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToastId {
    Num(u64),
    Str(String),
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToastId::Num(n) => write!(f, "{n}"),
            ToastId::Str(s) => f.write_str(s),
        }
    }
}

impl From<u64> for ToastId {
    fn from(n: u64) -> Self {
        ToastId::Num(n)
    }
}

impl From<&str> for ToastId {
    fn from(s: &str) -> Self {
        ToastId::Str(s.to_string())
    }
}

impl From<String> for ToastId {
    fn from(s: String) -> Self {
        ToastId::Str(s)
    }
}

// =============================================================================
// Enumerations
// =============================================================================

/// Visual severity level
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Primary,
    Secondary,
    Success,
    Info,
    #[serde(alias = "warning")]
    Warn,
    Help,
    Danger,
    #[default]
    Contrast,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Primary => "primary",
            Severity::Secondary => "secondary",
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Help => "help",
            Severity::Danger => "danger",
            Severity::Contrast => "contrast",
        }
    }
}

impl FromStr for Severity {
    type Err = ToastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(Severity::Primary),
            "secondary" => Ok(Severity::Secondary),
            "success" => Ok(Severity::Success),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "help" => Ok(Severity::Help),
            "danger" | "error" => Ok(Severity::Danger),
            "contrast" => Ok(Severity::Contrast),
            other => Err(ToastError::UnknownValue {
                kind: "severity",
                value: other.to_string(),
            }),
        }
    }
}

/// Screen edge/corner a toast is stacked in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToastPosition {
    #[default]
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
    TopCenter,
    BottomCenter,
}

impl ToastPosition {
    /// Every position, in bucket order
    pub const ALL: [ToastPosition; 6] = [
        ToastPosition::TopRight,
        ToastPosition::TopLeft,
        ToastPosition::BottomRight,
        ToastPosition::BottomLeft,
        ToastPosition::TopCenter,
        ToastPosition::BottomCenter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToastPosition::TopRight => "top-right",
            ToastPosition::TopLeft => "top-left",
            ToastPosition::BottomRight => "bottom-right",
            ToastPosition::BottomLeft => "bottom-left",
            ToastPosition::TopCenter => "top-center",
            ToastPosition::BottomCenter => "bottom-center",
        }
    }

    /// Toasts anchored to the top edge grow downward
    pub fn is_top(&self) -> bool {
        matches!(
            self,
            ToastPosition::TopRight | ToastPosition::TopLeft | ToastPosition::TopCenter
        )
    }
}

impl fmt::Display for ToastPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToastPosition {
    type Err = ToastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToastPosition::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ToastError::UnknownValue {
                kind: "position",
                value: s.to_string(),
            })
    }
}

/// Announcement urgency: user-triggered (`foreground`) or system (`background`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    #[default]
    Foreground,
    Background,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Soft,
    Minimal,
    Outlined,
    Glass,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastAnimation {
    #[default]
    Slide,
    Fade,
    Scale,
    Bounce,
}

/// Progress bar setting: `false`, `true`, or `{ color }`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ProgressRepr", into = "ProgressRepr")]
pub enum Progress {
    Hidden,
    #[default]
    Visible,
    Colored(String),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ProgressRepr {
    Flag(bool),
    Styled { color: Option<String> },
}

impl From<ProgressRepr> for Progress {
    fn from(repr: ProgressRepr) -> Self {
        match repr {
            ProgressRepr::Flag(false) => Progress::Hidden,
            ProgressRepr::Flag(true) | ProgressRepr::Styled { color: None } => Progress::Visible,
            ProgressRepr::Styled { color: Some(c) } => Progress::Colored(c),
        }
    }
}

impl From<Progress> for ProgressRepr {
    fn from(progress: Progress) -> Self {
        match progress {
            Progress::Hidden => ProgressRepr::Flag(false),
            Progress::Visible => ProgressRepr::Flag(true),
            Progress::Colored(c) => ProgressRepr::Styled { color: Some(c) },
        }
    }
}

impl From<bool> for Progress {
    fn from(visible: bool) -> Self {
        if visible {
            Progress::Visible
        } else {
            Progress::Hidden
        }
    }
}

/// Icon shown next to the title
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastIcon {
    /// No icon at all
    Hidden,
    /// A named icon instead of the severity icon
    Named(String),
}

// =============================================================================
// Actions
// =============================================================================

/// Callback run when an action button is pressed
pub type ActionCallback = Arc<dyn Fn() + Send + Sync>;

/// Button rendered inside a toast
#[derive(Clone)]
pub struct ToastAction {
    pub label: String,
    pub icon: Option<String>,
    pub on_click: ActionCallback,
    /// Text copied to the clipboard when pressed
    pub copy_text: Option<String>,
    /// Haptic pulse length when pressed
    pub vibrate_ms: Option<u32>,
    /// Remove the toast after the callback ran
    pub dismiss: bool,
}

impl ToastAction {
    pub fn new<F>(label: impl Into<String>, on_click: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            icon: None,
            on_click: Arc::new(on_click),
            copy_text: None,
            vibrate_ms: None,
            dismiss: false,
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn copy_text(mut self, text: impl Into<String>) -> Self {
        self.copy_text = Some(text.into());
        self
    }

    pub fn vibrate(mut self, duration_ms: u32) -> Self {
        self.vibrate_ms = Some(duration_ms);
        self
    }

    pub fn dismiss(mut self, dismiss: bool) -> Self {
        self.dismiss = dismiss;
        self
    }
}

impl fmt::Debug for ToastAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastAction")
            .field("label", &self.label)
            .field("icon", &self.icon)
            .field("copy_text", &self.copy_text)
            .field("vibrate_ms", &self.vibrate_ms)
            .field("dismiss", &self.dismiss)
            .finish()
    }
}

// =============================================================================
// ToastOptions
// =============================================================================

/// Partial toast description used by `add` and `update`
#[derive(Clone, Debug, Default)]
pub struct ToastOptions {
    pub id: Option<ToastId>,
    pub position: Option<ToastPosition>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub severity: Option<Severity>,
    /// Auto-dismiss delay in ms, 0 keeps the toast until closed
    pub duration_ms: Option<u64>,
    pub closable: Option<bool>,
    pub prevent_close: Option<bool>,
    pub progress: Option<Progress>,
    pub orientation: Option<Orientation>,
    pub variant: Option<Variant>,
    pub animation: Option<ToastAnimation>,
    pub icon: Option<ToastIcon>,
    pub avatar: Option<String>,
    pub action: Option<ToastAction>,
    pub actions: Option<Vec<ToastAction>>,
    pub kind: Option<ToastKind>,
    pub loading: Option<bool>,
}

impl ToastOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a toast with only a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self::new().title(title)
    }

    pub fn id(mut self, id: impl Into<ToastId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn position(mut self, position: ToastPosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Keep the toast open until dismissed
    pub fn persistent(self) -> Self {
        self.duration_ms(0)
    }

    pub fn closable(mut self, closable: bool) -> Self {
        self.closable = Some(closable);
        self
    }

    pub fn prevent_close(mut self, prevent_close: bool) -> Self {
        self.prevent_close = Some(prevent_close);
        self
    }

    pub fn progress(mut self, progress: impl Into<Progress>) -> Self {
        self.progress = Some(progress.into());
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn animation(mut self, animation: ToastAnimation) -> Self {
        self.animation = Some(animation);
        self
    }

    pub fn icon(mut self, icon: ToastIcon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn avatar(mut self, src: impl Into<String>) -> Self {
        self.avatar = Some(src.into());
        self
    }

    pub fn action(mut self, action: ToastAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn actions(mut self, actions: Vec<ToastAction>) -> Self {
        self.actions = Some(actions);
        self
    }

    pub fn kind(mut self, kind: ToastKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = Some(loading);
        self
    }
}

// =============================================================================
// ToastRecord
// =============================================================================

/// A live toast inside a position bucket
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToastRecord {
    pub id: ToastId,
    pub position: ToastPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub severity: Severity,
    pub duration_ms: u64,
    pub closable: bool,
    pub prevent_close: bool,
    pub progress: Progress,
    pub orientation: Orientation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,
    pub animation: ToastAnimation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<ToastIcon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Callbacks can't be restored from a snapshot
    #[serde(skip)]
    pub action: Option<ToastAction>,
    #[serde(skip)]
    pub actions: Vec<ToastAction>,
    pub kind: ToastKind,
    #[serde(default)]
    pub loading: bool,
    pub created_at_ms: u64,
}

/// What an applied patch touched
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PatchEffect {
    /// `duration_ms` or `prevent_close` changed: the lifecycle timer must restart
    pub timing_changed: bool,
}

impl ToastRecord {
    /// Resolve options against defaults
    pub fn from_options(
        id: ToastId,
        options: ToastOptions,
        defaults: &ToastDefaults,
        now_ms: u64,
    ) -> Self {
        Self {
            id,
            position: options.position.unwrap_or(defaults.position),
            title: options.title,
            description: options.description,
            severity: options.severity.unwrap_or(defaults.severity),
            duration_ms: options.duration_ms.unwrap_or(defaults.duration_ms),
            closable: options.closable.unwrap_or(defaults.closable),
            prevent_close: options.prevent_close.unwrap_or(false),
            progress: options.progress.unwrap_or_else(|| defaults.progress.clone()),
            orientation: options.orientation.unwrap_or(defaults.orientation),
            variant: options.variant.or(defaults.variant),
            animation: options.animation.unwrap_or(defaults.animation),
            icon: options.icon,
            avatar: options.avatar,
            action: options.action,
            actions: options.actions.unwrap_or_default(),
            kind: options.kind.unwrap_or_default(),
            loading: options.loading.unwrap_or(false),
            created_at_ms: now_ms,
        }
    }

    /// Merge set fields of `patch` into this record
    ///
    /// `id` and `position` are ignored: a toast never changes identity or bucket.
    pub fn apply(&mut self, patch: ToastOptions) -> PatchEffect {
        let mut effect = PatchEffect::default();

        if let Some(title) = patch.title {
            self.title = Some(title);
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(severity) = patch.severity {
            self.severity = severity;
        }
        if let Some(duration_ms) = patch.duration_ms {
            self.duration_ms = duration_ms;
            effect.timing_changed = true;
        }
        if let Some(closable) = patch.closable {
            self.closable = closable;
        }
        if let Some(prevent_close) = patch.prevent_close {
            effect.timing_changed |= prevent_close != self.prevent_close;
            self.prevent_close = prevent_close;
        }
        if let Some(progress) = patch.progress {
            self.progress = progress;
        }
        if let Some(orientation) = patch.orientation {
            self.orientation = orientation;
        }
        if let Some(variant) = patch.variant {
            self.variant = Some(variant);
        }
        if let Some(animation) = patch.animation {
            self.animation = animation;
        }
        if let Some(icon) = patch.icon {
            self.icon = Some(icon);
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = Some(avatar);
        }
        if let Some(action) = patch.action {
            self.action = Some(action);
        }
        if let Some(actions) = patch.actions {
            self.actions = actions;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(loading) = patch.loading {
            self.loading = loading;
        }

        effect
    }

    /// Whether this toast should count down on its own
    pub fn auto_dismisses(&self) -> bool {
        self.duration_ms > 0 && !self.prevent_close
    }

    /// Action at `index`, counting the single `action` first
    pub fn action_at(&self, index: usize) -> Option<&ToastAction> {
        self.action.iter().chain(self.actions.iter()).nth(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_warning_normalizes() {
        assert_eq!("warning".parse::<Severity>().unwrap(), Severity::Warn);
        let parsed: Severity = serde_json::from_str("\"warning\"").unwrap();
        assert_eq!(parsed, Severity::Warn);
        assert_eq!(Severity::Warn.as_str(), "warn");
    }

    #[test]
    fn test_position_parse() {
        assert_eq!(
            "bottom-center".parse::<ToastPosition>().unwrap(),
            ToastPosition::BottomCenter
        );
        assert!("middle".parse::<ToastPosition>().is_err());
        assert_eq!(ToastPosition::ALL.len(), 6);
    }

    #[test]
    fn test_progress_serde_forms() {
        let hidden: Progress = serde_json::from_str("false").unwrap();
        assert_eq!(hidden, Progress::Hidden);
        let colored: Progress = serde_json::from_str(r##"{"color":"#ff0000"}"##).unwrap();
        assert_eq!(colored, Progress::Colored("#ff0000".into()));
        assert_eq!(serde_json::to_string(&Progress::Visible).unwrap(), "true");
    }

    #[test]
    fn test_toast_id_untagged() {
        let num: ToastId = serde_json::from_str("42").unwrap();
        assert_eq!(num, ToastId::Num(42));
        let text: ToastId = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(text, ToastId::from("x"));
    }

    #[test]
    fn test_apply_reports_timing_changes() {
        let mut record = ToastRecord::from_options(
            ToastId::Num(1),
            ToastOptions::titled("A"),
            &ToastDefaults::default(),
            0,
        );

        let effect = record.apply(ToastOptions::new().title("B"));
        assert!(!effect.timing_changed);
        assert_eq!(record.title.as_deref(), Some("B"));

        let effect = record.apply(ToastOptions::new().duration_ms(1000));
        assert!(effect.timing_changed);

        let effect = record.apply(ToastOptions::new().prevent_close(false));
        assert!(!effect.timing_changed);
    }

    #[test]
    fn test_patch_ignores_position() {
        let mut record = ToastRecord::from_options(
            ToastId::Num(1),
            ToastOptions::titled("A"),
            &ToastDefaults::default(),
            0,
        );
        record.apply(ToastOptions::new().position(ToastPosition::BottomLeft));
        assert_eq!(record.position, ToastPosition::TopRight);
    }

    #[test]
    fn test_action_at_counts_single_action_first() {
        let record = ToastRecord::from_options(
            ToastId::Num(1),
            ToastOptions::new()
                .action(ToastAction::new("Undo", || {}))
                .actions(vec![ToastAction::new("Retry", || {})]),
            &ToastDefaults::default(),
            0,
        );
        assert_eq!(record.action_at(0).map(|a| a.label.as_str()), Some("Undo"));
        assert_eq!(record.action_at(1).map(|a| a.label.as_str()), Some("Retry"));
        assert!(record.action_at(2).is_none());
    }
}
