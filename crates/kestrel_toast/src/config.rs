//! Toast configuration
//!
//! Two tables, both fully defaulted:
//! - `[toast]` - per-toast defaults applied by `add`
//! - `[toaster]` - controller limits and timings

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{Orientation, Progress, Severity, ToastAnimation, ToastPosition, Variant};

/// Defaults for fields a caller leaves unset on `add`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToastDefaults {
    pub position: ToastPosition,
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    pub severity: Severity,
    pub closable: bool,
    pub progress: Progress,
    pub orientation: Orientation,
    pub variant: Option<Variant>,
    pub animation: ToastAnimation,
}

impl Default for ToastDefaults {
    fn default() -> Self {
        Self {
            position: ToastPosition::TopRight,
            duration_ms: 5000,
            severity: Severity::Contrast,
            closable: true,
            progress: Progress::Visible,
            orientation: Orientation::Horizontal,
            variant: None,
            animation: ToastAnimation::Slide,
        }
    }
}

/// Controller limits
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToasterConfig {
    /// Maximum toasts per position bucket
    #[serde(default = "default_max")]
    pub max: usize,
    /// Identical `(title, description)` adds within this window collapse
    #[serde(default = "default_dedupe_window")]
    pub dedupe_window_ms: u64,
    /// How long the close-refused shake signal stays raised
    #[serde(default = "default_shake")]
    pub shake_ms: u64,
    /// Write bucket snapshots to the key-value backend
    #[serde(default)]
    pub persist: bool,
}

fn default_max() -> usize {
    5
}

fn default_dedupe_window() -> u64 {
    500
}

fn default_shake() -> u64 {
    600
}

impl Default for ToasterConfig {
    fn default() -> Self {
        Self {
            max: default_max(),
            dedupe_window_ms: default_dedupe_window(),
            shake_ms: default_shake(),
            persist: false,
        }
    }
}

impl ToasterConfig {
    pub fn max(mut self, max: usize) -> Self {
        self.max = max;
        self
    }

    pub fn dedupe_window_ms(mut self, window: u64) -> Self {
        self.dedupe_window_ms = window;
        self
    }

    pub fn persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }
}

/// Both toast tables, as they appear in `kestrel.toml`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastSettings {
    pub toast: ToastDefaults,
    pub toaster: ToasterConfig,
}

impl ToastSettings {
    /// Parse from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a file, falling back to defaults when it doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("ToastSettings::load - {} missing, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }
}
