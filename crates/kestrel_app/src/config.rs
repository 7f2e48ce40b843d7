//! `kestrel.toml` handling
//!
//! One file configures both engines:
//!
//! ```toml
//! [toast]
//! position = "bottom-right"
//! duration = 4000
//!
//! [toaster]
//! max = 3
//!
//! [tooltip]
//! placement = "bottom"
//! show_delay = 150
//! ```
//!
//! Every table and field is optional; unknown tables or keys are rejected.

use std::fs;
use std::path::Path;

use kestrel_toast::{ToastDefaults, ToastSettings, ToasterConfig};
use kestrel_tooltip::TooltipConfig;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Name of the config file looked up by [`AppConfig::load_from_dir`]
pub const CONFIG_FILE: &str = "kestrel.toml";

/// Configuration for an application root
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub toast: ToastDefaults,
    pub toaster: ToasterConfig,
    pub tooltip: TooltipConfig,
}

impl AppConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config file, falling back to defaults when it doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("AppConfig::load - {} missing, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        tracing::debug!("AppConfig::load - loaded {}", path.display());
        Ok(config)
    }

    /// Load `kestrel.toml` from a directory
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load(&dir.join(CONFIG_FILE))
    }

    /// The toast half of the config
    pub fn toast_settings(&self) -> ToastSettings {
        ToastSettings {
            toast: self.toast.clone(),
            toaster: self.toaster.clone(),
        }
    }

    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
