//! `[tooltip]` configuration table

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{Placement, Strategy};

/// Manager-wide tooltip defaults
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TooltipConfig {
    #[serde(default)]
    pub placement: Placement,
    #[serde(default = "default_offset")]
    pub offset: f32,
    #[serde(default)]
    pub show_delay: u64,
    #[serde(default)]
    pub hide_delay: u64,
    /// How long a group stays active after its last member closed
    #[serde(default = "default_group_grace")]
    pub group_grace_ms: u64,
    /// Time to reach an interactive tooltip's content after leaving its trigger
    #[serde(default = "default_interactive_grace")]
    pub interactive_grace_ms: u64,
    #[serde(default)]
    pub strategy: Strategy,
}

fn default_offset() -> f32 {
    8.0
}

fn default_group_grace() -> u64 {
    500
}

fn default_interactive_grace() -> u64 {
    100
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            placement: Placement::Top,
            offset: default_offset(),
            show_delay: 0,
            hide_delay: 0,
            group_grace_ms: default_group_grace(),
            interactive_grace_ms: default_interactive_grace(),
            strategy: Strategy::Manual,
        }
    }
}

/// The `[tooltip]` table of `kestrel.toml`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipSettings {
    pub tooltip: TooltipConfig,
}

impl TooltipConfig {
    /// Parse a `kestrel.toml` and take its `[tooltip]` table
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: TooltipSettings = toml::from_str(text)?;
        Ok(settings.tooltip)
    }

    /// Load from a file, falling back to defaults when it doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("TooltipConfig::load - {} missing, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::from_toml(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TooltipConfig::default();
        assert_eq!(config.placement, Placement::Top);
        assert_eq!(config.offset, 8.0);
        assert_eq!(config.group_grace_ms, 500);
        assert_eq!(config.strategy, Strategy::Manual);
    }

    #[test]
    fn test_tooltip_table() {
        let config = TooltipConfig::from_toml(
            r#"
            [toast]
            duration = 1000

            [tooltip]
            placement = "right-start"
            show_delay = 150
            strategy = "middleware"
            "#,
        )
        .unwrap();
        assert_eq!(config.placement, Placement::RightStart);
        assert_eq!(config.show_delay, 150);
        assert_eq!(config.hide_delay, 0);
        assert_eq!(config.strategy, Strategy::Middleware);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(TooltipConfig::from_toml("[tooltip]\nplacment = \"top\"\n").is_err());
    }
}
