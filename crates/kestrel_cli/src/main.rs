//! Kestrel CLI
//!
//! Run the toast and tooltip engines against a terminal "renderer" and check
//! `kestrel.toml` files.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kestrel_app::{AppConfig, CONFIG_FILE};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod demo;

#[derive(Parser)]
#[command(name = "kestrel")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Kestrel headless toast and tooltip engines", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./kestrel.toml when present)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scripted scenario in real time and log every event
    Demo {
        #[command(subcommand)]
        command: DemoCommands,
    },

    /// Inspect configuration files
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum DemoCommands {
    /// Dedupe, eviction, prevent-close, undo and promise toasts
    Toast,
    /// Hover delays, group hand-off, flipping, auto-update and escape
    Tooltip,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Validate a config file
    Check {
        /// File to check
        #[arg(default_value = CONFIG_FILE)]
        path: PathBuf,
    },

    /// Print the effective configuration as TOML
    Print,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Demo { command } => {
            let config = load_config(cli.config.as_deref())?;
            match command {
                DemoCommands::Toast => demo::toast(config).await,
                DemoCommands::Tooltip => demo::tooltip(config).await,
            }
        }

        Commands::Config { command } => match command {
            ConfigCommands::Check { path } => cmd_config_check(&path),
            ConfigCommands::Print => cmd_config_print(cli.config.as_deref()),
        },
    }
}

/// Explicit path, else `kestrel.toml` in the working directory, else defaults
fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file {} does not exist", path.display());
            }
            AppConfig::load(path).with_context(|| format!("Failed to load {}", path.display()))
        }
        None => {
            let dir = env::current_dir().context("Failed to read the working directory")?;
            AppConfig::load_from_dir(&dir)
                .with_context(|| format!("Failed to load {}", dir.join(CONFIG_FILE).display()))
        }
    }
}

fn cmd_config_check(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Config file {} does not exist", path.display());
    }
    let config =
        AppConfig::load(path).with_context(|| format!("Invalid config {}", path.display()))?;

    info!("{} is valid", path.display());
    info!(
        "  toast: {} for {}ms, severity {}",
        config.toast.position,
        config.toast.duration_ms,
        config.toast.severity.as_str()
    );
    info!(
        "  toaster: max {}, dedupe {}ms, persist {}",
        config.toaster.max, config.toaster.dedupe_window_ms, config.toaster.persist
    );
    info!(
        "  tooltip: {} +{}px, delays {}/{}ms, {:?} strategy",
        config.tooltip.placement,
        config.tooltip.offset,
        config.tooltip.show_delay,
        config.tooltip.hide_delay,
        config.tooltip.strategy
    );
    Ok(())
}

fn cmd_config_print(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    let text = config
        .to_toml()
        .context("Failed to serialize configuration")?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_check_defaults_to_kestrel_toml() {
        let cli = Cli::parse_from(["kestrel", "config", "check"]);
        match cli.command {
            Commands::Config {
                command: ConfigCommands::Check { path },
            } => assert_eq!(path, PathBuf::from(CONFIG_FILE)),
            _ => panic!("expected config check"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["kestrel", "demo", "tooltip", "-v", "--config", "ui.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("ui.toml")));
        assert!(matches!(
            cli.command,
            Commands::Demo {
                command: DemoCommands::Tooltip
            }
        ));
    }
}
