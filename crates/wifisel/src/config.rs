//! CLI configuration: thin wrapper around `wifisel_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--config,
//! --output, --color) and per-run scenario overrides (--scorer,
//! --experiment-id).

use std::path::PathBuf;

use clap::ValueEnum;

use wifisel_core::SelectionConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat, ScenarioArgs};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use wifisel_config::Config;

// ── CLI-specific helpers ────────────────────────────────────────────

/// Config file in effect: `--config` / `WIFISEL_CONFIG`, else the platform path.
pub fn active_config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(wifisel_config::config_path)
}

/// Load the config file in effect, layered over defaults and env.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(wifisel_config::load_config_from(&active_config_path(global))?)
}

/// Output format: flag > config default > table.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    global
        .output
        .or_else(|| OutputFormat::from_str(&cfg.defaults.output, true).ok())
        .unwrap_or(OutputFormat::Table)
}

/// Color mode: flag > config default > auto.
pub fn color_mode(global: &GlobalOpts, cfg: &Config) -> ColorMode {
    global
        .color
        .or_else(|| ColorMode::from_str(&cfg.defaults.color, true).ok())
        .unwrap_or(ColorMode::Auto)
}

/// Validated selection config with the run's scorer overrides applied.
pub fn selection_config(cfg: &Config, args: &ScenarioArgs) -> Result<SelectionConfig, CliError> {
    let mut selection = wifisel_config::to_selection_config(cfg)?;
    if let Some(ref scorer) = args.scorer {
        selection.active_scorer.clone_from(scorer);
    }
    if let Some(id) = args.experiment_id {
        selection.experiment_id = id;
    }
    Ok(selection)
}
