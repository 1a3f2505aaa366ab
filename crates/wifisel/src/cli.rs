//! Clap derive structures for the `wifisel` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wifisel -- replay Wi-Fi scan scenarios through the selection engine
#[derive(Debug, Parser)]
#[command(
    name = "wifisel",
    version,
    about = "Pick the Wi-Fi network and access point a station should join",
    long_about = "Replays a scan scenario (profiles, scan results, interface state)\n\
        through the network selection engine and shows what it would pick.\n\n\
        Scenarios are JSON, YAML, or TOML files.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file to use instead of the platform default
    #[arg(long, env = "WIFISEL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (defaults to the config file's `defaults.output`)
    #[arg(long, short = 'o', env = "WIFISEL_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one selection cycle over a scenario and show the pick
    #[command(alias = "sel")]
    Select(SelectArgs),

    /// List the candidates a scenario produces, with their scores
    #[command(alias = "cand")]
    Candidates(ScenarioArgs),

    /// List registered scorers and their experiment ids
    Scorers,

    /// Inspect configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Scenario Arguments ───────────────────────────────────────────────

/// Scenario file plus per-run overrides of the selection config.
#[derive(Debug, Args)]
pub struct ScenarioArgs {
    /// Scenario file (.json, .yaml, .yml, or .toml)
    pub scenario: PathBuf,

    /// Scorer that decides, overriding the config file
    #[arg(long)]
    pub scorer: Option<String>,

    /// Experiment id that selects the deciding scorer
    #[arg(long)]
    pub experiment_id: Option<u32>,
}

#[derive(Debug, Args)]
pub struct SelectArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Print the whole cycle trace instead of just the selection
    #[arg(long)]
    pub trace: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
