//! CLI error types with miette diagnostics.
//!
//! Maps engine and config errors into user-facing errors with actionable
//! help text.

use miette::Diagnostic;
use thiserror::Error;

use wifisel_config::ConfigError;
use wifisel_core::SelectionError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Scenario ─────────────────────────────────────────────────────
    #[error("Could not read scenario {path}")]
    #[diagnostic(
        code(wifisel::scenario_unreadable),
        help("Check that the file exists and is readable.")
    )]
    ScenarioUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid scenario {path}: {reason}")]
    #[diagnostic(
        code(wifisel::scenario_invalid),
        help(
            "A scenario holds `profiles`, `observations`, and optionally\n\
             `interfaces`, `blocklist`, `admin`, `flags`, `restricted_uids`,\n\
             `external_scores`, and `last_user_selection`."
        )
    )]
    ScenarioInvalid { path: String, reason: String },

    #[error("Unsupported scenario format '{extension}'")]
    #[diagnostic(
        code(wifisel::scenario_format),
        help("Use a .json, .yaml, .yml, or .toml file.")
    )]
    ScenarioFormat { extension: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(wifisel::not_found),
        help("Run: wifisel {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Engine ───────────────────────────────────────────────────────
    #[error("Selection failed: {message}")]
    #[diagnostic(code(wifisel::selection))]
    Selection { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wifisel::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(wifisel::config),
        help("Run: wifisel config path to locate the config file")
    )]
    Config(Box<figment::Error>),

    #[error("Could not write configuration: {message}")]
    #[diagnostic(code(wifisel::config_write))]
    ConfigWrite { message: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } | Self::ScenarioUnreadable { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::ScenarioInvalid { .. }
            | Self::ScenarioFormat { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── SelectionError / ConfigError → CliError mapping ──────────────────

impl From<SelectionError> for CliError {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::ProfileNotFound { network_id } => CliError::NotFound {
                resource_type: "network profile".into(),
                identifier: network_id.to_string(),
                list_command: "candidates <scenario>".into(),
            },
            SelectionError::Config { message } => CliError::Validation {
                field: "selection".into(),
                reason: message,
            },
            other => CliError::Selection {
                message: other.to_string(),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Figment(inner) => CliError::Config(inner),
            ConfigError::Io(e) => CliError::Io(e),
            ConfigError::Serialization(e) => CliError::ConfigWrite {
                message: e.to_string(),
            },
        }
    }
}
