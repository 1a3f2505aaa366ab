//! Rendering of selection results for the terminal.
//!
//! `--output table` draws `tabled` grids and detail blocks, the serde formats
//! dump the underlying report, and `plain` prints one network per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};

// ── Color ────────────────────────────────────────────────────────────

/// Whether ANSI styling goes to stdout.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Tone {
    /// The network or BSSID the engine picked.
    Chosen,
    /// Notes under a detail view.
    Muted,
}

pub fn paint(text: &str, tone: Tone, color: bool) -> String {
    if !color {
        return text.to_owned();
    }
    match tone {
        Tone::Chosen => text.green().bold().to_string(),
        Tone::Muted => text.dimmed().to_string(),
    }
}

// ── Rendering ────────────────────────────────────────────────────────

/// Candidates, scorers and other row sets. `plain` prints `key` per row.
pub fn render_list<T, R>(
    format: OutputFormat,
    rows: &[T],
    to_row: impl Fn(&T) -> R,
    key: impl Fn(&T) -> String,
) -> String
where
    T: Serialize,
    R: Tabled,
{
    structured(format, rows).unwrap_or_else(|| match format {
        OutputFormat::Plain => rows.iter().map(key).collect::<Vec<_>>().join("\n"),
        _ => render_table(&rows.iter().map(to_row).collect::<Vec<_>>()),
    })
}

/// A report or a single selection. `table` uses the hand-built `detail` view.
pub fn render_single<T>(
    format: OutputFormat,
    value: &T,
    detail: impl Fn(&T) -> String,
    key: impl Fn(&T) -> String,
) -> String
where
    T: Serialize + ?Sized,
{
    structured(format, value).unwrap_or_else(|| match format {
        OutputFormat::Plain => key(value),
        _ => detail(value),
    })
}

pub(crate) fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Serde rendering for the machine formats, `None` for table and plain.
fn structured<T: Serialize + ?Sized>(format: OutputFormat, value: &T) -> Option<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
        OutputFormat::JsonCompact => serde_json::to_string(value).map_err(|e| e.to_string()),
        OutputFormat::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
        OutputFormat::Table | OutputFormat::Plain => return None,
    };
    Some(rendered.unwrap_or_else(|e| format!("error: could not serialize output: {e}")))
}

/// Write to stdout unless `--quiet` or there is nothing to say.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let _ = writeln!(io::stdout().lock(), "{output}");
}
