//! Scorer listing.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use wifisel_core::{InMemoryProfileStore, NetworkSelector};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct ScorerInfo {
    identifier: String,
    experiment_id: u32,
    active: bool,
}

#[derive(Tabled)]
struct ScorerRow {
    #[tabled(rename = "Scorer")]
    identifier: String,
    #[tabled(rename = "Experiment ID")]
    experiment_id: u32,
    #[tabled(rename = "Active")]
    active: String,
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let format = config::output_format(global, &cfg);
    let selection = wifisel_config::to_selection_config(&cfg)?;

    let selector = NetworkSelector::builder(Arc::new(InMemoryProfileStore::new()))
        .config(selection)
        .build()?;
    let registry = selector.scorers();
    let active = registry
        .active(
            &selector.config().active_scorer,
            selector.config().experiment_id,
        )
        .map(|s| s.identifier().to_owned());

    let scorers: Vec<ScorerInfo> = registry
        .iter()
        .map(|s| ScorerInfo {
            identifier: s.identifier().to_owned(),
            experiment_id: s.experiment_id(),
            active: active.as_deref() == Some(s.identifier()),
        })
        .collect();

    let out = output::render_list(
        format,
        &scorers,
        |s| ScorerRow {
            identifier: s.identifier.clone(),
            experiment_id: s.experiment_id,
            active: if s.active { "yes".into() } else { String::new() },
        },
        |s| s.identifier.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
