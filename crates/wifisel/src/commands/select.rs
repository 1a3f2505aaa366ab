//! Selection command handlers: `select` and `candidates`.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tabled::Tabled;

use wifisel_core::{
    Candidate, CandidateScorer, CycleInput, CycleReport, NetworkSelector, ScorerVerdict,
    Selection,
};

use crate::cli::{GlobalOpts, ScenarioArgs, SelectArgs};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output::{self, Tone};
use crate::scenario::Scenario;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct CandidateRow {
    #[tabled(rename = "Network")]
    network_id: String,
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "BSSID")]
    bssid: String,
    #[tabled(rename = "Security")]
    security: String,
    #[tabled(rename = "RSSI")]
    rssi: i32,
    #[tabled(rename = "Freq")]
    frequency: u32,
    #[tabled(rename = "Nominator")]
    nominator: String,
    #[tabled(rename = "Score")]
    score: i32,
}

impl From<&ScoredCandidate> for CandidateRow {
    fn from(c: &ScoredCandidate) -> Self {
        Self {
            network_id: c.candidate.key.network_id.to_string(),
            ssid: c.candidate.ssid.to_string(),
            bssid: c.candidate.key.bssid.to_string(),
            security: c.candidate.key.security_type.to_string(),
            rssi: c.candidate.signal_level_dbm,
            frequency: c.candidate.frequency_mhz,
            nominator: c.candidate.nominator.to_string(),
            score: c.score,
        }
    }
}

#[derive(Tabled)]
struct VerdictRow {
    #[tabled(rename = "Scorer")]
    scorer: String,
    #[tabled(rename = "Experiment")]
    experiment_id: u32,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Network")]
    network_id: String,
    #[tabled(rename = "BSSID")]
    bssid: String,
    #[tabled(rename = "Score")]
    score: String,
}

impl From<&ScorerVerdict> for VerdictRow {
    fn from(v: &ScorerVerdict) -> Self {
        let choice = v.choice.as_ref();
        Self {
            scorer: v.scorer.clone(),
            experiment_id: v.experiment_id,
            active: if v.active { "yes".into() } else { String::new() },
            network_id: choice.map_or_else(|| "-".into(), |c| c.key.network_id.to_string()),
            bssid: choice.map_or_else(|| "-".into(), |c| c.key.bssid.to_string()),
            score: choice.map_or_else(|| "-".into(), |c| format!("{} ±{}", c.value, c.err)),
        }
    }
}

/// A candidate with the deciding scorer's score.
#[derive(Serialize)]
struct ScoredCandidate {
    #[serde(flatten)]
    candidate: Candidate,
    score: i32,
}

// ── Shared setup ────────────────────────────────────────────────────

/// Load the scenario and build a selector over it.
fn prepare(args: &ScenarioArgs, cfg: &Config) -> Result<(NetworkSelector, Scenario), CliError> {
    let scenario = Scenario::load(&args.scenario)?;
    let selection = config::selection_config(cfg, args)?;
    let store = Arc::new(scenario.store(Utc::now())?);
    let selector = NetworkSelector::builder(store)
        .config(selection)
        .external_scores(scenario.external_scores())
        .admin_policy(scenario.admin.clone())
        .build()?;

    if let Some(ref name) = args.scorer {
        if selector.scorers().get(name).is_none() {
            return Err(CliError::NotFound {
                resource_type: "scorer".into(),
                identifier: name.clone(),
                list_command: "scorers".into(),
            });
        }
    }
    Ok((selector, scenario))
}

fn cycle_input(scenario: &Scenario) -> CycleInput<'_> {
    CycleInput {
        observations: &scenario.observations,
        states: &scenario.interfaces,
        blocklist: &scenario.blocklist,
        flags: scenario.flags,
        restricted_uids: &scenario.restricted_uids,
    }
}

// ── Detail views ────────────────────────────────────────────────────

fn selection_detail(selection: Option<&Selection>, color: bool) -> String {
    let Some(s) = selection else {
        return output::paint("No network selected", Tone::Muted, color);
    };
    let pmf = if s.security_params.require_pmf {
        "PMF required"
    } else {
        "PMF optional"
    };
    let mut lines = vec![
        format!("Network:  {}", output::paint(&s.network_id.to_string(), Tone::Chosen, color)),
        format!("BSSID:    {}", output::paint(&s.bssid.to_string(), Tone::Chosen, color)),
        format!("Security: {} ({pmf})", s.security_params.security_type),
        format!("Score:    {}", s.score),
        format!("Scorer:   {}", s.scorer),
    ];
    if s.overridden_by_user_choice {
        lines.push("Override: user connect choice".into());
    }
    lines.join("\n")
}

fn trace_detail(
    report: &CycleReport,
    scorer: Option<&dyn CandidateScorer>,
    color: bool,
) -> String {
    let mut out = String::new();
    let filter = &report.filter;
    if let Some(ref iface) = filter.discarded_for {
        let _ = writeln!(
            out,
            "{}",
            output::paint(
                &format!("Scan batch discarded: connected BSSID of {iface} missing"),
                Tone::Muted,
                color,
            )
        );
    } else {
        let reasons: Vec<String> = filter
            .dropped
            .iter()
            .map(|(reason, count)| format!("{reason} {count}"))
            .collect();
        let _ = writeln!(
            out,
            "Observations kept: {}, dropped: {}{}",
            filter.kept.len(),
            filter.dropped_total(),
            if reasons.is_empty() {
                String::new()
            } else {
                format!(" ({})", reasons.join(", "))
            }
        );
    }

    if !report.candidates.is_empty() {
        let rows: Vec<_> = report
            .candidates
            .iter()
            .map(|c| {
                CandidateRow::from(&ScoredCandidate {
                    candidate: c.clone(),
                    score: scorer.map_or(0, |s| s.score_candidate(c)),
                })
            })
            .collect();
        let _ = writeln!(out, "\n{}", output::render_table(&rows));
    }
    if !report.verdicts.is_empty() {
        let rows: Vec<VerdictRow> = report.verdicts.iter().map(VerdictRow::from).collect();
        let _ = writeln!(out, "\n{}", output::render_table(&rows));
    }
    let _ = write!(out, "\n{}", selection_detail(report.selection.as_ref(), color));
    out
}

fn plain(selection: Option<&Selection>) -> String {
    selection.map_or_else(
        || "none".into(),
        |s| format!("{} {}", s.network_id, s.bssid),
    )
}

// ── Handlers ────────────────────────────────────────────────────────

pub fn handle_select(args: &SelectArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let format = config::output_format(global, &cfg);
    let color = output::should_color(config::color_mode(global, &cfg));
    let (mut selector, scenario) = prepare(&args.scenario, &cfg)?;

    let report = selector.run_cycle(&cycle_input(&scenario));
    tracing::debug!(selected = report.selection.is_some(), "cycle finished");
    let active = selector.config();
    let scorer = selector
        .scorers()
        .active(&active.active_scorer, active.experiment_id);

    let out = if args.trace {
        output::render_single(
            format,
            &report,
            |r| trace_detail(r, scorer, color),
            |r| plain(r.selection.as_ref()),
        )
    } else {
        output::render_single(
            format,
            &report.selection,
            |s| selection_detail(s.as_ref(), color),
            |s| plain(s.as_ref()),
        )
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn handle_candidates(args: &ScenarioArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let format = config::output_format(global, &cfg);
    let (mut selector, scenario) = prepare(args, &cfg)?;

    let built = selector.get_candidates_from_scan(&cycle_input(&scenario));
    let active_config = selector.config();
    let scored: Vec<ScoredCandidate> = match selector
        .scorers()
        .active(&active_config.active_scorer, active_config.experiment_id)
    {
        Some(scorer) => built
            .candidates
            .iter()
            .map(|c| ScoredCandidate {
                candidate: c.clone(),
                score: scorer.score_candidate(c),
            })
            .collect(),
        None => Vec::new(),
    };

    let out = output::render_list(format, &scored, |c| CandidateRow::from(c), |c| {
        format!("{} {}", c.candidate.key.network_id, c.candidate.key.bssid)
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
