// ── Filter stage ──
//
// Removes observations that cannot or should not be considered this cycle.
// Every rule is evaluated for every observation so the report shows all
// hits; the first matching rule is the one the observation is dropped for.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;
use strum::{Display, EnumIter};
use tracing::{debug, info};

use crate::config::SelectionConfig;
use crate::model::{InterfaceState, MacAddress, ScanObservation};
use crate::policy::AdminPolicy;

/// Why an observation was removed, in rule order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DropReason {
    EmptySsid,
    Blocklisted,
    LowSignal,
    AssociationDisallowed,
    AdminSsidPolicy,
    AdminSecurityLevel,
}

/// Outcome of one filter pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterReport {
    pub kept: Vec<ScanObservation>,
    /// Observations dropped, counted by their first matching rule.
    pub dropped: BTreeMap<DropReason, usize>,
    /// Every rule hit, including those masked by an earlier rule.
    pub rule_hits: BTreeMap<DropReason, usize>,
    /// Interfaces whose connected BSSID appeared in the batch.
    pub seen_connected: BTreeSet<String>,
    /// Set when the batch was discarded because a sufficient link's BSSID
    /// was missing from it.
    pub discarded_for: Option<String>,
}

impl FilterReport {
    pub fn dropped_total(&self) -> usize {
        self.dropped.values().sum()
    }
}

/// Inputs of the filter stage besides the observations themselves.
#[derive(Debug, Clone, Copy)]
pub struct FilterInputs<'a> {
    pub blocklist: &'a HashSet<MacAddress>,
    pub states: &'a [InterfaceState],
    pub policy: &'a AdminPolicy,
    pub config: &'a SelectionConfig,
}

/// Run every rule over `observations`.
///
/// Applying the filter to its own output yields the same output.
pub fn filter(observations: &[ScanObservation], inputs: &FilterInputs<'_>) -> FilterReport {
    let mut report = FilterReport::default();

    // A sufficient link whose BSSID is absent marks the batch as partial.
    for state in inputs.states {
        let Some(link) = state.link() else { continue };
        if link.score >= inputs.config.poor_score_threshold
            && !observations.iter().any(|o| o.bssid == link.bssid)
        {
            info!(
                iface = %state.iface_name,
                bssid = %link.bssid,
                score = link.score,
                "connected BSSID missing from scan batch, discarding batch"
            );
            report.discarded_for = Some(state.iface_name.clone());
            return report;
        }
    }

    for obs in observations {
        if obs.ssid.is_empty() {
            record(&mut report, &[DropReason::EmptySsid], obs);
            continue;
        }

        let connected_on: Vec<&InterfaceState> = inputs
            .states
            .iter()
            .filter(|s| s.connected_bssid() == Some(&obs.bssid))
            .collect();
        if !connected_on.is_empty() {
            for state in connected_on {
                report.seen_connected.insert(state.iface_name.clone());
            }
            report.kept.push(obs.clone());
            continue;
        }

        let hits = matching_rules(obs, inputs);
        if hits.is_empty() {
            report.kept.push(obs.clone());
        } else {
            record(&mut report, &hits, obs);
        }
    }

    debug!(
        kept = report.kept.len(),
        dropped = report.dropped_total(),
        "filter stage complete"
    );
    report
}

fn matching_rules(obs: &ScanObservation, inputs: &FilterInputs<'_>) -> Vec<DropReason> {
    let mut hits = Vec::new();
    if inputs.blocklist.contains(&obs.bssid) {
        hits.push(DropReason::Blocklisted);
    }
    let thresholds = inputs.config.rssi.for_frequency(obs.frequency_mhz);
    if obs.signal_level_dbm < thresholds.entry_rssi_dbm {
        hits.push(DropReason::LowSignal);
    }
    if obs.association_restricted {
        hits.push(DropReason::AssociationDisallowed);
    }
    if !inputs.policy.permits_ssid(&obs.ssid) {
        hits.push(DropReason::AdminSsidPolicy);
    }
    if !inputs.policy.permits_security(&obs.security) {
        hits.push(DropReason::AdminSecurityLevel);
    }
    hits
}

fn record(report: &mut FilterReport, hits: &[DropReason], obs: &ScanObservation) {
    let Some(first) = hits.first() else { return };
    *report.dropped.entry(*first).or_default() += 1;
    for hit in hits {
        *report.rule_hits.entry(*hit).or_default() += 1;
    }
    debug!(
        bssid = %obs.bssid,
        ssid = %obs.ssid,
        rssi = obs.signal_level_dbm,
        reason = %first,
        "observation filtered"
    );
}
