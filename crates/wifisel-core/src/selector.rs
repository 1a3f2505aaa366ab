// ── Network selector ──
//
// Drives one selection cycle: filter -> nominate -> reconcile -> group ->
// score -> user-choice override. Cycles are not reentrant; every entry
// point takes `&mut self`.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::candidate::{Candidate, CandidateKey, CandidateStore};
use crate::choice::apply_user_choice;
use crate::clock::{Clock, SystemClock};
use crate::config::SelectionConfig;
use crate::error::SelectionError;
use crate::filter::{FilterInputs, FilterReport, filter};
use crate::metrics::{MetricsSink, NoopMetrics, SelectionEvent};
use crate::model::{
    CandidateScanResult, InterfaceState, MacAddress, NetworkId, NetworkProfile, ScanObservation,
    SecurityParams, SecurityType, SelectionStatus,
};
use crate::nominator::{
    ExternalScoreSource, NominationContext, Nominator, NominatorKind, PolicyFlags, StaticScores,
    default_nominators,
};
use crate::policy::{AdminPolicy, AdminPolicySource};
use crate::predictor::{NoThroughputPrediction, ThroughputPredictor, ThroughputQuery};
use crate::scorer::{
    CandidateScorer, CompatibilityScorer, ScoredChoice, ScorerRegistry, ThroughputScorer,
};
use crate::security::reconcile;
use crate::store::ProfileStore;

// ── Cycle inputs and outputs ────────────────────────────────────────

/// Everything a caller supplies for one cycle.
#[derive(Debug, Clone, Copy)]
pub struct CycleInput<'a> {
    pub observations: &'a [ScanObservation],
    pub states: &'a [InterfaceState],
    pub blocklist: &'a HashSet<MacAddress>,
    pub flags: PolicyFlags,
    pub restricted_uids: &'a BTreeSet<u32>,
}

/// Candidates built from one scan batch.
#[derive(Debug)]
pub struct ScanCandidates {
    pub filter: FilterReport,
    pub candidates: CandidateStore,
}

/// The network and access point to associate with next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub network_id: NetworkId,
    pub bssid: MacAddress,
    pub security_params: SecurityParams,
    pub score: i32,
    pub scorer: String,
    pub overridden_by_user_choice: bool,
}

/// One scorer's verdict over the whole cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScorerVerdict {
    pub scorer: String,
    pub experiment_id: u32,
    pub active: bool,
    pub choice: Option<ScoredChoice>,
}

/// Full trace of one cycle, for callers that display it.
#[derive(Debug, Serialize)]
pub struct CycleReport {
    pub filter: FilterReport,
    pub candidates: Vec<Candidate>,
    pub verdicts: Vec<ScorerVerdict>,
    pub selection: Option<Selection>,
}

// ── Builder ─────────────────────────────────────────────────────────

pub struct NetworkSelectorBuilder {
    config: SelectionConfig,
    store: Arc<dyn ProfileStore>,
    nominators: Option<Vec<Box<dyn Nominator>>>,
    external_scores: Option<Box<dyn ExternalScoreSource>>,
    scorers: Option<ScorerRegistry>,
    predictor: Box<dyn ThroughputPredictor>,
    metrics: Arc<dyn MetricsSink>,
    admin: Box<dyn AdminPolicySource>,
    clock: Arc<dyn Clock>,
}

impl NetworkSelectorBuilder {
    pub fn config(mut self, config: SelectionConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default nominator set. Order is priority order.
    pub fn nominators(mut self, nominators: Vec<Box<dyn Nominator>>) -> Self {
        self.nominators = Some(nominators);
        self
    }

    /// Score source of the default externally-scored nominator.
    pub fn external_scores(mut self, source: impl ExternalScoreSource + 'static) -> Self {
        self.external_scores = Some(Box::new(source));
        self
    }

    /// Replace the default scorers.
    pub fn scorers(mut self, scorers: ScorerRegistry) -> Self {
        self.scorers = Some(scorers);
        self
    }

    /// Add a scorer next to the defaults.
    pub fn register_scorer(mut self, scorer: impl CandidateScorer + 'static) -> Self {
        let config = &self.config;
        self.scorers
            .get_or_insert_with(|| default_scorers(config))
            .register(Box::new(scorer));
        self
    }

    pub fn predictor(mut self, predictor: impl ThroughputPredictor + 'static) -> Self {
        self.predictor = Box::new(predictor);
        self
    }

    pub fn metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn admin_policy(mut self, admin: impl AdminPolicySource + 'static) -> Self {
        self.admin = Box::new(admin);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Result<NetworkSelector, SelectionError> {
        self.config.validate()?;
        let scorers = match self.scorers {
            Some(scorers) => scorers,
            None => default_scorers(&self.config),
        };
        let nominators = match self.nominators {
            Some(nominators) => nominators,
            None => default_nominators(
                self.external_scores
                    .unwrap_or_else(|| Box::new(StaticScores::default())),
            ),
        };
        Ok(NetworkSelector {
            config: self.config,
            store: self.store,
            nominators,
            scorers,
            predictor: self.predictor,
            metrics: self.metrics,
            admin: self.admin,
            clock: self.clock,
            last_selection_at: None,
        })
    }
}

/// Throughput scorer (the default) and the compatibility scorer.
fn default_scorers(config: &SelectionConfig) -> ScorerRegistry {
    let mut registry = ScorerRegistry::new();
    registry.register(Box::new(ThroughputScorer::from_config(config)));
    registry.register(Box::new(CompatibilityScorer::from_config(config)));
    registry
}

// ── Selector ────────────────────────────────────────────────────────

pub struct NetworkSelector {
    config: SelectionConfig,
    store: Arc<dyn ProfileStore>,
    nominators: Vec<Box<dyn Nominator>>,
    scorers: ScorerRegistry,
    predictor: Box<dyn ThroughputPredictor>,
    metrics: Arc<dyn MetricsSink>,
    admin: Box<dyn AdminPolicySource>,
    clock: Arc<dyn Clock>,
    last_selection_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for NetworkSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkSelector")
            .field("config", &self.config)
            .field("nominators", &self.nominators.iter().map(|n| n.kind()).collect::<Vec<_>>())
            .field("scorers", &self.scorers)
            .field("last_selection_at", &self.last_selection_at)
            .finish_non_exhaustive()
    }
}

/// Per-cycle facts every candidate draws from.
struct CandidateContext<'a> {
    config: &'a SelectionConfig,
    store: &'a dyn ProfileStore,
    predictor: &'a dyn ThroughputPredictor,
    batch: &'a [ScanObservation],
    states: &'a [InterfaceState],
    last_selected: Option<(NetworkId, f64)>,
    secrets: HashMap<NetworkId, Option<NetworkProfile>>,
}

impl CandidateContext<'_> {
    /// Profile with its key when the key can affect reconciliation.
    fn reconcilable(&mut self, profile: &NetworkProfile) -> Option<NetworkProfile> {
        if !profile.has_enabled(SecurityType::Sae) {
            return None;
        }
        let store = self.store;
        self.secrets
            .entry(profile.id)
            .or_insert_with(|| store.configured_network_with_password(profile.id))
            .clone()
    }

    fn build(
        &mut self,
        nominator: NominatorKind,
        observation: &ScanObservation,
        profile: &NetworkProfile,
    ) -> Option<Candidate> {
        let with_secret = self.reconcilable(profile);
        let reconciled_against = with_secret.as_ref().unwrap_or(profile);
        let Some(params) = reconcile(
            reconciled_against,
            observation,
            self.batch,
            &self.config.auto_upgrade,
        ) else {
            debug!(
                network_id = %profile.id,
                bssid = %observation.bssid,
                nominator = %nominator,
                "no usable security variant"
            );
            return None;
        };

        let links: Vec<_> = self.states.iter().filter_map(InterfaceState::link).collect();
        let current_network = links.iter().any(|l| l.network_id == profile.id);
        let current_bssid = links
            .iter()
            .any(|l| l.network_id == profile.id && l.bssid == observation.bssid);
        let last_selection_weight = match self.last_selected {
            Some((id, weight)) if id == profile.id => weight,
            _ => 0.0,
        };
        let predicted_throughput_mbps = self
            .predictor
            .predict_mbps(&ThroughputQuery::for_observation(self.config.phy, observation));

        Some(Candidate {
            key: CandidateKey {
                network_id: profile.id,
                bssid: observation.bssid.clone(),
                security_type: params.security_type,
            },
            ssid: observation.ssid.clone(),
            signal_level_dbm: observation.signal_level_dbm,
            frequency_mhz: observation.frequency_mhz,
            channel_width: observation.channel_width,
            last_selection_weight,
            metered: profile.is_metered(),
            privileged: profile.restricted || profile.oem_paid || profile.oem_private,
            predicted_throughput_mbps,
            nominator,
            current_network,
            current_bssid,
            open: params.security_type.is_open(),
            ephemeral: profile.ephemeral,
            trusted: profile.trusted,
            oem_paid: profile.oem_paid,
            oem_private: profile.oem_private,
            carrier_or_privileged: profile.is_carrier_or_privileged(),
            no_internet_unexpected: profile.has_unexpected_no_internet(),
            security_params: params,
        })
    }
}

impl NetworkSelector {
    pub fn builder(store: Arc<dyn ProfileStore>) -> NetworkSelectorBuilder {
        NetworkSelectorBuilder {
            config: SelectionConfig::default(),
            store,
            nominators: None,
            external_scores: None,
            scorers: None,
            predictor: Box::new(NoThroughputPrediction),
            metrics: Arc::new(NoopMetrics),
            admin: Box::new(AdminPolicy::default()),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    pub fn scorers(&self) -> &ScorerRegistry {
        &self.scorers
    }

    /// When the last cycle produced a selection.
    pub fn last_selection_at(&self) -> Option<DateTime<Utc>> {
        self.last_selection_at
    }

    /// Weight of the last user selection at `now`: 1 right after the
    /// selection, falling linearly to 0 at the end of the window.
    #[allow(clippy::cast_precision_loss)]
    fn last_selection_weight(&self, now: DateTime<Utc>) -> Option<(NetworkId, f64)> {
        let id = self.store.last_selected_network()?;
        let at = self.store.last_selected_timestamp()?;
        let elapsed_ms = (now - at).num_milliseconds();
        let window_ms =
            i64::try_from(self.config.last_selection_window().as_millis()).unwrap_or(i64::MAX);
        if elapsed_ms < 0 || elapsed_ms >= window_ms {
            return None;
        }
        Some((id, 1.0 - elapsed_ms as f64 / window_ms as f64))
    }

    /// Filter the batch, run every nominator, and build the candidate set.
    pub fn get_candidates_from_scan(&mut self, input: &CycleInput<'_>) -> ScanCandidates {
        let now = self.clock.now();
        let policy = self.admin.policy();

        for profile in self.store.configured_networks() {
            if matches!(profile.status, SelectionStatus::TemporarilyDisabled { .. }) {
                self.store.try_enable_network(profile.id, now);
            }
            if profile.candidate.is_some() {
                if let Err(e) = self.store.clear_network_candidate_scan_result(profile.id) {
                    debug!(network_id = %profile.id, error = %e, "could not clear candidate");
                }
            }
        }
        let profiles = self.store.configured_networks();

        let report = filter(
            input.observations,
            &FilterInputs {
                blocklist: input.blocklist,
                states: input.states,
                policy: &policy,
                config: &self.config,
            },
        );
        match &report.discarded_for {
            Some(iface) => self.metrics.record(SelectionEvent::BatchDiscarded {
                iface: iface.clone(),
            }),
            None => self.metrics.record(SelectionEvent::Filtered {
                kept: report.kept.len(),
                dropped: report.dropped.clone(),
            }),
        }

        let ctx = NominationContext {
            profiles: &profiles,
            states: input.states,
            flags: input.flags,
            restricted_uids: input.restricted_uids,
        };
        let candidates = {
            let mut building = CandidateContext {
                config: &self.config,
                store: self.store.as_ref(),
                predictor: self.predictor.as_ref(),
                batch: &report.kept,
                states: input.states,
                last_selected: self.last_selection_weight(now),
                secrets: HashMap::new(),
            };
            let mut candidates = CandidateStore::new();
            for nominator in &mut self.nominators {
                nominator.update(&report.kept, &ctx);
                let before = candidates.len();
                nominator.nominate(&report.kept, &ctx, &mut |kind, observation, profile| {
                    if let Some(candidate) = building.build(kind, observation, profile) {
                        candidates.add(candidate);
                    }
                });
                debug!(
                    nominator = %nominator.kind(),
                    added = candidates.len() - before,
                    "nominator finished"
                );
            }
            candidates
        };

        let groups = candidates.groups().len();
        info!(
            observations = input.observations.len(),
            kept = report.kept.len(),
            candidates = candidates.len(),
            groups,
            "candidates built"
        );
        self.metrics.record(SelectionEvent::CandidatesBuilt {
            candidates: candidates.len(),
            groups,
        });

        ScanCandidates {
            filter: report,
            candidates,
        }
    }

    /// Score every group with every scorer and return the active scorer's
    /// pick, after user-choice override.
    pub fn select_network(&mut self, candidates: &CandidateStore) -> Option<Selection> {
        self.evaluate(candidates).1
    }

    /// `get_candidates_from_scan` followed by `select_network`, traced.
    pub fn run_cycle(&mut self, input: &CycleInput<'_>) -> CycleReport {
        let ScanCandidates { filter, candidates } = self.get_candidates_from_scan(input);
        let (verdicts, selection) = self.evaluate(&candidates);
        CycleReport {
            filter,
            candidates: candidates.iter().cloned().collect(),
            verdicts,
            selection,
        }
    }

    fn evaluate(&mut self, candidates: &CandidateStore) -> (Vec<ScorerVerdict>, Option<Selection>) {
        let groups = candidates.groups();
        if groups.is_empty() {
            info!("no candidates, nothing to select");
            self.metrics.record(SelectionEvent::NoSelection);
            return (Vec::new(), None);
        }

        let Some(active) = self
            .scorers
            .active(&self.config.active_scorer, self.config.experiment_id)
        else {
            warn!("no scorer registered");
            self.metrics.record(SelectionEvent::NoSelection);
            return (Vec::new(), None);
        };
        let active_id = active.identifier().to_owned();

        let mut verdicts = Vec::new();
        let mut active_choices = IndexMap::new();
        for scorer in self.scorers.iter() {
            let is_active = scorer.identifier() == active_id;
            let choices = score_groups(scorer, &groups);
            let best = best_choice(&choices).cloned();
            let network_id = best.as_ref().map(|c| c.key.network_id);
            if is_active {
                info!(scorer = scorer.identifier(), network_id = ?network_id, "chooses");
                active_choices = choices;
            } else {
                info!(scorer = scorer.identifier(), network_id = ?network_id, "would choose");
            }
            self.metrics.record(SelectionEvent::ScorerChoice {
                scorer: scorer.identifier().to_owned(),
                experiment_id: scorer.experiment_id(),
                network_id,
                active: is_active,
            });
            verdicts.push(ScorerVerdict {
                scorer: scorer.identifier().to_owned(),
                experiment_id: scorer.experiment_id(),
                active: is_active,
                choice: best,
            });
        }

        let active_pick = verdicts
            .iter()
            .find(|v| v.active)
            .and_then(|v| v.choice.clone());
        for other in verdicts.iter().filter(|v| !v.active) {
            let other_pick = other.choice.as_ref().map(|c| c.key.network_id);
            let active_network = active_pick.as_ref().map(|c| c.key.network_id);
            if other_pick != active_network {
                warn!(
                    active = %active_id,
                    other = %other.scorer,
                    active_choice = ?active_network,
                    other_choice = ?other_pick,
                    "scorers diverge"
                );
                self.metrics.record(SelectionEvent::ScorerDivergence {
                    active: active_id.clone(),
                    other: other.scorer.clone(),
                    active_choice: active_network,
                    other_choice: other_pick,
                });
            }
        }

        let selection = active_pick.and_then(|choice| {
            self.finish_selection(&choice, &active_choices, candidates, &active_id)
        });
        if selection.is_none() {
            self.metrics.record(SelectionEvent::NoSelection);
        }
        (verdicts, selection)
    }

    fn finish_selection(
        &mut self,
        choice: &ScoredChoice,
        active_choices: &IndexMap<NetworkId, ScoredChoice>,
        candidates: &CandidateStore,
        scorer: &str,
    ) -> Option<Selection> {
        let Some(scored) = self.store.configured_network(choice.key.network_id) else {
            warn!(network_id = %choice.key.network_id, "scored profile vanished from store");
            return None;
        };

        let mut key = choice.key.clone();
        let mut score = choice.value;
        let mut overridden = false;
        if choice.user_connect_choice_override {
            let outcome = apply_user_choice(
                &scored,
                self.store.as_ref(),
                candidates,
                self.config.user_choice_rssi_margin_db,
            );
            if outcome.cycle_detected {
                self.metrics
                    .record(SelectionEvent::UserChoiceCycle { at: scored.id });
            }
            if outcome.overridden() {
                let target = outcome.profile.id;
                let replacement = active_choices
                    .get(&target)
                    .map(|c| (c.key.clone(), c.value))
                    .or_else(|| {
                        candidates
                            .strongest_for(target)
                            .map(|c| (c.key.clone(), choice.value))
                    });
                if let Some((target_key, target_score)) = replacement {
                    info!(from = %scored.id, to = %target, "user connect choice overrides scorer");
                    self.metrics.record(SelectionEvent::UserChoiceOverride {
                        from: scored.id,
                        to: target,
                    });
                    key = target_key;
                    score = target_score;
                    overridden = true;
                }
            }
        }

        let candidate = candidates.get(&key)?;
        let result = CandidateScanResult {
            bssid: candidate.key.bssid.clone(),
            signal_level_dbm: candidate.signal_level_dbm,
            frequency_mhz: candidate.frequency_mhz,
            security_params: candidate.security_params,
        };
        if let Err(e) = self
            .store
            .set_network_candidate_scan_result(key.network_id, result)
        {
            warn!(network_id = %key.network_id, error = %e, "could not record candidate");
        }

        self.last_selection_at = Some(self.clock.now());
        info!(
            network_id = %key.network_id,
            bssid = %key.bssid,
            security = %candidate.security_params.security_type,
            score,
            scorer,
            overridden,
            "network selected"
        );
        self.metrics.record(SelectionEvent::Selected {
            network_id: key.network_id,
            bssid: key.bssid.clone(),
            scorer: scorer.to_owned(),
        });
        Some(Selection {
            network_id: key.network_id,
            bssid: key.bssid,
            security_params: candidate.security_params,
            score,
            scorer: scorer.to_owned(),
            overridden_by_user_choice: overridden,
        })
    }

    /// Whether a new cycle is worth running: not while a connected link is
    /// sufficient and the last selection is more recent than the minimum
    /// interval.
    pub fn is_network_selection_needed(&self, states: &[InterfaceState]) -> bool {
        let Some(last) = self.last_selection_at else {
            return true;
        };
        let sufficient_link = states.iter().filter_map(InterfaceState::link).any(|l| {
            l.score >= self.config.poor_score_threshold
                && l.signal_level_dbm
                    >= self
                        .config
                        .rssi
                        .for_frequency(l.frequency_mhz)
                        .sufficient_rssi_dbm
        });
        if !sufficient_link {
            return true;
        }
        let since = (self.clock.now() - last).to_std().unwrap_or_default();
        let needed = since >= self.config.min_selection_interval();
        if !needed {
            debug!(since_ms = since.as_millis(), "link sufficient and last selection recent");
        }
        needed
    }
}

/// Run one scorer over every group. Scorer errors drop the group only.
fn score_groups(
    scorer: &dyn CandidateScorer,
    groups: &IndexMap<NetworkId, Vec<&Candidate>>,
) -> IndexMap<NetworkId, ScoredChoice> {
    let mut choices = IndexMap::new();
    for (network_id, group) in groups {
        match scorer.score_group(group) {
            Ok(Some(choice)) => {
                debug!(
                    scorer = scorer.identifier(),
                    network_id = %network_id,
                    bssid = %choice.key.bssid,
                    score = choice.value,
                    "group scored"
                );
                choices.insert(*network_id, choice);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(
                    scorer = scorer.identifier(),
                    network_id = %network_id,
                    error = %e,
                    "scorer failed on group"
                );
            }
        }
    }
    choices
}

/// Highest-valued choice; the earliest group wins ties.
fn best_choice(choices: &IndexMap<NetworkId, ScoredChoice>) -> Option<&ScoredChoice> {
    let mut best: Option<&ScoredChoice> = None;
    for choice in choices.values() {
        if best.is_none_or(|b| choice.value > b.value) {
            best = Some(choice);
        }
    }
    best
}
