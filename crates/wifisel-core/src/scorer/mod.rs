// ── Scorer registry ──
//
// Every registered scorer rates every group each cycle; only the active
// one decides. The rest are run for comparison so divergence can be
// reported.

mod compat;
mod throughput;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

use crate::candidate::{Candidate, CandidateKey};
use crate::config::RssiThresholds;
use crate::error::SelectionError;

pub use compat::CompatibilityScorer;
pub use throughput::ThroughputScorer;

pub const THROUGHPUT_SCORER: &str = "ThroughputScorer";
pub const COMPATIBILITY_SCORER: &str = "CompatibilityScorer";

/// Experiment ids live in `[EXPERIMENT_ID_BASE, EXPERIMENT_ID_BASE + 1_000_000)`.
pub const EXPERIMENT_ID_BASE: u32 = 42_000_000;

/// A scorer's verdict on one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredChoice {
    pub value: i32,
    /// Uncertainty of `value`.
    pub err: i32,
    pub key: CandidateKey,
    /// Whether the user's connect choices may replace this pick.
    pub user_connect_choice_override: bool,
}

pub trait CandidateScorer: Send + Sync {
    fn identifier(&self) -> &str;

    fn score_candidate(&self, candidate: &Candidate) -> i32;

    fn error_bound(&self) -> i32 {
        0
    }

    fn requests_user_choice_override(&self) -> bool {
        true
    }

    /// Best candidate of one network. Ties keep the earlier candidate.
    fn score_group(&self, group: &[&Candidate]) -> Result<Option<ScoredChoice>, SelectionError> {
        let mut best: Option<(i32, &Candidate)> = None;
        for &candidate in group {
            let value = self.score_candidate(candidate);
            if best.is_none_or(|(v, _)| value > v) {
                best = Some((value, candidate));
            }
        }
        Ok(best.map(|(value, candidate)| ScoredChoice {
            value,
            err: self.error_bound(),
            key: candidate.key.clone(),
            user_connect_choice_override: self.requests_user_choice_override(),
        }))
    }

    fn experiment_id(&self) -> u32 {
        experiment_id(self.identifier())
    }
}

/// `(min(rssi, sufficient) + offset) * slope`, shared by both scorers.
/// Saturates instead of overflowing.
pub(crate) fn rssi_base_score(
    candidate: &Candidate,
    rssi: &RssiThresholds,
    offset: i32,
    slope: i32,
) -> i32 {
    let sufficient = rssi.for_frequency(candidate.frequency_mhz).sufficient_rssi_dbm;
    candidate
        .signal_level_dbm
        .min(sufficient)
        .saturating_add(offset)
        .saturating_mul(slope)
}

/// Deterministic non-cryptographic hash: FNV-1a over the bytes followed by
/// a SplitMix64 finalizer. Stable across platforms and releases.
pub fn stable_hash(s: &str) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for b in s.as_bytes() {
        h ^= u64::from(*b);
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    splitmix64(h)
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Experiment id of a scorer identifier.
pub fn experiment_id(identifier: &str) -> u32 {
    let offset = u32::try_from(stable_hash(identifier) % 1_000_000).unwrap_or_default();
    EXPERIMENT_ID_BASE + offset
}

/// Registered scorers, in registration order.
#[derive(Default)]
pub struct ScorerRegistry {
    scorers: IndexMap<String, Box<dyn CandidateScorer>>,
}

impl ScorerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scorer. A second scorer with the same identifier is
    /// rejected.
    pub fn register(&mut self, scorer: Box<dyn CandidateScorer>) -> bool {
        let identifier = scorer.identifier().to_owned();
        if self.scorers.contains_key(&identifier) {
            warn!(scorer = %identifier, "scorer already registered");
            return false;
        }
        self.scorers.insert(identifier, scorer);
        true
    }

    pub fn get(&self, identifier: &str) -> Option<&dyn CandidateScorer> {
        self.scorers.get(identifier).map(|s| &**s)
    }

    pub fn by_experiment_id(&self, id: u32) -> Option<&dyn CandidateScorer> {
        self.iter().find(|s| s.experiment_id() == id)
    }

    /// The scorer that decides: the experiment override when set and
    /// registered, else the configured identifier, else the throughput
    /// scorer, else the first registered.
    pub fn active(&self, configured: &str, experiment_id: u32) -> Option<&dyn CandidateScorer> {
        if experiment_id != 0 {
            match self.by_experiment_id(experiment_id) {
                Some(scorer) => return Some(scorer),
                None => warn!(experiment_id, "no scorer for experiment id, using configured"),
            }
        }
        self.get(configured)
            .or_else(|| self.get(THROUGHPUT_SCORER))
            .or_else(|| self.iter().next())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn CandidateScorer> {
        self.scorers
            .values()
            .map(|s| -> &dyn CandidateScorer { &**s })
    }

    pub fn len(&self) -> usize {
        self.scorers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scorers.is_empty()
    }
}

impl std::fmt::Debug for ScorerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.scorers.keys()).finish()
    }
}
