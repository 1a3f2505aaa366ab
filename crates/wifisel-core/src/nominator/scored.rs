// ── Externally scored nominator ──
//
// Proposes profiles that opted into recommendations from an external
// network scorer. `update` pulls scores for the batch once per cycle;
// an observation without a cached score is not proposed.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use super::{NominationContext, Nominator, NominatorKind, is_autojoinable, matches_observation};
use crate::error::SelectionError;
use crate::model::{MacAddress, NetworkProfile, Provenance, ScanObservation, Ssid};

/// Source of externally computed per-BSS scores.
pub trait ExternalScoreSource: Send + Sync {
    /// Score of one BSS, or `None` when the scorer has no opinion.
    fn score(&self, bssid: &MacAddress, ssid: &Ssid) -> Result<Option<i32>, SelectionError>;
}

/// A fixed score table. BSSIDs in `failing` report a lookup error.
#[derive(Debug, Clone, Default)]
pub struct StaticScores {
    scores: HashMap<MacAddress, i32>,
    failing: HashSet<MacAddress>,
}

impl StaticScores {
    pub fn new(scores: impl IntoIterator<Item = (MacAddress, i32)>) -> Self {
        Self {
            scores: scores.into_iter().collect(),
            failing: HashSet::new(),
        }
    }

    pub fn with_failure(mut self, bssid: MacAddress) -> Self {
        self.failing.insert(bssid);
        self
    }
}

impl ExternalScoreSource for StaticScores {
    fn score(&self, bssid: &MacAddress, _ssid: &Ssid) -> Result<Option<i32>, SelectionError> {
        if self.failing.contains(bssid) {
            return Err(SelectionError::ExternalScore {
                bssid: bssid.clone(),
                message: "score service unavailable".into(),
            });
        }
        Ok(self.scores.get(bssid).copied())
    }
}

pub struct ScoredNetworkNominator {
    source: Box<dyn ExternalScoreSource>,
    cache: HashMap<MacAddress, i32>,
    failures: HashMap<MacAddress, String>,
}

impl ScoredNetworkNominator {
    pub fn new(source: Box<dyn ExternalScoreSource>) -> Self {
        Self {
            source,
            cache: HashMap::new(),
            failures: HashMap::new(),
        }
    }

    fn is_eligible(profile: &NetworkProfile, ctx: &NominationContext<'_>) -> bool {
        (profile.use_external_scores || profile.provenance == Provenance::ExternallyScored)
            && is_autojoinable(profile)
            && (profile.trusted || ctx.flags.untrusted_allowed)
    }

    /// Cached score of `bssid` from the last `update`.
    pub fn cached_score(&self, bssid: &MacAddress) -> Option<i32> {
        self.cache.get(bssid).copied()
    }
}

impl Nominator for ScoredNetworkNominator {
    fn kind(&self) -> NominatorKind {
        NominatorKind::ExternallyScored
    }

    fn update(&mut self, observations: &[ScanObservation], ctx: &NominationContext<'_>) {
        self.cache.clear();
        self.failures.clear();
        for observation in observations {
            let interesting = ctx
                .profiles
                .iter()
                .any(|p| Self::is_eligible(p, ctx) && matches_observation(p, observation));
            if !interesting {
                continue;
            }
            match self.source.score(&observation.bssid, &observation.ssid) {
                Ok(Some(score)) => {
                    self.cache.insert(observation.bssid.clone(), score);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(bssid = %observation.bssid, error = %e, "external score lookup failed");
                    self.failures.insert(observation.bssid.clone(), e.to_string());
                }
            }
        }
        debug!(
            scored = self.cache.len(),
            failed = self.failures.len(),
            "external scores refreshed"
        );
    }

    fn evaluate(
        &self,
        observation: &ScanObservation,
        ctx: &NominationContext<'_>,
    ) -> Result<Vec<Arc<NetworkProfile>>, SelectionError> {
        let eligible: Vec<Arc<NetworkProfile>> = ctx
            .profiles
            .iter()
            .filter(|p| Self::is_eligible(p, ctx) && matches_observation(p, observation))
            .cloned()
            .collect();
        if eligible.is_empty() {
            return Ok(eligible);
        }
        if let Some(message) = self.failures.get(&observation.bssid) {
            return Err(SelectionError::ExternalScore {
                bssid: observation.bssid.clone(),
                message: message.clone(),
            });
        }
        if self.cache.contains_key(&observation.bssid) {
            Ok(eligible)
        } else {
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::nominator::PolicyFlags;
    use crate::nominator::tests::{ids, psk_obs, psk_profile, snapshot};
    use pretty_assertions::assert_eq;

    fn scored_profile(id: u32, ssid: &str) -> NetworkProfile {
        psk_profile(id, ssid).with_provenance(Provenance::ExternallyScored)
    }

    #[test]
    fn only_scored_bssids_are_nominated() {
        let scored = MacAddress::new("aa:bb:cc:dd:ee:01");
        let unscored = psk_obs("aa:bb:cc:dd:ee:02", "Metro");
        let failing = MacAddress::new("aa:bb:cc:dd:ee:03");
        let source = StaticScores::new([(scored.clone(), 80)]).with_failure(failing.clone());
        let mut nominator = ScoredNetworkNominator::new(Box::new(source));

        let profiles = snapshot(vec![scored_profile(1, "Metro"), psk_profile(2, "Metro")]);
        let ctx = NominationContext {
            profiles: &profiles,
            states: &[],
            flags: PolicyFlags::default(),
            restricted_uids: &BTreeSet::new(),
        };
        let batch = [
            psk_obs(scored.as_str(), "Metro"),
            unscored,
            psk_obs(failing.as_str(), "Metro"),
        ];
        nominator.update(&batch, &ctx);
        assert_eq!(nominator.cached_score(&scored), Some(80));

        let hit = nominator.evaluate(&batch[0], &ctx).unwrap_or_default();
        assert_eq!(ids(&hit), vec![1]);
        assert!(nominator.evaluate(&batch[1], &ctx).unwrap_or_default().is_empty());
        assert!(matches!(
            nominator.evaluate(&batch[2], &ctx),
            Err(SelectionError::ExternalScore { .. })
        ));
    }

    #[test]
    fn untrusted_scored_profiles_need_the_flag() {
        let bssid = MacAddress::new("aa:bb:cc:dd:ee:01");
        let mut nominator =
            ScoredNetworkNominator::new(Box::new(StaticScores::new([(bssid.clone(), 10)])));
        let mut profile = scored_profile(1, "Metro");
        profile.trusted = false;
        let profiles = snapshot(vec![profile]);
        let batch = [psk_obs(bssid.as_str(), "Metro")];

        let strict = NominationContext {
            profiles: &profiles,
            states: &[],
            flags: PolicyFlags::default(),
            restricted_uids: &BTreeSet::new(),
        };
        nominator.update(&batch, &strict);
        assert!(nominator.evaluate(&batch[0], &strict).unwrap_or_default().is_empty());

        let relaxed = NominationContext {
            flags: PolicyFlags {
                untrusted_allowed: true,
                ..PolicyFlags::default()
            },
            ..strict
        };
        nominator.update(&batch, &relaxed);
        assert_eq!(ids(&nominator.evaluate(&batch[0], &relaxed).unwrap_or_default()), vec![1]);
    }
}
