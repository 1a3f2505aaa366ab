// ── Nominator set ──
//
// Nominators turn filtered observations into (observation, profile)
// pairs worth scoring. They run in a fixed priority order every cycle; the
// candidate store keeps the first registration of a key, so earlier
// nominators win ties over the same candidate.

mod current;
mod saved;
mod scored;
mod suggestion;

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::warn;

use crate::error::SelectionError;
use crate::model::{InterfaceState, NetworkId, NetworkProfile, ScanObservation};

pub use current::CurrentConnectionNominator;
pub use saved::SavedNetworkNominator;
pub use scored::{ExternalScoreSource, ScoredNetworkNominator, StaticScores};
pub use suggestion::SuggestionNominator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum NominatorKind {
    Saved,
    Suggestion,
    ExternallyScored,
    CurrentConnection,
}

/// Which restricted network classes the caller may join this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyFlags {
    pub untrusted_allowed: bool,
    pub oem_paid_allowed: bool,
    pub oem_private_allowed: bool,
}

/// Read-only view of the cycle a nominator works in.
#[derive(Debug, Clone, Copy)]
pub struct NominationContext<'a> {
    /// Profile snapshot taken at cycle start, ordered by id.
    pub profiles: &'a [Arc<NetworkProfile>],
    pub states: &'a [InterfaceState],
    pub flags: PolicyFlags,
    pub restricted_uids: &'a BTreeSet<u32>,
}

impl NominationContext<'_> {
    pub fn profile(&self, id: NetworkId) -> Option<&Arc<NetworkProfile>> {
        self.profiles
            .binary_search_by_key(&id, |p| p.id)
            .ok()
            .and_then(|i| self.profiles.get(i))
    }
}

/// Callback receiving every connectable (observation, profile) pair.
pub type OnConnectable<'f> = dyn FnMut(NominatorKind, &ScanObservation, &Arc<NetworkProfile>) + 'f;

pub trait Nominator: Send {
    fn kind(&self) -> NominatorKind;

    /// Refresh per-cycle state before nomination.
    fn update(&mut self, _observations: &[ScanObservation], _ctx: &NominationContext<'_>) {}

    /// Profiles this nominator proposes for one observation.
    fn evaluate(
        &self,
        observation: &ScanObservation,
        ctx: &NominationContext<'_>,
    ) -> Result<Vec<Arc<NetworkProfile>>, SelectionError>;

    /// Evaluate every observation. A failing observation is logged and
    /// skipped; the rest proceed.
    fn nominate(
        &self,
        observations: &[ScanObservation],
        ctx: &NominationContext<'_>,
        on_connectable: &mut OnConnectable<'_>,
    ) {
        for observation in observations {
            match self.evaluate(observation, ctx) {
                Ok(profiles) => {
                    for profile in &profiles {
                        on_connectable(self.kind(), observation, profile);
                    }
                }
                Err(e) => {
                    warn!(
                        nominator = %self.kind(),
                        bssid = %observation.bssid,
                        error = %e,
                        "nominator skipped observation"
                    );
                }
            }
        }
    }
}

/// The four nominators in priority order.
pub fn default_nominators(scores: Box<dyn ExternalScoreSource>) -> Vec<Box<dyn Nominator>> {
    vec![
        Box::new(SavedNetworkNominator),
        Box::new(SuggestionNominator),
        Box::new(ScoredNetworkNominator::new(scores)),
        Box::new(CurrentConnectionNominator),
    ]
}

/// Same SSID, and at least one enabled variant the AP advertises.
pub(crate) fn matches_observation(profile: &NetworkProfile, observation: &ScanObservation) -> bool {
    profile.ssid == observation.ssid
        && profile
            .enabled_params()
            .any(|p| observation.security.advertises(p.security_type))
}

/// Selection status and autojoin permit automatic connection.
pub(crate) fn is_autojoinable(profile: &NetworkProfile) -> bool {
    profile.allow_autojoin && profile.is_enabled()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{AdvertisedScheme, SecurityAdvertisement, SecurityParams, SecurityType};

    pub(crate) fn psk_profile(id: u32, ssid: &str) -> NetworkProfile {
        NetworkProfile::new(id, ssid, [SecurityParams::new(SecurityType::Psk)])
    }

    pub(crate) fn psk_obs(bssid: &str, ssid: &str) -> ScanObservation {
        ScanObservation::new(
            bssid,
            ssid,
            -55,
            2437,
            SecurityAdvertisement::single(AdvertisedScheme::Psk),
        )
    }

    pub(crate) fn snapshot(profiles: Vec<NetworkProfile>) -> Vec<Arc<NetworkProfile>> {
        let mut snapshot: Vec<Arc<NetworkProfile>> = profiles.into_iter().map(Arc::new).collect();
        snapshot.sort_by_key(|p| p.id);
        snapshot
    }

    pub(crate) fn ids(profiles: &[Arc<NetworkProfile>]) -> Vec<u32> {
        profiles.iter().map(|p| p.id.get()).collect()
    }

    struct Failing;

    impl Nominator for Failing {
        fn kind(&self) -> NominatorKind {
            NominatorKind::Saved
        }

        fn evaluate(
            &self,
            observation: &ScanObservation,
            ctx: &NominationContext<'_>,
        ) -> Result<Vec<Arc<NetworkProfile>>, SelectionError> {
            if observation.signal_level_dbm < -70 {
                return Err(SelectionError::InvalidObservation {
                    bssid: observation.bssid.clone(),
                    reason: "too weak".into(),
                });
            }
            Ok(ctx.profiles.to_vec())
        }
    }

    #[test]
    fn failing_observation_is_skipped_only() {
        let profiles = snapshot(vec![psk_profile(1, "A")]);
        let ctx = NominationContext {
            profiles: &profiles,
            states: &[],
            flags: PolicyFlags::default(),
            restricted_uids: &BTreeSet::new(),
        };
        let mut weak = psk_obs("aa:bb:cc:dd:ee:01", "A");
        weak.signal_level_dbm = -75;
        let batch = [weak, psk_obs("aa:bb:cc:dd:ee:02", "A")];
        let mut seen = Vec::new();
        Failing.nominate(&batch, &ctx, &mut |_, obs, _| seen.push(obs.bssid.clone()));
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].as_str(), "aa:bb:cc:dd:ee:02");
    }

    #[test]
    fn context_finds_profiles_by_id() {
        let profiles = snapshot(vec![psk_profile(5, "E"), psk_profile(2, "B")]);
        let ctx = NominationContext {
            profiles: &profiles,
            states: &[],
            flags: PolicyFlags::default(),
            restricted_uids: &BTreeSet::new(),
        };
        assert!(ctx.profile(NetworkId(5)).is_some());
        assert!(ctx.profile(NetworkId(3)).is_none());
    }
}
