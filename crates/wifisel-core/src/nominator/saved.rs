// ── Saved-network nominator ──

use std::sync::Arc;

use super::{NominationContext, Nominator, NominatorKind, is_autojoinable, matches_observation};
use crate::error::SelectionError;
use crate::model::{NetworkProfile, Provenance, ScanObservation};

/// Proposes user-saved and carrier profiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct SavedNetworkNominator;

impl SavedNetworkNominator {
    fn is_eligible(profile: &NetworkProfile) -> bool {
        matches!(profile.provenance, Provenance::Saved | Provenance::Carrier)
            && !profile.ephemeral
            && !profile.use_external_scores
            && is_autojoinable(profile)
    }
}

impl Nominator for SavedNetworkNominator {
    fn kind(&self) -> NominatorKind {
        NominatorKind::Saved
    }

    fn evaluate(
        &self,
        observation: &ScanObservation,
        ctx: &NominationContext<'_>,
    ) -> Result<Vec<Arc<NetworkProfile>>, SelectionError> {
        Ok(ctx
            .profiles
            .iter()
            .filter(|p| Self::is_eligible(p) && matches_observation(p, observation))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::model::{DisableReason, SecurityParams, SecurityType, SelectionStatus};
    use crate::nominator::PolicyFlags;
    use crate::nominator::tests::{ids, psk_obs, psk_profile, snapshot};
    use pretty_assertions::assert_eq;

    fn nominated(profiles: Vec<NetworkProfile>, obs: &ScanObservation) -> Vec<u32> {
        let profiles = snapshot(profiles);
        let ctx = NominationContext {
            profiles: &profiles,
            states: &[],
            flags: PolicyFlags::default(),
            restricted_uids: &BTreeSet::new(),
        };
        ids(&SavedNetworkNominator.evaluate(obs, &ctx).unwrap_or_default())
    }

    #[test]
    fn matches_ssid_and_security() {
        let obs = psk_obs("aa:bb:cc:dd:ee:01", "Home");
        let open = NetworkProfile::new(3, "Home", [SecurityParams::new(SecurityType::Open)]);
        let found = nominated(vec![psk_profile(1, "Home"), psk_profile(2, "Work"), open], &obs);
        assert_eq!(found, vec![1]);
    }

    #[test]
    fn skips_disabled_ephemeral_and_non_autojoin() {
        let obs = psk_obs("aa:bb:cc:dd:ee:01", "Home");
        let mut disabled = psk_profile(1, "Home");
        disabled.status = SelectionStatus::PermanentlyDisabled {
            reason: DisableReason::ByUser,
        };
        let mut no_autojoin = psk_profile(2, "Home");
        no_autojoin.allow_autojoin = false;
        let suggestion = psk_profile(3, "Home").with_provenance(Provenance::Suggestion);
        let mut external = psk_profile(4, "Home");
        external.use_external_scores = true;
        let carrier = psk_profile(5, "Home").with_provenance(Provenance::Carrier);
        let found = nominated(vec![disabled, no_autojoin, suggestion, external, carrier], &obs);
        assert_eq!(found, vec![5]);
    }
}
