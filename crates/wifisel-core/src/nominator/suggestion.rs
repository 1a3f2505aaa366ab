// ── Suggestion nominator ──
//
// Proposes profiles that apps registered through the suggestion API.
// Suggestion profiles are registered with the store by the suggestion
// source; this nominator only reads them.

use std::sync::Arc;

use tracing::debug;

use super::{NominationContext, Nominator, NominatorKind, is_autojoinable, matches_observation};
use crate::error::SelectionError;
use crate::model::{NetworkProfile, Provenance, ScanObservation};

#[derive(Debug, Clone, Copy, Default)]
pub struct SuggestionNominator;

impl SuggestionNominator {
    fn is_permitted(profile: &NetworkProfile, ctx: &NominationContext<'_>) -> bool {
        if !profile.trusted && !ctx.flags.untrusted_allowed {
            return false;
        }
        if profile.oem_paid && !ctx.flags.oem_paid_allowed {
            return false;
        }
        if profile.oem_private && !ctx.flags.oem_private_allowed {
            return false;
        }
        if profile.restricted && !ctx.restricted_uids.contains(&profile.creator_uid) {
            return false;
        }
        true
    }
}

impl Nominator for SuggestionNominator {
    fn kind(&self) -> NominatorKind {
        NominatorKind::Suggestion
    }

    fn evaluate(
        &self,
        observation: &ScanObservation,
        ctx: &NominationContext<'_>,
    ) -> Result<Vec<Arc<NetworkProfile>>, SelectionError> {
        let mut nominated = Vec::new();
        for profile in ctx.profiles {
            if profile.provenance != Provenance::Suggestion
                || !is_autojoinable(profile)
                || !matches_observation(profile, observation)
            {
                continue;
            }
            if !Self::is_permitted(profile, ctx) {
                debug!(
                    network_id = %profile.id,
                    bssid = %observation.bssid,
                    "suggestion not permitted by policy flags"
                );
                continue;
            }
            nominated.push(Arc::clone(profile));
        }
        Ok(nominated)
    }
}
