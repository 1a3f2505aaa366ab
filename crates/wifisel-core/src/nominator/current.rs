// ── Current-connection nominator ──
//
// Runs last. Guarantees the link an interface already holds is scored
// even when no other nominator proposes it again.

use std::sync::Arc;

use super::{NominationContext, Nominator, NominatorKind};
use crate::error::SelectionError;
use crate::model::{NetworkProfile, ScanObservation};

#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentConnectionNominator;

impl Nominator for CurrentConnectionNominator {
    fn kind(&self) -> NominatorKind {
        NominatorKind::CurrentConnection
    }

    fn evaluate(
        &self,
        observation: &ScanObservation,
        ctx: &NominationContext<'_>,
    ) -> Result<Vec<Arc<NetworkProfile>>, SelectionError> {
        let mut nominated = Vec::new();
        for link in ctx.states.iter().filter_map(|s| s.link()) {
            if link.bssid != observation.bssid {
                continue;
            }
            let profile = ctx
                .profile(link.network_id)
                .ok_or(SelectionError::ProfileNotFound {
                    network_id: link.network_id,
                })?;
            nominated.push(Arc::clone(profile));
        }
        Ok(nominated)
    }
}
