// ── User-choice override ──
//
// Users leave "prefer B over A" edges behind when they manually switch
// networks. After scoring, the engine follows those edges from the scored
// profile as long as each target is present and healthy this cycle.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::candidate::CandidateStore;
use crate::model::{NetworkId, NetworkProfile};
use crate::store::ProfileStore;

/// Where the connect-choice walk ended.
#[derive(Debug, Clone)]
pub struct ChoiceOutcome {
    pub profile: Arc<NetworkProfile>,
    /// Profiles accepted along the way, starting with the scored one.
    pub path: Vec<NetworkId>,
    /// The walk hit a profile twice and fell back to the scored profile.
    pub cycle_detected: bool,
}

impl ChoiceOutcome {
    pub fn overridden(&self) -> bool {
        self.path.len() > 1 && !self.cycle_detected
    }
}

/// Follow connect-choice edges from `scored`.
///
/// A link is accepted when its target profile exists, has a live candidate
/// this cycle, is enabled, is not missing expected Internet access, and its
/// strongest live signal is no more than `margin_db` below the recorded
/// signal. A recorded signal of 0 always passes. A rejected link ends the
/// walk at the last accepted profile; a revisit reverts to `scored`.
pub fn apply_user_choice(
    scored: &Arc<NetworkProfile>,
    store: &dyn ProfileStore,
    candidates: &CandidateStore,
    margin_db: i32,
) -> ChoiceOutcome {
    let mut visited = HashSet::from([scored.id]);
    let mut path = vec![scored.id];
    let mut current = Arc::clone(scored);

    while let Some(choice) = store.connect_choice(current.id) {
        if !visited.insert(choice.network_id) {
            warn!(
                from = %scored.id,
                at = %choice.network_id,
                "connect choice cycle, keeping scored network"
            );
            return ChoiceOutcome {
                profile: Arc::clone(scored),
                path,
                cycle_detected: true,
            };
        }

        let Some(target) = store.configured_network(choice.network_id) else {
            debug!(target = %choice.network_id, "connect choice target no longer configured");
            break;
        };
        let Some(live) = candidates.strongest_for(target.id) else {
            debug!(target = %target.id, "connect choice target not seen this cycle");
            break;
        };
        if !target.is_enabled() || target.has_unexpected_no_internet() {
            debug!(target = %target.id, "connect choice target not usable");
            break;
        }
        let floor = choice.rssi_dbm.saturating_sub(margin_db);
        if choice.rssi_dbm != 0 && live.signal_level_dbm < floor {
            debug!(
                target = %target.id,
                recorded = choice.rssi_dbm,
                live = live.signal_level_dbm,
                "connect choice target too weak"
            );
            break;
        }

        debug!(from = %current.id, to = %target.id, "following connect choice");
        path.push(target.id);
        current = target;
    }

    ChoiceOutcome {
        profile: current,
        path,
        cycle_detected: false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::candidate::tests::candidate;
    use crate::model::{ConnectChoice, DisableReason, SecurityParams, SecurityType};
    use crate::store::InMemoryProfileStore;
    use pretty_assertions::assert_eq;

    fn profile(id: u32) -> NetworkProfile {
        NetworkProfile::new(id, format!("net{id}"), [SecurityParams::new(SecurityType::Psk)])
    }

    fn live(entries: &[(u32, i32)]) -> CandidateStore {
        let mut store = CandidateStore::new();
        for (i, (id, rssi)) in entries.iter().enumerate() {
            store.add(candidate(*id, &format!("aa:bb:cc:dd:ee:{i:02x}"), *rssi));
        }
        store
    }

    fn link(store: &InMemoryProfileStore, from: u32, to: u32, rssi_dbm: i32) {
        store
            .set_connect_choice(
                NetworkId(from),
                Some(ConnectChoice {
                    network_id: NetworkId(to),
                    rssi_dbm,
                }),
            )
            .unwrap();
    }

    fn walk(store: &InMemoryProfileStore, candidates: &CandidateStore, from: u32) -> ChoiceOutcome {
        let scored = store.configured_network(NetworkId(from)).unwrap();
        apply_user_choice(&scored, store, candidates, 5)
    }

    #[test]
    fn follows_chain_while_links_hold() {
        let store = InMemoryProfileStore::with_profiles([profile(1), profile(2), profile(3)]);
        link(&store, 1, 2, -60);
        link(&store, 2, 3, 0);
        let outcome = walk(&store, &live(&[(1, -50), (2, -64), (3, -90)]), 1);
        assert_eq!(outcome.profile.id, NetworkId(3));
        assert_eq!(outcome.path, vec![NetworkId(1), NetworkId(2), NetworkId(3)]);
        assert!(outcome.overridden());
    }

    #[test]
    fn weak_target_stops_at_last_accepted() {
        let store = InMemoryProfileStore::with_profiles([profile(1), profile(2), profile(3)]);
        link(&store, 1, 2, -60);
        link(&store, 2, 3, -55);
        let outcome = walk(&store, &live(&[(1, -50), (2, -60), (3, -80)]), 1);
        assert_eq!(outcome.profile.id, NetworkId(2));
    }

    #[test]
    fn absent_or_disabled_targets_are_rejected() {
        let store = InMemoryProfileStore::with_profiles([profile(1), profile(2)]);
        link(&store, 1, 2, 0);
        assert_eq!(walk(&store, &live(&[(1, -50)]), 1).profile.id, NetworkId(1));

        store
            .disable_network(NetworkId(2), DisableReason::ByUser, None)
            .unwrap();
        let outcome = walk(&store, &live(&[(1, -50), (2, -40)]), 1);
        assert_eq!(outcome.profile.id, NetworkId(1));
        assert!(!outcome.overridden());
    }

    #[test]
    fn cycle_reverts_to_scored_profile() {
        let store = InMemoryProfileStore::with_profiles([profile(1), profile(2), profile(3)]);
        link(&store, 1, 2, 0);
        link(&store, 2, 3, 0);
        link(&store, 3, 1, 0);
        let outcome = walk(&store, &live(&[(1, -50), (2, -50), (3, -50)]), 1);
        assert_eq!(outcome.profile.id, NetworkId(1));
        assert!(outcome.cycle_detected);
        assert!(!outcome.overridden());
        // One step per profile before the revisit is noticed.
        assert!(outcome.path.len() <= 3);
    }
}
