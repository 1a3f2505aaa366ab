// ── Profile arena ──
//
// Concurrent storage keyed by network id with O(1) lookups.

use std::sync::Arc;

use dashmap::DashMap;

use crate::model::{NetworkId, NetworkProfile};

/// A lock-free arena of network profiles.
///
/// Entries are shared as `Arc`s; mutation swaps in a new `Arc` so readers
/// holding an older one keep a consistent view.
pub(crate) struct ProfileArena {
    by_id: DashMap<NetworkId, Arc<NetworkProfile>>,
}

impl ProfileArena {
    pub(crate) fn new() -> Self {
        Self {
            by_id: DashMap::new(),
        }
    }

    /// Insert or replace a profile. Returns `true` if the id was new.
    pub(crate) fn upsert(&self, profile: NetworkProfile) -> bool {
        self.by_id.insert(profile.id, Arc::new(profile)).is_none()
    }

    /// Remove a profile by id. Returns the removed profile if it existed.
    pub(crate) fn remove(&self, id: NetworkId) -> Option<Arc<NetworkProfile>> {
        self.by_id.remove(&id).map(|(_, v)| v)
    }

    pub(crate) fn get(&self, id: NetworkId) -> Option<Arc<NetworkProfile>> {
        self.by_id.get(&id).map(|r| Arc::clone(r.value()))
    }

    /// Apply `f` to a stored profile. Returns `false` if the id is unknown.
    pub(crate) fn update(&self, id: NetworkId, f: impl FnOnce(&mut NetworkProfile)) -> bool {
        match self.by_id.get_mut(&id) {
            Some(mut entry) => {
                f(Arc::make_mut(entry.value_mut()));
                true
            }
            None => false,
        }
    }

    /// All profiles, ordered by id.
    pub(crate) fn snapshot(&self) -> Vec<Arc<NetworkProfile>> {
        let mut values: Vec<Arc<NetworkProfile>> =
            self.by_id.iter().map(|r| Arc::clone(r.value())).collect();
        values.sort_by_key(|p| p.id);
        values
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{SecurityParams, SecurityType};

    fn profile(id: u32, ssid: &str) -> NetworkProfile {
        NetworkProfile::new(id, ssid, [SecurityParams::new(SecurityType::Psk)])
    }

    #[test]
    fn upsert_returns_true_for_new_id() {
        let arena = ProfileArena::new();
        assert!(arena.upsert(profile(1, "Home")));
        assert!(!arena.upsert(profile(1, "Home2")));
        assert_eq!(arena.get(NetworkId(1)).unwrap().ssid.to_string_lossy(), "Home2");
    }

    #[test]
    fn update_does_not_touch_held_snapshots() {
        let arena = ProfileArena::new();
        arena.upsert(profile(1, "Home"));
        let before = arena.get(NetworkId(1)).unwrap();
        assert!(arena.update(NetworkId(1), |p| p.allow_autojoin = false));
        assert!(before.allow_autojoin);
        assert!(!arena.get(NetworkId(1)).unwrap().allow_autojoin);
        assert!(!arena.update(NetworkId(9), |_| {}));
    }

    #[test]
    fn snapshot_is_ordered_by_id() {
        let arena = ProfileArena::new();
        arena.upsert(profile(3, "C"));
        arena.upsert(profile(1, "A"));
        let ids: Vec<u32> = arena.snapshot().iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(arena.remove(NetworkId(3)).is_some());
        assert_eq!(arena.len(), 1);
        assert!(arena.remove(NetworkId(3)).is_none());
    }
}
