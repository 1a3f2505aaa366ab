// ── In-memory profile store ──

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use secrecy::SecretString;
use tracing::debug;

use super::ProfileStore;
use super::collection::ProfileArena;
use crate::error::SelectionError;
use crate::model::{
    CandidateScanResult, ConnectChoice, DisableReason, NetworkId, NetworkProfile, SelectionStatus,
};

#[derive(Debug, Clone, Copy)]
struct UserSelection {
    network_id: NetworkId,
    at: DateTime<Utc>,
}

/// `ProfileStore` kept entirely in memory.
///
/// Profiles are stored without their secret; pre-shared keys live in a
/// side table and are re-attached only by `configured_network_with_password`.
pub struct InMemoryProfileStore {
    profiles: ProfileArena,
    secrets: DashMap<NetworkId, SecretString>,
    last_selection: RwLock<Option<UserSelection>>,
}

impl Default for InMemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: ProfileArena::new(),
            secrets: DashMap::new(),
            last_selection: RwLock::new(None),
        }
    }

    pub fn with_profiles(profiles: impl IntoIterator<Item = NetworkProfile>) -> Self {
        let store = Self::new();
        for profile in profiles {
            store.upsert(profile);
        }
        store
    }

    /// Insert or replace a profile. Returns `true` if the id was new.
    pub fn upsert(&self, mut profile: NetworkProfile) -> bool {
        match profile.pre_shared_key.take() {
            Some(key) => {
                self.secrets.insert(profile.id, key);
            }
            None => {
                self.secrets.remove(&profile.id);
            }
        }
        self.profiles.upsert(profile)
    }

    pub fn remove(&self, id: NetworkId) -> Option<Arc<NetworkProfile>> {
        self.secrets.remove(&id);
        let removed = self.profiles.remove(id);
        let mut last = self
            .last_selection
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if (*last).is_some_and(|s| s.network_id == id) {
            *last = None;
        }
        removed
    }

    /// Record that the user explicitly picked `id`.
    pub fn user_select(&self, id: NetworkId, at: DateTime<Utc>) -> Result<(), SelectionError> {
        if self.profiles.get(id).is_none() {
            return Err(SelectionError::ProfileNotFound { network_id: id });
        }
        *self
            .last_selection
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(UserSelection { network_id: id, at });
        Ok(())
    }

    pub fn set_connect_choice(
        &self,
        id: NetworkId,
        choice: Option<ConnectChoice>,
    ) -> Result<(), SelectionError> {
        if self.profiles.update(id, |p| p.connect_choice = choice) {
            Ok(())
        } else {
            Err(SelectionError::ProfileNotFound { network_id: id })
        }
    }

    /// Disable `id` for `reason`, until `until` when given, else permanently.
    pub fn disable_network(
        &self,
        id: NetworkId,
        reason: DisableReason,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), SelectionError> {
        let updated = self.profiles.update(id, |p| {
            *p.disable_counters.entry(reason).or_default() += 1;
            p.status = match until {
                Some(until) if !reason.is_permanent() => {
                    SelectionStatus::TemporarilyDisabled { reason, until }
                }
                _ => SelectionStatus::PermanentlyDisabled { reason },
            };
        });
        if updated {
            debug!(network_id = %id, %reason, "network disabled");
            Ok(())
        } else {
            Err(SelectionError::ProfileNotFound { network_id: id })
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn configured_networks(&self) -> Vec<Arc<NetworkProfile>> {
        self.profiles.snapshot()
    }

    fn configured_network(&self, id: NetworkId) -> Option<Arc<NetworkProfile>> {
        self.profiles.get(id)
    }

    fn configured_network_with_password(&self, id: NetworkId) -> Option<NetworkProfile> {
        let mut profile = NetworkProfile::clone(&*self.profiles.get(id)?);
        profile.pre_shared_key = self.secrets.get(&id).map(|s| s.value().clone());
        Some(profile)
    }

    fn set_network_candidate_scan_result(
        &self,
        id: NetworkId,
        result: CandidateScanResult,
    ) -> Result<(), SelectionError> {
        if self.profiles.update(id, |p| p.candidate = Some(result)) {
            Ok(())
        } else {
            Err(SelectionError::ProfileNotFound { network_id: id })
        }
    }

    fn clear_network_candidate_scan_result(&self, id: NetworkId) -> Result<(), SelectionError> {
        if self.profiles.update(id, |p| p.candidate = None) {
            Ok(())
        } else {
            Err(SelectionError::ProfileNotFound { network_id: id })
        }
    }

    fn try_enable_network(&self, id: NetworkId, now: DateTime<Utc>) -> bool {
        let Some(profile) = self.profiles.get(id) else {
            return false;
        };
        match profile.status {
            SelectionStatus::Enabled => true,
            SelectionStatus::PermanentlyDisabled { .. } => false,
            SelectionStatus::TemporarilyDisabled { reason, until } => {
                if now < until {
                    return false;
                }
                debug!(network_id = %id, %reason, "disable period elapsed, re-enabling");
                self.profiles.update(id, |p| p.status = SelectionStatus::Enabled)
            }
        }
    }

    fn last_selected_network(&self) -> Option<NetworkId> {
        self.last_selection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .map(|s| s.network_id)
    }

    fn last_selected_timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_selection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .map(|s| s.at)
    }

    fn connect_choice(&self, id: NetworkId) -> Option<ConnectChoice> {
        self.profiles.get(id)?.connect_choice
    }
}
