// ── Profile store contract ──
//
// The persistent configuration store is an external collaborator. The
// engine reads a snapshot at cycle start, re-fetches one profile after
// scoring, and writes back candidate scan results and re-enables.

mod collection;
mod memory;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::SelectionError;
use crate::model::{CandidateScanResult, ConnectChoice, NetworkId, NetworkProfile};

pub use memory::InMemoryProfileStore;

pub trait ProfileStore: Send + Sync {
    /// Every configured profile, secrets stripped, ordered by id.
    fn configured_networks(&self) -> Vec<Arc<NetworkProfile>>;

    /// One profile, secrets stripped.
    fn configured_network(&self, id: NetworkId) -> Option<Arc<NetworkProfile>>;

    /// One profile including its pre-shared key.
    fn configured_network_with_password(&self, id: NetworkId) -> Option<NetworkProfile>;

    fn set_network_candidate_scan_result(
        &self,
        id: NetworkId,
        result: CandidateScanResult,
    ) -> Result<(), SelectionError>;

    fn clear_network_candidate_scan_result(&self, id: NetworkId) -> Result<(), SelectionError>;

    /// Re-enable a temporarily disabled profile whose disable period has
    /// elapsed. Returns whether the profile is enabled afterwards.
    fn try_enable_network(&self, id: NetworkId, now: DateTime<Utc>) -> bool;

    fn last_selected_network(&self) -> Option<NetworkId>;

    fn last_selected_timestamp(&self) -> Option<DateTime<Utc>>;

    fn connect_choice(&self, id: NetworkId) -> Option<ConnectChoice>;
}
