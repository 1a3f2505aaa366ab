// ── Candidates ──
//
// A candidate is one (profile, BSSID, security variant) triple that
// survived filtering, nomination, and reconciliation. Built fresh each
// cycle and dropped at its end.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::model::{ChannelWidth, MacAddress, NetworkId, SecurityParams, SecurityType, Ssid};
use crate::nominator::NominatorKind;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CandidateKey {
    pub network_id: NetworkId,
    pub bssid: MacAddress,
    pub security_type: SecurityType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub key: CandidateKey,
    pub ssid: Ssid,
    pub signal_level_dbm: i32,
    pub frequency_mhz: u32,
    pub channel_width: ChannelWidth,
    /// In [0, 1]; nonzero only for the most recent user selection.
    pub last_selection_weight: f64,
    pub metered: bool,
    pub privileged: bool,
    pub predicted_throughput_mbps: u32,
    pub nominator: NominatorKind,
    pub current_network: bool,
    pub current_bssid: bool,
    pub open: bool,
    pub ephemeral: bool,
    pub trusted: bool,
    pub oem_paid: bool,
    pub oem_private: bool,
    pub carrier_or_privileged: bool,
    pub no_internet_unexpected: bool,
    pub security_params: SecurityParams,
}

impl Candidate {
    pub fn network_id(&self) -> NetworkId {
        self.key.network_id
    }

    pub fn bssid(&self) -> &MacAddress {
        &self.key.bssid
    }

    pub fn is_5ghz_or_above(&self) -> bool {
        self.frequency_mhz >= 4900
    }
}

/// Candidates of one cycle, deduplicated by key.
#[derive(Debug, Default)]
pub struct CandidateStore {
    by_key: IndexMap<CandidateKey, Candidate>,
}

impl CandidateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a candidate. The first registration of a key wins; later
    /// ones return `false` and are discarded.
    pub fn add(&mut self, candidate: Candidate) -> bool {
        if self.by_key.contains_key(&candidate.key) {
            debug!(
                network_id = %candidate.key.network_id,
                bssid = %candidate.key.bssid,
                nominator = %candidate.nominator,
                "duplicate candidate ignored"
            );
            return false;
        }
        debug!(
            network_id = %candidate.key.network_id,
            bssid = %candidate.key.bssid,
            security = %candidate.key.security_type,
            rssi = candidate.signal_level_dbm,
            nominator = %candidate.nominator,
            "candidate added"
        );
        self.by_key.insert(candidate.key.clone(), candidate);
        true
    }

    pub fn get(&self, key: &CandidateKey) -> Option<&Candidate> {
        self.by_key.get(key)
    }

    /// Strongest live candidate of a network.
    pub fn strongest_for(&self, network_id: NetworkId) -> Option<&Candidate> {
        self.iter()
            .filter(|c| c.key.network_id == network_id)
            .fold(None, |best: Option<&Candidate>, c| match best {
                Some(b) if b.signal_level_dbm >= c.signal_level_dbm => Some(b),
                _ => Some(c),
            })
    }

    /// Candidates grouped by network id, groups in first-seen order.
    pub fn groups(&self) -> IndexMap<NetworkId, Vec<&Candidate>> {
        let mut groups: IndexMap<NetworkId, Vec<&Candidate>> = IndexMap::new();
        for candidate in self.by_key.values() {
            groups
                .entry(candidate.key.network_id)
                .or_default()
                .push(candidate);
        }
        groups
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.by_key.values()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) fn candidate(network_id: u32, bssid: &str, rssi: i32) -> Candidate {
        Candidate {
            key: CandidateKey {
                network_id: NetworkId(network_id),
                bssid: MacAddress::new(bssid),
                security_type: SecurityType::Psk,
            },
            ssid: Ssid::from("Home"),
            signal_level_dbm: rssi,
            frequency_mhz: 2412,
            channel_width: ChannelWidth::Mhz20,
            last_selection_weight: 0.0,
            metered: false,
            privileged: false,
            predicted_throughput_mbps: 0,
            nominator: NominatorKind::Saved,
            current_network: false,
            current_bssid: false,
            open: false,
            ephemeral: false,
            trusted: true,
            oem_paid: false,
            oem_private: false,
            carrier_or_privileged: false,
            no_internet_unexpected: false,
            security_params: SecurityParams::new(SecurityType::Psk),
        }
    }

    #[test]
    fn first_registration_wins() {
        let mut store = CandidateStore::new();
        assert!(store.add(candidate(1, "aa:bb:cc:dd:ee:01", -50)));
        let mut late = candidate(1, "aa:bb:cc:dd:ee:01", -40);
        late.nominator = NominatorKind::CurrentConnection;
        assert!(!store.add(late));
        let kept = store.iter().next().map(|c| (c.signal_level_dbm, c.nominator));
        assert_eq!(kept, Some((-50, NominatorKind::Saved)));
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let mut store = CandidateStore::new();
        store.add(candidate(2, "aa:bb:cc:dd:ee:01", -50));
        store.add(candidate(1, "aa:bb:cc:dd:ee:02", -50));
        store.add(candidate(2, "aa:bb:cc:dd:ee:03", -60));
        let groups = store.groups();
        let order: Vec<u32> = groups.keys().map(|id| id.get()).collect();
        assert_eq!(order, vec![2, 1]);
        assert_eq!(groups[&NetworkId(2)].len(), 2);
    }

    #[test]
    fn strongest_for_prefers_first_on_ties() {
        let mut store = CandidateStore::new();
        store.add(candidate(1, "aa:bb:cc:dd:ee:01", -60));
        store.add(candidate(1, "aa:bb:cc:dd:ee:02", -50));
        store.add(candidate(1, "aa:bb:cc:dd:ee:03", -50));
        let best = store.strongest_for(NetworkId(1)).map(|c| c.bssid().as_str().to_owned());
        assert_eq!(best.as_deref(), Some("aa:bb:cc:dd:ee:02"));
        assert!(store.strongest_for(NetworkId(9)).is_none());
    }
}
