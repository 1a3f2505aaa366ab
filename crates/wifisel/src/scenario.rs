//! Scenario files: one selection cycle's worth of inputs.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use wifisel_core::{
    AdminPolicy, InMemoryProfileStore, InterfaceState, MacAddress, NetworkId, NetworkProfile,
    PolicyFlags, ScanObservation, StaticScores,
};

use crate::error::CliError;

/// Score an external provider assigned to one BSSID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalScore {
    pub bssid: MacAddress,
    pub score: i32,
}

/// The user's most recent manual pick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LastUserSelection {
    pub network_id: NetworkId,
    #[serde(default)]
    pub seconds_ago: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub profiles: Vec<NetworkProfile>,
    #[serde(default)]
    pub observations: Vec<ScanObservation>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceState>,
    #[serde(default)]
    pub blocklist: HashSet<MacAddress>,
    #[serde(default)]
    pub admin: AdminPolicy,
    #[serde(default)]
    pub flags: PolicyFlags,
    #[serde(default)]
    pub restricted_uids: BTreeSet<u32>,
    #[serde(default)]
    pub external_scores: Vec<ExternalScore>,
    #[serde(default)]
    pub last_user_selection: Option<LastUserSelection>,
}

impl Scenario {
    /// Read a scenario, picking the parser from the file extension.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| CliError::ScenarioUnreadable {
            path: display.clone(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let invalid = |reason: String| CliError::ScenarioInvalid {
            path: display.clone(),
            reason,
        };
        let scenario: Self = match extension.as_str() {
            "json" => serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))?,
            "yaml" | "yml" => serde_yaml::from_str(&text).map_err(|e| invalid(e.to_string()))?,
            "toml" => toml::from_str(&text).map_err(|e| invalid(e.to_string()))?,
            other => {
                return Err(CliError::ScenarioFormat {
                    extension: other.to_owned(),
                });
            }
        };
        scenario.validate().map_err(invalid)?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for profile in &self.profiles {
            if !seen.insert(profile.id) {
                return Err(format!("duplicate profile id {}", profile.id));
            }
            if profile.security_params.is_empty() {
                return Err(format!("profile {} has no security params", profile.id));
            }
        }
        if let Some(last) = self.last_user_selection {
            if !seen.contains(&last.network_id) {
                return Err(format!(
                    "last_user_selection names unknown profile {}",
                    last.network_id
                ));
            }
        }
        Ok(())
    }

    /// Profile store seeded with the scenario's profiles and last pick.
    pub fn store(&self, now: DateTime<Utc>) -> Result<InMemoryProfileStore, CliError> {
        let store = InMemoryProfileStore::with_profiles(
            self.profiles
                .iter()
                .cloned()
                .map(|p| {
                    let provenance = p.provenance;
                    p.with_provenance(provenance)
                }),
        );
        if let Some(last) = self.last_user_selection {
            let at = now - TimeDelta::seconds(i64::from(last.seconds_ago));
            store.user_select(last.network_id, at)?;
        }
        Ok(store)
    }

    pub fn external_scores(&self) -> StaticScores {
        StaticScores::new(self.external_scores.iter().map(|s| (s.bssid.clone(), s.score)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wifisel_core::ProfileStore;

    const SCENARIO: &str = r#"{
        "profiles": [
            { "id": 1, "ssid": "Home", "security_params": [{ "security_type": "psk" }] }
        ],
        "observations": [
            {
                "bssid": "AA:BB:CC:DD:EE:01",
                "ssid": "Home",
                "signal_level_dbm": -55,
                "frequency_mhz": 5180,
                "security": { "schemes": ["psk"] }
            }
        ],
        "last_user_selection": { "network_id": 1, "seconds_ago": 60 }
    }"#;

    #[test]
    fn loads_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("home.json");
        std::fs::write(&path, SCENARIO).unwrap();

        let scenario = Scenario::load(&path).unwrap();
        assert_eq!(scenario.profiles.len(), 1);
        assert_eq!(
            scenario.observations[0].bssid,
            MacAddress::new("aa:bb:cc:dd:ee:01")
        );
    }

    #[test]
    fn rejects_unknown_extension_and_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("home.txt");
        std::fs::write(&txt, SCENARIO).unwrap();
        assert!(matches!(
            Scenario::load(&txt),
            Err(CliError::ScenarioFormat { .. })
        ));

        let dup = dir.path().join("dup.yaml");
        std::fs::write(
            &dup,
            "profiles:\n\
             - { id: 1, ssid: A, security_params: [{ security_type: psk }] }\n\
             - { id: 1, ssid: B, security_params: [{ security_type: psk }] }\n",
        )
        .unwrap();
        assert!(matches!(
            Scenario::load(&dup),
            Err(CliError::ScenarioInvalid { .. })
        ));
    }

    #[test]
    fn store_keeps_explicit_ephemeral_flag() {
        let scenario: Scenario = serde_json::from_str(
            r#"{
                "profiles": [
                    { "id": 1, "ssid": "Hotel", "ephemeral": true,
                      "security_params": [{ "security_type": "open" }] },
                    { "id": 2, "ssid": "Shop", "provenance": "suggestion",
                      "security_params": [{ "security_type": "open" }] },
                    { "id": 3, "ssid": "Home",
                      "security_params": [{ "security_type": "psk" }] }
                ]
            }"#,
        )
        .unwrap();
        let store = scenario.store(Utc::now()).unwrap();
        assert!(store.configured_network(NetworkId(1)).unwrap().ephemeral);
        assert!(store.configured_network(NetworkId(2)).unwrap().ephemeral);
        assert!(!store.configured_network(NetworkId(3)).unwrap().ephemeral);
    }

    #[test]
    fn store_carries_last_user_selection() {
        let scenario: Scenario = serde_json::from_str(SCENARIO).unwrap();
        let now = Utc::now();
        let store = scenario.store(now).unwrap();
        assert_eq!(store.last_selected_network(), Some(NetworkId(1)));
        assert_eq!(
            store.last_selected_timestamp(),
            Some(now - TimeDelta::seconds(60))
        );
    }
}
