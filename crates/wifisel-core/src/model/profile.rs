// ── Network profile types ──
//
// A `NetworkProfile` is a locally known network identity as owned by the
// profile store. The engine reads profiles and writes back a few selection
// fields (candidate scan result, enable status) through the store contract.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use strum::Display;

use super::ids::{MacAddress, NetworkId};
use super::scan::Ssid;
use super::security::{SecurityParams, SecurityType};

/// Where a profile came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Provenance {
    /// Added by the user.
    #[default]
    Saved,
    /// Proposed by an app through the suggestion API.
    Suggestion,
    /// Recommended by an external network scorer.
    ExternallyScored,
    /// Provisioned by the carrier.
    Carrier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeteredOverride {
    #[default]
    Auto,
    Metered,
    NotMetered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DisableReason {
    AssociationRejection,
    AuthenticationFailure,
    DhcpFailure,
    NoInternetTemporary,
    WrongPassword,
    NoInternetPermanent,
    ByUser,
}

impl DisableReason {
    /// Reasons that never expire on their own.
    pub fn is_permanent(self) -> bool {
        matches!(
            self,
            Self::WrongPassword | Self::NoInternetPermanent | Self::ByUser
        )
    }
}

/// Network-selection enable status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum SelectionStatus {
    #[default]
    Enabled,
    TemporarilyDisabled {
        reason: DisableReason,
        until: DateTime<Utc>,
    },
    PermanentlyDisabled {
        reason: DisableReason,
    },
}

impl SelectionStatus {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled)
    }
}

/// A user preference edge: "when this profile is chosen, prefer `network_id`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectChoice {
    pub network_id: NetworkId,
    /// Signal of the preferred network when the choice was recorded.
    /// 0 means the choice predates signal recording.
    #[serde(default)]
    pub rssi_dbm: i32,
}

/// The scan result the last selection cycle associated with a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateScanResult {
    pub bssid: MacAddress,
    pub signal_level_dbm: i32,
    pub frequency_mhz: u32,
    pub security_params: SecurityParams,
}

/// A locally known network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkProfile {
    pub id: NetworkId,
    pub ssid: Ssid,
    /// Configured variants in priority order, highest first.
    pub security_params: Vec<SecurityParams>,
    #[serde(default, skip_serializing, deserialize_with = "deserialize_secret")]
    pub pre_shared_key: Option<SecretString>,
    #[serde(default)]
    pub metered_override: MeteredOverride,
    #[serde(default)]
    pub provenance: Provenance,
    #[serde(default)]
    pub ephemeral: bool,
    #[serde(default = "default_true")]
    pub trusted: bool,
    #[serde(default)]
    pub oem_paid: bool,
    #[serde(default)]
    pub oem_private: bool,
    #[serde(default)]
    pub restricted: bool,
    #[serde(default)]
    pub carrier_privileged: bool,
    #[serde(default)]
    pub creator_uid: u32,
    #[serde(default = "default_true")]
    pub allow_autojoin: bool,
    #[serde(default)]
    pub use_external_scores: bool,
    #[serde(default)]
    pub has_no_internet_access: bool,
    #[serde(default)]
    pub no_internet_access_expected: bool,
    #[serde(default)]
    pub status: SelectionStatus,
    #[serde(default)]
    pub disable_counters: BTreeMap<DisableReason, u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_choice: Option<ConnectChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate: Option<CandidateScanResult>,
}

fn default_true() -> bool {
    true
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

impl NetworkProfile {
    pub fn new(
        id: impl Into<NetworkId>,
        ssid: impl Into<Ssid>,
        security_params: impl IntoIterator<Item = SecurityParams>,
    ) -> Self {
        Self {
            id: id.into(),
            ssid: ssid.into(),
            security_params: security_params.into_iter().collect(),
            pre_shared_key: None,
            metered_override: MeteredOverride::default(),
            provenance: Provenance::default(),
            ephemeral: false,
            trusted: true,
            oem_paid: false,
            oem_private: false,
            restricted: false,
            carrier_privileged: false,
            creator_uid: 0,
            allow_autojoin: true,
            use_external_scores: false,
            has_no_internet_access: false,
            no_internet_access_expected: false,
            status: SelectionStatus::default(),
            disable_counters: BTreeMap::new(),
            connect_choice: None,
            candidate: None,
        }
    }

    /// Set the provenance. Suggested and externally scored networks are
    /// always ephemeral; an explicit `ephemeral` flag is never cleared.
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self.ephemeral |= matches!(
            provenance,
            Provenance::Suggestion | Provenance::ExternallyScored
        );
        self
    }

    pub fn with_pre_shared_key(mut self, key: impl Into<String>) -> Self {
        self.pre_shared_key = Some(SecretString::from(key.into()));
        self
    }

    pub fn with_connect_choice(mut self, network_id: NetworkId, rssi_dbm: i32) -> Self {
        self.connect_choice = Some(ConnectChoice {
            network_id,
            rssi_dbm,
        });
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.status.is_enabled()
    }

    /// Enabled configured variants, in priority order.
    pub fn enabled_params(&self) -> impl Iterator<Item = &SecurityParams> {
        self.security_params.iter().filter(|p| p.enabled)
    }

    pub fn has_enabled(&self, security_type: SecurityType) -> bool {
        self.enabled_params()
            .any(|p| p.security_type == security_type)
    }

    pub fn is_metered(&self) -> bool {
        match self.metered_override {
            MeteredOverride::Metered => true,
            MeteredOverride::NotMetered => false,
            MeteredOverride::Auto => self.provenance == Provenance::Carrier,
        }
    }

    pub fn is_carrier_or_privileged(&self) -> bool {
        self.provenance == Provenance::Carrier || self.carrier_privileged
    }

    /// Lacks Internet access although Internet was expected.
    pub fn has_unexpected_no_internet(&self) -> bool {
        self.has_no_internet_access && !self.no_internet_access_expected
    }

    /// The PSK is a raw 256-bit key in hex form, usable with WPA2 only.
    pub fn has_hex_psk(&self) -> bool {
        self.pre_shared_key.as_ref().is_some_and(|key| {
            let key = key.expose_secret();
            key.len() == 64 && key.chars().all(|c| c.is_ascii_hexdigit())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::security::UpgradePair;

    fn home() -> NetworkProfile {
        NetworkProfile::new(
            1,
            "Home",
            [
                SecurityParams::auto_upgraded(UpgradePair::PskToSae),
                SecurityParams::new(SecurityType::Psk),
            ],
        )
    }

    #[test]
    fn hex_psk_detection() {
        let hex = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
        assert!(home().with_pre_shared_key(hex).has_hex_psk());
        assert!(!home().with_pre_shared_key("correct horse").has_hex_psk());
        assert!(!home().has_hex_psk());
    }

    #[test]
    fn enabled_params_keep_priority_order() {
        let mut profile = home();
        profile.security_params.push(SecurityParams::new(SecurityType::Open).disabled());
        let order: Vec<_> = profile.enabled_params().map(|p| p.security_type).collect();
        assert_eq!(order, vec![SecurityType::Sae, SecurityType::Psk]);
        assert!(!profile.has_enabled(SecurityType::Open));
    }

    #[test]
    fn provenance_forces_but_never_clears_ephemeral() {
        assert!(home().with_provenance(Provenance::Suggestion).ephemeral);
        assert!(home().with_provenance(Provenance::ExternallyScored).ephemeral);
        assert!(!home().with_provenance(Provenance::Carrier).ephemeral);

        let mut transient = home();
        transient.ephemeral = true;
        assert!(transient.with_provenance(Provenance::Saved).ephemeral);
    }

    #[test]
    fn carrier_profiles_are_metered_by_default() {
        let carrier = home().with_provenance(Provenance::Carrier);
        assert!(carrier.is_metered());
        assert!(carrier.is_carrier_or_privileged());
        let mut overridden = carrier;
        overridden.metered_override = MeteredOverride::NotMetered;
        assert!(!overridden.is_metered());
    }

    #[test]
    fn profile_deserializes_with_password() {
        let json = r#"{
            "id": 3,
            "ssid": "Cafe",
            "security_params": [{ "security_type": "psk" }],
            "pre_shared_key": "espresso"
        }"#;
        let profile: NetworkProfile =
            serde_json::from_str(json).unwrap_or_else(|e| panic!("{e}"));
        assert!(profile.pre_shared_key.is_some());
        assert!(profile.trusted);
        assert!(profile.allow_autojoin);
        assert!(profile.is_enabled());
    }
}
