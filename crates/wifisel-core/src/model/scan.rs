// ── Scan observation types ──
//
// One `ScanObservation` is one beacon / probe-response sighting, normalized
// by the scan layer. Observations are immutable once produced.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use strum::Display;

use super::ids::MacAddress;
use super::security::SecurityAdvertisement;

// ── SSID ────────────────────────────────────────────────────────────

/// Raw network name. Up to 32 arbitrary octets on the air.
///
/// Serialized as a string when the octets are valid UTF-8, else as an array
/// of octets. Both forms deserialize.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[serde(from = "SsidRepr")]
pub struct Ssid(Vec<u8>);

#[derive(Deserialize)]
#[serde(untagged)]
enum SsidRepr {
    Text(String),
    Octets(Vec<u8>),
}

impl From<SsidRepr> for Ssid {
    fn from(repr: SsidRepr) -> Self {
        match repr {
            SsidRepr::Text(s) => Self(s.into_bytes()),
            SsidRepr::Octets(bytes) => Self(bytes),
        }
    }
}

impl Serialize for Ssid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match std::str::from_utf8(&self.0) {
            Ok(text) => serializer.serialize_str(text),
            Err(_) => serializer.collect_seq(&self.0),
        }
    }
}

impl Ssid {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty() || self.0.iter().all(|b| *b == 0)
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl fmt::Display for Ssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.to_string_lossy())
    }
}

impl From<String> for Ssid {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl From<&str> for Ssid {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

// ── Radio parameters ────────────────────────────────────────────────

/// Frequency band, derived from the center frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
pub enum Band {
    #[strum(serialize = "2.4GHz")]
    Ghz2_4,
    #[strum(serialize = "5GHz")]
    Ghz5,
    #[strum(serialize = "6GHz")]
    Ghz6,
    #[strum(serialize = "unknown")]
    Unknown,
}

impl Band {
    pub fn from_frequency(frequency_mhz: u32) -> Self {
        match frequency_mhz {
            2400..=2500 => Self::Ghz2_4,
            4900..=5900 => Self::Ghz5,
            5925..=7125 => Self::Ghz6,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelWidth {
    #[default]
    #[strum(serialize = "20MHz")]
    Mhz20,
    #[strum(serialize = "40MHz")]
    Mhz40,
    #[strum(serialize = "80MHz")]
    Mhz80,
    #[strum(serialize = "160MHz")]
    Mhz160,
    #[strum(serialize = "80+80MHz")]
    Mhz80Plus80,
    #[strum(serialize = "320MHz")]
    Mhz320,
}

/// 802.11 generation the AP operates in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum WifiStandard {
    #[default]
    Legacy,
    #[serde(rename = "11n")]
    N,
    #[serde(rename = "11ac")]
    Ac,
    #[serde(rename = "11ax")]
    Ax,
    #[serde(rename = "11be")]
    Be,
}

// ── ScanObservation ─────────────────────────────────────────────────

/// One sighting of one BSS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanObservation {
    pub bssid: MacAddress,
    pub ssid: Ssid,
    pub signal_level_dbm: i32,
    pub frequency_mhz: u32,
    #[serde(default)]
    pub channel_width: ChannelWidth,
    #[serde(default)]
    pub security: SecurityAdvertisement,
    /// MBO-OCE "association disallowed" attribute present.
    #[serde(default)]
    pub association_restricted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restriction_reason_code: Option<u32>,
    #[serde(default)]
    pub wifi_standard: WifiStandard,
    #[serde(default = "default_spatial_streams")]
    pub max_spatial_streams: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_utilization: Option<u8>,
}

fn default_spatial_streams() -> u8 {
    1
}

impl ScanObservation {
    pub fn new(
        bssid: impl Into<MacAddress>,
        ssid: impl Into<Ssid>,
        signal_level_dbm: i32,
        frequency_mhz: u32,
        security: SecurityAdvertisement,
    ) -> Self {
        Self {
            bssid: bssid.into(),
            ssid: ssid.into(),
            signal_level_dbm,
            frequency_mhz,
            channel_width: ChannelWidth::default(),
            security,
            association_restricted: false,
            restriction_reason_code: None,
            wifi_standard: WifiStandard::default(),
            max_spatial_streams: default_spatial_streams(),
            channel_utilization: None,
        }
    }

    pub fn band(&self) -> Band {
        Band::from_frequency(self.frequency_mhz)
    }

    pub fn with_channel_width(mut self, width: ChannelWidth) -> Self {
        self.channel_width = width;
        self
    }

    pub fn with_standard(mut self, standard: WifiStandard, spatial_streams: u8) -> Self {
        self.wifi_standard = standard;
        self.max_spatial_streams = spatial_streams;
        self
    }

    pub fn with_association_restricted(mut self, reason_code: Option<u32>) -> Self {
        self.association_restricted = true;
        self.restriction_reason_code = reason_code;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::security::AdvertisedScheme;

    #[test]
    fn band_from_frequency() {
        assert_eq!(Band::from_frequency(2437), Band::Ghz2_4);
        assert_eq!(Band::from_frequency(5180), Band::Ghz5);
        assert_eq!(Band::from_frequency(5955), Band::Ghz6);
        assert_eq!(Band::from_frequency(60_480), Band::Unknown);
    }

    #[test]
    fn nul_only_ssid_counts_as_empty() {
        assert!(Ssid::from_bytes(vec![0, 0, 0]).is_empty());
        assert!(Ssid::from("").is_empty());
        assert!(!Ssid::from("Home").is_empty());
    }

    #[test]
    fn ssid_octets_survive_serde() {
        let raw = Ssid::from_bytes([0x48, 0xff, 0x49]);
        let json = serde_json::to_string(&raw).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(json, "[72,255,73]");
        let back: Ssid = serde_json::from_str(&json).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(back, raw);

        let text = Ssid::from("Café");
        let json = serde_json::to_string(&text).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(json, "\"Café\"");
        let back: Ssid = serde_json::from_str(&json).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(back, text);
    }

    #[test]
    fn observation_deserializes_with_defaults() {
        let json = r#"{
            "bssid": "AA-BB-CC-DD-EE-01",
            "ssid": "Home",
            "signal_level_dbm": -55,
            "frequency_mhz": 5180,
            "security": { "schemes": ["psk-sae-transition"] }
        }"#;
        let obs: ScanObservation = serde_json::from_str(json).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(obs.bssid.as_str(), "aa:bb:cc:dd:ee:01");
        assert_eq!(obs.channel_width, ChannelWidth::Mhz20);
        assert_eq!(obs.max_spatial_streams, 1);
        assert_eq!(obs.security.schemes, vec![AdvertisedScheme::PskSaeTransition]);
        assert_eq!(obs.band(), Band::Ghz5);
    }
}
