// ── Selection tuning ──
//
// These types describe *how* a selection cycle weighs its inputs. They
// never touch disk: `wifisel-config` (or any embedder) builds a
// `SelectionConfig` and hands it to the `NetworkSelector` builder.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SelectionError;
use crate::model::{Band, ChannelWidth, UpgradePair, WifiStandard};

/// Entry and sufficiency RSSI thresholds for one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandThresholds {
    /// Observations weaker than this are filtered out.
    pub entry_rssi_dbm: i32,
    /// Signal beyond this earns no further RSSI score.
    pub sufficient_rssi_dbm: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RssiThresholds {
    pub ghz2_4: BandThresholds,
    pub ghz5: BandThresholds,
    pub ghz6: BandThresholds,
}

impl Default for RssiThresholds {
    fn default() -> Self {
        Self {
            ghz2_4: BandThresholds {
                entry_rssi_dbm: -80,
                sufficient_rssi_dbm: -73,
            },
            ghz5: BandThresholds {
                entry_rssi_dbm: -77,
                sufficient_rssi_dbm: -70,
            },
            ghz6: BandThresholds {
                entry_rssi_dbm: -77,
                sufficient_rssi_dbm: -70,
            },
        }
    }
}

impl RssiThresholds {
    /// Unknown bands are held to the 2.4 GHz thresholds.
    pub fn for_band(&self, band: Band) -> BandThresholds {
        match band {
            Band::Ghz5 => self.ghz5,
            Band::Ghz6 => self.ghz6,
            Band::Ghz2_4 | Band::Unknown => self.ghz2_4,
        }
    }

    pub fn for_frequency(&self, frequency_mhz: u32) -> BandThresholds {
        self.for_band(Band::from_frequency(frequency_mhz))
    }
}

/// Per-pair switches for WPA3-era auto-upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoUpgradeConfig {
    pub sae: bool,
    pub owe: bool,
    pub wpa3_enterprise: bool,
}

impl Default for AutoUpgradeConfig {
    fn default() -> Self {
        Self {
            sae: true,
            owe: true,
            wpa3_enterprise: true,
        }
    }
}

impl AutoUpgradeConfig {
    pub fn is_enabled(&self, pair: UpgradePair) -> bool {
        match pair {
            UpgradePair::PskToSae => self.sae,
            UpgradePair::OpenToOwe => self.owe,
            UpgradePair::EapToWpa3Enterprise => self.wpa3_enterprise,
        }
    }
}

/// Weights of the throughput scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThroughputScoringParams {
    pub rssi_score_offset: i32,
    pub rssi_score_slope: i32,
    pub throughput_bonus_numerator: i32,
    pub throughput_bonus_denominator: i32,
    pub throughput_bonus_limit: i32,
    pub current_network_boost_percent: i32,
    pub current_network_boost_min: i32,
    pub secure_network_award: i32,
    pub unmetered_network_award: i32,
    pub saved_network_award: i32,
    pub trusted_network_award: i32,
    pub last_selection_boost: i32,
}

impl Default for ThroughputScoringParams {
    fn default() -> Self {
        Self {
            rssi_score_offset: 85,
            rssi_score_slope: 4,
            throughput_bonus_numerator: 120,
            throughput_bonus_denominator: 433,
            throughput_bonus_limit: 320,
            current_network_boost_percent: 20,
            current_network_boost_min: 16,
            secure_network_award: 40,
            unmetered_network_award: 1000,
            saved_network_award: 500,
            trusted_network_award: 1000,
            last_selection_boost: 1900,
        }
    }
}

/// What this station's radio can do, fed to the throughput predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhyCapabilities {
    pub max_standard: WifiStandard,
    pub max_channel_width: ChannelWidth,
    pub max_spatial_streams: u8,
}

impl Default for PhyCapabilities {
    fn default() -> Self {
        Self {
            max_standard: WifiStandard::Ax,
            max_channel_width: ChannelWidth::Mhz80,
            max_spatial_streams: 2,
        }
    }
}

/// Everything a `NetworkSelector` is tuned by.
///
/// Built by the embedder, passed to the selector builder. Core never reads
/// config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub rssi: RssiThresholds,
    /// Connected links scoring at or above this are "good enough".
    pub poor_score_threshold: i32,
    pub auto_upgrade: AutoUpgradeConfig,
    /// Identifier of the scorer that decides.
    pub active_scorer: String,
    /// Overrides `active_scorer` when non-zero and registered.
    pub experiment_id: u32,
    /// A connect-choice target may be this much weaker than recorded.
    pub user_choice_rssi_margin_db: i32,
    /// Seconds over which the last user selection boost fades out.
    pub last_selection_window_secs: u64,
    pub throughput: ThroughputScoringParams,
    pub phy: PhyCapabilities,
    /// Minimum seconds between two selections while the link is sufficient.
    pub min_selection_interval_secs: u64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            rssi: RssiThresholds::default(),
            poor_score_threshold: 40,
            auto_upgrade: AutoUpgradeConfig::default(),
            active_scorer: crate::scorer::THROUGHPUT_SCORER.into(),
            experiment_id: 0,
            user_choice_rssi_margin_db: 5,
            last_selection_window_secs: 8 * 60 * 60,
            throughput: ThroughputScoringParams::default(),
            phy: PhyCapabilities::default(),
            min_selection_interval_secs: 10,
        }
    }
}

impl SelectionConfig {
    pub fn last_selection_window(&self) -> Duration {
        Duration::from_secs(self.last_selection_window_secs)
    }

    pub fn min_selection_interval(&self) -> Duration {
        Duration::from_secs(self.min_selection_interval_secs)
    }

    /// Reject tunings that would make a cycle meaningless.
    pub fn validate(&self) -> Result<(), SelectionError> {
        for (band, t) in [
            ("2.4GHz", self.rssi.ghz2_4),
            ("5GHz", self.rssi.ghz5),
            ("6GHz", self.rssi.ghz6),
        ] {
            if t.entry_rssi_dbm > t.sufficient_rssi_dbm {
                return Err(SelectionError::config(format!(
                    "{band} entry threshold {} dBm is above sufficient threshold {} dBm",
                    t.entry_rssi_dbm, t.sufficient_rssi_dbm
                )));
            }
        }
        if self.user_choice_rssi_margin_db < 0 {
            return Err(SelectionError::config(
                "user_choice_rssi_margin_db must not be negative",
            ));
        }
        if self.last_selection_window_secs == 0 {
            return Err(SelectionError::config(
                "last_selection_window_secs must be positive",
            ));
        }
        if self.throughput.throughput_bonus_denominator <= 0 {
            return Err(SelectionError::config(
                "throughput_bonus_denominator must be positive",
            ));
        }
        if self.active_scorer.trim().is_empty() {
            return Err(SelectionError::config("active_scorer must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(SelectionConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_band_thresholds_are_rejected() {
        let mut config = SelectionConfig::default();
        config.rssi.ghz5.entry_rssi_dbm = -60;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("5GHz"));
    }

    #[test]
    fn unknown_band_uses_2_4_ghz_thresholds() {
        let rssi = RssiThresholds::default();
        assert_eq!(rssi.for_frequency(60_480), rssi.ghz2_4);
        assert_eq!(rssi.for_frequency(5955), rssi.ghz6);
    }
}
