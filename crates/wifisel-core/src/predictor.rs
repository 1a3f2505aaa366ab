// ── Throughput prediction seam ──
//
// The physical-layer throughput model lives outside the engine. Scorers
// only see the number it produces, in Mbps.

use serde::{Deserialize, Serialize};

use crate::config::PhyCapabilities;
use crate::model::{ChannelWidth, ScanObservation, WifiStandard};

/// Inputs of one throughput estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThroughputQuery {
    pub phy: PhyCapabilities,
    pub standard: WifiStandard,
    pub channel_width: ChannelWidth,
    pub signal_level_dbm: i32,
    pub frequency_mhz: u32,
    pub max_spatial_streams: u8,
    pub channel_utilization: Option<u8>,
}

impl ThroughputQuery {
    pub fn for_observation(phy: PhyCapabilities, observation: &ScanObservation) -> Self {
        Self {
            phy,
            standard: observation.wifi_standard,
            channel_width: observation.channel_width,
            signal_level_dbm: observation.signal_level_dbm,
            frequency_mhz: observation.frequency_mhz,
            max_spatial_streams: observation.max_spatial_streams,
            channel_utilization: observation.channel_utilization,
        }
    }
}

/// Pure estimate of achievable throughput. Must not block.
pub trait ThroughputPredictor: Send + Sync {
    fn predict_mbps(&self, query: &ThroughputQuery) -> u32;
}

/// Predicts nothing. Throughput then plays no part in scoring.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoThroughputPrediction;

impl ThroughputPredictor for NoThroughputPrediction {
    fn predict_mbps(&self, _query: &ThroughputQuery) -> u32 {
        0
    }
}

impl<F> ThroughputPredictor for F
where
    F: Fn(&ThroughputQuery) -> u32 + Send + Sync,
{
    fn predict_mbps(&self, query: &ThroughputQuery) -> u32 {
        self(query)
    }
}
