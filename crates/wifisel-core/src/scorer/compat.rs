// ── Compatibility scorer ──

use super::throughput::weighted;
use super::{CandidateScorer, COMPATIBILITY_SCORER, rssi_base_score};
use crate::candidate::Candidate;
use crate::config::{RssiThresholds, SelectionConfig};

const RSSI_SCORE_OFFSET: i32 = 85;
const RSSI_SCORE_SLOPE: i32 = 4;
const BAND_5GHZ_AWARD: i32 = 40;
const LAST_SELECTION_AWARD: i32 = 480;
const CURRENT_NETWORK_BOOST: i32 = 16;
const SECURITY_AWARD: i32 = 80;

/// Signal-first scorer retained for comparison runs and experiments.
#[derive(Debug, Clone)]
pub struct CompatibilityScorer {
    rssi: RssiThresholds,
}

impl CompatibilityScorer {
    pub fn new(rssi: RssiThresholds) -> Self {
        Self { rssi }
    }

    pub fn from_config(config: &SelectionConfig) -> Self {
        Self::new(config.rssi)
    }
}

impl CandidateScorer for CompatibilityScorer {
    fn identifier(&self) -> &str {
        COMPATIBILITY_SCORER
    }

    fn score_candidate(&self, candidate: &Candidate) -> i32 {
        let mut score =
            rssi_base_score(candidate, &self.rssi, RSSI_SCORE_OFFSET, RSSI_SCORE_SLOPE);
        if candidate.is_5ghz_or_above() {
            score = score.saturating_add(BAND_5GHZ_AWARD);
        }
        score = score.saturating_add(weighted(
            candidate.last_selection_weight,
            LAST_SELECTION_AWARD,
        ));
        if candidate.current_network {
            score = score.saturating_add(CURRENT_NETWORK_BOOST);
        }
        if !candidate.open {
            score = score.saturating_add(SECURITY_AWARD);
        }
        score
    }

    fn error_bound(&self) -> i32 {
        RSSI_SCORE_SLOPE * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::tests::candidate;

    #[test]
    fn five_ghz_and_security_awards() {
        let scorer = CompatibilityScorer::from_config(&SelectionConfig::default());
        let mut c = candidate(1, "aa:bb:cc:dd:ee:01", -70);
        // 2.4 GHz: capped at -73 -> 48, plus security 80.
        assert_eq!(scorer.score_candidate(&c), 48 + 80);
        c.frequency_mhz = 5180;
        // 5 GHz: -70 -> 60, plus band 40 and security 80.
        assert_eq!(scorer.score_candidate(&c), 60 + 40 + 80);
        c.current_network = true;
        c.last_selection_weight = 0.5;
        assert_eq!(scorer.score_candidate(&c), 60 + 40 + 80 + 16 + 240);
    }

    #[test]
    fn reports_error_bound() {
        let scorer = CompatibilityScorer::from_config(&SelectionConfig::default());
        let c = candidate(1, "aa:bb:cc:dd:ee:01", -60);
        let choice = scorer.score_group(&[&c]).ok().flatten();
        assert_eq!(choice.map(|c| c.err), Some(16));
    }
}
