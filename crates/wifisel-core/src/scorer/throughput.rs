// ── Throughput scorer ──

use super::{CandidateScorer, THROUGHPUT_SCORER, rssi_base_score};
use crate::candidate::Candidate;
use crate::config::{RssiThresholds, SelectionConfig, ThroughputScoringParams};

/// Default scorer: signal plus predicted throughput, with large awards
/// for unmetered, saved, and trusted networks.
#[derive(Debug, Clone)]
pub struct ThroughputScorer {
    params: ThroughputScoringParams,
    rssi: RssiThresholds,
}

impl ThroughputScorer {
    pub fn new(params: ThroughputScoringParams, rssi: RssiThresholds) -> Self {
        Self { params, rssi }
    }

    pub fn from_config(config: &SelectionConfig) -> Self {
        Self::new(config.throughput, config.rssi)
    }

    fn throughput_bonus(&self, mbps: u32) -> i32 {
        let p = &self.params;
        let bonus = i64::from(mbps) * i64::from(p.throughput_bonus_numerator)
            / i64::from(p.throughput_bonus_denominator.max(1));
        i32::try_from(bonus.min(i64::from(p.throughput_bonus_limit)))
            .unwrap_or(p.throughput_bonus_limit)
    }
}

impl CandidateScorer for ThroughputScorer {
    fn identifier(&self) -> &str {
        THROUGHPUT_SCORER
    }

    fn score_candidate(&self, candidate: &Candidate) -> i32 {
        let p = &self.params;
        let rssi_base =
            rssi_base_score(candidate, &self.rssi, p.rssi_score_offset, p.rssi_score_slope);
        let throughput_bonus = self.throughput_bonus(candidate.predicted_throughput_mbps);

        // No Internet where Internet was expected cancels both stickiness boosts.
        let unexpected_no_internet = candidate.no_internet_unexpected;

        let current_network_boost = if candidate.current_network && !unexpected_no_internet {
            (rssi_base
                .saturating_add(throughput_bonus)
                .saturating_mul(p.current_network_boost_percent)
                / 100)
                .max(p.current_network_boost_min)
        } else {
            0
        };

        let last_selection_boost = if unexpected_no_internet {
            0
        } else {
            weighted(candidate.last_selection_weight, p.last_selection_boost)
        };

        let security_award = if candidate.open { 0 } else { p.secure_network_award };
        let unmetered_award = if candidate.metered { 0 } else { p.unmetered_network_award };
        let saved_award = if !candidate.ephemeral && candidate.trusted {
            p.saved_network_award
        } else {
            0
        };
        let trusted_award = if candidate.trusted && !candidate.oem_paid && !candidate.oem_private {
            p.trusted_network_award
        } else {
            0
        };

        // Weights come from config; saturate rather than overflow.
        [
            throughput_bonus,
            current_network_boost,
            last_selection_boost,
            security_award,
            unmetered_award,
            saved_award,
            trusted_award,
        ]
        .into_iter()
        .fold(rssi_base, i32::saturating_add)
    }
}

/// `weight * award`, rounded. `weight` is clamped to [0, 1].
#[allow(clippy::cast_possible_truncation)]
pub(super) fn weighted(weight: f64, award: i32) -> i32 {
    (weight.clamp(0.0, 1.0) * f64::from(award)).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::tests::candidate;

    fn scorer() -> ThroughputScorer {
        ThroughputScorer::from_config(&SelectionConfig::default())
    }

    #[test]
    fn baseline_saved_trusted_network() {
        // rssi -80 on 2.4 GHz: (-80 + 85) * 4 = 20, plus awards 40 + 1000 + 500 + 1000.
        let c = candidate(1, "aa:bb:cc:dd:ee:01", -80);
        assert_eq!(scorer().score_candidate(&c), 20 + 40 + 1000 + 500 + 1000);
    }

    #[test]
    fn rssi_is_capped_at_sufficient() {
        let strong = candidate(1, "aa:bb:cc:dd:ee:01", -30);
        let sufficient = candidate(1, "aa:bb:cc:dd:ee:02", -73);
        assert_eq!(scorer().score_candidate(&strong), scorer().score_candidate(&sufficient));
    }

    #[test]
    fn throughput_bonus_is_limited() {
        let s = scorer();
        assert_eq!(s.throughput_bonus(433), 120);
        assert_eq!(s.throughput_bonus(10_000), 320);
        assert_eq!(s.throughput_bonus(0), 0);
    }

    #[test]
    fn current_network_boost_has_a_floor() {
        let mut c = candidate(1, "aa:bb:cc:dd:ee:01", -80);
        let base = scorer().score_candidate(&c);
        c.current_network = true;
        // 20% of 20 is 4, below the floor of 16.
        assert_eq!(scorer().score_candidate(&c) - base, 16);
    }

    #[test]
    fn unexpected_no_internet_cancels_boosts() {
        let mut c = candidate(1, "aa:bb:cc:dd:ee:01", -60);
        c.current_network = true;
        c.last_selection_weight = 1.0;
        let boosted = scorer().score_candidate(&c);
        c.no_internet_unexpected = true;
        let cancelled = scorer().score_candidate(&c);
        // (-73 + 85) * 4 = 48 -> boost max(9, 16) = 16, plus 1900.
        assert_eq!(boosted - cancelled, 16 + 1900);
    }

    #[test]
    fn metered_untrusted_ephemeral_lose_awards() {
        let mut c = candidate(1, "aa:bb:cc:dd:ee:01", -80);
        c.metered = true;
        c.ephemeral = true;
        c.trusted = false;
        c.open = true;
        assert_eq!(scorer().score_candidate(&c), 20);
    }

    #[test]
    fn extreme_weights_saturate() {
        let params = ThroughputScoringParams {
            rssi_score_slope: i32::MAX,
            current_network_boost_percent: i32::MAX,
            unmetered_network_award: i32::MAX - 100,
            trusted_network_award: i32::MAX - 100,
            last_selection_boost: i32::MAX,
            ..ThroughputScoringParams::default()
        };
        let s = ThroughputScorer::new(params, RssiThresholds::default());
        let mut c = candidate(1, "aa:bb:cc:dd:ee:01", -60);
        c.current_network = true;
        c.last_selection_weight = 1.0;
        assert_eq!(s.score_candidate(&c), i32::MAX);

        let negative = ThroughputScorer::new(
            ThroughputScoringParams {
                rssi_score_offset: i32::MIN,
                saved_network_award: i32::MIN,
                ..ThroughputScoringParams::default()
            },
            RssiThresholds::default(),
        );
        assert!(negative.score_candidate(&c) < 0);
    }

    #[test]
    fn weighted_rounds_and_clamps() {
        assert_eq!(weighted(0.5, 1900), 950);
        assert_eq!(weighted(1.5, 480), 480);
        assert_eq!(weighted(-1.0, 480), 0);
    }
}
