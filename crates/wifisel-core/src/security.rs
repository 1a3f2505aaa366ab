// ── Security reconciliation ──
//
// Picks the one security variant a candidate will connect with: advertised
// by the AP, enabled in the profile, highest in the profile's priority.

use std::collections::BTreeSet;

use tracing::debug;

use crate::config::AutoUpgradeConfig;
use crate::model::{NetworkProfile, ScanObservation, SecurityParams, SecurityType, UpgradePair};

/// Reconcile `profile` against `observation`.
///
/// `batch` is the filtered observation batch of the cycle; it decides
/// whether an auto-upgraded variant is held back to avoid flapping between
/// legacy and upgraded security on one SSID. Returns `None` when no
/// variant is usable, which disqualifies the candidate.
pub fn reconcile(
    profile: &NetworkProfile,
    observation: &ScanObservation,
    batch: &[ScanObservation],
    auto_upgrade: &AutoUpgradeConfig,
) -> Option<SecurityParams> {
    let mut variants = observation.security.security_types();

    let suppressed: BTreeSet<SecurityType> = UpgradePair::all()
        .into_iter()
        .filter(|pair| should_suppress_upgrade(*pair, profile, observation, batch, auto_upgrade))
        .map(UpgradePair::upgraded)
        .collect();

    // A raw hex key is a WPA2 PMK and cannot drive SAE.
    if profile.has_hex_psk() {
        variants.remove(&SecurityType::Sae);
    }

    let chosen = profile.enabled_params().find(|p| {
        variants.contains(&p.security_type)
            && !(p.added_by_auto_upgrade && suppressed.contains(&p.security_type))
    })?;

    let mut params = *chosen;
    let relaxes_pmf = match params.security_type {
        SecurityType::Sae => Some(UpgradePair::PskToSae),
        SecurityType::EapWpa3Enterprise => Some(UpgradePair::EapToWpa3Enterprise),
        _ => None,
    };
    if let Some(pair) = relaxes_pmf {
        if observation.security.is_transition_for(pair) {
            params = params.with_pmf_required(false);
        }
    }

    debug!(
        network_id = %profile.id,
        bssid = %observation.bssid,
        security = %params.security_type,
        pmf = params.require_pmf,
        "security reconciled"
    );
    Some(params)
}

fn should_suppress_upgrade(
    pair: UpgradePair,
    profile: &NetworkProfile,
    observation: &ScanObservation,
    batch: &[ScanObservation],
    auto_upgrade: &AutoUpgradeConfig,
) -> bool {
    if !auto_upgrade.is_enabled(pair) || !profile.has_enabled(pair.base()) {
        return false;
    }
    let same_ssid = || batch.iter().filter(|o| o.ssid == observation.ssid);
    let legacy_only = same_ssid().any(|o| o.security.is_legacy_only(pair));
    let upgrade_only = same_ssid().any(|o| o.security.is_upgrade_only(pair));
    legacy_only && !upgrade_only
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AdvertisedScheme, SecurityAdvertisement};
    use pretty_assertions::assert_eq;

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

    fn ap(bssid: &str, scheme: AdvertisedScheme) -> ScanObservation {
        ScanObservation::new(bssid, "Home", -55, 5180, SecurityAdvertisement::single(scheme))
    }

    fn chosen(
        profile: &NetworkProfile,
        obs: &ScanObservation,
        batch: &[ScanObservation],
    ) -> Option<SecurityType> {
        reconcile(profile, obs, batch, &AutoUpgradeConfig::default()).map(|p| p.security_type)
    }

    #[test]
    fn transition_ap_prefers_sae_with_relaxed_pmf() {
        let obs = ap("aa:bb:cc:dd:ee:01", AdvertisedScheme::PskSaeTransition);
        let params = reconcile(&home(), &obs, &[obs.clone()], &AutoUpgradeConfig::default());
        let params = params.unwrap_or_else(|| panic!("expected params"));
        assert_eq!(params.security_type, SecurityType::Sae);
        assert!(!params.require_pmf);
    }

    #[test]
    fn legacy_only_neighbour_holds_back_auto_upgrade() {
        let transition = ap("aa:bb:cc:dd:ee:01", AdvertisedScheme::PskSaeTransition);
        let legacy = ap("aa:bb:cc:dd:ee:02", AdvertisedScheme::Psk);
        let batch = [transition.clone(), legacy];
        assert_eq!(chosen(&home(), &transition, &batch), Some(SecurityType::Psk));

        let disabled = AutoUpgradeConfig {
            sae: false,
            ..AutoUpgradeConfig::default()
        };
        let params = reconcile(&home(), &transition, &batch, &disabled).map(|p| p.security_type);
        assert_eq!(params, Some(SecurityType::Sae));
    }

    #[test]
    fn mixed_legacy_and_sae_only_aps_keep_both_variants() {
        let legacy = ap("aa:bb:cc:dd:ee:01", AdvertisedScheme::Psk);
        let sae = ap("aa:bb:cc:dd:ee:02", AdvertisedScheme::Sae);
        let batch = [legacy.clone(), sae.clone()];
        assert_eq!(chosen(&home(), &legacy, &batch), Some(SecurityType::Psk));
        let on_sae = reconcile(&home(), &sae, &batch, &AutoUpgradeConfig::default())
            .unwrap_or_else(|| panic!("expected params"));
        assert_eq!(on_sae.security_type, SecurityType::Sae);
        assert!(on_sae.require_pmf);
    }

    #[test]
    fn hex_psk_never_uses_sae() {
        let hex = "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff";
        let profile = home().with_pre_shared_key(hex);
        let sae = ap("aa:bb:cc:dd:ee:02", AdvertisedScheme::Sae);
        assert_eq!(chosen(&profile, &sae, &[sae.clone()]), None);
        let transition = ap("aa:bb:cc:dd:ee:01", AdvertisedScheme::PskSaeTransition);
        assert_eq!(chosen(&profile, &transition, &[transition.clone()]), Some(SecurityType::Psk));
    }

    #[test]
    fn disabled_variants_are_never_chosen() {
        let profile = NetworkProfile::new(
            2,
            "Home",
            [SecurityParams::new(SecurityType::Psk).disabled()],
        );
        let obs = ap("aa:bb:cc:dd:ee:01", AdvertisedScheme::Psk);
        assert_eq!(chosen(&profile, &obs, &[obs.clone()]), None);
    }

    #[test]
    fn reconciliation_is_deterministic() {
        let transition = ap("aa:bb:cc:dd:ee:01", AdvertisedScheme::PskSaeTransition);
        let legacy = ap("aa:bb:cc:dd:ee:02", AdvertisedScheme::Psk);
        let batch = [transition.clone(), legacy];
        let first = reconcile(&home(), &transition, &batch, &AutoUpgradeConfig::default());
        for _ in 0..10 {
            assert_eq!(
                reconcile(&home(), &transition, &batch, &AutoUpgradeConfig::default()),
                first
            );
        }
    }
}
