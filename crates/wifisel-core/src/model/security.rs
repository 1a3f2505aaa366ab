// ── Security domain types ──
//
// Two views of security meet here: what an AP advertises over the air
// (`SecurityAdvertisement`) and what a profile is configured to use
// (`SecurityParams`). Both are expressed in terms of `SecurityType`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A concrete security variant a station can associate with.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SecurityType {
    Open,
    Owe,
    Psk,
    Sae,
    Eap,
    EapWpa3Enterprise,
}

impl SecurityType {
    pub fn level(self) -> SecurityLevel {
        match self {
            Self::Open | Self::Owe => SecurityLevel::Open,
            Self::Psk | Self::Sae => SecurityLevel::Personal,
            Self::Eap | Self::EapWpa3Enterprise => SecurityLevel::Enterprise,
        }
    }

    /// No link-layer encryption at all. OWE is encrypted and does not count.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// PMF requirement a freshly configured variant carries.
    pub fn requires_pmf_by_default(self) -> bool {
        matches!(self, Self::Owe | Self::Sae | Self::EapWpa3Enterprise)
    }
}

/// Administrative security tiers, ordered weakest first.
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
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SecurityLevel {
    #[default]
    Open,
    Personal,
    Enterprise,
}

// ── Auto-upgrade pairs ──────────────────────────────────────────────

/// A legacy variant and the WPA3-era variant a profile may be upgraded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum UpgradePair {
    PskToSae,
    OpenToOwe,
    EapToWpa3Enterprise,
}

impl UpgradePair {
    pub fn base(self) -> SecurityType {
        match self {
            Self::PskToSae => SecurityType::Psk,
            Self::OpenToOwe => SecurityType::Open,
            Self::EapToWpa3Enterprise => SecurityType::Eap,
        }
    }

    pub fn upgraded(self) -> SecurityType {
        match self {
            Self::PskToSae => SecurityType::Sae,
            Self::OpenToOwe => SecurityType::Owe,
            Self::EapToWpa3Enterprise => SecurityType::EapWpa3Enterprise,
        }
    }

    pub fn all() -> [Self; 3] {
        [Self::PskToSae, Self::OpenToOwe, Self::EapToWpa3Enterprise]
    }
}

// ── Profile-side security ───────────────────────────────────────────

/// One security variant a profile may connect with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecurityParams {
    pub security_type: SecurityType,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Added by the platform when the base variant was saved, not by the user.
    #[serde(default)]
    pub added_by_auto_upgrade: bool,
    #[serde(default)]
    pub require_pmf: bool,
}

fn default_true() -> bool {
    true
}

impl SecurityParams {
    pub fn new(security_type: SecurityType) -> Self {
        Self {
            security_type,
            enabled: true,
            added_by_auto_upgrade: false,
            require_pmf: security_type.requires_pmf_by_default(),
        }
    }

    /// The upgraded half of `pair`, flagged as auto-added.
    pub fn auto_upgraded(pair: UpgradePair) -> Self {
        Self {
            added_by_auto_upgrade: true,
            ..Self::new(pair.upgraded())
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_pmf_required(mut self, required: bool) -> Self {
        self.require_pmf = required;
        self
    }
}

// ── Air-side security ───────────────────────────────────────────────

/// A security scheme as decoded from an AP's beacon or probe response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AdvertisedScheme {
    Open,
    Owe,
    OweTransition,
    Psk,
    Sae,
    PskSaeTransition,
    Eap,
    EapWpa3,
    EapWpa3Transition,
}

impl AdvertisedScheme {
    /// Variants a station may use against this scheme.
    pub fn variants(self) -> &'static [SecurityType] {
        match self {
            Self::Open => &[SecurityType::Open],
            Self::Owe => &[SecurityType::Owe],
            Self::OweTransition => &[SecurityType::Open, SecurityType::Owe],
            Self::Psk => &[SecurityType::Psk],
            Self::Sae => &[SecurityType::Sae],
            Self::PskSaeTransition => &[SecurityType::Psk, SecurityType::Sae],
            Self::Eap => &[SecurityType::Eap],
            Self::EapWpa3 => &[SecurityType::EapWpa3Enterprise],
            Self::EapWpa3Transition => &[SecurityType::Eap, SecurityType::EapWpa3Enterprise],
        }
    }

    pub fn is_transition(self) -> bool {
        matches!(
            self,
            Self::OweTransition | Self::PskSaeTransition | Self::EapWpa3Transition
        )
    }
}

/// Everything an AP advertises about its security.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SecurityAdvertisement {
    pub schemes: Vec<AdvertisedScheme>,
    #[serde(default)]
    pub pmf_capable: bool,
    #[serde(default)]
    pub pmf_required: bool,
}

impl SecurityAdvertisement {
    pub fn new(schemes: impl IntoIterator<Item = AdvertisedScheme>) -> Self {
        let schemes: Vec<AdvertisedScheme> = schemes.into_iter().collect();
        let pmf_required = schemes.iter().any(|s| {
            matches!(
                s,
                AdvertisedScheme::Sae | AdvertisedScheme::Owe | AdvertisedScheme::EapWpa3
            )
        });
        let pmf_capable = pmf_required || schemes.iter().any(|s| s.is_transition());
        Self {
            schemes,
            pmf_capable,
            pmf_required,
        }
    }

    pub fn single(scheme: AdvertisedScheme) -> Self {
        Self::new([scheme])
    }

    /// Every variant derivable from the advertised schemes, ordered.
    pub fn security_types(&self) -> BTreeSet<SecurityType> {
        self.schemes
            .iter()
            .flat_map(|s| s.variants().iter().copied())
            .collect()
    }

    pub fn advertises(&self, security_type: SecurityType) -> bool {
        self.schemes
            .iter()
            .any(|s| s.variants().contains(&security_type))
    }

    /// Both halves of `pair` are offered by this one AP.
    pub fn is_transition_for(&self, pair: UpgradePair) -> bool {
        self.advertises(pair.base()) && self.advertises(pair.upgraded())
    }

    /// Offers the base variant of `pair` but not the upgraded one.
    pub fn is_legacy_only(&self, pair: UpgradePair) -> bool {
        self.advertises(pair.base()) && !self.advertises(pair.upgraded())
    }

    /// Offers the upgraded variant of `pair` but not the base one.
    pub fn is_upgrade_only(&self, pair: UpgradePair) -> bool {
        self.advertises(pair.upgraded()) && !self.advertises(pair.base())
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_scheme_yields_both_variants() {
        let adv = SecurityAdvertisement::single(AdvertisedScheme::PskSaeTransition);
        let types: Vec<_> = adv.security_types().into_iter().collect();
        assert_eq!(types, vec![SecurityType::Psk, SecurityType::Sae]);
        assert!(adv.is_transition_for(UpgradePair::PskToSae));
        assert!(!adv.is_legacy_only(UpgradePair::PskToSae));
        assert!(!adv.is_upgrade_only(UpgradePair::PskToSae));
    }

    #[test]
    fn legacy_and_upgrade_only_are_exclusive() {
        let psk = SecurityAdvertisement::single(AdvertisedScheme::Psk);
        let sae = SecurityAdvertisement::single(AdvertisedScheme::Sae);
        assert!(psk.is_legacy_only(UpgradePair::PskToSae));
        assert!(sae.is_upgrade_only(UpgradePair::PskToSae));
        assert!(sae.pmf_required);
        assert!(!psk.pmf_capable);
    }

    #[test]
    fn security_levels_are_ordered() {
        assert!(SecurityType::Owe.level() < SecurityType::Psk.level());
        assert!(SecurityType::Sae.level() < SecurityType::Eap.level());
        assert!(!SecurityType::Owe.is_open());
    }

    #[test]
    fn security_type_round_trips_through_strum() {
        let parsed: SecurityType = "eap-wpa3-enterprise".parse().unwrap_or(SecurityType::Open);
        assert_eq!(parsed, SecurityType::EapWpa3Enterprise);
        assert_eq!(SecurityType::Sae.to_string(), "sae");
    }

    #[test]
    fn auto_upgraded_params_are_flagged() {
        let params = SecurityParams::auto_upgraded(UpgradePair::PskToSae);
        assert_eq!(params.security_type, SecurityType::Sae);
        assert!(params.added_by_auto_upgrade);
        assert!(params.require_pmf);
    }
}
