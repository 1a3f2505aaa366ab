// ── Administrative restrictions ──
//
// Device-management policy the filter stage enforces: which SSIDs may be
// joined and how weak a network's security may be. Read once per cycle.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{SecurityAdvertisement, SecurityLevel, SecurityType, Ssid};

/// Read access to the current admin policy.
pub trait AdminPolicySource: Send + Sync {
    fn policy(&self) -> AdminPolicy;
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminPolicy {
    /// When non-empty, only these SSIDs may be joined. Compared octet for
    /// octet.
    pub ssid_allowlist: BTreeSet<Ssid>,
    pub ssid_denylist: BTreeSet<Ssid>,
    pub minimum_security_level: SecurityLevel,
}

impl AdminPolicySource for AdminPolicy {
    fn policy(&self) -> AdminPolicy {
        self.clone()
    }
}

impl AdminPolicy {
    pub fn permits_ssid(&self, ssid: &Ssid) -> bool {
        if self.ssid_denylist.contains(ssid) {
            return false;
        }
        self.ssid_allowlist.is_empty() || self.ssid_allowlist.contains(ssid)
    }

    /// At least one advertised variant meets the minimum level. An AP
    /// advertising nothing is treated as open.
    pub fn permits_security(&self, advertisement: &SecurityAdvertisement) -> bool {
        if advertisement.is_empty() {
            return SecurityType::Open.level() >= self.minimum_security_level;
        }
        advertisement
            .security_types()
            .into_iter()
            .any(|t| t.level() >= self.minimum_security_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AdvertisedScheme;

    #[test]
    fn denylist_beats_allowlist() {
        let policy = AdminPolicy {
            ssid_allowlist: BTreeSet::from([Ssid::from("Corp")]),
            ssid_denylist: BTreeSet::from([Ssid::from("Corp")]),
            ..AdminPolicy::default()
        };
        assert!(!policy.permits_ssid(&Ssid::from("Corp")));
        assert!(!policy.permits_ssid(&Ssid::from("Guest")));
    }

    #[test]
    fn lists_compare_raw_octets() {
        // Both decode lossily to "H\u{fffd}I".
        let listed = Ssid::from_bytes([0x48, 0xff, 0x49]);
        let other = Ssid::from_bytes([0x48, 0xfe, 0x49]);
        assert_eq!(listed.to_string_lossy(), other.to_string_lossy());

        let policy = AdminPolicy {
            ssid_denylist: BTreeSet::from([listed.clone()]),
            ..AdminPolicy::default()
        };
        assert!(!policy.permits_ssid(&listed));
        assert!(policy.permits_ssid(&other));
    }

    #[test]
    fn owe_counts_as_open_level() {
        let policy = AdminPolicy {
            minimum_security_level: SecurityLevel::Personal,
            ..AdminPolicy::default()
        };
        let owe = SecurityAdvertisement::single(AdvertisedScheme::Owe);
        let transition = SecurityAdvertisement::single(AdvertisedScheme::PskSaeTransition);
        assert!(!policy.permits_security(&owe));
        assert!(policy.permits_security(&transition));
        assert!(!policy.permits_security(&SecurityAdvertisement::default()));
    }
}
