// ── Per-interface connection state ──
//
// Snapshot of every managed station interface, supplied by the caller at
// the start of a cycle.

use serde::{Deserialize, Serialize};

use super::ids::{MacAddress, NetworkId};
use super::scan::Band;

/// The link a connected interface currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentConnection {
    pub network_id: NetworkId,
    pub bssid: MacAddress,
    pub signal_level_dbm: i32,
    pub frequency_mhz: u32,
    /// Link quality score as computed by the connectivity monitor.
    pub score: i32,
}

impl CurrentConnection {
    pub fn band(&self) -> Band {
        Band::from_frequency(self.frequency_mhz)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceState {
    pub iface_name: String,
    #[serde(default)]
    pub connected: bool,
    #[serde(default = "default_true")]
    pub disconnected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<CurrentConnection>,
}

fn default_true() -> bool {
    true
}

impl InterfaceState {
    pub fn disconnected(iface_name: impl Into<String>) -> Self {
        Self {
            iface_name: iface_name.into(),
            connected: false,
            disconnected: true,
            current: None,
        }
    }

    pub fn connected(iface_name: impl Into<String>, current: CurrentConnection) -> Self {
        Self {
            iface_name: iface_name.into(),
            connected: true,
            disconnected: false,
            current: Some(current),
        }
    }

    /// The active link, when the interface is connected.
    pub fn link(&self) -> Option<&CurrentConnection> {
        if self.connected {
            self.current.as_ref()
        } else {
            None
        }
    }

    pub fn connected_bssid(&self) -> Option<&MacAddress> {
        self.link().map(|c| &c.bssid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnected_interface_has_no_link() {
        let mut state = InterfaceState::disconnected("wlan0");
        state.current = Some(CurrentConnection {
            network_id: NetworkId(1),
            bssid: MacAddress::new("aa:bb:cc:dd:ee:01"),
            signal_level_dbm: -50,
            frequency_mhz: 2412,
            score: 60,
        });
        assert!(state.link().is_none());
        assert!(state.connected_bssid().is_none());
    }
}
