// ── Domain model ──
//
// Canonical types shared by every stage of a selection cycle.

pub mod connection;
pub mod ids;
pub mod profile;
pub mod scan;
pub mod security;

pub use connection::{CurrentConnection, InterfaceState};
pub use ids::{MacAddress, NetworkId};
pub use profile::{
    CandidateScanResult, ConnectChoice, DisableReason, MeteredOverride, NetworkProfile,
    Provenance, SelectionStatus,
};
pub use scan::{Band, ChannelWidth, ScanObservation, Ssid, WifiStandard};
pub use security::{
    AdvertisedScheme, SecurityAdvertisement, SecurityLevel, SecurityParams, SecurityType,
    UpgradePair,
};
