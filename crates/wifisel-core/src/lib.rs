//! Wi-Fi network candidate selection and scoring engine.
//!
//! Given a batch of scan observations, the saved and suggested network
//! profiles, and the state of each station interface, this crate decides
//! which network and access point to associate with next:
//!
//! - **[`filter`]** removes observations that must not be considered
//!   (empty SSID, blocklisted, weak, association-restricted, admin policy).
//! - **[`nominator`]** matches the survivors against profiles from several
//!   sources (saved, app suggestions, externally scored, current link).
//! - **[`security`]** reconciles each match to one concrete security
//!   variant, honoring auto-upgrade and transition-mode rules.
//! - **[`scorer`]** ranks candidates per network and globally. Several
//!   scorers run side by side; one is active, the rest are only compared.
//! - **[`choice`]** lets a user's recorded "prefer B over A" edges override
//!   the active scorer.
//!
//! [`NetworkSelector`] wires the stages into a cycle. Profile persistence
//! sits behind [`ProfileStore`]; [`InMemoryProfileStore`] is the bundled
//! implementation. The engine never reads configuration files itself:
//! callers hand it a [`SelectionConfig`].

pub mod candidate;
pub mod choice;
pub mod clock;
pub mod config;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod model;
pub mod nominator;
pub mod policy;
pub mod predictor;
pub mod scorer;
pub mod security;
pub mod selector;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use candidate::{Candidate, CandidateKey, CandidateStore};
pub use choice::{ChoiceOutcome, apply_user_choice};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{
    AutoUpgradeConfig, BandThresholds, PhyCapabilities, RssiThresholds, SelectionConfig,
    ThroughputScoringParams,
};
pub use error::SelectionError;
pub use filter::{DropReason, FilterInputs, FilterReport};
pub use metrics::{MetricsSink, NoopMetrics, RecordingMetrics, SelectionEvent};
pub use nominator::{
    ExternalScoreSource, NominationContext, Nominator, NominatorKind, PolicyFlags, StaticScores,
};
pub use policy::{AdminPolicy, AdminPolicySource};
pub use predictor::{NoThroughputPrediction, ThroughputPredictor, ThroughputQuery};
pub use scorer::{
    COMPATIBILITY_SCORER, CandidateScorer, CompatibilityScorer, ScoredChoice, ScorerRegistry,
    THROUGHPUT_SCORER, ThroughputScorer,
};
pub use security::reconcile;
pub use selector::{
    CycleInput, CycleReport, NetworkSelector, NetworkSelectorBuilder, ScanCandidates,
    ScorerVerdict, Selection,
};
pub use store::{InMemoryProfileStore, ProfileStore};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AdvertisedScheme, Band, CandidateScanResult, ChannelWidth, ConnectChoice, CurrentConnection,
    DisableReason, InterfaceState, MacAddress, MeteredOverride, NetworkId, NetworkProfile,
    Provenance, ScanObservation, SecurityAdvertisement, SecurityLevel, SecurityParams,
    SecurityType, SelectionStatus, Ssid, UpgradePair, WifiStandard,
};
