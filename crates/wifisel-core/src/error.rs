// ── Core error types ──
//
// Errors raised inside a selection cycle. None of them abort a cycle: the
// engine catches each at observation, nominator, or scorer granularity and
// logs it. They surface to callers only from configuration validation.

use thiserror::Error;

use crate::model::{MacAddress, NetworkId};

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum SelectionError {
    // ── Store errors ─────────────────────────────────────────────────
    #[error("Network profile not found: {network_id}")]
    ProfileNotFound { network_id: NetworkId },

    // ── Collaborator errors ──────────────────────────────────────────
    #[error("External score lookup failed for {bssid}: {message}")]
    ExternalScore { bssid: MacAddress, message: String },

    #[error("Scorer {scorer} failed: {message}")]
    Scorer { scorer: String, message: String },

    #[error("Nominator {nominator} failed: {message}")]
    Nominator { nominator: String, message: String },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("Invalid scan observation for {bssid}: {reason}")]
    InvalidObservation { bssid: MacAddress, reason: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl SelectionError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
