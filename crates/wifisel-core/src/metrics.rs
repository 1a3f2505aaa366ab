// ── Selection telemetry ──
//
// Fire-and-forget events emitted during a cycle. Sinks must not block and
// must not fail the cycle.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use crate::filter::DropReason;
use crate::model::{MacAddress, NetworkId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum SelectionEvent {
    Filtered {
        kept: usize,
        dropped: BTreeMap<DropReason, usize>,
    },
    BatchDiscarded {
        iface: String,
    },
    CandidatesBuilt {
        candidates: usize,
        groups: usize,
    },
    ScorerChoice {
        scorer: String,
        experiment_id: u32,
        network_id: Option<NetworkId>,
        active: bool,
    },
    ScorerDivergence {
        active: String,
        other: String,
        active_choice: Option<NetworkId>,
        other_choice: Option<NetworkId>,
    },
    UserChoiceOverride {
        from: NetworkId,
        to: NetworkId,
    },
    UserChoiceCycle {
        at: NetworkId,
    },
    Selected {
        network_id: NetworkId,
        bssid: MacAddress,
        scorer: String,
    },
    NoSelection,
}

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: SelectionEvent);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record(&self, _event: SelectionEvent) {}
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    events: Mutex<Vec<SelectionEvent>>,
}

impl RecordingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SelectionEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain recorded events.
    pub fn take(&self) -> Vec<SelectionEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl MetricsSink for RecordingMetrics {
    fn record(&self, event: SelectionEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl<T: MetricsSink + ?Sized> MetricsSink for std::sync::Arc<T> {
    fn record(&self, event: SelectionEvent) {
        (**self).record(event);
    }
}
