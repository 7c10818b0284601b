//! Per-operation counters for the signaling engine.

use std::collections::BTreeMap;

use serde::Serialize;

use rancp_ngap::Cause;

/// Counters for one class of UE-associated operation.
#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct OperationCounters {
    pub requested: u64,
    pub succeeded: u64,
    /// Failures keyed by cause, so a report shows what actually went wrong.
    pub failed_by_cause: BTreeMap<String, u64>,
}

impl OperationCounters {
    pub fn record_request(&mut self) {
        self.requested += 1;
    }

    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, cause: &Cause) {
        *self.failed_by_cause.entry(cause.to_string()).or_insert(0) += 1;
    }

    pub fn failed(&self) -> u64 {
        self.failed_by_cause.values().sum()
    }
}

/// All engine counters, grouped by procedure class.
#[derive(Debug, Default)]
pub struct NgapMetrics {
    pub context_setup: OperationCounters,
    pub session_setup: OperationCounters,
    pub session_modify: OperationCounters,
    pub session_release: OperationCounters,
    pub handover_preparations: OperationCounters,
    pub handover_executions: OperationCounters,
}

/// Snapshot of the counters, suitable for serialization.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MetricsReport {
    pub context_setup: OperationCounters,
    pub session_setup: OperationCounters,
    pub session_modify: OperationCounters,
    pub session_release: OperationCounters,
    pub handover_preparations: OperationCounters,
    pub handover_executions: OperationCounters,
}

impl NgapMetrics {
    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            context_setup: self.context_setup.clone(),
            session_setup: self.session_setup.clone(),
            session_modify: self.session_modify.clone(),
            session_release: self.session_release.clone(),
            handover_preparations: self.handover_preparations.clone(),
            handover_executions: self.handover_executions.clone(),
        }
    }
}
