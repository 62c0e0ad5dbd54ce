//! Audit sink port.
//!
//! Sinks are best-effort: a failed append is logged by [`AuditSinkSet`] and
//! never reaches the decision cycle.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::{DecisionSnapshot, HedgeEvent};
use crate::error::Result;

/// Records accepted by an audit sink.
#[derive(Debug, Clone)]
pub enum AuditRecord {
    /// One hedge attempt.
    Hedge(HedgeEvent),
    /// One evaluation cycle.
    Decision(DecisionSnapshot),
}

impl AuditRecord {
    /// Short kind label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Hedge(_) => "hedge_event",
            Self::Decision(_) => "decision_snapshot",
        }
    }
}

/// Append-only destination for audit records.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Sink name for logging.
    fn name(&self) -> &'static str;

    /// Append one record.
    ///
    /// # Errors
    ///
    /// Returns an error when the record could not be stored.
    async fn append(&self, record: &AuditRecord) -> Result<()>;
}

/// Fan-out over several sinks (composite pattern).
///
/// Appends to every sink in registration order; individual failures are
/// logged and swallowed.
#[derive(Default)]
pub struct AuditSinkSet {
    sinks: Vec<Box<dyn AuditSink>>,
}

impl AuditSinkSet {
    /// Empty set. Register sinks before sharing it.
    #[must_use]
    pub fn new() -> Self {
        Self { sinks: vec![] }
    }

    /// Register a sink.
    pub fn register(&mut self, sink: Box<dyn AuditSink>) {
        self.sinks.push(sink);
    }

    /// Append to every sink. Returns how many sinks accepted the record.
    pub async fn append_all(&self, record: &AuditRecord) -> usize {
        let mut stored = 0;
        for sink in &self.sinks {
            match sink.append(record).await {
                Ok(()) => stored += 1,
                Err(e) => warn!(
                    sink = sink.name(),
                    record = record.kind(),
                    error = %e,
                    "Audit sink append failed"
                ),
            }
        }
        stored
    }

    /// Number of registered sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

/// Writes audit records as structured tracing events.
pub struct LogAuditSink;

#[async_trait]
impl AuditSink for LogAuditSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn append(&self, record: &AuditRecord) -> Result<()> {
        match record {
            AuditRecord::Hedge(e) => {
                info!(
                    id = %e.id,
                    asset = %e.asset,
                    status = %e.status,
                    spread_bps = e.spread_bps,
                    amount = %e.amount_notional,
                    venue_ref = %e.venue_ref,
                    strategy = e.strategy.as_deref().unwrap_or("-"),
                    risk_score = e.risk_score,
                    composite_score = %e.composite_score,
                    volatility_factor = %e.volatility_factor,
                    reason = %e.reason,
                    "Hedge audited"
                );
            }
            AuditRecord::Decision(s) => {
                info!(
                    asset = %s.asset,
                    outcome = s.status.label(),
                    fixed_rate = %s.fixed_rate,
                    floating_rate = %s.floating_rate,
                    spread_bps = ?s.spread.map(|sp| sp.spread_bps),
                    risk_score = ?s.assessment.as_ref().map(|a| a.risk_score()),
                    composite_score = ?s.composite_score(),
                    assessor_invoked = s.assessor_invoked,
                    "Cycle decided"
                );
            }
        }
        Ok(())
    }
}
