//! Audit sinks for assertions.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{DecisionSnapshot, HedgeEvent};
use crate::error::{Error, Result};
use crate::port::outbound::audit::{AuditRecord, AuditSink};

/// Keeps every record in memory. Clones share the same buffer.
#[derive(Clone, Default)]
pub struct RecordingAuditSink {
    records: Arc<Mutex<Vec<AuditRecord>>>,
}

impl RecordingAuditSink {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    /// Recorded hedge events, in order.
    pub fn hedges(&self) -> Vec<HedgeEvent> {
        self.records
            .lock()
            .iter()
            .filter_map(|r| match r {
                AuditRecord::Hedge(e) => Some(e.clone()),
                AuditRecord::Decision(_) => None,
            })
            .collect()
    }

    /// Recorded decision snapshots, in order.
    pub fn decisions(&self) -> Vec<DecisionSnapshot> {
        self.records
            .lock()
            .iter()
            .filter_map(|r| match r {
                AuditRecord::Decision(s) => Some(s.clone()),
                AuditRecord::Hedge(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn append(&self, record: &AuditRecord) -> Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// Rejects every record.
pub struct FailingAuditSink;

#[async_trait]
impl AuditSink for FailingAuditSink {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn append(&self, _record: &AuditRecord) -> Result<()> {
        Err(Error::Database("audit store unavailable".into()))
    }
}
