//! SQLite-backed audit sink and history queries.

use async_trait::async_trait;
use diesel::prelude::*;
use tracing::debug;

use super::connection::{configure_connection, DbPool};
use super::model::{DecisionSnapshotRow, HedgeEventRow};
use super::schema::{decision_snapshots, hedge_events};
use crate::domain::HedgeEvent;
use crate::error::{Error, Result};
use crate::port::outbound::audit::{AuditRecord, AuditSink};

/// Persists audit records through a pooled connection.
///
/// Writes run on the blocking pool so a slow disk never stalls the runtime.
#[derive(Clone)]
pub struct SqliteAuditSink {
    pool: DbPool,
}

impl SqliteAuditSink {
    /// Create a sink over an open pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn insert(pool: &DbPool, record: &AuditRecord) -> Result<()> {
        let mut conn = pool.get().map_err(|e| Error::Connection(e.to_string()))?;
        configure_connection(&mut conn)?;

        match record {
            AuditRecord::Hedge(event) => {
                diesel::insert_into(hedge_events::table)
                    .values(HedgeEventRow::from(event))
                    .execute(&mut conn)
                    .map_err(|e| Error::Database(e.to_string()))?;
            }
            AuditRecord::Decision(snapshot) => {
                diesel::insert_into(decision_snapshots::table)
                    .values(DecisionSnapshotRow::try_from_snapshot(snapshot)?)
                    .execute(&mut conn)
                    .map_err(|e| Error::Database(e.to_string()))?;
            }
        }
        Ok(())
    }

    /// Most recent hedge events, newest first.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored row cannot be read.
    pub fn recent_hedges(&self, limit: i64, asset: Option<&str>) -> Result<Vec<HedgeEvent>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let mut query = hedge_events::table
            .select(HedgeEventRow::as_select())
            .order(hedge_events::timestamp.desc())
            .limit(limit)
            .into_boxed();
        if let Some(asset) = asset {
            query = query.filter(hedge_events::asset.eq(asset.to_uppercase()));
        }

        query
            .load::<HedgeEventRow>(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?
            .into_iter()
            .map(HedgeEvent::try_from)
            .collect()
    }

    /// Number of decision snapshots stored for an asset.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn snapshot_count(&self, asset: &str) -> Result<i64> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;
        decision_snapshots::table
            .filter(decision_snapshots::asset.eq(asset.to_uppercase()))
            .count()
            .get_result(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))
    }
}

#[async_trait]
impl AuditSink for SqliteAuditSink {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn append(&self, record: &AuditRecord) -> Result<()> {
        let pool = self.pool.clone();
        let record = record.clone();
        tokio::task::spawn_blocking(move || Self::insert(&pool, &record))
            .await
            .map_err(|e| Error::Database(format!("audit write task failed: {e}")))??;
        debug!(sink = "sqlite", "Audit record stored");
        Ok(())
    }
}
