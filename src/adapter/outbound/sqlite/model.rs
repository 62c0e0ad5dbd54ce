//! Diesel row types for the audit tables.
//!
//! Decimals are stored as text so the audit trail keeps exact values.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::schema::{decision_snapshots, hedge_events};
use crate::domain::{DecisionSnapshot, HedgeEvent, HedgeStatus};
use crate::error::{Error, Result};

/// Row of `hedge_events`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = hedge_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HedgeEventRow {
    pub id: String,
    pub timestamp: String,
    pub asset: String,
    pub spread_bps: i64,
    pub amount_notional: String,
    pub venue_ref: String,
    pub status: String,
    pub reason: String,
    pub strategy: Option<String>,
    pub risk_score: i32,
    pub composite_score: String,
    pub volatility_factor: String,
}

impl From<&HedgeEvent> for HedgeEventRow {
    fn from(event: &HedgeEvent) -> Self {
        Self {
            id: event.id.to_string(),
            timestamp: event.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
            asset: event.asset.clone(),
            spread_bps: event.spread_bps,
            amount_notional: event.amount_notional.to_string(),
            venue_ref: event.venue_ref.clone(),
            status: event.status.as_str().to_string(),
            reason: event.reason.clone(),
            strategy: event.strategy.clone(),
            risk_score: i32::from(event.risk_score),
            composite_score: event.composite_score.to_string(),
            volatility_factor: event.volatility_factor.to_string(),
        }
    }
}

impl TryFrom<HedgeEventRow> for HedgeEvent {
    type Error = Error;

    fn try_from(row: HedgeEventRow) -> Result<Self> {
        let status = match row.status.as_str() {
            "success" => HedgeStatus::Success,
            "failure" => HedgeStatus::Failure,
            other => return Err(Error::Parse(format!("unknown hedge status {other:?}"))),
        };

        Ok(Self {
            id: Uuid::parse_str(&row.id).map_err(|e| Error::Parse(e.to_string()))?,
            timestamp: parse_timestamp(&row.timestamp)?,
            asset: row.asset,
            spread_bps: row.spread_bps,
            amount_notional: parse_decimal(&row.amount_notional)?,
            venue_ref: row.venue_ref,
            status,
            reason: row.reason,
            strategy: row.strategy,
            risk_score: u8::try_from(row.risk_score.clamp(0, 100)).unwrap_or(0),
            composite_score: parse_decimal(&row.composite_score)?,
            volatility_factor: parse_decimal(&row.volatility_factor)?,
        })
    }
}

/// Row of `decision_snapshots`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = decision_snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DecisionSnapshotRow {
    pub id: String,
    pub timestamp: String,
    pub asset: String,
    pub outcome: String,
    pub fixed_rate: String,
    pub floating_rate: String,
    pub spread_bps: Option<i64>,
    pub risk_score: Option<i32>,
    pub composite_score: Option<String>,
    /// Full snapshot as JSON.
    pub payload: String,
}

impl DecisionSnapshotRow {
    /// Flatten a snapshot, keeping the full record as a JSON payload.
    ///
    /// # Errors
    /// Returns an error if the snapshot cannot be serialized.
    pub fn try_from_snapshot(snapshot: &DecisionSnapshot) -> Result<Self> {
        Ok(Self {
            id: snapshot.id.to_string(),
            timestamp: snapshot.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
            asset: snapshot.asset.clone(),
            outcome: snapshot.status.label().to_string(),
            fixed_rate: snapshot.fixed_rate.to_string(),
            floating_rate: snapshot.floating_rate.to_string(),
            spread_bps: snapshot.spread.map(|s| s.spread_bps),
            risk_score: snapshot
                .assessment
                .as_ref()
                .map(|a| i32::from(a.risk_score())),
            composite_score: snapshot.composite_score().map(|c| c.to_string()),
            payload: serde_json::to_string(snapshot)?,
        })
    }
}

fn parse_decimal(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).map_err(|e| Error::Parse(format!("decimal {raw:?}: {e}")))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Parse(format!("timestamp {raw:?}: {e}")))
}
