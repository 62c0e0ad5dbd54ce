//! Audit history listing.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::HistoryArgs;
use crate::adapter::inbound::cli::output;
use crate::adapter::outbound::sqlite::{self, SqliteAuditSink};
use crate::domain::{HedgeEvent, HedgeStatus};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

const REASON_WIDTH: usize = 48;

#[derive(Tabled)]
struct HedgeRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Asset")]
    asset: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Spread (bps)")]
    spread_bps: i64,
    #[tabled(rename = "Notional")]
    amount: String,
    #[tabled(rename = "Strategy")]
    strategy: String,
    #[tabled(rename = "Risk")]
    risk: u8,
    #[tabled(rename = "Composite")]
    composite: String,
    #[tabled(rename = "Ref")]
    venue_ref: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

impl From<&HedgeEvent> for HedgeRow {
    fn from(event: &HedgeEvent) -> Self {
        let status = match event.status {
            HedgeStatus::Success => output::positive(event.status),
            HedgeStatus::Failure => output::negative(event.status),
        };
        Self {
            time: event.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            asset: event.asset.clone(),
            status,
            spread_bps: event.spread_bps,
            amount: event.amount_notional.to_string(),
            strategy: event.strategy.clone().unwrap_or_else(|| "-".into()),
            risk: event.risk_score,
            composite: event.composite_score.round_dp(2).to_string(),
            venue_ref: shorten(&event.venue_ref, 14),
            reason: shorten(&event.reason, REASON_WIDTH),
        }
    }
}

/// Truncate to `max` characters, marking the cut with an ellipsis.
fn shorten(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let kept: String = value.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Show the most recent hedge attempts.
pub fn execute(args: &HistoryArgs) -> Result<()> {
    let database = match &args.database {
        Some(path) => path.to_string_lossy().to_string(),
        None => Config::load(&args.config)?.database,
    };
    let store = SqliteAuditSink::new(sqlite::open(&database)?);
    let events = store.recent_hedges(args.limit, args.asset.as_deref())?;

    if output::is_json() {
        output::json_output(json!({
            "command": "history",
            "database": database,
            "events": events,
        }));
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    output::section("Hedge history");
    if events.is_empty() {
        output::note("No hedge attempts recorded");
        return Ok(());
    }

    let rows: Vec<HedgeRow> = events.iter().map(HedgeRow::from).collect();
    output::lines(&Table::new(rows).to_string());

    let failures = events
        .iter()
        .filter(|e| e.status == HedgeStatus::Failure)
        .count();
    output::field("Shown", events.len());
    output::field("Failures", failures);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorten_keeps_short_values() {
        assert_eq!(shorten("confirmed", 14), "confirmed");
    }

    #[test]
    fn shorten_marks_truncation() {
        let value = shorten("0x0123456789abcdef0123", 8);
        assert_eq!(value.chars().count(), 8);
        assert!(value.ends_with('…'));
        assert!(value.starts_with("0x01234"));
    }
}
