//! SQLite audit store behaviour.

mod support;

use kyute::domain::{
    AssessmentSource, CompositeScorer, DecisionSnapshot, HedgeEvent, HedgeRequest, HedgeStatus,
    RiskAssessment, SpreadSample,
};
use kyute::port::outbound::audit::{AuditRecord, AuditSink};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use support::harness::TempDb;

fn event(asset: &str, status: HedgeStatus) -> HedgeEvent {
    let spread = SpreadSample::compute(dec!(0.10), dec!(0.18));
    let risk = RiskAssessment::new(85, "High reversion risk", AssessmentSource::Assessor);
    let decision = CompositeScorer::default().score(&risk, spread.spread_decimal, Decimal::ONE, false);
    let request = HedgeRequest::try_new(asset, "0xmarket", dec!(0.12), &spread, &risk, &decision)
        .unwrap();
    HedgeEvent::from_request(&request, status, "0xhash", Some("direct_order"), "confirmed")
}

#[tokio::test]
async fn hedge_events_round_trip_with_exact_decimals() {
    let db = TempDb::create();
    let original = event("ETH", HedgeStatus::Success);

    db.store()
        .append(&AuditRecord::Hedge(original.clone()))
        .await
        .unwrap();

    let stored = db.store().recent_hedges(10, None).unwrap();
    assert_eq!(stored.len(), 1);
    let stored = &stored[0];
    assert_eq!(stored.id, original.id);
    assert_eq!(stored.amount_notional, dec!(0.12));
    assert_eq!(stored.composite_score, original.composite_score);
    assert_eq!(stored.volatility_factor, original.volatility_factor);
    assert_eq!(stored.strategy.as_deref(), Some("direct_order"));
    assert_eq!(stored.status, HedgeStatus::Success);
}

#[tokio::test]
async fn history_is_newest_first_and_filterable() {
    let db = TempDb::create();
    for (asset, status) in [
        ("ETH", HedgeStatus::Success),
        ("BTC", HedgeStatus::Failure),
        ("ETH", HedgeStatus::Failure),
    ] {
        db.store()
            .append(&AuditRecord::Hedge(event(asset, status)))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let all = db.store().recent_hedges(10, None).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].asset, "ETH");
    assert_eq!(all[0].status, HedgeStatus::Failure);

    let eth = db.store().recent_hedges(10, Some("eth")).unwrap();
    assert_eq!(eth.len(), 2);

    let limited = db.store().recent_hedges(1, None).unwrap();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn decision_snapshots_are_counted_per_asset() {
    let db = TempDb::create();
    for asset in ["ETH", "ETH", "BTC"] {
        let snapshot = DecisionSnapshot::no_data(asset, dec!(0.1), Decimal::ZERO, "no data");
        db.store()
            .append(&AuditRecord::Decision(snapshot))
            .await
            .unwrap();
    }

    assert_eq!(db.store().snapshot_count("ETH").unwrap(), 2);
    assert_eq!(db.store().snapshot_count("BTC").unwrap(), 1);
    assert_eq!(db.store().snapshot_count("SOL").unwrap(), 0);
}

#[tokio::test]
async fn snapshot_count_matches_asset_case_insensitively() {
    let db = TempDb::create();
    let snapshot = DecisionSnapshot::no_data("ETH", dec!(0.1), Decimal::ZERO, "no data");
    db.store()
        .append(&AuditRecord::Decision(snapshot))
        .await
        .unwrap();

    assert_eq!(db.store().snapshot_count("eth").unwrap(), 1);
    assert_eq!(
        db.store().recent_hedges(10, Some("eth")).unwrap().len(),
        db.store().recent_hedges(10, Some("ETH")).unwrap().len()
    );
}

#[test]
fn reopening_an_existing_database_keeps_rows() {
    let db = TempDb::create();
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime
        .block_on(db.store().append(&AuditRecord::Hedge(event("ETH", HedgeStatus::Success))))
        .unwrap();

    let reopened = kyute::adapter::outbound::sqlite::open(db.path()).unwrap();
    let store = kyute::adapter::outbound::sqlite::SqliteAuditSink::new(reopened);

    assert_eq!(store.recent_hedges(10, None).unwrap().len(), 1);
}
