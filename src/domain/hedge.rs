//! Hedge requests, audit records, and cycle outcomes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::assessment::RiskAssessment;
use super::error::DomainError;
use super::score::CompositeDecision;
use super::spread::SpreadSample;

/// Venue market a hedge is placed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketRef {
    /// Market contract address.
    pub address: String,
    /// Venue-specific numeric id, when the venue assigns one.
    pub market_id: Option<u64>,
}

impl MarketRef {
    /// Market identified by its address.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            market_id: None,
        }
    }

    /// Attach the venue market id.
    #[must_use]
    pub const fn with_id(mut self, market_id: u64) -> Self {
        self.market_id = Some(market_id);
        self
    }
}

/// Confirmed on-chain (or simulated) transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: String,
    pub block_number: Option<u64>,
}

impl TxReceipt {
    /// Receipt for a confirmed transaction.
    #[must_use]
    pub fn new(tx_hash: impl Into<String>) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            block_number: None,
        }
    }
}

/// Everything the orchestrator needs to execute and audit one hedge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HedgeRequest {
    asset: String,
    market_address: String,
    amount: Decimal,
    spread_bps: i64,
    risk_score: u8,
    composite_score: Decimal,
    volatility_factor: Decimal,
}

impl HedgeRequest {
    /// Create a request, validating the notional.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NonPositiveNotional`] for a zero or negative
    /// amount and [`DomainError::EmptyAsset`] for a blank asset.
    pub fn try_new(
        asset: impl Into<String>,
        market_address: impl Into<String>,
        amount: Decimal,
        spread: &SpreadSample,
        risk: &RiskAssessment,
        decision: &CompositeDecision,
    ) -> Result<Self, DomainError> {
        let asset = asset.into();
        if asset.trim().is_empty() {
            return Err(DomainError::EmptyAsset);
        }
        if amount <= Decimal::ZERO {
            return Err(DomainError::NonPositiveNotional { notional: amount });
        }

        Ok(Self {
            asset,
            market_address: market_address.into(),
            amount,
            spread_bps: spread.spread_bps,
            risk_score: risk.risk_score(),
            composite_score: decision.composite_score,
            volatility_factor: decision.volatility_factor,
        })
    }

    /// Asset to hedge.
    #[must_use]
    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Market the hedge targets. Empty when none is configured.
    #[must_use]
    pub fn market_address(&self) -> &str {
        &self.market_address
    }

    /// Notional to hedge.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    #[must_use]
    pub const fn spread_bps(&self) -> i64 {
        self.spread_bps
    }

    #[must_use]
    pub const fn risk_score(&self) -> u8 {
        self.risk_score
    }

    #[must_use]
    pub const fn composite_score(&self) -> Decimal {
        self.composite_score
    }

    #[must_use]
    pub const fn volatility_factor(&self) -> Decimal {
        self.volatility_factor
    }
}

/// Terminal status of a hedge attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HedgeStatus {
    Success,
    Failure,
}

impl HedgeStatus {
    /// Stored status label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

impl std::fmt::Display for HedgeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only audit record: exactly one per hedge attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedgeEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub asset: String,
    pub spread_bps: i64,
    pub amount_notional: Decimal,
    /// Transaction hash on success, market address otherwise.
    pub venue_ref: String,
    pub status: HedgeStatus,
    pub reason: String,
    /// Execution path that produced the outcome, if any ran.
    pub strategy: Option<String>,
    pub risk_score: u8,
    pub composite_score: Decimal,
    pub volatility_factor: Decimal,
}

impl HedgeEvent {
    /// Build the record for a finished attempt.
    #[must_use]
    pub fn from_request(
        request: &HedgeRequest,
        status: HedgeStatus,
        venue_ref: impl Into<String>,
        strategy: Option<&str>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            asset: request.asset().to_string(),
            spread_bps: request.spread_bps(),
            amount_notional: request.amount(),
            venue_ref: venue_ref.into(),
            status,
            reason: reason.into(),
            strategy: strategy.map(ToOwned::to_owned),
            risk_score: request.risk_score(),
            composite_score: request.composite_score(),
            volatility_factor: request.volatility_factor(),
        }
    }
}

/// Structured result of one evaluation cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleStatus {
    /// No hedge taken.
    Hold { reason: String },
    /// Hedge confirmed.
    HedgeExecuted { tx_hash: String, strategy: String },
    /// Hedge attempted and failed.
    Failed { reason: String },
}

impl CycleStatus {
    /// Outcome label shown to operators.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Hold { .. } => "HOLD",
            Self::HedgeExecuted { .. } => "HEDGE_EXECUTED",
            Self::Failed { .. } => "FAILED",
        }
    }
}

/// Numeric trail of one cycle, enough to reconstruct the decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionSnapshot {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub asset: String,
    pub fixed_rate: Decimal,
    pub floating_rate: Decimal,
    pub spread: Option<SpreadSample>,
    pub assessment: Option<RiskAssessment>,
    pub decision: Option<CompositeDecision>,
    pub assessor_invoked: bool,
    pub status: CycleStatus,
}

impl DecisionSnapshot {
    /// Snapshot of a cycle that stopped before scoring.
    #[must_use]
    pub fn no_data(
        asset: impl Into<String>,
        fixed_rate: Decimal,
        floating_rate: Decimal,
        reason: impl Into<String>,
    ) -> Self {
        Self::unscored(
            asset,
            fixed_rate,
            floating_rate,
            CycleStatus::Hold {
                reason: reason.into(),
            },
        )
    }

    /// Snapshot of a cycle whose deadline passed before rates arrived.
    #[must_use]
    pub fn timed_out(asset: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::unscored(
            asset,
            Decimal::ZERO,
            Decimal::ZERO,
            CycleStatus::Failed {
                reason: reason.into(),
            },
        )
    }

    fn unscored(
        asset: impl Into<String>,
        fixed_rate: Decimal,
        floating_rate: Decimal,
        status: CycleStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            asset: asset.into(),
            fixed_rate,
            floating_rate,
            spread: None,
            assessment: None,
            decision: None,
            assessor_invoked: false,
            status,
        }
    }

    #[must_use]
    pub fn composite_score(&self) -> Option<Decimal> {
        self.decision.map(|d| d.composite_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assessment::AssessmentSource;
    use crate::domain::score::CompositeScorer;
    use rust_decimal_macros::dec;

    fn request(amount: Decimal) -> Result<HedgeRequest, DomainError> {
        let spread = SpreadSample::compute(dec!(0.10), dec!(0.18));
        let risk = RiskAssessment::new(85, "high", AssessmentSource::Assessor);
        let decision = CompositeScorer::default().score(&risk, spread.spread_decimal, dec!(1), false);
        HedgeRequest::try_new("ETH", "0xmarket", amount, &spread, &risk, &decision)
    }

    #[test]
    fn request_rejects_non_positive_notional() {
        assert_eq!(
            request(dec!(0)),
            Err(DomainError::NonPositiveNotional { notional: dec!(0) })
        );
    }

    #[test]
    fn event_carries_decision_context() {
        let req = request(dec!(0.12)).unwrap();
        let event = HedgeEvent::from_request(
            &req,
            HedgeStatus::Success,
            "0xtx",
            Some("direct_order"),
            "confirmed",
        );
        assert_eq!(event.asset, "ETH");
        assert_eq!(event.spread_bps, 800);
        assert_eq!(event.risk_score, 85);
        assert_eq!(event.amount_notional, dec!(0.12));
        assert_eq!(event.composite_score, dec!(113));
        assert_eq!(event.strategy.as_deref(), Some("direct_order"));
    }

    #[test]
    fn cycle_status_labels() {
        assert_eq!(CycleStatus::Hold { reason: String::new() }.label(), "HOLD");
        assert_eq!(
            CycleStatus::HedgeExecuted {
                tx_hash: "0x".into(),
                strategy: "s".into()
            }
            .label(),
            "HEDGE_EXECUTED"
        );
        assert_eq!(CycleStatus::Failed { reason: String::new() }.label(), "FAILED");
    }

    #[test]
    fn cycle_status_serializes_with_outcome_tag() {
        let json = serde_json::to_value(CycleStatus::Hold {
            reason: "below".into(),
        })
        .unwrap();
        assert_eq!(json["outcome"], "HOLD");
        assert_eq!(json["reason"], "below");
    }
}
