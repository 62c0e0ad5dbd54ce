//! Venue-agnostic decision logic.
//!
//! Everything here is pure: no I/O, no clocks beyond timestamps on records.

pub mod assessment;
pub mod consensus;
pub mod error;
pub mod forecast;
pub mod hedge;
pub mod rate;
pub mod score;
pub mod spread;
pub mod trigger;
pub mod volatility;

pub use assessment::{AssessmentSource, Direction, RiskAssessment};
pub use consensus::{median, ConsensusAggregator, ConsensusRate};
pub use forecast::{must_hedge, FundingForecast, OverrideConfig};
pub use hedge::{
    CycleStatus, DecisionSnapshot, HedgeEvent, HedgeRequest, HedgeStatus, MarketRef, TxReceipt,
};
pub use rate::{Interval, RateLeg, RateObservation};
pub use score::{
    CompositeDecision, CompositeScorer, ConfidenceMode, ConfidenceSignal, KeywordConfidence,
    ReportedConfidence,
};
pub use spread::{SpreadHistory, SpreadSample};
pub use trigger::{ThresholdState, ThresholdTrigger, Transition};
pub use volatility::VolatilityEstimator;
