//! The per-asset decision cycle.
//!
//! One cycle: fetch every venue concurrently, form a consensus per leg,
//! compute the spread, edge-trigger the risk assessment, score, and hand a
//! hedge decision to the orchestrator. Every cycle ends in exactly one
//! [`DecisionSnapshot`], which is also appended to the audit sinks.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use rust_decimal::Decimal;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::orchestrator::HedgeOrchestrator;
use super::state::EngineState;
use crate::domain::{
    must_hedge, CompositeScorer, ConfidenceMode, ConsensusAggregator, CycleStatus,
    DecisionSnapshot, FundingForecast, OverrideConfig, RateLeg, RateObservation, RiskAssessment,
    SpreadSample, ThresholdTrigger, VolatilityEstimator,
};
use crate::error::{AssessmentError, RateError};
use crate::port::outbound::assessor::{AssessmentContext, RiskAssessor};
use crate::port::outbound::audit::{AuditRecord, AuditSinkSet};
use crate::port::outbound::rate::RateSource;

/// Reason recorded when a leg has no usable rate.
pub const NO_DATA_REASON: &str = "no data";

/// Reason recorded when the cycle deadline passes during the rate fetch.
pub const FETCH_TIMEOUT_REASON: &str = "cycle timed out while fetching rates";

/// Reason recorded when the assessor advises against hedging.
pub const HOLD_ADVICE_REASON: &str = "assessor advised HOLD";

/// Tunables of the decision cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Spread in basis points at or above which the trigger sits "above".
    pub trigger_bps: i64,
    /// Composite score at or above which a hedge is taken.
    pub hedge_threshold: Decimal,
    pub history_window: usize,
    /// Consensus outlier tolerance in percent.
    pub outlier_tolerance_pct: Decimal,
    pub volatility_baseline: Decimal,
    /// Bound on one assessor call, further capped by the cycle deadline.
    pub assessor_timeout: Duration,
    /// Bound on a whole cycle: fetch, assessment and hedge.
    pub cycle_timeout: Duration,
    /// Risk score of the assessment reused between crossings.
    pub placeholder_score: u8,
    pub confidence: ConfidenceMode,
    pub override_check: OverrideConfig,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            trigger_bps: 500,
            hedge_threshold: Decimal::ONE_HUNDRED,
            history_window: crate::domain::spread::DEFAULT_HISTORY_WINDOW,
            outlier_tolerance_pct: Decimal::from(5),
            volatility_baseline: crate::domain::volatility::DEFAULT_BASELINE,
            assessor_timeout: Duration::from_secs(20),
            cycle_timeout: Duration::from_secs(90),
            placeholder_score: crate::domain::assessment::DEFAULT_PLACEHOLDER_SCORE,
            confidence: ConfidenceMode::Keyword,
            override_check: OverrideConfig::default(),
        }
    }
}

/// Result of probing one venue.
#[derive(Debug, Clone)]
pub struct SourceProbe {
    pub venue: String,
    pub leg: RateLeg,
    pub result: Result<Decimal, RateError>,
}

/// Runs decision cycles for any asset. Per-asset memory lives in the
/// [`EngineState`] the caller passes in.
pub struct DecisionEngine {
    settings: EngineSettings,
    sources: Vec<Arc<dyn RateSource>>,
    assessor: Option<Arc<dyn RiskAssessor>>,
    orchestrator: Arc<HedgeOrchestrator>,
    audit: Arc<AuditSinkSet>,
    aggregator: ConsensusAggregator,
    trigger: ThresholdTrigger,
    estimator: VolatilityEstimator,
    scorer: CompositeScorer,
}

impl DecisionEngine {
    /// Create an engine. Without an assessor every crossing uses the
    /// deterministic fallback assessment.
    #[must_use]
    pub fn new(
        settings: EngineSettings,
        sources: Vec<Arc<dyn RateSource>>,
        assessor: Option<Arc<dyn RiskAssessor>>,
        orchestrator: Arc<HedgeOrchestrator>,
        audit: Arc<AuditSinkSet>,
    ) -> Self {
        Self {
            aggregator: ConsensusAggregator::new(settings.outlier_tolerance_pct),
            trigger: ThresholdTrigger::new(settings.trigger_bps),
            estimator: VolatilityEstimator::new(settings.volatility_baseline),
            scorer: CompositeScorer::new(settings.hedge_threshold, settings.confidence.signal()),
            settings,
            sources,
            assessor,
            orchestrator,
            audit,
        }
    }

    /// Cycle tunables.
    #[must_use]
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Name of the configured assessor, if any.
    #[must_use]
    pub fn assessor_name(&self) -> Option<&'static str> {
        self.assessor.as_ref().map(|a| a.name())
    }

    /// Hedge orchestrator shared by every asset.
    #[must_use]
    pub fn orchestrator(&self) -> &HedgeOrchestrator {
        &self.orchestrator
    }

    /// Fresh state sized to the configured history window.
    #[must_use]
    pub fn new_state(&self) -> EngineState {
        EngineState::new(self.settings.history_window)
    }

    /// Deadline for a cycle starting now.
    #[must_use]
    pub fn cycle_deadline(&self) -> Instant {
        Instant::now() + self.settings.cycle_timeout
    }

    /// Fetch and evaluate one cycle.
    pub async fn run_cycle(&self, asset: &str, state: &mut EngineState) -> DecisionSnapshot {
        let deadline = self.cycle_deadline();
        match self.fetch_until(asset, deadline).await {
            Some(observations) => self.evaluate(asset, state, &observations, deadline).await,
            None => self.fetch_timed_out(asset).await,
        }
    }

    /// Fetch rates, giving up at `deadline`. `None` means the deadline passed.
    pub async fn fetch_until(
        &self,
        asset: &str,
        deadline: Instant,
    ) -> Option<Vec<RateObservation>> {
        timeout_at(deadline, self.fetch_observations(asset)).await.ok()
    }

    /// Audit a cycle whose deadline passed during the rate fetch. State is
    /// left untouched.
    pub async fn fetch_timed_out(&self, asset: &str) -> DecisionSnapshot {
        warn!(
            asset,
            timeout_secs = self.settings.cycle_timeout.as_secs(),
            "Rate fetch exceeded the cycle deadline"
        );
        let snapshot = DecisionSnapshot::timed_out(asset, FETCH_TIMEOUT_REASON);
        self.audit
            .append_all(&AuditRecord::Decision(snapshot.clone()))
            .await;
        snapshot
    }

    /// Query every venue concurrently. Failed venues are logged and skipped.
    pub async fn fetch_observations(&self, asset: &str) -> Vec<RateObservation> {
        self.probe(asset)
            .await
            .into_iter()
            .filter_map(|probe| match probe.result {
                Ok(rate) => {
                    debug!(venue = %probe.venue, leg = %probe.leg, %rate, "Rate observed");
                    Some(RateObservation::new(probe.venue, asset, probe.leg, rate))
                }
                Err(e) => {
                    warn!(venue = %probe.venue, asset, error = %e, "Rate source failed");
                    None
                }
            })
            .collect()
    }

    /// Raw per-venue results, used by health checks.
    pub async fn probe(&self, asset: &str) -> Vec<SourceProbe> {
        join_all(self.sources.iter().map(|source| async move {
            SourceProbe {
                venue: source.venue().to_string(),
                leg: source.leg(),
                result: source.fetch_rate(asset).await,
            }
        }))
        .await
    }

    /// Decide one cycle from already-fetched observations.
    ///
    /// A leg without data yields HOLD and leaves `state` untouched.
    #[instrument(skip_all, fields(asset = %asset))]
    pub async fn evaluate(
        &self,
        asset: &str,
        state: &mut EngineState,
        observations: &[RateObservation],
        deadline: Instant,
    ) -> DecisionSnapshot {
        let (fixed_obs, floating_obs): (Vec<_>, Vec<_>) = observations
            .iter()
            .cloned()
            .partition(|o| o.leg() == RateLeg::Fixed);
        let fixed = self.aggregator.aggregate(asset, &fixed_obs);
        let floating = self.aggregator.aggregate(asset, &floating_obs);
        let fixed_rate = fixed.median_rate();
        let floating_rate = floating.median_rate();

        info!(
            %fixed_rate,
            fixed_sources = fixed.sources().len(),
            %floating_rate,
            floating_sources = floating.sources().len(),
            "Consensus rates"
        );

        if fixed.is_no_data() || floating.is_no_data() {
            warn!(
                fixed_missing = fixed.is_no_data(),
                floating_missing = floating.is_no_data(),
                "No usable rate, holding"
            );
            let snapshot = DecisionSnapshot::no_data(asset, fixed_rate, floating_rate, NO_DATA_REASON);
            self.audit
                .append_all(&AuditRecord::Decision(snapshot.clone()))
                .await;
            return snapshot;
        }

        let spread = SpreadSample::compute(fixed_rate, floating_rate);
        state.history_mut().push(spread.spread_decimal);

        let transition = self.trigger.classify(state.threshold(), spread.spread_bps);
        info!(
            spread_bps = spread.spread_bps,
            trigger_bps = self.trigger.trigger_bps(),
            ?transition,
            "Spread evaluated"
        );

        let (assessment, assessor_invoked) = if transition.fires() {
            let context = AssessmentContext {
                asset: asset.to_string(),
                fixed_rate,
                floating_rate,
                spread,
                history: state.history().clone(),
            };
            self.assess(&context, deadline).await
        } else {
            (RiskAssessment::placeholder(self.settings.placeholder_score), false)
        };
        self.trigger.observe(state.threshold_mut(), spread.spread_bps);

        let volatility_factor = self.estimator.factor(&state.history().values());
        // The override rides on the same edge as the assessor, so a sustained
        // breach never re-hedges.
        let override_set = transition.fires() && {
            let forecast = FundingForecast::predict(floating_rate, fixed_rate);
            must_hedge(&self.settings.override_check, &forecast, fixed_rate)
        };
        let decision = self.scorer.score(
            &assessment,
            spread.spread_decimal,
            volatility_factor,
            override_set,
        );

        info!(
            risk_score = assessment.risk_score(),
            level = assessment.level(),
            source = ?assessment.source(),
            confidence_boost = decision.confidence_boost,
            %volatility_factor,
            composite_score = %decision.composite_score,
            threshold = %self.scorer.hedge_threshold(),
            override_set,
            vetoed = decision.vetoed,
            hedge = decision.hedge,
            "Composite scored"
        );

        let status = if decision.hedge {
            self.hedge(asset, &spread, &assessment, &decision, deadline).await
        } else if decision.vetoed {
            CycleStatus::Hold {
                reason: HOLD_ADVICE_REASON.to_string(),
            }
        } else {
            CycleStatus::Hold {
                reason: format!(
                    "composite {} below threshold {}",
                    decision.composite_score.round_dp(2),
                    self.scorer.hedge_threshold()
                ),
            }
        };

        let snapshot = DecisionSnapshot {
            id: Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            asset: asset.to_string(),
            fixed_rate,
            floating_rate,
            spread: Some(spread),
            assessment: Some(assessment),
            decision: Some(decision),
            assessor_invoked,
            status,
        };
        self.audit
            .append_all(&AuditRecord::Decision(snapshot.clone()))
            .await;
        snapshot
    }

    /// Ask the assessor; any failure becomes the fallback assessment. The
    /// call is bounded by the assessor timeout or the cycle deadline,
    /// whichever comes first.
    async fn assess(
        &self,
        context: &AssessmentContext,
        deadline: Instant,
    ) -> (RiskAssessment, bool) {
        let Some(assessor) = &self.assessor else {
            info!("No risk assessor configured, using fallback");
            return (
                RiskAssessment::fallback(context.fixed_rate, context.floating_rate),
                false,
            );
        };

        let started = Instant::now();
        let until = deadline.min(started + self.settings.assessor_timeout);
        let result = match timeout_at(until, assessor.assess(context)).await {
            Ok(result) => result,
            Err(_) => Err(AssessmentError::Timeout {
                secs: until.saturating_duration_since(started).as_secs(),
            }),
        };

        match result {
            Ok(assessment) => {
                info!(
                    assessor = assessor.name(),
                    risk_score = assessment.risk_score(),
                    reason = assessment.reason(),
                    "Risk assessed"
                );
                (assessment, true)
            }
            Err(e) => {
                warn!(assessor = assessor.name(), error = %e, "Assessor failed, using fallback");
                (
                    RiskAssessment::fallback(context.fixed_rate, context.floating_rate),
                    true,
                )
            }
        }
    }

    async fn hedge(
        &self,
        asset: &str,
        spread: &SpreadSample,
        assessment: &RiskAssessment,
        decision: &crate::domain::CompositeDecision,
        deadline: Instant,
    ) -> CycleStatus {
        let request = match self.orchestrator.prepare(asset, spread, assessment, decision) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Hedge request rejected");
                return CycleStatus::Failed {
                    reason: e.to_string(),
                };
            }
        };

        match self.orchestrator.execute_hedge(&request, deadline).await {
            Ok(outcome) => CycleStatus::HedgeExecuted {
                tx_hash: outcome.receipt.tx_hash,
                strategy: outcome.strategy.to_string(),
            },
            Err(e) => CycleStatus::Failed {
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::adapter::outbound::execution::StrategyKind;
    use crate::application::orchestrator::HedgeSettings;
    use crate::domain::{AssessmentSource, Direction};
    use crate::testkit::vault::VaultOp;
    use crate::testkit::{RecordingAuditSink, ScriptedAssessor, ScriptedRateSource, ScriptedVault};

    const MARKET: &str = "0xmarket";

    struct Fixture {
        engine: DecisionEngine,
        fixed: Arc<ScriptedRateSource>,
        floating: Arc<ScriptedRateSource>,
        assessor: Arc<ScriptedAssessor>,
        audit: RecordingAuditSink,
    }

    fn fixture(assessor: ScriptedAssessor, vault: ScriptedVault) -> Fixture {
        fixture_with(assessor, vault, None)
    }

    fn fixture_with(
        assessor: ScriptedAssessor,
        vault: ScriptedVault,
        fixed_delay: Option<Duration>,
    ) -> Fixture {
        let fixed = ScriptedRateSource::fixed("boros", "ETH", dec!(0.10));
        let fixed = Arc::new(match fixed_delay {
            Some(delay) => fixed.with_delay(delay),
            None => fixed,
        });
        let floating = Arc::new(ScriptedRateSource::floating("hyperliquid", "ETH", dec!(0.18)));
        let assessor = Arc::new(assessor);
        let recorder = RecordingAuditSink::new();
        let mut audit = AuditSinkSet::new();
        audit.register(Box::new(recorder.clone()));
        let audit = Arc::new(audit);

        let vault: Arc<ScriptedVault> = Arc::new(vault);
        let settings = HedgeSettings {
            markets: [("ETH".to_string(), MARKET.to_string())].into(),
            ..HedgeSettings::default()
        };
        let orchestrator = Arc::new(HedgeOrchestrator::new(
            vault.clone(),
            StrategyKind::DirectOrder.build(vault.clone()),
            Some(StrategyKind::VaultRecord.build(vault)),
            audit.clone(),
            settings,
        ));

        let engine = DecisionEngine::new(
            EngineSettings::default(),
            vec![fixed.clone(), floating.clone()],
            Some(assessor.clone()),
            orchestrator,
            audit,
        );

        Fixture {
            engine,
            fixed,
            floating,
            assessor,
            audit: recorder,
        }
    }

    fn funded() -> ScriptedVault {
        ScriptedVault::funded(MARKET, dec!(1))
    }

    #[tokio::test]
    async fn crossing_with_high_risk_executes_hedge() {
        let f = fixture(ScriptedAssessor::returning(85, "High reversion risk"), funded());
        let mut state = f.engine.new_state().with_history(&[dec!(0.08)]);

        let snapshot = f.engine.run_cycle("ETH", &mut state).await;

        assert_eq!(snapshot.status.label(), "HEDGE_EXECUTED");
        let decision = snapshot.decision.unwrap();
        assert_eq!(decision.volatility_factor, dec!(1));
        assert_eq!(decision.composite_score, dec!(113));
        assert!(snapshot.assessor_invoked);
        assert_eq!(f.assessor.calls(), 1);
        assert_eq!(f.audit.hedges().len(), 1);
        assert_eq!(f.audit.decisions().len(), 1);
    }

    #[tokio::test]
    async fn sustained_breach_reuses_placeholder() {
        let f = fixture(ScriptedAssessor::returning(85, "High reversion risk"), funded());
        let mut state = f.engine.new_state();

        f.engine.run_cycle("ETH", &mut state).await;
        let second = f.engine.run_cycle("ETH", &mut state).await;

        assert_eq!(f.assessor.calls(), 1);
        assert!(!second.assessor_invoked);
        assert_eq!(
            second.assessment.unwrap().source(),
            AssessmentSource::Placeholder
        );
        assert!(state.threshold().was_above_threshold);
        assert_eq!(state.history().len(), 2);
    }

    #[tokio::test]
    async fn sustained_breach_hedges_only_on_the_crossing() {
        let f = fixture(ScriptedAssessor::returning(85, "High reversion risk"), funded());
        let mut state = f.engine.new_state();

        let mut labels = Vec::new();
        for _ in 0..4 {
            labels.push(f.engine.run_cycle("ETH", &mut state).await.status.label());
        }

        assert_eq!(labels, vec!["HEDGE_EXECUTED", "HOLD", "HOLD", "HOLD"]);
        assert_eq!(f.audit.hedges().len(), 1);
        assert_eq!(f.assessor.calls(), 1);
    }

    #[tokio::test]
    async fn override_is_not_rechecked_while_above() {
        let f = fixture(ScriptedAssessor::returning(85, "High reversion risk"), funded());
        let mut state = f.engine.new_state();

        f.engine.run_cycle("ETH", &mut state).await;
        let second = f.engine.run_cycle("ETH", &mut state).await;

        let decision = second.decision.unwrap();
        assert!(!decision.override_set);
        assert!(!decision.hedge);
    }

    #[tokio::test]
    async fn hold_advice_vetoes_the_hedge() {
        let assessor = ScriptedAssessor::with_assessment(
            RiskAssessment::new(95, "Extreme dislocation", AssessmentSource::Assessor)
                .with_direction(Direction::Hold),
        );
        let f = fixture(assessor, funded());
        let mut state = f.engine.new_state();

        let snapshot = f.engine.run_cycle("ETH", &mut state).await;

        assert_eq!(
            snapshot.status,
            CycleStatus::Hold {
                reason: HOLD_ADVICE_REASON.into()
            }
        );
        assert!(snapshot.decision.unwrap().vetoed);
        assert!(f.audit.hedges().is_empty());
        assert!(state.threshold().was_above_threshold);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_source_is_cut_off_at_the_cycle_deadline() {
        let f = fixture_with(
            ScriptedAssessor::returning(85, "High"),
            funded(),
            Some(Duration::from_secs(100_000)),
        );
        let mut state = f.engine.new_state();
        let started = Instant::now();

        let snapshot = f.engine.run_cycle("ETH", &mut state).await;

        assert!(started.elapsed() <= f.engine.settings().cycle_timeout + Duration::from_secs(1));
        assert_eq!(
            snapshot.status,
            CycleStatus::Failed {
                reason: FETCH_TIMEOUT_REASON.into()
            }
        );
        assert_eq!(f.audit.decisions().len(), 1);
        assert!(f.audit.hedges().is_empty());
        assert!(state.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn assessor_is_capped_by_the_cycle_deadline() {
        let f = fixture(ScriptedAssessor::stalled(), funded());
        let mut state = f.engine.new_state();
        let deadline = Instant::now() + Duration::from_secs(3);
        let observations = f.engine.fetch_until("ETH", deadline).await.unwrap();

        let snapshot = f.engine.evaluate("ETH", &mut state, &observations, deadline).await;

        assert!(Instant::now() >= deadline);
        assert!(Instant::now() < deadline + f.engine.settings().assessor_timeout);
        assert_eq!(
            snapshot.assessment.unwrap().source(),
            AssessmentSource::Fallback
        );
    }

    #[tokio::test]
    async fn narrow_spread_holds_without_assessor() {
        let f = fixture(ScriptedAssessor::returning(85, "High reversion risk"), funded());
        f.fixed.set_rate("ETH", dec!(0.155));
        f.floating.set_rate("ETH", dec!(0.156));
        let mut state = f.engine.new_state();

        let snapshot = f.engine.run_cycle("ETH", &mut state).await;

        assert_eq!(snapshot.status.label(), "HOLD");
        assert_eq!(f.assessor.calls(), 0);
        assert!(f.audit.hedges().is_empty());
        let decision = snapshot.decision.unwrap();
        assert!(decision.composite_score < dec!(100));
        assert!(!decision.override_set);
    }

    #[tokio::test]
    async fn missing_leg_holds_without_touching_state() {
        let f = fixture(ScriptedAssessor::returning(85, "High"), funded());
        f.fixed.clear_rate("ETH");
        let mut state = f.engine.new_state();

        let snapshot = f.engine.run_cycle("ETH", &mut state).await;

        assert_eq!(
            snapshot.status,
            CycleStatus::Hold {
                reason: NO_DATA_REASON.into()
            }
        );
        assert!(state.history().is_empty());
        assert!(!state.threshold().was_above_threshold);
        assert_eq!(f.audit.decisions().len(), 1);
    }

    #[tokio::test]
    async fn failing_assessor_uses_fallback_formula() {
        let f = fixture(ScriptedAssessor::failing("quota"), funded());
        let mut state = f.engine.new_state();

        let snapshot = f.engine.run_cycle("ETH", &mut state).await;

        let assessment = snapshot.assessment.unwrap();
        assert_eq!(assessment.source(), AssessmentSource::Fallback);
        // min(100, 80) + 8 + 10
        assert_eq!(assessment.risk_score(), 98);
        assert!(snapshot.assessor_invoked);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_assessor_times_out_into_fallback() {
        let f = fixture(ScriptedAssessor::stalled(), funded());
        let mut state = f.engine.new_state();

        let snapshot = f.engine.run_cycle("ETH", &mut state).await;

        assert_eq!(
            snapshot.assessment.unwrap().source(),
            AssessmentSource::Fallback
        );
    }

    #[tokio::test]
    async fn assessor_sees_history_including_current_spread() {
        let f = fixture(ScriptedAssessor::returning(50, "moderate"), funded());
        let mut state = f.engine.new_state().with_history(&[dec!(0.01)]);

        f.engine.run_cycle("ETH", &mut state).await;

        let context = &f.assessor.contexts()[0];
        assert_eq!(context.history.values(), vec![dec!(0.01), dec!(0.08)]);
        assert_eq!(context.spread.spread_bps, 800);
    }

    #[tokio::test]
    async fn failed_hedge_is_reported_and_audited() {
        let vault = funded()
            .failing_on(VaultOp::OpenPosition)
            .failing_on(VaultOp::RecordHedge);
        let f = fixture(ScriptedAssessor::returning(85, "High"), vault);
        let mut state = f.engine.new_state();

        let snapshot = f.engine.run_cycle("ETH", &mut state).await;

        assert_eq!(snapshot.status.label(), "FAILED");
        assert_eq!(f.audit.hedges().len(), 1);
        assert!(state.threshold().was_above_threshold);
    }

    #[tokio::test]
    async fn unlisted_asset_is_no_data() {
        let f = fixture(ScriptedAssessor::returning(85, "High"), funded());
        let mut state = f.engine.new_state();

        let snapshot = f.engine.run_cycle("BTC", &mut state).await;

        assert_eq!(snapshot.status.label(), "HOLD");
        assert!(snapshot.spread.is_none());
    }
}
