//! Risk assessor port.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{RiskAssessment, SpreadHistory, SpreadSample};
use crate::error::AssessmentError;

/// Inputs handed to the external risk assessor on a threshold crossing.
#[derive(Debug, Clone)]
pub struct AssessmentContext {
    pub asset: String,
    pub fixed_rate: Decimal,
    pub floating_rate: Decimal,
    pub spread: SpreadSample,
    /// Rolling spread history including this cycle's sample.
    pub history: SpreadHistory,
}

impl AssessmentContext {
    /// History rendered as a comma-separated percentage list.
    #[must_use]
    pub fn history_list(&self) -> String {
        self.history.to_prompt_list()
    }
}

/// External service scoring the reversion risk of a spread.
///
/// Failures are never fatal: the engine substitutes
/// [`RiskAssessment::fallback`] for any error.
#[async_trait]
pub trait RiskAssessor: Send + Sync {
    /// Assessor name for logging.
    fn name(&self) -> &'static str;

    /// Score the current spread.
    ///
    /// # Errors
    ///
    /// Returns an [`AssessmentError`] when the service is unreachable or
    /// its reply cannot be parsed.
    async fn assess(&self, context: &AssessmentContext) -> Result<RiskAssessment, AssessmentError>;
}
