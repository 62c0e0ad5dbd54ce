//! Scripted risk assessor.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{AssessmentSource, RiskAssessment};
use crate::error::AssessmentError;
use crate::port::outbound::assessor::{AssessmentContext, RiskAssessor};

enum Reply {
    Assessment(RiskAssessment),
    Error(AssessmentError),
    Stall,
}

/// Assessor with a fixed reply that records every context it receives.
pub struct ScriptedAssessor {
    reply: Reply,
    calls: AtomicUsize,
    contexts: Mutex<Vec<AssessmentContext>>,
}

impl ScriptedAssessor {
    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            contexts: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `score` and `reason`.
    pub fn returning(score: i64, reason: &str) -> Self {
        Self::with_reply(Reply::Assessment(RiskAssessment::new(
            score,
            reason,
            AssessmentSource::Assessor,
        )))
    }

    /// Always answer with a prepared assessment.
    pub fn with_assessment(assessment: RiskAssessment) -> Self {
        Self::with_reply(Reply::Assessment(assessment))
    }

    /// Always fail as unavailable.
    pub fn failing(reason: &str) -> Self {
        Self::with_reply(Reply::Error(AssessmentError::Unavailable(reason.to_string())))
    }

    /// Never answer within any reasonable timeout.
    pub fn stalled() -> Self {
        Self::with_reply(Reply::Stall)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Contexts seen so far, in call order.
    pub fn contexts(&self) -> Vec<AssessmentContext> {
        self.contexts.lock().clone()
    }
}

#[async_trait]
impl RiskAssessor for ScriptedAssessor {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn assess(&self, context: &AssessmentContext) -> Result<RiskAssessment, AssessmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.contexts.lock().push(context.clone());
        match &self.reply {
            Reply::Assessment(a) => Ok(a.clone()),
            Reply::Error(e) => Err(e.clone()),
            Reply::Stall => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(AssessmentError::Unavailable("stalled".into()))
            }
        }
    }
}
