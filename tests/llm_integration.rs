//! Live risk-assessor tests against real LLM providers.
//!
//! Gated behind the `integration-tests` feature and `#[ignore]`. They need
//! network access and a provider key:
//!
//! ```bash
//! export GEMINI_API_KEY=...
//! cargo test --features integration-tests --test llm_integration -- --ignored
//! ```

#![cfg(feature = "integration-tests")]

use std::sync::Arc;

use kyute::adapter::outbound::assessor::LlmRiskAssessor;
use kyute::adapter::outbound::llm::{Anthropic, CompletionSettings, Gemini, OpenAi};
use kyute::domain::{AssessmentSource, SpreadHistory, SpreadSample};
use kyute::infrastructure::bootstrap::http_client;
use kyute::port::outbound::assessor::{AssessmentContext, RiskAssessor};
use kyute::port::outbound::llm::Llm;
use rust_decimal_macros::dec;

fn settings(model: &str) -> CompletionSettings {
    CompletionSettings {
        model: model.to_string(),
        max_tokens: 256,
        temperature: 0.0,
    }
}

fn context() -> AssessmentContext {
    let spread = SpreadSample::compute(dec!(0.10), dec!(0.18));
    let mut history = SpreadHistory::with_capacity(24);
    for value in [dec!(0.02), dec!(0.05), dec!(0.08)] {
        history.push(value);
    }
    AssessmentContext {
        asset: "ETH".to_string(),
        fixed_rate: dec!(0.10),
        floating_rate: dec!(0.18),
        spread,
        history,
    }
}

async fn assert_scores(llm: Arc<dyn Llm>) {
    let assessor = LlmRiskAssessor::new(llm);
    let assessment = assessor.assess(&context()).await.expect("assessment");

    assert_eq!(assessment.source(), AssessmentSource::Assessor);
    assert!(assessment.risk_score() <= 100);
    assert!(!assessment.reason().is_empty());
}

#[tokio::test]
#[ignore = "requires GEMINI_API_KEY and network access"]
async fn gemini_scores_a_wide_spread() {
    let llm = Gemini::from_env(http_client().unwrap(), settings("gemini-2.0-flash")).unwrap();
    assert_scores(Arc::new(llm)).await;
}

#[tokio::test]
#[ignore = "requires ANTHROPIC_API_KEY and network access"]
async fn anthropic_scores_a_wide_spread() {
    let llm = Anthropic::from_env(
        http_client().unwrap(),
        settings("claude-3-5-haiku-20241022"),
    )
    .unwrap();
    assert_scores(Arc::new(llm)).await;
}

#[tokio::test]
#[ignore = "requires OPENAI_API_KEY and network access"]
async fn openai_scores_a_wide_spread() {
    let llm = OpenAi::from_env(http_client().unwrap(), settings("gpt-4o-mini")).unwrap();
    assert_scores(Arc::new(llm)).await;
}
