//! Risk assessor adapters.

pub mod llm;

pub use llm::LlmRiskAssessor;
