//! Outbound ports consumed by the application layer.

pub mod assessor;
pub mod audit;
pub mod execution;
pub mod llm;
pub mod rate;
pub mod vault;
