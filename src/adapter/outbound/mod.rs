//! Outbound adapters: venues, LLM providers, vaults, strategies, storage.

pub mod assessor;
pub mod execution;
pub mod llm;
pub mod sqlite;
pub mod vault;
pub mod venue;
