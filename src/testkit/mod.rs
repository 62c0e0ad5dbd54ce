//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`rate`] - `ScriptedRateSource`, a venue whose rates tests set directly.
//! - [`assessor`] - `ScriptedAssessor` with canned, failing or stalled replies.
//! - [`vault`] - `ScriptedVault`, a paper vault with injectable failures.
//! - [`audit`] - `RecordingAuditSink` and `FailingAuditSink`.
//! - [`config`] - Canonical test settings and config files.

pub mod assessor;
pub mod audit;
pub mod config;
pub mod rate;
pub mod vault;

pub use assessor::ScriptedAssessor;
pub use audit::{FailingAuditSink, RecordingAuditSink};
pub use rate::ScriptedRateSource;
pub use vault::ScriptedVault;
