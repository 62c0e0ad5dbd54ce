//! Kyute - yield-spread hedging decision engine.
//!
//! Watches the spread between a fixed-rate funding venue (Boros) and
//! floating perpetual funding (Hyperliquid, Binance), scores dislocations
//! with an external risk assessor, and hedges through a vault when the
//! composite score clears the configured threshold.
//!
//! # Modules
//!
//! - [`domain`] - Pure decision logic: spreads, triggers, volatility, scoring
//! - [`port`] - Traits the application consumes (venues, assessor, vault, audit)
//! - [`adapter`] - Port implementations and the CLI
//! - [`application`] - Decision engine, hedge orchestrator, scheduler
//! - [`infrastructure`] - Configuration and wiring
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `onchain` (default) - Live vault over an EVM RPC via alloy
//! - `testkit` - Scripted collaborators for integration tests

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
