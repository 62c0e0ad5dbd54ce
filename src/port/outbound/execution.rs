//! Hedge execution strategy port.

use async_trait::async_trait;

use crate::domain::{HedgeRequest, MarketRef, TxReceipt};
use crate::error::Result;

/// One way of placing a hedge.
///
/// Strategies do not retry or fall back; the orchestrator owns ordering.
#[async_trait]
pub trait HedgeStrategy: Send + Sync {
    /// Strategy name recorded on hedge events.
    fn name(&self) -> &'static str;

    /// Execute the hedge and wait for confirmation.
    ///
    /// # Errors
    ///
    /// Returns an error when the transaction fails or cannot be confirmed.
    async fn execute(&self, request: &HedgeRequest, market: &MarketRef) -> Result<TxReceipt>;
}
