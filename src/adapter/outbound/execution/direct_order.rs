//! Primary path: open a position against the yield market.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::{HedgeRequest, MarketRef, TxReceipt};
use crate::error::Result;
use crate::port::outbound::execution::HedgeStrategy;
use crate::port::outbound::vault::VaultWrite;

/// Primary strategy: opens a short position on the market.
pub struct DirectOrderStrategy {
    vault: Arc<dyn VaultWrite>,
}

impl DirectOrderStrategy {
    /// Create the strategy over a vault.
    #[must_use]
    pub fn new(vault: Arc<dyn VaultWrite>) -> Self {
        Self { vault }
    }
}

#[async_trait]
impl HedgeStrategy for DirectOrderStrategy {
    fn name(&self) -> &'static str {
        "direct_order"
    }

    async fn execute(&self, request: &HedgeRequest, market: &MarketRef) -> Result<TxReceipt> {
        info!(
            asset = request.asset(),
            market = %market.address,
            amount = %request.amount(),
            "Opening hedge position"
        );
        self.vault.open_position(market, request.amount()).await
    }
}
