//! Fallback path: record the hedge on the vault contract.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::{HedgeRequest, MarketRef, TxReceipt};
use crate::error::Result;
use crate::port::outbound::execution::HedgeStrategy;
use crate::port::outbound::vault::VaultWrite;

/// Fallback strategy: records the hedge on the vault.
pub struct VaultRecordStrategy {
    vault: Arc<dyn VaultWrite>,
}

impl VaultRecordStrategy {
    /// Create the strategy over a vault.
    #[must_use]
    pub fn new(vault: Arc<dyn VaultWrite>) -> Self {
        Self { vault }
    }
}

#[async_trait]
impl HedgeStrategy for VaultRecordStrategy {
    fn name(&self) -> &'static str {
        "vault_record"
    }

    async fn execute(&self, request: &HedgeRequest, _market: &MarketRef) -> Result<TxReceipt> {
        info!(
            asset = request.asset(),
            amount = %request.amount(),
            "Recording hedge on vault"
        );
        self.vault.record_hedge(request.amount()).await
    }
}
