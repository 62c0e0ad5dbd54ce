//! Hedge execution strategies over the vault.

pub mod direct_order;
pub mod vault_record;

pub use direct_order::DirectOrderStrategy;
pub use vault_record::VaultRecordStrategy;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::port::outbound::execution::HedgeStrategy;
use crate::port::outbound::vault::VaultWrite;

/// Configurable choice of execution path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Open a position on the resolved market.
    DirectOrder,
    /// Record the hedge on the vault contract.
    VaultRecord,
}

impl StrategyKind {
    /// Configuration name of the strategy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DirectOrder => "direct_order",
            Self::VaultRecord => "vault_record",
        }
    }

    /// Build the strategy over a vault.
    #[must_use]
    pub fn build(self, vault: Arc<dyn VaultWrite>) -> Arc<dyn HedgeStrategy> {
        match self {
            Self::DirectOrder => Arc::new(DirectOrderStrategy::new(vault)),
            Self::VaultRecord => Arc::new(VaultRecordStrategy::new(vault)),
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
