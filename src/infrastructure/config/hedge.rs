//! Hedge sizing and execution-path configuration.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::adapter::outbound::execution::StrategyKind;

/// Secondary execution path, or none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackKind {
    None,
    DirectOrder,
    #[default]
    VaultRecord,
}

impl FallbackKind {
    /// Strategy to build, `None` for `none`.
    #[must_use]
    pub const fn strategy(self) -> Option<StrategyKind> {
        match self {
            Self::None => None,
            Self::DirectOrder => Some(StrategyKind::DirectOrder),
            Self::VaultRecord => Some(StrategyKind::VaultRecord),
        }
    }
}

/// `[hedge]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct HedgeConfig {
    /// Notional of each hedge, in the vault's collateral unit.
    #[serde(default = "default_notional")]
    pub notional: Decimal,

    /// Wrap native balance into collateral when the vault is short.
    #[serde(default = "default_auto_top_up")]
    pub auto_top_up: bool,

    #[serde(default = "default_primary")]
    pub primary: StrategyKind,

    #[serde(default)]
    pub fallback: FallbackKind,
}

impl Default for HedgeConfig {
    fn default() -> Self {
        Self {
            notional: default_notional(),
            auto_top_up: default_auto_top_up(),
            primary: default_primary(),
            fallback: FallbackKind::default(),
        }
    }
}

fn default_notional() -> Decimal {
    Decimal::new(12, 2)
}

const fn default_auto_top_up() -> bool {
    true
}

const fn default_primary() -> StrategyKind {
    StrategyKind::DirectOrder
}
