//! Vault write capability.
//!
//! The engine treats every write as atomic and confirmable: a method only
//! returns `Ok` once the transaction has been confirmed.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{MarketRef, TxReceipt};
use crate::error::Result;

/// On-chain (or simulated) vault used for preflight and execution.
#[async_trait]
pub trait VaultWrite: Send + Sync {
    /// Account the vault acts for.
    fn account(&self) -> String;

    /// Collateral credited to `account` inside the vault.
    async fn read_balance(&self, account: &str) -> Result<Decimal>;

    /// Native-asset balance held outside the vault, available for top-up.
    async fn native_balance(&self, account: &str) -> Result<Decimal>;

    /// Wrap native asset into vault collateral.
    async fn deposit(&self, amount: Decimal) -> Result<TxReceipt>;

    /// Record a hedge of `amount` against the vault itself.
    async fn record_hedge(&self, amount: Decimal) -> Result<TxReceipt>;

    /// Open a hedge position of `amount` on `market`.
    async fn open_position(&self, market: &MarketRef, amount: Decimal) -> Result<TxReceipt>;

    /// Resolve a configured market address to a live market.
    ///
    /// Returns `Ok(None)` when the market does not exist.
    async fn resolve_market(&self, address: &str) -> Result<Option<MarketRef>>;
}
