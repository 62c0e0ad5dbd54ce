//! In-memory vault for dry runs.
//!
//! Balances and markets are simulated; every write succeeds immediately
//! with a synthetic transaction hash unless collateral is short.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::domain::{MarketRef, TxReceipt};
use crate::error::{Error, Result};
use crate::port::outbound::vault::VaultWrite;

#[derive(Debug, Default)]
struct Balances {
    vault: Decimal,
    native: Decimal,
}

/// Simulated vault with a single account.
#[derive(Debug)]
pub struct PaperVault {
    account: String,
    balances: Mutex<Balances>,
    /// Lower-case market addresses that resolve.
    markets: HashSet<String>,
    hedges: Mutex<Vec<Decimal>>,
}

impl PaperVault {
    /// Paper vault for `account` with starting balances.
    #[must_use]
    pub fn new(account: impl Into<String>, vault_balance: Decimal, native_balance: Decimal) -> Self {
        Self {
            account: account.into(),
            balances: Mutex::new(Balances {
                vault: vault_balance,
                native: native_balance,
            }),
            markets: HashSet::new(),
            hedges: Mutex::new(Vec::new()),
        }
    }

    /// Make a market address resolvable.
    #[must_use]
    pub fn with_market(mut self, address: &str) -> Self {
        self.markets.insert(address.to_lowercase());
        self
    }

    /// Amounts hedged so far, in order.
    #[must_use]
    pub fn hedges(&self) -> Vec<Decimal> {
        self.hedges.lock().clone()
    }

    fn receipt() -> TxReceipt {
        TxReceipt::new(format!("paper-{}", Uuid::new_v4().simple()))
    }
}

#[async_trait]
impl VaultWrite for PaperVault {
    fn account(&self) -> String {
        self.account.clone()
    }

    async fn read_balance(&self, _account: &str) -> Result<Decimal> {
        Ok(self.balances.lock().vault)
    }

    async fn native_balance(&self, _account: &str) -> Result<Decimal> {
        Ok(self.balances.lock().native)
    }

    async fn deposit(&self, amount: Decimal) -> Result<TxReceipt> {
        let mut balances = self.balances.lock();
        if balances.native < amount {
            return Err(Error::Vault(format!(
                "paper deposit of {amount} exceeds native balance {}",
                balances.native
            )));
        }
        balances.native -= amount;
        balances.vault += amount;
        info!(%amount, vault = %balances.vault, "Paper deposit");
        Ok(Self::receipt())
    }

    async fn record_hedge(&self, amount: Decimal) -> Result<TxReceipt> {
        self.hedges.lock().push(amount);
        info!(%amount, "Paper hedge recorded");
        Ok(Self::receipt())
    }

    async fn open_position(&self, market: &MarketRef, amount: Decimal) -> Result<TxReceipt> {
        {
            let mut balances = self.balances.lock();
            if balances.vault < amount {
                return Err(Error::Vault(format!(
                    "paper position of {amount} exceeds vault balance {}",
                    balances.vault
                )));
            }
            balances.vault -= amount;
        }
        self.hedges.lock().push(amount);
        info!(market = %market.address, %amount, "Paper position opened");
        Ok(Self::receipt())
    }

    async fn resolve_market(&self, address: &str) -> Result<Option<MarketRef>> {
        Ok(self
            .markets
            .contains(&address.to_lowercase())
            .then(|| MarketRef::new(address)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn deposit_moves_native_into_vault() {
        let vault = PaperVault::new("0xme", dec!(0.05), dec!(1));
        vault.deposit(dec!(0.07)).await.unwrap();
        assert_eq!(vault.read_balance("0xme").await.unwrap(), dec!(0.12));
        assert_eq!(vault.native_balance("0xme").await.unwrap(), dec!(0.93));
    }

    #[tokio::test]
    async fn deposit_beyond_native_fails() {
        let vault = PaperVault::new("0xme", dec!(0), dec!(0.01));
        assert!(vault.deposit(dec!(0.5)).await.is_err());
    }

    #[tokio::test]
    async fn open_position_spends_collateral() {
        let vault = PaperVault::new("0xme", dec!(0.2), dec!(0)).with_market("0xM");
        let market = vault.resolve_market("0xm").await.unwrap().unwrap();
        let receipt = vault.open_position(&market, dec!(0.12)).await.unwrap();

        assert!(receipt.tx_hash.starts_with("paper-"));
        assert_eq!(vault.read_balance("0xme").await.unwrap(), dec!(0.08));
        assert_eq!(vault.hedges(), vec![dec!(0.12)]);
    }

    #[tokio::test]
    async fn unknown_market_does_not_resolve() {
        let vault = PaperVault::new("0xme", dec!(1), dec!(0));
        assert!(vault.resolve_market("0xnope").await.unwrap().is_none());
    }
}
