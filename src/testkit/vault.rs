//! Vault with injectable failures.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::adapter::outbound::vault::PaperVault;
use crate::domain::{MarketRef, TxReceipt};
use crate::error::{Error, Result};
use crate::port::outbound::vault::VaultWrite;

/// Vault operations a test can make fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VaultOp {
    ReadBalance,
    Deposit,
    RecordHedge,
    OpenPosition,
    ResolveMarket,
}

/// [`PaperVault`] wrapper that records writes and fails on demand.
pub struct ScriptedVault {
    inner: PaperVault,
    failing: Mutex<HashSet<VaultOp>>,
    writes: Mutex<Vec<VaultOp>>,
}

impl ScriptedVault {
    /// Funded vault on which `market` resolves.
    pub fn funded(market: &str, balance: Decimal) -> Self {
        Self::new(PaperVault::new("0xtest", balance, Decimal::ZERO).with_market(market))
    }

    /// Wrap a paper vault.
    pub fn new(inner: PaperVault) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call of `op`.
    #[must_use]
    pub fn failing_on(self, op: VaultOp) -> Self {
        self.failing.lock().insert(op);
        self
    }

    /// Successful writes, in order.
    pub fn writes(&self) -> Vec<VaultOp> {
        self.writes.lock().clone()
    }

    fn check(&self, op: VaultOp) -> Result<()> {
        if self.failing.lock().contains(&op) {
            return Err(Error::Vault(format!("scripted {op:?} failure")));
        }
        Ok(())
    }

    fn wrote(&self, op: VaultOp, receipt: TxReceipt) -> TxReceipt {
        self.writes.lock().push(op);
        receipt
    }
}

#[async_trait]
impl VaultWrite for ScriptedVault {
    fn account(&self) -> String {
        self.inner.account()
    }

    async fn read_balance(&self, account: &str) -> Result<Decimal> {
        self.check(VaultOp::ReadBalance)?;
        self.inner.read_balance(account).await
    }

    async fn native_balance(&self, account: &str) -> Result<Decimal> {
        self.inner.native_balance(account).await
    }

    async fn deposit(&self, amount: Decimal) -> Result<TxReceipt> {
        self.check(VaultOp::Deposit)?;
        let receipt = self.inner.deposit(amount).await?;
        Ok(self.wrote(VaultOp::Deposit, receipt))
    }

    async fn record_hedge(&self, amount: Decimal) -> Result<TxReceipt> {
        self.check(VaultOp::RecordHedge)?;
        let receipt = self.inner.record_hedge(amount).await?;
        Ok(self.wrote(VaultOp::RecordHedge, receipt))
    }

    async fn open_position(&self, market: &MarketRef, amount: Decimal) -> Result<TxReceipt> {
        self.check(VaultOp::OpenPosition)?;
        let receipt = self.inner.open_position(market, amount).await?;
        Ok(self.wrote(VaultOp::OpenPosition, receipt))
    }

    async fn resolve_market(&self, address: &str) -> Result<Option<MarketRef>> {
        self.check(VaultOp::ResolveMarket)?;
        self.inner.resolve_market(address).await
    }
}
