//! On-chain StabilityVault adapter.
//!
//! Reads go through a plain HTTP provider; writes are signed with the
//! wallet key and only return once a successful receipt is available.

use std::str::FromStr;

use alloy_primitives::{Address, U256};
use alloy_provider::network::{EthereumWallet, ReceiptResponse};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_signer::Signer as _;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::sol;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;
use url::Url;

use crate::domain::{MarketRef, TxReceipt};
use crate::error::{ConfigError, Error, Result};
use crate::port::outbound::vault::VaultWrite;

/// Vault and native balances use 18 decimals.
const DECIMALS: u32 = 18;

sol! {
    #[sol(rpc)]
    contract IStabilityVault {
        function balances(address account) external view returns (uint256);
        function deposit() external payable;
        function recordHedge(uint256 amount) external;
        function openShortYU(address market, uint256 amount) external;
    }
}

/// Signed client for a deployed StabilityVault.
pub struct StabilityVault {
    signer: PrivateKeySigner,
    rpc_url: Url,
    address: Address,
}

impl StabilityVault {
    /// Build the adapter from a hex private key.
    ///
    /// # Errors
    ///
    /// Returns a config error when the key, RPC URL, or vault address
    /// cannot be parsed.
    pub fn new(private_key: &str, rpc_url: &str, address: &str, chain_id: u64) -> Result<Self> {
        if private_key.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "WALLET_PRIVATE_KEY",
            }
            .into());
        }
        let signer = PrivateKeySigner::from_str(private_key.trim())
            .map_err(|e| ConfigError::InvalidValue {
                field: "WALLET_PRIVATE_KEY",
                reason: e.to_string(),
            })?
            .with_chain_id(Some(chain_id));
        let rpc_url = Url::parse(rpc_url).map_err(|e| ConfigError::InvalidValue {
            field: "vault.rpc_url",
            reason: e.to_string(),
        })?;
        let address = parse_address(address, "vault.address")?;

        Ok(Self {
            signer,
            rpc_url,
            address,
        })
    }

    fn wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

fn parse_address(raw: &str, field: &'static str) -> Result<Address> {
    Address::from_str(raw.trim()).map_err(|e| {
        ConfigError::InvalidValue {
            field,
            reason: e.to_string(),
        }
        .into()
    })
}

/// Decimal amount to 18-decimal base units, truncating dust.
fn to_units(amount: Decimal) -> U256 {
    let scaled = (amount * Decimal::from(10u64.pow(DECIMALS))).trunc();
    U256::from(scaled.to_string().parse::<u128>().unwrap_or(0))
}

/// 18-decimal base units to a decimal amount.
fn from_units(units: U256) -> Decimal {
    let raw: u128 = units.try_into().unwrap_or(u128::MAX);
    i128::try_from(raw)
        .ok()
        .and_then(|v| Decimal::try_from_i128_with_scale(v, DECIMALS).ok())
        .map_or(Decimal::MAX, |d| d.normalize())
}

fn vault_error(action: &str, e: impl std::fmt::Display) -> Error {
    Error::Vault(format!("{action}: {e}"))
}

fn confirmed<R: ReceiptResponse>(action: &str, receipt: &R) -> Result<TxReceipt> {
    let tx_hash = format!("{:?}", receipt.transaction_hash());
    if !receipt.status() {
        return Err(Error::Vault(format!("{action} reverted in {tx_hash}")));
    }
    Ok(TxReceipt {
        tx_hash,
        block_number: receipt.block_number(),
    })
}

#[async_trait]
impl VaultWrite for StabilityVault {
    fn account(&self) -> String {
        self.signer.address().to_string()
    }

    async fn read_balance(&self, account: &str) -> Result<Decimal> {
        let owner = parse_address(account, "account")?;
        let provider = ProviderBuilder::new().connect_http(self.rpc_url.clone());
        let vault = IStabilityVault::new(self.address, &provider);
        let balance: U256 = vault
            .balances(owner)
            .call()
            .await
            .map_err(|e| vault_error("balances", e))?;
        Ok(from_units(balance))
    }

    async fn native_balance(&self, account: &str) -> Result<Decimal> {
        let owner = parse_address(account, "account")?;
        let provider = ProviderBuilder::new().connect_http(self.rpc_url.clone());
        let balance = provider
            .get_balance(owner)
            .await
            .map_err(|e| vault_error("get_balance", e))?;
        Ok(from_units(balance))
    }

    async fn deposit(&self, amount: Decimal) -> Result<TxReceipt> {
        let provider = ProviderBuilder::new()
            .wallet(self.wallet())
            .connect_http(self.rpc_url.clone());
        let vault = IStabilityVault::new(self.address, &provider);

        let receipt = vault
            .deposit()
            .value(to_units(amount))
            .send()
            .await
            .map_err(|e| vault_error("deposit send", e))?
            .get_receipt()
            .await
            .map_err(|e| vault_error("deposit receipt", e))?;

        let receipt = confirmed("deposit", &receipt)?;
        info!(%amount, tx_hash = %receipt.tx_hash, "Vault deposit confirmed");
        Ok(receipt)
    }

    async fn record_hedge(&self, amount: Decimal) -> Result<TxReceipt> {
        let provider = ProviderBuilder::new()
            .wallet(self.wallet())
            .connect_http(self.rpc_url.clone());
        let vault = IStabilityVault::new(self.address, &provider);

        let receipt = vault
            .recordHedge(to_units(amount))
            .send()
            .await
            .map_err(|e| vault_error("recordHedge send", e))?
            .get_receipt()
            .await
            .map_err(|e| vault_error("recordHedge receipt", e))?;

        confirmed("recordHedge", &receipt)
    }

    async fn open_position(&self, market: &MarketRef, amount: Decimal) -> Result<TxReceipt> {
        let market_address = parse_address(&market.address, "market")?;
        let provider = ProviderBuilder::new()
            .wallet(self.wallet())
            .connect_http(self.rpc_url.clone());
        let vault = IStabilityVault::new(self.address, &provider);

        let receipt = vault
            .openShortYU(market_address, to_units(amount))
            .send()
            .await
            .map_err(|e| vault_error("openShortYU send", e))?
            .get_receipt()
            .await
            .map_err(|e| vault_error("openShortYU receipt", e))?;

        confirmed("openShortYU", &receipt)
    }

    async fn resolve_market(&self, address: &str) -> Result<Option<MarketRef>> {
        let Ok(market) = Address::from_str(address.trim()) else {
            return Ok(None);
        };
        let provider = ProviderBuilder::new().connect_http(self.rpc_url.clone());
        let code = provider
            .get_code_at(market)
            .await
            .map_err(|e| vault_error("get_code_at", e))?;
        Ok((!code.is_empty()).then(|| MarketRef::new(address.trim())))
    }
}
