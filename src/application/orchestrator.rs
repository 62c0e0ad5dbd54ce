//! Hedge orchestration.
//!
//! `IDLE -> PREFLIGHT -> PRIMARY [-> FALLBACK] -> AUDITED -> IDLE`
//!
//! Every call to [`HedgeOrchestrator::execute_hedge`] ends in exactly one
//! [`HedgeEvent`], whichever path ran and however it ended. Broadcast
//! steps run on their own tasks: when the cycle deadline passes the
//! orchestrator stops waiting, but a transaction already in flight is left
//! to settle and its result is logged.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, warn};

use crate::domain::error::DomainError;
use crate::domain::{
    CompositeDecision, HedgeEvent, HedgeRequest, HedgeStatus, MarketRef, RiskAssessment,
    SpreadSample, TxReceipt,
};
use crate::error::{Error, HedgeError, PreflightFailure, Result};
use crate::port::outbound::audit::{AuditRecord, AuditSinkSet};
use crate::port::outbound::execution::HedgeStrategy;
use crate::port::outbound::vault::VaultWrite;

/// Sizing and collateral policy.
#[derive(Debug, Clone, PartialEq)]
pub struct HedgeSettings {
    /// Notional of every hedge.
    pub notional: Decimal,
    /// Wrap native balance into collateral when the vault is short.
    pub auto_top_up: bool,
    /// Upper-case asset to market address.
    pub markets: HashMap<String, String>,
}

impl Default for HedgeSettings {
    fn default() -> Self {
        Self {
            notional: Decimal::new(12, 2),
            auto_top_up: true,
            markets: HashMap::new(),
        }
    }
}

/// A confirmed hedge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HedgeOutcome {
    pub receipt: TxReceipt,
    /// Strategy that confirmed.
    pub strategy: &'static str,
    /// Primary failure that led to the fallback, if any.
    pub primary_error: Option<String>,
}

impl HedgeOutcome {
    /// Whether the fallback strategy produced the receipt.
    #[must_use]
    pub const fn used_fallback(&self) -> bool {
        self.primary_error.is_some()
    }
}

/// Preflights, executes and audits hedge attempts.
pub struct HedgeOrchestrator {
    vault: Arc<dyn VaultWrite>,
    primary: Arc<dyn HedgeStrategy>,
    fallback: Option<Arc<dyn HedgeStrategy>>,
    audit: Arc<AuditSinkSet>,
    settings: HedgeSettings,
}

impl HedgeOrchestrator {
    /// Create an orchestrator. Without a fallback a primary failure fails the attempt.
    #[must_use]
    pub fn new(
        vault: Arc<dyn VaultWrite>,
        primary: Arc<dyn HedgeStrategy>,
        fallback: Option<Arc<dyn HedgeStrategy>>,
        audit: Arc<AuditSinkSet>,
        settings: HedgeSettings,
    ) -> Self {
        Self {
            vault,
            primary,
            fallback,
            audit,
            settings,
        }
    }

    /// Hedge tunables.
    #[must_use]
    pub const fn settings(&self) -> &HedgeSettings {
        &self.settings
    }

    /// Vault used for preflight and execution.
    #[must_use]
    pub fn vault(&self) -> &dyn VaultWrite {
        self.vault.as_ref()
    }

    /// Configured market address for an asset; empty when none is set.
    #[must_use]
    pub fn market_for(&self, asset: &str) -> &str {
        self.settings
            .markets
            .get(&asset.to_uppercase())
            .map_or("", String::as_str)
    }

    /// Build the request for a hedge decision using the configured policy.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] when the configured notional is invalid.
    pub fn prepare(
        &self,
        asset: &str,
        spread: &SpreadSample,
        risk: &RiskAssessment,
        decision: &CompositeDecision,
    ) -> std::result::Result<HedgeRequest, DomainError> {
        HedgeRequest::try_new(
            asset,
            self.market_for(asset),
            self.settings.notional,
            spread,
            risk,
            decision,
        )
    }

    /// Run one hedge attempt and audit it.
    ///
    /// Not deduplicated: callers decide when a hedge is warranted.
    ///
    /// # Errors
    ///
    /// Returns the [`HedgeError`] that ended the attempt. The failure has
    /// already been audited when this returns.
    pub async fn execute_hedge(
        &self,
        request: &HedgeRequest,
        deadline: Instant,
    ) -> std::result::Result<HedgeOutcome, HedgeError> {
        let result = match timeout_at(deadline, self.attempt(request)).await {
            Ok(result) => result,
            Err(_) => Err(HedgeError::Timeout),
        };

        let event = match &result {
            Ok(outcome) => {
                let reason = outcome.primary_error.as_ref().map_or_else(
                    || "confirmed".to_string(),
                    |primary| format!("confirmed by fallback after primary failed: {primary}"),
                );
                HedgeEvent::from_request(
                    request,
                    HedgeStatus::Success,
                    outcome.receipt.tx_hash.clone(),
                    Some(outcome.strategy),
                    reason,
                )
            }
            Err(e) => HedgeEvent::from_request(
                request,
                HedgeStatus::Failure,
                request.market_address(),
                failed_strategy(e),
                e.to_string(),
            ),
        };

        match &result {
            Ok(outcome) => info!(
                asset = request.asset(),
                strategy = outcome.strategy,
                tx_hash = %outcome.receipt.tx_hash,
                fallback = outcome.used_fallback(),
                "Hedge executed"
            ),
            Err(e) => error!(asset = request.asset(), error = %e, "Hedge failed"),
        }

        self.audit.append_all(&AuditRecord::Hedge(event)).await;
        result
    }

    async fn attempt(
        &self,
        request: &HedgeRequest,
    ) -> std::result::Result<HedgeOutcome, HedgeError> {
        let market = self.preflight(request).await?;

        let primary_error = match self.run_strategy(&self.primary, request, &market).await {
            Ok(receipt) => {
                return Ok(HedgeOutcome {
                    receipt,
                    strategy: self.primary.name(),
                    primary_error: None,
                })
            }
            Err(e) => e.to_string(),
        };

        let Some(fallback) = &self.fallback else {
            return Err(HedgeError::Execution {
                strategy: self.primary.name(),
                reason: primary_error,
            });
        };

        warn!(
            asset = request.asset(),
            primary = self.primary.name(),
            fallback = fallback.name(),
            error = %primary_error,
            "Primary execution failed, trying fallback"
        );

        match self.run_strategy(fallback, request, &market).await {
            Ok(receipt) => Ok(HedgeOutcome {
                receipt,
                strategy: fallback.name(),
                primary_error: Some(primary_error),
            }),
            Err(e) => Err(HedgeError::FallbackFailed {
                primary: self.primary.name(),
                primary_reason: primary_error,
                fallback: fallback.name(),
                fallback_reason: e.to_string(),
            }),
        }
    }

    /// Resolve the market and make sure collateral covers the notional.
    async fn preflight(
        &self,
        request: &HedgeRequest,
    ) -> std::result::Result<MarketRef, PreflightFailure> {
        let address = request.market_address();
        let market_not_found = || PreflightFailure::MarketNotFound {
            market: if address.is_empty() {
                format!("(none configured for {})", request.asset())
            } else {
                address.to_string()
            },
        };
        if address.is_empty() {
            return Err(market_not_found());
        }

        let market = self
            .vault
            .resolve_market(address)
            .await
            .map_err(|e| PreflightFailure::Vault(e.to_string()))?
            .ok_or_else(market_not_found)?;

        let account = self.vault.account();
        let required = request.amount();
        let balance = self
            .vault
            .read_balance(&account)
            .await
            .map_err(|e| PreflightFailure::Vault(e.to_string()))?;
        debug!(%account, %balance, %required, "Preflight collateral");

        if balance >= required {
            return Ok(market);
        }

        let insufficient = PreflightFailure::InsufficientCollateral { balance, required };
        if !self.settings.auto_top_up {
            return Err(insufficient);
        }

        let shortfall = required - balance;
        let native = self
            .vault
            .native_balance(&account)
            .await
            .map_err(|e| PreflightFailure::Vault(e.to_string()))?;
        if native < shortfall {
            warn!(%native, %shortfall, "Native balance cannot cover top-up");
            return Err(insufficient);
        }

        info!(%shortfall, "Topping up vault collateral");
        let vault = Arc::clone(&self.vault);
        broadcast("deposit", async move { vault.deposit(shortfall).await })
            .await
            .map_err(|e| PreflightFailure::Vault(format!("top-up failed: {e}")))?;

        Ok(market)
    }

    async fn run_strategy(
        &self,
        strategy: &Arc<dyn HedgeStrategy>,
        request: &HedgeRequest,
        market: &MarketRef,
    ) -> Result<TxReceipt> {
        let task_strategy = Arc::clone(strategy);
        let request = request.clone();
        let market = market.clone();
        broadcast(strategy.name(), async move {
            task_strategy.execute(&request, &market).await
        })
        .await
    }
}

/// Strategy recorded on a failed attempt.
fn failed_strategy(error: &HedgeError) -> Option<&'static str> {
    match error {
        HedgeError::Execution { strategy, .. } => Some(strategy),
        HedgeError::FallbackFailed { fallback, .. } => Some(fallback),
        HedgeError::Preflight(_) | HedgeError::Timeout => None,
    }
}

/// Run a write on its own task so dropping the caller never cancels it.
async fn broadcast<T, F>(label: &'static str, write: F) -> Result<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        let result = write.await;
        match &result {
            Ok(_) => debug!(write = label, "Broadcast settled"),
            Err(e) => warn!(write = label, error = %e, "Broadcast failed"),
        }
        result
    });

    handle
        .await
        .map_err(|e| Error::Vault(format!("{label} task aborted: {e}")))?
}
