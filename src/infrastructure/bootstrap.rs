//! Composition root: turns a [`Config`] into a running engine.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::adapter::outbound::assessor::LlmRiskAssessor;
use crate::adapter::outbound::llm::{Anthropic, Gemini, OpenAi};
use crate::adapter::outbound::sqlite::{self, SqliteAuditSink};
use crate::adapter::outbound::vault::PaperVault;
use crate::adapter::outbound::venue::{BinanceSource, BorosSource, HyperliquidSource};
use crate::application::{DecisionEngine, HedgeOrchestrator, Scheduler};
use crate::error::{Error, Result};
use crate::infrastructure::config::llm::LlmProvider;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::assessor::RiskAssessor;
use crate::port::outbound::audit::{AuditSinkSet, LogAuditSink};
use crate::port::outbound::llm::Llm;
use crate::port::outbound::rate::RateSource;
use crate::port::outbound::vault::VaultWrite;

/// Account name of the simulated vault.
pub const PAPER_ACCOUNT: &str = "paper";

/// Simulated collateral, in hedges' worth of notional.
const PAPER_COLLATERAL_HEDGES: i64 = 10;

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Everything a command needs to run cycles.
pub struct Components {
    pub engine: Arc<DecisionEngine>,
    pub scheduler: Arc<Scheduler>,
    /// Direct handle on the persistent store, for history queries.
    pub store: SqliteAuditSink,
}

/// Shared HTTP client for venues and LLM providers.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn http_client() -> Result<Client> {
    Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!("kyute/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(Error::Http)
}

/// Enabled venue rate sources, fixed leg first.
#[must_use]
pub fn build_sources(config: &Config, client: &Client) -> Vec<Arc<dyn RateSource>> {
    let venues = &config.venues;
    let mut sources: Vec<Arc<dyn RateSource>> = Vec::new();

    if venues.boros.enabled {
        if venues.boros.markets.is_empty() {
            warn!("Boros enabled without markets; the fixed leg will have no data");
        }
        sources.push(Arc::new(BorosSource::new(
            client.clone(),
            venues.boros_url(),
            &venues.boros.markets,
        )));
    }
    if venues.hyperliquid.enabled {
        sources.push(Arc::new(HyperliquidSource::new(
            client.clone(),
            venues.hyperliquid_url(),
        )));
    }
    if venues.binance.enabled {
        sources.push(Arc::new(BinanceSource::new(
            client.clone(),
            venues.binance_url(),
        )));
    }

    info!(
        sources = ?sources.iter().map(|s| s.venue().to_string()).collect::<Vec<_>>(),
        "Rate sources configured"
    );
    sources
}

/// LLM for the configured provider, if its API key is set.
#[must_use]
pub fn build_llm(config: &Config, client: &Client) -> Option<Arc<dyn Llm>> {
    let settings = config.llm.completion_settings();
    let llm: Result<Arc<dyn Llm>> = match config.llm.provider {
        LlmProvider::Gemini => {
            Gemini::from_env(client.clone(), settings).map(|l| Arc::new(l) as Arc<dyn Llm>)
        }
        LlmProvider::Anthropic => {
            Anthropic::from_env(client.clone(), settings).map(|l| Arc::new(l) as Arc<dyn Llm>)
        }
        LlmProvider::OpenAi => {
            OpenAi::from_env(client.clone(), settings).map(|l| Arc::new(l) as Arc<dyn Llm>)
        }
    };

    match llm {
        Ok(llm) => Some(llm),
        Err(e) => {
            warn!(
                provider = ?config.llm.provider,
                key = config.llm.provider.api_key_var(),
                error = %e,
                "LLM API key not set, risk assessment will use the fallback formula"
            );
            None
        }
    }
}

/// Risk assessor backed by the configured LLM, if one is available.
#[must_use]
pub fn build_assessor(config: &Config, client: &Client) -> Option<Arc<dyn RiskAssessor>> {
    build_llm(config, client).map(|llm| {
        let assessor = LlmRiskAssessor::new(llm);
        info!(provider = assessor.provider(), "Risk assessor configured");
        Arc::new(assessor) as Arc<dyn RiskAssessor>
    })
}

/// Paper vault for dry runs, the on-chain vault otherwise.
///
/// # Errors
///
/// Returns a config error when the live vault cannot be built.
pub fn build_vault(config: &Config) -> Result<Arc<dyn VaultWrite>> {
    if config.dry_run {
        let collateral = config.hedge.notional * Decimal::from(PAPER_COLLATERAL_HEDGES);
        let vault = config
            .venues
            .boros
            .markets
            .values()
            .fold(
                PaperVault::new(PAPER_ACCOUNT, collateral, Decimal::ONE),
                |vault, market| vault.with_market(market),
            );
        info!(%collateral, "Dry run: using paper vault");
        return Ok(Arc::new(vault));
    }
    live_vault(config)
}

#[cfg(feature = "onchain")]
fn live_vault(config: &Config) -> Result<Arc<dyn VaultWrite>> {
    use crate::adapter::outbound::vault::stability::StabilityVault;
    use crate::error::ConfigError;

    let key = config
        .vault
        .private_key
        .as_deref()
        .ok_or(ConfigError::MissingField {
            field: "WALLET_PRIVATE_KEY",
        })?;
    let vault = StabilityVault::new(
        key,
        &config.vault.rpc_url,
        &config.vault.address,
        config.vault.chain_id,
    )?;
    info!(
        address = %config.vault.address,
        chain_id = config.vault.chain_id,
        account = %vault.account(),
        "Live vault configured"
    );
    Ok(Arc::new(vault))
}

#[cfg(not(feature = "onchain"))]
fn live_vault(_config: &Config) -> Result<Arc<dyn VaultWrite>> {
    Err(crate::error::ConfigError::InvalidValue {
        field: "dry_run",
        reason: "live execution requires the onchain feature".to_string(),
    }
    .into())
}

/// Log sink plus the SQLite store.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated.
pub fn build_audit(config: &Config) -> Result<(AuditSinkSet, SqliteAuditSink)> {
    let pool = sqlite::open(&config.database)?;
    let store = SqliteAuditSink::new(pool);

    let mut audit = AuditSinkSet::new();
    audit.register(Box::new(LogAuditSink));
    audit.register(Box::new(store.clone()));
    info!(database = %config.database, "Audit store ready");
    Ok((audit, store))
}

/// Wire every component from configuration.
///
/// # Errors
///
/// Returns an error when the HTTP client, vault, or audit store cannot be
/// built.
pub fn build(config: &Config) -> Result<Components> {
    let client = http_client()?;
    let sources = build_sources(config, &client);
    let assessor = build_assessor(config, &client);
    let vault = build_vault(config)?;
    let (audit, store) = build_audit(config)?;
    let audit = Arc::new(audit);

    let primary = config.hedge.primary.build(Arc::clone(&vault));
    let fallback = config
        .hedge
        .fallback
        .strategy()
        .map(|kind| kind.build(Arc::clone(&vault)));
    info!(
        primary = %config.hedge.primary,
        fallback = ?config.hedge.fallback,
        "Execution strategies configured"
    );

    let orchestrator = Arc::new(HedgeOrchestrator::new(
        vault,
        primary,
        fallback,
        Arc::clone(&audit),
        config.hedge_settings(),
    ));
    let engine = Arc::new(DecisionEngine::new(
        config.engine.settings(),
        sources,
        assessor,
        orchestrator,
        audit,
    ));
    let scheduler = Arc::new(Scheduler::new(Arc::clone(&engine), config.interval()));

    Ok(Components {
        engine,
        scheduler,
        store,
    })
}
