//! Diagnostic checks: `kyute check config` and `kyute check health`.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::application::DecisionEngine;
use crate::error::{Error, Result};
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::{Config, PRIVATE_KEY_VARS};

/// Validate the configuration file without starting the engine.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    let config = Config::load(path)?;
    let llm_key = config.llm.provider.api_key_var();
    let llm_key_present = env_present(llm_key);

    if output::is_json() {
        output::json_output(json!({
            "command": "check.config",
            "valid": true,
            "assets": config.assets,
            "dry_run": config.dry_run,
            "interval_secs": config.interval_secs,
            "markets": config.venues.markets(),
            "llm_key_present": llm_key_present,
            "wallet_key_present": config.vault.private_key.is_some(),
        }));
        return Ok(());
    }

    output::section("Configuration Check");
    output::field("Config", path.display());
    output::success("Configuration file is valid");

    output::section("Summary");
    output::field("Assets", config.assets.join(", "));
    output::field("Interval", format!("{}s", config.interval_secs));
    output::field("Dry run", config.dry_run);
    output::field("Primary", config.hedge.primary);
    output::field("Fallback", format!("{:?}", config.hedge.fallback));
    output::field("Database", &config.database);

    let markets = config.venues.markets();
    for asset in &config.assets {
        if !markets.contains_key(asset) {
            output::warning(&format!(
                "No Boros market configured for {asset}; hedges will fail preflight"
            ));
        }
    }

    if llm_key_present {
        output::success(&format!("{llm_key} detected"));
    } else {
        output::warning(&format!(
            "{llm_key} not set; risk assessment will use the fallback formula"
        ));
    }

    if config.dry_run {
        output::field("Vault", "paper");
    } else if config.vault.private_key.is_some() {
        output::success("Wallet credentials detected");
    } else {
        output::warning(&format!(
            "Live mode without a signing key (set {})",
            PRIVATE_KEY_VARS[0]
        ));
    }

    output::success("Configuration check complete");
    Ok(())
}

fn env_present(var: &str) -> bool {
    std::env::var(var).is_ok_and(|v| !v.trim().is_empty())
}

/// One line of the health report.
#[derive(Debug)]
pub struct HealthCheck {
    pub name: String,
    pub critical: bool,
    pub result: std::result::Result<String, String>,
}

impl HealthCheck {
    fn new(name: impl Into<String>, critical: bool, result: std::result::Result<String, String>) -> Self {
        Self {
            name: name.into(),
            critical,
            result,
        }
    }
}

/// Probe every rate source for every asset, then the vault and assessor.
pub async fn health_report(engine: &DecisionEngine, assets: &[String]) -> Vec<HealthCheck> {
    let mut checks = Vec::new();

    for asset in assets {
        for probe in engine.probe(asset).await {
            checks.push(HealthCheck::new(
                format!("{} {} ({})", probe.venue, asset, probe.leg),
                true,
                probe
                    .result
                    .map(|rate| format!("rate {rate}"))
                    .map_err(|e| e.to_string()),
            ));
        }
    }

    let vault = engine.orchestrator().vault();
    let account = vault.account();
    checks.push(HealthCheck::new(
        "vault",
        true,
        vault
            .read_balance(&account)
            .await
            .map(|balance| format!("{account} collateral {balance}"))
            .map_err(|e| e.to_string()),
    ));

    checks.push(HealthCheck::new(
        "assessor",
        false,
        engine
            .assessor_name()
            .map(|name| name.to_string())
            .ok_or_else(|| "not configured, fallback formula only".to_string()),
    ));

    checks
}

/// Run the health check against live venues.
pub async fn execute_health<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let config = Config::load(config_path)?;
    config.logging.with_level("warn").init();

    let components = bootstrap::build(&config)?;
    let mut checks = health_report(&components.engine, &config.assets).await;
    checks.push(HealthCheck::new(
        "audit store",
        true,
        components
            .store
            .recent_hedges(1, None)
            .map(|_| config.database.clone())
            .map_err(|e| e.to_string()),
    ));

    let healthy = checks.iter().all(|c| !c.critical || c.result.is_ok());

    if output::is_json() {
        let rows = checks
            .iter()
            .map(|check| {
                let (status, details) = match &check.result {
                    Ok(details) => ("healthy", details),
                    Err(reason) => ("unhealthy", reason),
                };
                json!({
                    "name": check.name,
                    "critical": check.critical,
                    "status": status,
                    "details": details,
                })
            })
            .collect::<Vec<_>>();
        output::json_output(json!({
            "command": "check.health",
            "status": if healthy { "healthy" } else { "unhealthy" },
            "checks": rows,
        }));
    } else {
        output::section("Health Check");
        for check in &checks {
            let suffix = if check.critical { " (critical)" } else { "" };
            let value = match &check.result {
                Ok(details) => output::positive(details),
                Err(reason) => output::negative(reason),
            };
            output::field(&format!("{}{}", check.name, suffix), value);
        }
    }

    if !healthy {
        return Err(Error::Connection(
            "one or more critical health checks failed".to_string(),
        ));
    }
    output::success("All critical checks passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal_macros::dec;

    use super::*;
    use crate::adapter::outbound::execution::StrategyKind;
    use crate::application::{EngineSettings, HedgeOrchestrator, HedgeSettings};
    use crate::port::outbound::audit::AuditSinkSet;
    use crate::testkit::{ScriptedRateSource, ScriptedVault};

    fn engine(floating: ScriptedRateSource) -> DecisionEngine {
        let audit = Arc::new(AuditSinkSet::new());
        let vault = Arc::new(ScriptedVault::funded("0xm", dec!(0.5)));
        let orchestrator = Arc::new(HedgeOrchestrator::new(
            vault.clone(),
            StrategyKind::DirectOrder.build(vault),
            None,
            audit.clone(),
            HedgeSettings::default(),
        ));
        DecisionEngine::new(
            EngineSettings::default(),
            vec![
                Arc::new(ScriptedRateSource::fixed("boros", "ETH", dec!(0.05))),
                Arc::new(floating),
            ],
            None,
            orchestrator,
            audit,
        )
    }

    #[tokio::test]
    async fn report_covers_sources_vault_and_assessor() {
        let engine = engine(ScriptedRateSource::floating("hyperliquid", "ETH", dec!(0.08)));

        let checks = health_report(&engine, &["ETH".to_string()]).await;

        let names: Vec<&str> = checks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["boros ETH (fixed)", "hyperliquid ETH (floating)", "vault", "assessor"]
        );
        assert_eq!(checks[2].result, Ok("0xtest collateral 0.5".to_string()));
        assert!(!checks[3].critical);
        assert!(checks[3].result.is_err());
    }

    #[tokio::test]
    async fn missing_rate_is_a_critical_failure() {
        let engine = engine(ScriptedRateSource::new("binance", crate::domain::RateLeg::Floating));

        let checks = health_report(&engine, &["ETH".to_string()]).await;

        let binance = checks.iter().find(|c| c.name.starts_with("binance")).unwrap();
        assert!(binance.critical);
        assert!(binance.result.is_err());
    }
}
