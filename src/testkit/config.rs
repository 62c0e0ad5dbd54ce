//! Canonical settings and config files for tests.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::application::{EngineSettings, HedgeSettings};

/// Market address the helpers register for ETH.
pub const ETH_MARKET: &str = "0x00000000000000000000000000000000000e7401";

/// Default engine settings with short timeouts.
#[must_use]
pub fn engine_settings() -> EngineSettings {
    EngineSettings {
        assessor_timeout: Duration::from_secs(2),
        cycle_timeout: Duration::from_secs(5),
        ..EngineSettings::default()
    }
}

/// Hedge settings with one market per `(asset, address)` pair.
#[must_use]
pub fn hedge_settings(markets: &[(&str, &str)]) -> HedgeSettings {
    HedgeSettings {
        markets: markets
            .iter()
            .map(|(asset, address)| (asset.to_uppercase(), (*address).to_string()))
            .collect::<HashMap<_, _>>(),
        ..HedgeSettings::default()
    }
}

/// Dry-run config for ETH writing its audit trail to `database`.
#[must_use]
pub fn config_toml(database: &Path) -> String {
    format!(
        r#"assets = ["ETH"]
interval_secs = 1
dry_run = true
database = {database:?}

[logging]
level = "warn"

[venues.binance]
enabled = false

[venues.boros.markets]
ETH = "{ETH_MARKET}"
"#,
        database = database.to_string_lossy(),
    )
}

/// Paper collateral a dry run starts with, for `notional`.
#[must_use]
pub fn paper_collateral(notional: Decimal) -> Decimal {
    notional * Decimal::TEN
}
