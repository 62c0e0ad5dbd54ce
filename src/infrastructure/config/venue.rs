//! Venue rate source configuration.

use std::collections::HashMap;

use serde::Deserialize;

use crate::adapter::outbound::venue::{binance, boros, hyperliquid};

/// A floating-rate venue.
#[derive(Debug, Clone, Deserialize)]
pub struct VenueConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Overrides the public API endpoint.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: None,
        }
    }
}

/// The fixed-rate venue and its per-asset markets.
#[derive(Debug, Clone, Deserialize)]
pub struct BorosConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Asset symbol to market address.
    #[serde(default)]
    pub markets: HashMap<String, String>,
}

impl Default for BorosConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: None,
            markets: HashMap::new(),
        }
    }
}

/// `[venues]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VenuesConfig {
    #[serde(default)]
    pub binance: VenueConfig,
    #[serde(default)]
    pub hyperliquid: VenueConfig,
    #[serde(default)]
    pub boros: BorosConfig,
}

impl VenuesConfig {
    /// Binance base URL.
    #[must_use]
    pub fn binance_url(&self) -> &str {
        self.binance
            .base_url
            .as_deref()
            .unwrap_or(binance::DEFAULT_BASE_URL)
    }

    /// Hyperliquid base URL.
    #[must_use]
    pub fn hyperliquid_url(&self) -> &str {
        self.hyperliquid
            .base_url
            .as_deref()
            .unwrap_or(hyperliquid::DEFAULT_BASE_URL)
    }

    /// Boros base URL.
    #[must_use]
    pub fn boros_url(&self) -> &str {
        self.boros
            .base_url
            .as_deref()
            .unwrap_or(boros::DEFAULT_BASE_URL)
    }

    /// Whether any floating-leg venue is enabled.
    #[must_use]
    pub const fn has_floating(&self) -> bool {
        self.binance.enabled || self.hyperliquid.enabled
    }

    /// Whether the fixed-leg venue is enabled.
    #[must_use]
    pub const fn has_fixed(&self) -> bool {
        self.boros.enabled
    }

    /// Markets keyed by upper-case asset.
    #[must_use]
    pub fn markets(&self) -> HashMap<String, String> {
        self.boros
            .markets
            .iter()
            .map(|(asset, address)| (asset.to_uppercase(), address.clone()))
            .collect()
    }
}

const fn default_enabled() -> bool {
    true
}
