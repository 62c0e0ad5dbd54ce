//! Binance USD-M futures funding (floating leg, 8h settlement).

use std::str::FromStr;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use super::{malformed, request_error};
use crate::domain::{Interval, RateLeg};
use crate::error::RateError;
use crate::port::outbound::rate::RateSource;

/// Public futures API root.
pub const DEFAULT_BASE_URL: &str = "https://fapi.binance.com";

const VENUE: &str = "binance";

/// Reads `lastFundingRate` from the premium index.
#[derive(Debug, Clone)]
pub struct BinanceSource {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PremiumIndex {
    last_funding_rate: Option<String>,
}

impl BinanceSource {
    /// Create a source against `base_url`.
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn symbol(asset: &str) -> String {
        format!("{}USDT", asset.to_uppercase())
    }
}

/// Extract the annualized funding rate from a premium index payload.
fn parse_premium_index(body: &str) -> Result<Decimal, RateError> {
    let index: PremiumIndex =
        serde_json::from_str(body).map_err(|e| malformed(VENUE, e.to_string()))?;
    let raw = index
        .last_funding_rate
        .ok_or_else(|| malformed(VENUE, "missing lastFundingRate"))?;
    let rate = Decimal::from_str(raw.trim())
        .or_else(|_| Decimal::from_scientific(raw.trim()))
        .map_err(|e| malformed(VENUE, format!("lastFundingRate {raw:?}: {e}")))?;
    Ok(Interval::EightHourly.annualize(rate))
}

#[async_trait]
impl RateSource for BinanceSource {
    fn venue(&self) -> &str {
        VENUE
    }

    fn leg(&self) -> RateLeg {
        RateLeg::Floating
    }

    async fn fetch_rate(&self, asset: &str) -> Result<Decimal, RateError> {
        let url = format!("{}/fapi/v1/premiumIndex", self.base_url);
        let symbol = Self::symbol(asset);

        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol.as_str())])
            .send()
            .await
            .map_err(|e| request_error(VENUE, &e))?;

        if response.status() == reqwest::StatusCode::BAD_REQUEST {
            return Err(RateError::UnknownAsset {
                venue: VENUE.to_string(),
                asset: asset.to_string(),
            });
        }

        let body = response
            .error_for_status()
            .map_err(|e| request_error(VENUE, &e))?
            .text()
            .await
            .map_err(|e| request_error(VENUE, &e))?;

        let apr = parse_premium_index(&body)?;
        debug!(venue = VENUE, %symbol, %apr, "Fetched funding rate");
        Ok(apr)
    }
}
