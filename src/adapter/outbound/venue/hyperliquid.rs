//! Hyperliquid predicted funding (floating leg, 1h settlement).

use std::str::FromStr;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{malformed, request_error};
use crate::domain::{Interval, RateLeg};
use crate::error::RateError;
use crate::port::outbound::rate::RateSource;

/// Mainnet info API root.
pub const DEFAULT_BASE_URL: &str = "https://api.hyperliquid.xyz";

/// Venue key of Hyperliquid's own perp inside `predictedFundings`.
const HL_PERP: &str = "HlPerp";

const VENUE: &str = "hyperliquid";

/// Reads the `HlPerp` entry of `predictedFundings`.
#[derive(Debug, Clone)]
pub struct HyperliquidSource {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictedFunding {
    funding_rate: String,
}

/// `[[coin, [[venue, {fundingRate} | null]]]]`
type PredictedFundings = Vec<(String, Vec<(String, Option<PredictedFunding>)>)>;

impl HyperliquidSource {
    /// Create a source against `base_url`.
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

/// Find the asset's `HlPerp` rate and annualize it.
fn parse_predicted_fundings(body: &str, asset: &str) -> Result<Decimal, RateError> {
    let fundings: PredictedFundings =
        serde_json::from_str(body).map_err(|e| malformed(VENUE, e.to_string()))?;

    let unknown = || RateError::UnknownAsset {
        venue: VENUE.to_string(),
        asset: asset.to_string(),
    };

    let (_, venues) = fundings
        .into_iter()
        .find(|(coin, _)| coin.eq_ignore_ascii_case(asset))
        .ok_or_else(unknown)?;

    let entry = venues
        .into_iter()
        .find(|(venue, _)| venue == HL_PERP)
        .and_then(|(_, entry)| entry)
        .ok_or_else(unknown)?;

    let rate = Decimal::from_str(entry.funding_rate.trim())
        .or_else(|_| Decimal::from_scientific(entry.funding_rate.trim()))
        .map_err(|e| malformed(VENUE, format!("fundingRate {:?}: {e}", entry.funding_rate)))?;

    Ok(Interval::Hourly.annualize(rate))
}

#[async_trait]
impl RateSource for HyperliquidSource {
    fn venue(&self) -> &str {
        VENUE
    }

    fn leg(&self) -> RateLeg {
        RateLeg::Floating
    }

    async fn fetch_rate(&self, asset: &str) -> Result<Decimal, RateError> {
        let url = format!("{}/info", self.base_url);
        let body = self
            .client
            .post(&url)
            .json(&json!({ "type": "predictedFundings" }))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| request_error(VENUE, &e))?
            .text()
            .await
            .map_err(|e| request_error(VENUE, &e))?;

        let apr = parse_predicted_fundings(&body, asset)?;
        debug!(venue = VENUE, asset, %apr, "Fetched predicted funding");
        Ok(apr)
    }
}
