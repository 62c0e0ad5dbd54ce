//! Boros implied APR (fixed leg).
//!
//! Primary read is the order book mid in ticks; when the book is
//! unavailable or empty the market summary `midApr` (a percentage) is used.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{malformed, request_error};
use crate::domain::RateLeg;
use crate::error::RateError;
use crate::port::outbound::rate::RateSource;

/// Public API root.
pub const DEFAULT_BASE_URL: &str = "https://api.boros.finance";

/// Order book tick size: one tick is 0.1% APR.
pub const TICK_SIZE: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

const VENUE: &str = "boros";
const MARKET_PAGE: u32 = 100;

/// Fixed-leg source keyed by configured market addresses.
#[derive(Debug, Clone)]
pub struct BorosSource {
    client: Client,
    base_url: String,
    /// Upper-case asset symbol to market address.
    markets: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct MarketList {
    results: Vec<Market>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Market {
    market_id: u64,
    address: String,
    #[serde(default)]
    data: Option<MarketData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketData {
    #[serde(default)]
    mid_apr: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct OrderBook {
    long: BookSide,
    short: BookSide,
}

#[derive(Debug, Deserialize)]
struct BookSide {
    /// Implied APR ticks, best first.
    ia: Vec<Decimal>,
}

impl BorosSource {
    /// Create a source with the configured asset markets.
    #[must_use]
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        markets: &HashMap<String, String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            markets: markets
                .iter()
                .map(|(asset, address)| (asset.to_uppercase(), address.clone()))
                .collect(),
        }
    }

    /// Configured market address for an asset.
    #[must_use]
    pub fn market_address(&self, asset: &str) -> Option<&str> {
        self.markets.get(&asset.to_uppercase()).map(String::as_str)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, RateError> {
        let body = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| request_error(VENUE, &e))?
            .text()
            .await
            .map_err(|e| request_error(VENUE, &e))?;
        serde_json::from_str(&body).map_err(|e| malformed(VENUE, e.to_string()))
    }

    async fn find_market(&self, address: &str) -> Result<Market, RateError> {
        let url = format!("{}/core/v1/markets", self.base_url);
        let list: MarketList = self
            .get_json(
                &url,
                &[
                    ("skip", "0".to_string()),
                    ("limit", MARKET_PAGE.to_string()),
                    ("isWhitelisted", "true".to_string()),
                ],
            )
            .await?;
        list.results
            .into_iter()
            .find(|m| m.address.eq_ignore_ascii_case(address))
            .ok_or_else(|| malformed(VENUE, format!("market {address} not listed")))
    }

    async fn order_book(&self, market_id: u64) -> Result<OrderBook, RateError> {
        let url = format!("{}/core/v1/order-books/{market_id}", self.base_url);
        self.get_json(&url, &[("tickSize", TICK_SIZE.to_string())])
            .await
    }
}

/// Mid of the best long and short ticks, or the only side present.
fn book_apr(book: &OrderBook) -> Option<Decimal> {
    let ticks = match (book.long.ia.first(), book.short.ia.first()) {
        (Some(long), Some(short)) => (long + short) / Decimal::TWO,
        (Some(long), None) => *long,
        (None, Some(short)) => *short,
        (None, None) => return None,
    };
    Some(ticks * TICK_SIZE)
}

/// Summary `midApr` is a percentage.
fn summary_apr(market: &Market) -> Option<Decimal> {
    market
        .data
        .as_ref()
        .and_then(|d| d.mid_apr)
        .filter(|apr| !apr.is_zero())
        .map(|apr| apr / Decimal::ONE_HUNDRED)
}

#[async_trait]
impl RateSource for BorosSource {
    fn venue(&self) -> &str {
        VENUE
    }

    fn leg(&self) -> RateLeg {
        RateLeg::Fixed
    }

    async fn fetch_rate(&self, asset: &str) -> Result<Decimal, RateError> {
        let address = self
            .market_address(asset)
            .ok_or_else(|| RateError::UnknownAsset {
                venue: VENUE.to_string(),
                asset: asset.to_string(),
            })?;

        let market = self.find_market(address).await?;

        match self.order_book(market.market_id).await {
            Ok(book) => {
                if let Some(apr) = book_apr(&book) {
                    debug!(venue = VENUE, asset, market = address, %apr, "Order book implied APR");
                    return Ok(apr);
                }
                debug!(venue = VENUE, asset, "Order book empty, using market summary");
            }
            Err(e) => {
                warn!(venue = VENUE, asset, error = %e, "Order book unavailable, using market summary");
            }
        }

        summary_apr(&market).ok_or_else(|| malformed(VENUE, format!("no implied APR for {address}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn book(long: &[Decimal], short: &[Decimal]) -> OrderBook {
        OrderBook {
            long: BookSide { ia: long.to_vec() },
            short: BookSide { ia: short.to_vec() },
        }
    }

    #[test]
    fn mid_of_both_sides_in_ticks() {
        // (57 + 58) / 2 = 57.5 ticks -> 5.75%
        assert_eq!(book_apr(&book(&[dec!(57), dec!(56)], &[dec!(58)])), Some(dec!(0.0575)));
    }

    #[test]
    fn one_sided_book_uses_that_side() {
        assert_eq!(book_apr(&book(&[dec!(100)], &[])), Some(dec!(0.1)));
        assert_eq!(book_apr(&book(&[], &[dec!(150)])), Some(dec!(0.15)));
    }

    #[test]
    fn empty_book_has_no_rate() {
        assert_eq!(book_apr(&book(&[], &[])), None);
    }

    #[test]
    fn summary_mid_apr_is_a_percentage() {
        let market: Market =
            serde_json::from_str(r#"{"marketId": 3, "address": "0xAB", "data": {"midApr": 5.5}}"#)
                .unwrap();
        assert_eq!(summary_apr(&market), Some(dec!(0.055)));
    }

    #[test]
    fn missing_summary_has_no_rate() {
        let market: Market = serde_json::from_str(r#"{"marketId": 3, "address": "0xAB"}"#).unwrap();
        assert_eq!(summary_apr(&market), None);
    }

    #[test]
    fn order_book_payload_parses() {
        let parsed: OrderBook = serde_json::from_str(
            r#"{"long": {"ia": [120, 119], "sz": ["1", "2"]}, "short": {"ia": [124], "sz": ["3"]}}"#,
        )
        .unwrap();
        assert_eq!(book_apr(&parsed), Some(dec!(0.122)));
    }

    #[test]
    fn market_lookup_is_case_insensitive_on_asset() {
        let markets = HashMap::from([("eth".to_string(), "0x8db1".to_string())]);
        let source = BorosSource::new(Client::new(), DEFAULT_BASE_URL, &markets);
        assert_eq!(source.market_address("ETH"), Some("0x8db1"));
        assert_eq!(source.market_address("BTC"), None);
    }
}
