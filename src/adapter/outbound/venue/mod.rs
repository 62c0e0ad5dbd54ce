//! Venue rate sources.
//!
//! Each adapter implements [`RateSource`](crate::port::outbound::rate::RateSource)
//! over the venue's public HTTP API and annualizes with the venue's own
//! settlement interval.

pub mod binance;
pub mod boros;
pub mod hyperliquid;

pub use binance::BinanceSource;
pub use boros::BorosSource;
pub use hyperliquid::HyperliquidSource;

use crate::error::RateError;

fn request_error(venue: &str, error: &reqwest::Error) -> RateError {
    RateError::Request {
        venue: venue.to_string(),
        reason: error.to_string(),
    }
}

fn malformed(venue: &str, reason: impl Into<String>) -> RateError {
    RateError::Malformed {
        venue: venue.to_string(),
        reason: reason.into(),
    }
}
