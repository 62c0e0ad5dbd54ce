//! Rate observations and annualization conventions.
//!
//! Every venue quotes funding per settlement interval. Observations carry
//! the rate already annualized as a decimal APR (0.10 = 10%).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which side of the spread a venue prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLeg {
    /// Fixed-rate venue (e.g. Boros implied APR).
    Fixed,
    /// Floating-rate venue (perp funding on Hyperliquid or a CEX).
    Floating,
}

impl std::fmt::Display for RateLeg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Floating => write!(f, "floating"),
        }
    }
}

/// Funding settlement interval of a venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    /// Settles every hour (Hyperliquid).
    Hourly,
    /// Settles every eight hours (Binance).
    EightHourly,
    /// Venue already quotes an annual rate.
    Annual,
}

impl Interval {
    /// Number of settlements per year.
    #[must_use]
    pub fn periods_per_year(self) -> Decimal {
        match self {
            Self::Hourly => Decimal::from(24 * 365),
            Self::EightHourly => Decimal::from(3 * 365),
            Self::Annual => Decimal::ONE,
        }
    }

    /// Convert a per-interval rate into a decimal APR.
    #[must_use]
    pub fn annualize(self, rate: Decimal) -> Decimal {
        rate * self.periods_per_year()
    }
}

/// One annualized rate reading from one venue.
///
/// Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateObservation {
    venue: String,
    asset: String,
    leg: RateLeg,
    annualized_rate: Decimal,
    observed_at: DateTime<Utc>,
}

impl RateObservation {
    /// Create an observation stamped with the current time.
    #[must_use]
    pub fn new(
        venue: impl Into<String>,
        asset: impl Into<String>,
        leg: RateLeg,
        annualized_rate: Decimal,
    ) -> Self {
        Self::at(venue, asset, leg, annualized_rate, Utc::now())
    }

    /// Create an observation with an explicit timestamp.
    #[must_use]
    pub fn at(
        venue: impl Into<String>,
        asset: impl Into<String>,
        leg: RateLeg,
        annualized_rate: Decimal,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            venue: venue.into(),
            asset: asset.into(),
            leg,
            annualized_rate,
            observed_at,
        }
    }

    /// Venue that quoted the rate.
    #[must_use]
    pub fn venue(&self) -> &str {
        &self.venue
    }

    /// Asset the rate is for.
    #[must_use]
    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Fixed or floating leg.
    #[must_use]
    pub const fn leg(&self) -> RateLeg {
        self.leg
    }

    /// Annualized rate as a decimal.
    #[must_use]
    pub const fn annualized_rate(&self) -> Decimal {
        self.annualized_rate
    }

    /// When the rate was fetched.
    #[must_use]
    pub const fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}
