//! Rate source port.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::RateLeg;
use crate::error::RateError;

/// A venue quoting one leg of the spread.
///
/// Implementations annualize with their own settlement convention; the
/// engine treats the returned value as a decimal APR.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Venue name used in observations and logs.
    fn venue(&self) -> &str;

    /// Leg this venue prices.
    fn leg(&self) -> RateLeg;

    /// Fetch the current annualized rate for an asset.
    ///
    /// # Errors
    ///
    /// Returns a [`RateError`] when the request fails, the venue does not
    /// list the asset, or the payload cannot be read. A missing rate is an
    /// error, never a silent zero.
    async fn fetch_rate(&self, asset: &str) -> Result<Decimal, RateError>;
}
