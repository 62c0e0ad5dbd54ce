//! Scripted venue rate sources.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::domain::RateLeg;
use crate::error::RateError;
use crate::port::outbound::rate::RateSource;

/// A venue whose annualized rates are set by the test.
///
/// Assets without a scripted rate fail with [`RateError::UnknownAsset`].
pub struct ScriptedRateSource {
    venue: String,
    leg: RateLeg,
    rates: Mutex<HashMap<String, Decimal>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedRateSource {
    /// Source quoting nothing yet.
    pub fn new(venue: &str, leg: RateLeg) -> Self {
        Self {
            venue: venue.to_string(),
            leg,
            rates: Mutex::new(HashMap::new()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fixed-leg venue quoting `rate` for `asset`.
    pub fn fixed(venue: &str, asset: &str, rate: Decimal) -> Self {
        Self::new(venue, RateLeg::Fixed).with_rate(asset, rate)
    }

    /// Floating-leg venue quoting `rate` for `asset`.
    pub fn floating(venue: &str, asset: &str, rate: Decimal) -> Self {
        Self::new(venue, RateLeg::Floating).with_rate(asset, rate)
    }

    #[must_use]
    pub fn with_rate(self, asset: &str, rate: Decimal) -> Self {
        self.set_rate(asset, rate);
        self
    }

    /// Sleep before every reply.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Change the quoted rate between cycles.
    pub fn set_rate(&self, asset: &str, rate: Decimal) {
        self.rates.lock().insert(asset.to_string(), rate);
    }

    /// Stop quoting an asset.
    pub fn clear_rate(&self, asset: &str) {
        self.rates.lock().remove(asset);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateSource for ScriptedRateSource {
    fn venue(&self) -> &str {
        &self.venue
    }

    fn leg(&self) -> RateLeg {
        self.leg
    }

    async fn fetch_rate(&self, asset: &str) -> Result<Decimal, RateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.rates
            .lock()
            .get(asset)
            .copied()
            .ok_or_else(|| RateError::UnknownAsset {
                venue: self.venue.clone(),
                asset: asset.to_string(),
            })
    }
}
