//! Venue-vs-venue spread and its bounded rolling history.

use std::collections::VecDeque;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Default capacity of the rolling spread history.
pub const DEFAULT_HISTORY_WINDOW: usize = 24;

const BPS_PER_UNIT: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Spread between the floating and fixed legs.
///
/// Sign convention: `floating - fixed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadSample {
    /// Spread as a decimal APR difference.
    pub spread_decimal: Decimal,
    /// Spread in basis points, rounded half away from zero.
    pub spread_bps: i64,
}

impl SpreadSample {
    /// Compute the spread of a floating rate over a fixed rate.
    #[must_use]
    pub fn compute(fixed_rate: Decimal, floating_rate: Decimal) -> Self {
        let spread_decimal = floating_rate - fixed_rate;
        Self {
            spread_decimal,
            spread_bps: to_bps(spread_decimal),
        }
    }
}

/// Convert a decimal spread into whole basis points.
#[must_use]
pub fn to_bps(spread: Decimal) -> i64 {
    (spread * BPS_PER_UNIT)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(if spread.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        })
}

/// Fixed-capacity FIFO of recent spread values, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadHistory {
    capacity: usize,
    values: VecDeque<Decimal>,
}

impl Default for SpreadHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_WINDOW)
    }
}

impl SpreadHistory {
    /// Create an empty history. A capacity of zero is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a spread, evicting the oldest value when full.
    pub fn push(&mut self, spread_decimal: Decimal) {
        while self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(spread_decimal);
    }

    /// Values in push order.
    #[must_use]
    pub fn values(&self) -> Vec<Decimal> {
        self.values.iter().copied().collect()
    }

    /// Number of stored samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no sample is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Maximum number of samples kept.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Render as a comma-separated list of percentages for prompt context.
    #[must_use]
    pub fn to_prompt_list(&self) -> String {
        if self.values.is_empty() {
            return "(no history yet)".to_string();
        }
        self.values
            .iter()
            .map(|v| format!("{:.2}%", v * Decimal::ONE_HUNDRED))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
