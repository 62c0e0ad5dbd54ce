//! Domain validation errors.
//!
//! Returned by `try_new` constructors when a value would violate an
//! invariant of the decision engine.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Hedge notional must be positive.
    #[error("notional must be positive, got {notional}")]
    NonPositiveNotional {
        /// The invalid notional.
        notional: Decimal,
    },

    /// Rolling history needs room for at least two samples.
    #[error("history window must be at least 2, got {window}")]
    HistoryWindowTooSmall {
        /// The invalid window.
        window: usize,
    },

    /// Asset symbols cannot be blank.
    #[error("asset symbol cannot be empty")]
    EmptyAsset,
}
