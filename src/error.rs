use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Failures while fetching a venue rate.
#[derive(Error, Debug, Clone)]
pub enum RateError {
    #[error("{venue} request failed: {reason}")]
    Request { venue: String, reason: String },

    #[error("{venue} has no rate for asset {asset}")]
    UnknownAsset { venue: String, asset: String },

    #[error("{venue} returned a malformed payload: {reason}")]
    Malformed { venue: String, reason: String },
}

/// Failures of the external risk assessor.
///
/// Never fatal: the engine substitutes the deterministic fallback.
#[derive(Error, Debug, Clone)]
pub enum AssessmentError {
    #[error("risk assessor unavailable: {0}")]
    Unavailable(String),

    #[error("risk assessor returned a malformed response: {0}")]
    Malformed(String),

    #[error("risk assessor timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// Reasons a hedge is aborted before any execution attempt.
#[derive(Error, Debug, Clone)]
pub enum PreflightFailure {
    #[error("market {market} not found")]
    MarketNotFound { market: String },

    #[error("insufficient collateral: balance {balance} < required {required}")]
    InsufficientCollateral {
        balance: rust_decimal::Decimal,
        required: rust_decimal::Decimal,
    },

    #[error("vault read failed: {0}")]
    Vault(String),
}

/// Hedge execution errors.
#[derive(Error, Debug, Clone)]
pub enum HedgeError {
    #[error("preflight failed: {0}")]
    Preflight(#[from] PreflightFailure),

    #[error("{strategy} execution failed: {reason}")]
    Execution {
        strategy: &'static str,
        reason: String,
    },

    #[error("primary {primary} failed ({primary_reason}); fallback {fallback} failed ({fallback_reason})")]
    FallbackFailed {
        primary: &'static str,
        primary_reason: String,
        fallback: &'static str,
        fallback_reason: String,
    },

    #[error("hedge cycle timed out")]
    Timeout,
}

/// Crate-wide error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Rate(#[from] RateError),

    #[error(transparent)]
    Assessment(#[from] AssessmentError),

    #[error(transparent)]
    Hedge(#[from] HedgeError),

    #[error("vault error: {0}")]
    Vault(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn preflight_failure_converts_into_hedge_error() {
        let err: HedgeError = PreflightFailure::MarketNotFound {
            market: "0xabc".into(),
        }
        .into();
        assert!(matches!(err, HedgeError::Preflight(_)));
        assert_eq!(err.to_string(), "preflight failed: market 0xabc not found");
    }

    #[test]
    fn insufficient_collateral_message_carries_amounts() {
        let err = PreflightFailure::InsufficientCollateral {
            balance: dec!(0.05),
            required: dec!(0.12),
        };
        assert_eq!(
            err.to_string(),
            "insufficient collateral: balance 0.05 < required 0.12"
        );
    }

    #[test]
    fn rate_error_wraps_into_umbrella_error() {
        let err: Error = RateError::UnknownAsset {
            venue: "hyperliquid".into(),
            asset: "DOGE".into(),
        }
        .into();
        assert_eq!(err.to_string(), "hyperliquid has no rate for asset DOGE");
    }
}
