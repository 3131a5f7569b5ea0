//! Exchange error types.
//!
//! Remote failures carry the exchange-specific numeric code and the
//! request URL so retry logs can surface them. Lookup misses
//! (`AssetNotFound`, `BalanceNotFound`) are distinct kinds, not strings,
//! so callers never have to match on messages.

use thiserror::Error;

/// Errors from the Binance REST collaborator.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("Transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Error response returned by the exchange.
    #[error("Binance API error {code} for {url}: {message}")]
    Api {
        code: i64,
        message: String,
        url: String,
    },

    /// Asset missing from the exchange's coin configuration.
    #[error("Asset {0} not found")]
    AssetNotFound(String),

    /// Account has no balance entry for the asset.
    #[error("Balance for {0} not found")]
    BalanceNotFound(String),

    /// Response body did not decode as expected.
    #[error("Failed to parse response from {url}: {message}")]
    Parse { url: String, message: String },

    /// Order book or other market payload violated a domain invariant.
    #[error("Market data error: {0}")]
    MarketData(#[from] cliq_core::CoreError),

    /// Required credential environment variable is not set.
    #[error("Missing environment variable: {0}")]
    MissingCredentials(String),

    /// HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl ExchangeError {
    /// Exchange-specific numeric error code, when one was returned.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Request URL the failure came from, when known.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Transport { url, .. } | Self::Api { url, .. } | Self::Parse { url, .. } => {
                Some(url)
            }
            _ => None,
        }
    }
}

/// Result type alias for exchange operations.
pub type ExchangeResult<T> = Result<T, ExchangeError>;
