//! Error types for cliq-core.

use thiserror::Error;

/// Core error types.
///
/// Pure computations fail fast and are never retried; a bad plan must
/// not be retried into a worse one.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid market data: {0}")]
    InvalidMarketData(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Decimal parse error: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
