//! Engine error types.
//!
//! Planning failures (`Market`) are fatal and never retried; exchange
//! failures reach the engine only after the retry wrapper's budget is
//! spent.

use cliq_core::CoreError;
use cliq_exchange::ExchangeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Planning error: {0}")]
    Market(#[from] CoreError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    /// The retry wrapper was given a zero-attempt budget, so no error
    /// was ever observed.
    #[error("Retry budget for {0} exhausted before any attempt ran")]
    RetriesExhausted(String),
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
