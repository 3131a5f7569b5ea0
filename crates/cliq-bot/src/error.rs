//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Exchange error: {0}")]
    Exchange(#[from] cliq_exchange::ExchangeError),

    #[error("Engine error: {0}")]
    Engine(#[from] cliq_engine::EngineError),

    #[error("Logging error: {0}")]
    Logging(String),
}

pub type AppResult<T> = Result<T, AppError>;
