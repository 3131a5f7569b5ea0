//! Clip liquidation bot.
//!
//! Binary wiring for the engine: configuration loading, logging setup,
//! and assembly of the Binance client, delay scheduler, and liquidator.

pub mod config;
pub mod error;
pub mod logging;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
