//! Application configuration.

use crate::error::{AppError, AppResult};
use cliq_engine::{LiquidatorConfig, RetryPolicy, UniformDelay};
use cliq_core::Size;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Exchange connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// REST API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Binance recvWindow for signed requests (ms).
    #[serde(default = "default_recv_window_ms")]
    pub recv_window_ms: u64,
    /// Per-request timeout (seconds).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_recv_window_ms() -> u64 {
    5000
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            recv_window_ms: default_recv_window_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// What to sell, into what, and in what increments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    /// Trading pair symbol, e.g. "ICPUSDT".
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Asset being liquidated.
    #[serde(default = "default_base_asset")]
    pub base_asset: String,
    /// Quote currency received.
    #[serde(default = "default_quote_asset")]
    pub quote_asset: String,
    /// Target value of each clip, in quote currency.
    #[serde(default = "default_clip_notional")]
    pub clip_notional: Decimal,
    /// Minimum tradable unit; a balance at or below this is left alone.
    #[serde(default = "default_min_clip_qty")]
    pub min_clip_qty: Decimal,
}

fn default_symbol() -> String {
    "ICPUSDT".to_string()
}

fn default_base_asset() -> String {
    "ICP".to_string()
}

fn default_quote_asset() -> String {
    "USDT".to_string()
}

fn default_clip_notional() -> Decimal {
    Decimal::from(20)
}

fn default_min_clip_qty() -> Decimal {
    Decimal::ONE
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            base_asset: default_base_asset(),
            quote_asset: default_quote_asset(),
            clip_notional: default_clip_notional(),
            min_clip_qty: default_min_clip_qty(),
        }
    }
}

/// Randomized inter-clip pause bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DelayConfig {
    /// Minimum pause between clips (ms).
    #[serde(default = "default_delay_min_ms")]
    pub min_ms: u64,
    /// Maximum pause between clips (ms).
    #[serde(default = "default_delay_max_ms")]
    pub max_ms: u64,
}

fn default_delay_min_ms() -> u64 {
    5_000
}

fn default_delay_max_ms() -> u64 {
    15_000
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            min_ms: default_delay_min_ms(),
            max_ms: default_delay_max_ms(),
        }
    }
}

/// Retry budget for remote calls.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts per call, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay after the first failure (ms); doubled after each subsequent one.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    1_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub trading: TradingConfig,
    #[serde(default)]
    pub delay: DelayConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl AppConfig {
    /// Load configuration: `CLIQ_CONFIG` env var, falling back to
    /// `config/default.toml`, falling back to defaults when the file
    /// does not exist.
    pub fn load() -> AppResult<Self> {
        let config_path =
            std::env::var("CLIQ_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine would refuse at run time anyway,
    /// before any network call is made.
    pub fn validate(&self) -> AppResult<()> {
        if self.trading.clip_notional <= Decimal::ZERO {
            return Err(AppError::Config(format!(
                "clip_notional must be positive, got {}",
                self.trading.clip_notional
            )));
        }
        if self.trading.min_clip_qty <= Decimal::ZERO {
            return Err(AppError::Config(format!(
                "min_clip_qty must be positive, got {}",
                self.trading.min_clip_qty
            )));
        }
        if self.delay.max_ms < self.delay.min_ms {
            return Err(AppError::Config(format!(
                "delay max_ms {} is below min_ms {}",
                self.delay.max_ms, self.delay.min_ms
            )));
        }
        Ok(())
    }

    /// Engine-facing view of this configuration.
    pub fn liquidator_config(&self) -> LiquidatorConfig {
        LiquidatorConfig {
            base_asset: self.trading.base_asset.clone(),
            quote_asset: self.trading.quote_asset.clone(),
            symbol: self.trading.symbol.clone(),
            clip_notional: self.trading.clip_notional,
            min_clip_qty: Size::new(self.trading.min_clip_qty),
            retry: RetryPolicy {
                max_attempts: self.retry.max_attempts,
                initial_delay: Duration::from_millis(self.retry.initial_delay_ms),
            },
        }
    }

    /// Delay scheduler drawing uniformly from the configured range.
    pub fn delay_source(&self) -> UniformDelay {
        UniformDelay::new(self.delay.min_ms, self.delay.max_ms)
    }
}
