//! Structured logging initialization.

use crate::error::{AppError, AppResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset. Target names use the crate
/// names with underscores, one directive per workspace crate.
const DEFAULT_FILTER: &str =
    "info,cliq_core=debug,cliq_exchange=debug,cliq_engine=debug,cliq_bot=debug";

/// Initialize structured logging.
///
/// JSON output when `RUST_ENV=production`, pretty output otherwise.
/// Filter comes from `RUST_LOG` with a crate-scoped default.
pub fn init_logging() -> AppResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let is_production = std::env::var("RUST_ENV")
        .map(|v| v == "production")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if is_production {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_names(true),
            )
            .try_init()
    };

    result.map_err(|e| AppError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses_and_names_every_crate() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
        for target in ["cliq_core", "cliq_exchange", "cliq_engine", "cliq_bot"] {
            assert!(DEFAULT_FILTER.contains(target), "missing directive for {target}");
        }
    }
}
