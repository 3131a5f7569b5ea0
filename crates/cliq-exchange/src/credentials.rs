//! Secure API credential management.
//!
//! Uses the `secrecy` crate to prevent accidental logging of the secret
//! key and to zero its memory on drop.

use crate::error::{ExchangeError, ExchangeResult};
use secrecy::{ExposeSecret, SecretString};

/// API credentials for authenticated requests.
#[derive(Clone)]
pub struct ApiCredentials {
    api_key: String,
    secret_key: SecretString,
}

impl ApiCredentials {
    /// Load credentials from environment variables.
    ///
    /// Looks for `BINANCE_API_KEY` and `BINANCE_SECRET_KEY`, loading a
    /// `.env` file first when present.
    ///
    /// # Errors
    /// Returns `MissingCredentials` if either variable is not set.
    pub fn from_env() -> ExchangeResult<Self> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("BINANCE_API_KEY")
            .map_err(|_| ExchangeError::MissingCredentials("BINANCE_API_KEY".into()))?;

        let secret_key = std::env::var("BINANCE_SECRET_KEY")
            .map_err(|_| ExchangeError::MissingCredentials("BINANCE_SECRET_KEY".into()))?;

        Ok(Self::new(api_key, secret_key))
    }

    /// Create credentials from explicit values.
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key,
            secret_key: SecretString::from(secret_key),
        }
    }

    /// Get the API key (public, safe to log).
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Expose the secret key for signing. Never log the return value.
    pub fn expose_secret(&self) -> &str {
        self.secret_key.expose_secret()
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &self.api_key)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_new() {
        let creds = ApiCredentials::new("my_api_key".into(), "my_secret".into());
        assert_eq!(creds.api_key(), "my_api_key");
        assert_eq!(creds.expose_secret(), "my_secret");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = ApiCredentials::new("my_api_key".into(), "super_secret_key".into());
        let debug_str = format!("{:?}", creds);

        assert!(debug_str.contains("my_api_key"));
        assert!(!debug_str.contains("super_secret_key"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}
