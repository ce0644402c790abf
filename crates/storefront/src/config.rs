//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_NAME` - Shop name shown in banners (default: Rhea's Mystery Sack PH)
//! - `STOREFRONT_CURRENCY` - ISO 4217 code carts are priced in (default: PHP)
//! - `STOREFRONT_LOW_STOCK_THRESHOLD` - Stock below this shows "Only N left!" (default: 10)
//! - `STOREFRONT_MIN_PASSWORD_LENGTH` - Minimum sign-up password length (default: 6)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

use mystery_sack_core::CurrencyCode;

use crate::services::auth::DEFAULT_MIN_PASSWORD_LENGTH;

const DEFAULT_STORE_NAME: &str = "Rhea's Mystery Sack PH";
const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Shop name
    pub store_name: String,
    /// Currency every cart is priced in
    pub currency: CurrencyCode,
    /// Stock level below which the low-stock badge shows
    pub low_stock_threshold: u32,
    /// Minimum sign-up password length
    pub min_password_length: usize,
    /// Error tracking configuration
    pub sentry: SentryConfig,
}

/// Sentry configuration.
///
/// Implements `Debug` manually to redact the DSN.
#[derive(Clone, Default)]
pub struct SentryConfig {
    /// Sentry DSN (contains the project key)
    pub dsn: Option<SecretString>,
    /// Environment tag, e.g. `production`
    pub environment: Option<String>,
}

impl std::fmt::Debug for SentryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentryConfig")
            .field("dsn", &self.dsn.as_ref().map(|_| "[REDACTED]"))
            .field("environment", &self.environment)
            .finish()
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            store_name: DEFAULT_STORE_NAME.to_string(),
            currency: CurrencyCode::default(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
            sentry: SentryConfig::default(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store_name = get_env_or_default(&lookup, "STOREFRONT_NAME", DEFAULT_STORE_NAME);
        let currency = parse_env_or(&lookup, "STOREFRONT_CURRENCY", CurrencyCode::default())?;
        let low_stock_threshold = parse_env_or(
            &lookup,
            "STOREFRONT_LOW_STOCK_THRESHOLD",
            DEFAULT_LOW_STOCK_THRESHOLD,
        )?;
        let min_password_length = parse_env_or(
            &lookup,
            "STOREFRONT_MIN_PASSWORD_LENGTH",
            DEFAULT_MIN_PASSWORD_LENGTH,
        )?;
        if min_password_length == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_MIN_PASSWORD_LENGTH".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let sentry = SentryConfig {
            dsn: get_optional_env(&lookup, "SENTRY_DSN").map(SecretString::from),
            environment: get_optional_env(&lookup, "SENTRY_ENVIRONMENT"),
        };

        Ok(Self {
            store_name,
            currency,
            low_stock_threshold,
            min_password_length,
            sentry,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional variable. Blank values count as unset.
fn get_optional_env(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// Get a variable with a default value.
fn get_env_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> String {
    get_optional_env(lookup, key).unwrap_or_else(|| default.to_string())
}

/// Parse a variable, falling back to `default` when unset.
fn parse_env_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(lookup, key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.store_name, "Rhea's Mystery Sack PH");
        assert_eq!(config.currency, CurrencyCode::PHP);
        assert_eq!(config.low_stock_threshold, 10);
        assert_eq!(config.min_password_length, 6);
        assert!(config.sentry.dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("STOREFRONT_NAME", "Test Shop"),
            ("STOREFRONT_CURRENCY", "usd"),
            ("STOREFRONT_LOW_STOCK_THRESHOLD", " 3 "),
            ("STOREFRONT_MIN_PASSWORD_LENGTH", "12"),
            ("SENTRY_ENVIRONMENT", "staging"),
        ])
        .unwrap();
        assert_eq!(config.store_name, "Test Shop");
        assert_eq!(config.currency, CurrencyCode::USD);
        assert_eq!(config.low_stock_threshold, 3);
        assert_eq!(config.min_password_length, 12);
        assert_eq!(config.sentry.environment.as_deref(), Some("staging"));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = load(&[("STOREFRONT_NAME", "  "), ("SENTRY_DSN", "")]).unwrap();
        assert_eq!(config.store_name, "Rhea's Mystery Sack PH");
        assert!(config.sentry.dsn.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("STOREFRONT_LOW_STOCK_THRESHOLD", "lots")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_LOW_STOCK_THRESHOLD"));

        let err = load(&[("STOREFRONT_CURRENCY", "JPY")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_CURRENCY"));

        assert!(load(&[("STOREFRONT_MIN_PASSWORD_LENGTH", "0")]).is_err());
    }

    #[test]
    fn test_sentry_config_debug_redacts_dsn() {
        let config = load(&[("SENTRY_DSN", "https://super_secret_key@o0.ingest.sentry.io/1")])
            .unwrap();
        let debug_output = format!("{:?}", config.sentry);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_key"));
    }
}
