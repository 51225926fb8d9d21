//! Client configuration.
//!
//! A [`Config`] is the static triple (API key, app ID, shop domain) supplied
//! once when the client is built, plus a few optional tuning knobs. It is
//! immutable once handed to [`crate::build_client`].
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_BUY_API_KEY` - Your API client's public token
//! - `SHOPIFY_BUY_APP_ID` - The app whose listings the client will be using
//! - `SHOPIFY_BUY_DOMAIN` - Your shop's myshopify.com domain
//!
//! ## Optional
//! - `SHOPIFY_BUY_CART_DIR` - Directory for persisted carts (default: in-memory only)
//! - `SHOPIFY_BUY_API_URL` - Override for the listings API base URL
//! - `SHOPIFY_BUY_TIMEOUT_SECS` - HTTP request timeout (default: 30)
//! - `SHOPIFY_BUY_CACHE_TTL_SECS` - Listing cache TTL (default: 300)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Invalid {0}: {1}")]
    InvalidValue(&'static str, String),
}

/// Buy SDK client configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct Config {
    api_key: SecretString,
    app_id: String,
    domain: String,
    api_url: Option<Url>,
    cart_dir: Option<PathBuf>,
    timeout: Duration,
    cache_ttl: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"[REDACTED]")
            .field("app_id", &self.app_id)
            .field("domain", &self.domain)
            .field("api_url", &self.api_url.as_ref().map(Url::as_str))
            .field("cart_dir", &self.cart_dir)
            .field("timeout", &self.timeout)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl Config {
    /// Create a configuration from the three required values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is empty or the
    /// domain is not a bare host name (no scheme, no path).
    pub fn new(
        api_key: impl Into<String>,
        app_id: impl Into<String>,
        domain: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        let app_id = app_id.into();
        let domain = domain.into();

        if api_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue("api_key", "must not be empty".to_string()));
        }
        if app_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue("app_id", "must not be empty".to_string()));
        }
        validate_domain(&domain)?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            app_id,
            domain,
            api_url: None,
            cart_dir: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &str| lookup(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()));
        let seconds = |key: &str, default: u64| -> Result<Duration, ConfigError> {
            lookup(key).map_or(Ok(Duration::from_secs(default)), |raw| {
                raw.parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
            })
        };

        let mut config = Self::new(
            required("SHOPIFY_BUY_API_KEY")?,
            required("SHOPIFY_BUY_APP_ID")?,
            required("SHOPIFY_BUY_DOMAIN")?,
        )?;

        if let Some(raw) = lookup("SHOPIFY_BUY_API_URL") {
            let url = Url::parse(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("SHOPIFY_BUY_API_URL".to_string(), e.to_string())
            })?;
            config = config.with_api_url(url);
        }
        if let Some(dir) = lookup("SHOPIFY_BUY_CART_DIR") {
            config = config.with_cart_dir(dir);
        }

        Ok(config
            .with_timeout(seconds("SHOPIFY_BUY_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?)
            .with_cache_ttl(seconds("SHOPIFY_BUY_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?))
    }

    /// Override the listings API base URL (proxies, test servers).
    #[must_use]
    pub fn with_api_url(mut self, url: Url) -> Self {
        self.api_url = Some(url);
        self
    }

    /// Persist carts as files under `dir`.
    #[must_use]
    pub fn with_cart_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cart_dir = Some(dir.into());
        self
    }

    /// Set the HTTP request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the listing cache TTL.
    #[must_use]
    pub const fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// The API key. Exposed only for request signing and checkout URLs.
    #[must_use]
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// The app whose listings the client reads.
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// The shop's myshopify.com domain.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Directory for persisted carts, if any.
    #[must_use]
    pub const fn cart_dir(&self) -> Option<&PathBuf> {
        self.cart_dir.as_ref()
    }

    /// HTTP request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Listing cache TTL.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Base URL of the listings API, always ending in `/`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the URL cannot be built.
    pub fn api_base_url(&self) -> Result<Url, ConfigError> {
        let raw = self.api_url.as_ref().map_or_else(
            || format!("https://{}/api/apps/{}/", self.domain, self.app_id),
            |url| {
                let mut raw = url.to_string();
                if !raw.ends_with('/') {
                    raw.push('/');
                }
                raw
            },
        );
        Url::parse(&raw).map_err(|e| ConfigError::InvalidValue("api_url", e.to_string()))
    }
}

/// Validate that a shop domain is a bare host name.
fn validate_domain(domain: &str) -> Result<(), ConfigError> {
    if domain.trim().is_empty() {
        return Err(ConfigError::InvalidValue("domain", "must not be empty".to_string()));
    }
    if domain.contains("://") || domain.contains('/') || domain.contains(char::is_whitespace) {
        return Err(ConfigError::InvalidValue(
            "domain",
            format!("expected a bare host such as your-shop.myshopify.com, got {domain:?}"),
        ));
    }
    Url::parse(&format!("https://{domain}/"))
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidValue("domain", e.to_string()))
}
