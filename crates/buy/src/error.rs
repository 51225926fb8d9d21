//! Error type shared by every SDK operation.

use thiserror::Error;

use crate::cart::StorageError;
use crate::config::ConfigError;

/// Errors that can occur when using the Buy SDK.
#[derive(Debug, Error)]
pub enum BuyError {
    /// No product, collection, cart or line item has the given identifier.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An option value outside the option's permitted set was selected.
    #[error("Invalid selection: {value:?} is not a value of option {option:?}")]
    InvalidSelection {
        /// Option name (e.g., "Size").
        option: String,
        /// The rejected value.
        value: String,
    },

    /// Malformed attributes were passed to a create or update call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The listings API returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A listings URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Cart persistence failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Client configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl BuyError {
    /// Whether this error reports a missing entity.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias for `BuyError`.
pub type Result<T> = std::result::Result<T, BuyError>;
