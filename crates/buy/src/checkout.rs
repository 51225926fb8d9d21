//! Checkout URL construction.
//!
//! Checkout URLs are permalinks into the shop's own cart page: a path of
//! `variant_id:quantity` pairs followed by the API key, e.g.
//! `https://shop.myshopify.com/cart/123:2,456:1?api_key=...`.

use std::fmt::Write as _;

use buy_sdk_core::VariantId;
use secrecy::{ExposeSecret, SecretString};

use crate::config::Config;

/// Builds checkout URLs for one shop.
///
/// Shared (behind an `Arc`) by every variant and cart model produced by a
/// client so that models can derive their URLs without a client handle.
#[derive(Clone)]
pub struct CheckoutUrls {
    domain: String,
    api_key: SecretString,
}

impl std::fmt::Debug for CheckoutUrls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutUrls")
            .field("domain", &self.domain)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl CheckoutUrls {
    /// Create a builder for the configured shop.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            domain: config.domain().to_string(),
            api_key: SecretString::from(config.api_key().to_string()),
        }
    }

    /// Checkout URL for purchasing `quantity` units of one variant.
    #[must_use]
    pub fn variant(&self, variant_id: VariantId, quantity: u32) -> String {
        self.lines([(variant_id, quantity)])
    }

    /// Checkout URL for a set of `(variant, quantity)` lines.
    ///
    /// An empty set links to the shop's cart page without a permalink path.
    #[must_use]
    pub fn lines(&self, lines: impl IntoIterator<Item = (VariantId, u32)>) -> String {
        let path = lines
            .into_iter()
            .map(|(id, quantity)| format!("{id}:{quantity}"))
            .collect::<Vec<_>>()
            .join(",");

        let mut url = format!("https://{}/cart", self.domain);
        if !path.is_empty() {
            let _ = write!(url, "/{path}");
        }
        let key: String =
            url::form_urlencoded::byte_serialize(self.api_key.expose_secret().as_bytes()).collect();
        let _ = write!(url, "?api_key={key}");
        url
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn urls() -> CheckoutUrls {
        CheckoutUrls::new(&Config::new("abc123", "6", "embeds.myshopify.com").unwrap())
    }

    #[test]
    fn test_variant_checkout_url() {
        assert_eq!(
            urls().variant(VariantId::new(29_106_064_584), 3),
            "https://embeds.myshopify.com/cart/29106064584:3?api_key=abc123"
        );
    }

    #[test]
    fn test_multi_line_checkout_url() {
        let url = urls().lines([(VariantId::new(1), 2), (VariantId::new(5), 1)]);
        assert_eq!(url, "https://embeds.myshopify.com/cart/1:2,5:1?api_key=abc123");
    }

    #[test]
    fn test_empty_checkout_url() {
        assert_eq!(
            urls().lines(std::iter::empty::<(VariantId, u32)>()),
            "https://embeds.myshopify.com/cart?api_key=abc123"
        );
    }

    #[test]
    fn test_api_key_is_url_encoded() {
        let urls = CheckoutUrls::new(&Config::new("a b&c", "6", "embeds.myshopify.com").unwrap());
        assert!(urls.variant(VariantId::new(1), 1).ends_with("?api_key=a+b%26c"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        assert!(!format!("{:?}", urls()).contains("abc123"));
    }
}
