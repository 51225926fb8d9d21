//! HTTP client for the publication listings API.
//!
//! Uses `reqwest` 0.13 for HTTP. Single products and collections are cached
//! with `moka` for the configured TTL (5 minutes by default); queries always
//! go to the network.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use buy_sdk_core::{CollectionId, ProductId};
use moka::future::Cache;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::{Config, ConfigError};
use crate::error::{BuyError, Result};

use super::cache::{CacheKey, CacheValue};
use super::listings::{
    CollectionListing, CollectionListingEnvelope, CollectionListingsEnvelope, ProductListing,
    ProductListingEnvelope, ProductListingsEnvelope,
};
use super::{Catalog, CollectionQuery, ProductQuery};

/// Client for the shop's publication listings API.
///
/// Cheap to clone; clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct ListingsClient {
    inner: Arc<ListingsClientInner>,
}

struct ListingsClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for ListingsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingsClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("cached_entries", &self.inner.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl ListingsClient {
    /// Create a new listings client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or the authorization header cannot
    /// be built, or the HTTP client fails to initialize.
    pub fn new(config: &Config) -> Result<Self> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl())
            .build();

        let token = BASE64.encode(config.api_key());
        let mut auth = HeaderValue::from_str(&format!("Basic {token}"))
            .map_err(|e| ConfigError::InvalidValue("api_key", e.to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            inner: Arc::new(ListingsClientInner {
                client,
                base_url: config.api_base_url()?,
                cache,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str, params: &[(&'static str, String)]) -> Result<Url> {
        let mut url = self.inner.base_url.join(path)?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Execute a GET request and decode the JSON body.
    async fn execute<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .inner
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BuyError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BuyError::NotFound(url.path().to_string()));
        }

        // Body as text first for better error diagnostics
        let response_text = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate(&response_text, 500),
                "Listings API returned non-success status"
            );
            return Err(BuyError::Api {
                status: status.as_u16(),
                message: truncate(&response_text, 200),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&response_text, 500),
                "Failed to parse listings API response"
            );
            BuyError::Parse(e)
        })
    }
}

#[async_trait]
impl Catalog for ListingsClient {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<ProductListing> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(listing)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*listing);
        }

        let url = self.endpoint(&format!("product_listings/{id}"), &[])?;
        let listing = match self.execute::<ProductListingEnvelope>(url).await {
            Ok(envelope) => envelope.product_listing,
            Err(BuyError::NotFound(_)) => {
                return Err(BuyError::NotFound(format!("Product not found: {id}")));
            }
            Err(e) => return Err(e),
        };

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(listing.clone())))
            .await;

        Ok(listing)
    }

    #[instrument(skip(self))]
    async fn products(&self, query: &ProductQuery) -> Result<Vec<ProductListing>> {
        let url = self.endpoint("product_listings", &query.to_params())?;
        let envelope = self.execute::<ProductListingsEnvelope>(url).await?;
        debug!(count = envelope.product_listings.len(), "Fetched product listings");
        Ok(envelope.product_listings)
    }

    #[instrument(skip(self), fields(collection_id = %id))]
    async fn collection(&self, id: CollectionId) -> Result<CollectionListing> {
        let key = CacheKey::Collection(id);
        if let Some(CacheValue::Collection(listing)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for collection");
            return Ok(*listing);
        }

        let url = self.endpoint(&format!("collection_listings/{id}"), &[])?;
        let listing = match self.execute::<CollectionListingEnvelope>(url).await {
            Ok(envelope) => envelope.collection_listing,
            Err(BuyError::NotFound(_)) => {
                return Err(BuyError::NotFound(format!("Collection not found: {id}")));
            }
            Err(e) => return Err(e),
        };

        self.inner
            .cache
            .insert(key, CacheValue::Collection(Box::new(listing.clone())))
            .await;

        Ok(listing)
    }

    #[instrument(skip(self))]
    async fn collections(&self, query: &CollectionQuery) -> Result<Vec<CollectionListing>> {
        let url = self.endpoint("collection_listings", &query.to_params())?;
        let envelope = self.execute::<CollectionListingsEnvelope>(url).await?;
        debug!(
            count = envelope.collection_listings.len(),
            "Fetched collection listings"
        );
        Ok(envelope.collection_listings)
    }

    async fn invalidate_product(&self, id: ProductId) {
        self.inner.cache.invalidate(&CacheKey::Product(id)).await;
    }

    async fn invalidate_collection(&self, id: CollectionId) {
        self.inner.cache.invalidate(&CacheKey::Collection(id)).await;
    }

    async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

fn map_transport_error(e: reqwest::Error) -> BuyError {
    if e.is_timeout() {
        BuyError::Timeout
    } else {
        BuyError::Http(e)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> ListingsClient {
        let config = Config::new("abc123", "6", "embeds.myshopify.com").unwrap();
        ListingsClient::new(&config).unwrap()
    }

    #[test]
    fn test_base_url_defaults_to_shop_domain() {
        assert_eq!(
            client().base_url().as_str(),
            "https://embeds.myshopify.com/api/apps/6/"
        );
    }

    #[test]
    fn test_endpoint_with_query() {
        let query = ProductQuery {
            product_ids: vec![ProductId::new(1), ProductId::new(2)],
            page: Some(2),
            ..ProductQuery::default()
        };
        let url = client()
            .endpoint("product_listings", &query.to_params())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://embeds.myshopify.com/api/apps/6/product_listings?product_ids=1%2C2&page=2"
        );
    }

    #[test]
    fn test_endpoint_without_query_has_no_question_mark() {
        let url = client().endpoint("product_listings/7", &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://embeds.myshopify.com/api/apps/6/product_listings/7"
        );
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("ok", 10), "ok");
    }
}
