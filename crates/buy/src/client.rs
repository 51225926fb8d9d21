//! The configured entry point.
//!
//! A [`ShopClient`] composes a [`Catalog`] with a [`CartStore`] and converts
//! raw listings into models. Configuration is fixed at construction.

use std::sync::Arc;

use buy_sdk_core::{CartId, CollectionId, ProductId};
use tracing::{debug, instrument, warn};

use crate::cart::{CartStorage, CartStore, FileStorage, MemoryStorage};
use crate::catalog::conversions::{convert_collection, convert_product};
use crate::catalog::{Catalog, CollectionQuery, DEFAULT_LIMIT, ListingsClient, ProductQuery};
use crate::checkout::CheckoutUrls;
use crate::config::Config;
use crate::error::Result;
use crate::models::{CartAttrs, CartModel, CartUpdate, CollectionModel, ProductModel};

/// Upper bound on pages walked by the `fetch_all_*` methods.
pub const MAX_PAGES: u32 = 200;

/// Build a client from `config`.
///
/// Equivalent to [`ShopClient::new`].
///
/// # Errors
///
/// Returns an error if the HTTP catalog cannot be initialized.
pub fn build_client(config: Config) -> Result<ShopClient> {
    ShopClient::new(config)
}

/// Client for a single shop.
///
/// Cheaply cloneable via `Arc`; clones share the catalog cache and cart
/// store.
#[derive(Clone)]
pub struct ShopClient {
    inner: Arc<ShopClientInner>,
}

struct ShopClientInner {
    config: Config,
    catalog: Arc<dyn Catalog>,
    carts: CartStore,
    checkout: Arc<CheckoutUrls>,
}

impl std::fmt::Debug for ShopClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ShopClient {
    /// Create a client backed by the listings API.
    ///
    /// Carts are stored under `config.cart_dir()` when set, otherwise in
    /// memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP catalog cannot be initialized.
    pub fn new(config: Config) -> Result<Self> {
        let catalog = Arc::new(ListingsClient::new(&config)?);
        let storage: Arc<dyn CartStorage> = match config.cart_dir() {
            Some(dir) => Arc::new(FileStorage::new(dir.clone())),
            None => Arc::new(MemoryStorage::new()),
        };
        Ok(Self::with_parts(config, catalog, storage))
    }

    /// Create a client from an explicit catalog and cart storage.
    #[must_use]
    pub fn with_parts(
        config: Config,
        catalog: Arc<dyn Catalog>,
        storage: Arc<dyn CartStorage>,
    ) -> Self {
        let checkout = Arc::new(CheckoutUrls::new(&config));
        let carts = CartStore::new(storage, Arc::clone(&checkout));
        Self {
            inner: Arc::new(ShopClientInner {
                config,
                catalog,
                carts,
                checkout,
            }),
        }
    }

    /// Configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// The cart store, for line item operations by cart ID.
    #[must_use]
    pub fn carts(&self) -> &CartStore {
        &self.inner.carts
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch a product.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::NotFound` if the product does not exist, or a
    /// transport error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn fetch_product(&self, id: ProductId) -> Result<ProductModel> {
        let listing = self.inner.catalog.product(id).await?;
        Ok(convert_product(listing, &self.inner.checkout))
    }

    /// Fetch a collection.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::NotFound` if the collection does not exist, or a
    /// transport error.
    #[instrument(skip(self), fields(collection_id = %id))]
    pub async fn fetch_collection(&self, id: CollectionId) -> Result<CollectionModel> {
        let listing = self.inner.catalog.collection(id).await?;
        Ok(convert_collection(listing))
    }

    /// Fetch products matching `query`. No matches yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the catalog cannot be reached.
    #[instrument(skip(self))]
    pub async fn fetch_query_products(&self, query: &ProductQuery) -> Result<Vec<ProductModel>> {
        let listings = self.inner.catalog.products(query).await?;
        Ok(listings
            .into_iter()
            .map(|listing| convert_product(listing, &self.inner.checkout))
            .collect())
    }

    /// Fetch collections matching `query`. No matches yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the catalog cannot be reached.
    #[instrument(skip(self))]
    pub async fn fetch_query_collections(
        &self,
        query: &CollectionQuery,
    ) -> Result<Vec<CollectionModel>> {
        let listings = self.inner.catalog.collections(query).await?;
        Ok(listings.into_iter().map(convert_collection).collect())
    }

    /// Fetch every published product, walking all pages.
    ///
    /// # Errors
    ///
    /// Returns a transport error if any page cannot be fetched.
    #[instrument(skip(self))]
    pub async fn fetch_all_products(&self) -> Result<Vec<ProductModel>> {
        let mut products = Vec::new();
        let mut previous: Vec<ProductId> = Vec::new();
        for page in 1..=MAX_PAGES {
            let query = ProductQuery {
                page: Some(page),
                limit: Some(DEFAULT_LIMIT),
                ..ProductQuery::default()
            };
            let batch = self.fetch_query_products(&query).await?;
            let ids: Vec<ProductId> = batch.iter().map(ProductModel::id).collect();
            if !ids.is_empty() && ids == previous {
                warn!(page, "Listings API repeated a page, stopping");
                break;
            }
            let done = batch.len() < DEFAULT_LIMIT as usize;
            products.extend(batch);
            if done {
                break;
            }
            if page == MAX_PAGES {
                warn!(max_pages = MAX_PAGES, "Stopped walking products at page limit");
            }
            previous = ids;
        }
        debug!(count = products.len(), "Fetched all products");
        Ok(products)
    }

    /// Fetch every published collection, walking all pages.
    ///
    /// Stops early if the API returns the same page twice in a row, and
    /// never walks more than [`MAX_PAGES`] pages.
    ///
    /// # Errors
    ///
    /// Returns a transport error if any page cannot be fetched.
    #[instrument(skip(self))]
    pub async fn fetch_all_collections(&self) -> Result<Vec<CollectionModel>> {
        let mut collections = Vec::new();
        let mut previous: Vec<CollectionId> = Vec::new();
        for page in 1..=MAX_PAGES {
            let query = CollectionQuery {
                page: Some(page),
                limit: Some(DEFAULT_LIMIT),
                ..CollectionQuery::default()
            };
            let batch = self.fetch_query_collections(&query).await?;
            let ids: Vec<CollectionId> = batch.iter().map(|c| c.id).collect();
            if !ids.is_empty() && ids == previous {
                warn!(page, "Listings API repeated a page, stopping");
                break;
            }
            let done = batch.len() < DEFAULT_LIMIT as usize;
            collections.extend(batch);
            if done {
                break;
            }
            if page == MAX_PAGES {
                warn!(max_pages = MAX_PAGES, "Stopped walking collections at page limit");
            }
            previous = ids;
        }
        debug!(count = collections.len(), "Fetched all collections");
        Ok(collections)
    }

    /// Drop any cached copy of a product.
    pub async fn invalidate_product(&self, id: ProductId) {
        self.inner.catalog.invalidate_product(id).await;
    }

    /// Drop any cached copy of a collection.
    pub async fn invalidate_collection(&self, id: CollectionId) {
        self.inner.catalog.invalidate_collection(id).await;
    }

    /// Drop all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.inner.catalog.invalidate_all().await;
    }

    // =========================================================================
    // Carts
    // =========================================================================

    /// Create a new cart. See [`CartStore::create_cart`].
    ///
    /// # Errors
    ///
    /// Returns `BuyError::Validation` for malformed attributes, or a storage
    /// error.
    pub async fn create_cart(&self, attrs: CartAttrs) -> Result<CartModel> {
        self.inner.carts.create_cart(attrs).await
    }

    /// Apply a [`CartUpdate`] to a cart.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::NotFound` if the cart does not exist.
    pub async fn update_cart(&self, id: CartId, update: CartUpdate) -> Result<CartModel> {
        self.inner.carts.update_cart(id, update).await
    }

    /// Load a previously created cart.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::NotFound` if the cart does not exist.
    pub async fn fetch_cart(&self, id: CartId) -> Result<CartModel> {
        self.inner.carts.fetch_cart(id).await
    }

    /// The most recent cart, created on demand.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the cart cannot be loaded or created.
    pub async fn fetch_recent_cart(&self) -> Result<CartModel> {
        self.inner.carts.fetch_recent_cart().await
    }
}
