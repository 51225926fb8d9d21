//! In-memory catalog.
//!
//! Serves a fixed set of listings, typically loaded from a JSON seed file:
//!
//! ```json
//! {
//!   "products": [ { "product_id": 1, "title": "Tee", "variants": [] } ],
//!   "collections": [
//!     { "collection_id": 10, "title": "Summer", "product_ids": [1] }
//!   ]
//! }
//! ```
//!
//! Listings keep their seed order, which is also the order query results
//! are returned in.

use std::path::Path;

use async_trait::async_trait;
use buy_sdk_core::{CollectionId, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::{BuyError, Result};

use super::listings::{CollectionListing, ProductListing};
use super::{Catalog, CollectionQuery, ProductQuery, paginate};

/// Seed document for a [`MemoryCatalog`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    /// Published products.
    #[serde(default)]
    pub products: Vec<ProductListing>,
    /// Published collections with their members.
    #[serde(default)]
    pub collections: Vec<SeedCollection>,
}

/// A collection listing plus the products it contains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedCollection {
    /// The listing itself.
    #[serde(flatten)]
    pub listing: CollectionListing,
    /// Member products.
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
}

/// Catalog backed by listings held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    products: Vec<ProductListing>,
    collections: Vec<SeedCollection>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a seed document.
    #[must_use]
    pub fn from_seed(seed: CatalogSeed) -> Self {
        Self {
            products: seed.products,
            collections: seed.collections,
        }
    }

    /// Parse a JSON seed document.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::Parse` if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::from_seed(serde_json::from_str(json)?))
    }

    /// Read a JSON seed document from disk.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::Storage` if the file cannot be read and
    /// `BuyError::Parse` if it is malformed.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(crate::cart::StorageError::from)?;
        Self::from_json(&json)
    }

    /// Add or replace a product.
    #[must_use]
    pub fn with_product(mut self, listing: ProductListing) -> Self {
        self.products.retain(|p| p.product_id != listing.product_id);
        self.products.push(listing);
        self
    }

    /// Add or replace a collection containing `product_ids`.
    #[must_use]
    pub fn with_collection(
        mut self,
        listing: CollectionListing,
        product_ids: impl IntoIterator<Item = ProductId>,
    ) -> Self {
        self.collections
            .retain(|c| c.listing.collection_id != listing.collection_id);
        self.collections.push(SeedCollection {
            listing,
            product_ids: product_ids.into_iter().collect(),
        });
        self
    }

    fn in_collection(&self, collection_id: CollectionId, product_id: ProductId) -> bool {
        self.collections
            .iter()
            .find(|c| c.listing.collection_id == collection_id)
            .is_some_and(|c| c.product_ids.contains(&product_id))
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn product(&self, id: ProductId) -> Result<ProductListing> {
        self.products
            .iter()
            .find(|p| p.product_id == id)
            .cloned()
            .ok_or_else(|| BuyError::NotFound(format!("Product not found: {id}")))
    }

    async fn products(&self, query: &ProductQuery) -> Result<Vec<ProductListing>> {
        let matches = self
            .products
            .iter()
            .filter(|p| query.product_ids.is_empty() || query.product_ids.contains(&p.product_id))
            .filter(|p| {
                query
                    .collection_id
                    .is_none_or(|c| self.in_collection(c, p.product_id))
            })
            .filter(|p| query.handle.as_ref().is_none_or(|h| &p.handle == h))
            .cloned()
            .collect();
        Ok(paginate(matches, query.page, query.limit))
    }

    async fn collection(&self, id: CollectionId) -> Result<CollectionListing> {
        self.collections
            .iter()
            .find(|c| c.listing.collection_id == id)
            .map(|c| c.listing.clone())
            .ok_or_else(|| BuyError::NotFound(format!("Collection not found: {id}")))
    }

    async fn collections(&self, query: &CollectionQuery) -> Result<Vec<CollectionListing>> {
        let matches = self
            .collections
            .iter()
            .map(|c| &c.listing)
            .filter(|c| {
                query.collection_ids.is_empty() || query.collection_ids.contains(&c.collection_id)
            })
            .filter(|c| query.handle.as_ref().is_none_or(|h| &c.handle == h))
            .cloned()
            .collect();
        Ok(paginate(matches, query.page, query.limit))
    }
}
