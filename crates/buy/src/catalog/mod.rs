//! Catalog access.
//!
//! A [`Catalog`] returns raw listings; [`crate::ShopClient`] turns them into
//! models. Two implementations are provided:
//!
//! - [`ListingsClient`] - the shop's publication listings API over HTTPS,
//!   with single-entity fetches cached via `moka`
//! - [`MemoryCatalog`] - a fixed set of listings held in memory
//!
//! Every fetch is independent: a single product or collection that does not
//! exist fails with `BuyError::NotFound`, while a query with no matches
//! returns an empty list.

mod cache;
pub(crate) mod conversions;
pub mod listings;
mod memory;
mod storefront;

use async_trait::async_trait;
use buy_sdk_core::{CollectionId, ProductId};

use crate::error::Result;

pub use listings::{
    CollectionImage, CollectionListing, OptionListing, ProductListing, VariantListing,
};
pub use memory::{CatalogSeed, MemoryCatalog, SeedCollection};
pub use storefront::ListingsClient;

/// Default page size for listing queries.
pub const DEFAULT_LIMIT: u32 = 50;

/// Source of published products and collections.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch one product listing.
    async fn product(&self, id: ProductId) -> Result<ProductListing>;

    /// Fetch product listings matching a query.
    async fn products(&self, query: &ProductQuery) -> Result<Vec<ProductListing>>;

    /// Fetch one collection listing.
    async fn collection(&self, id: CollectionId) -> Result<CollectionListing>;

    /// Fetch collection listings matching a query.
    async fn collections(&self, query: &CollectionQuery) -> Result<Vec<CollectionListing>>;

    /// Drop any cached copy of a product. No-op for uncached catalogs.
    async fn invalidate_product(&self, _id: ProductId) {}

    /// Drop any cached copy of a collection. No-op for uncached catalogs.
    async fn invalidate_collection(&self, _id: CollectionId) {}

    /// Drop all cached data. No-op for uncached catalogs.
    async fn invalidate_all(&self) {}
}

/// Filter criteria for product queries. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Only these products.
    pub product_ids: Vec<ProductId>,
    /// Only products in this collection.
    pub collection_id: Option<CollectionId>,
    /// Only the product with this handle.
    pub handle: Option<String>,
    /// Page number, 1-indexed.
    pub page: Option<u32>,
    /// Page size (default [`DEFAULT_LIMIT`]).
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// Query parameters for the listings API.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.product_ids.is_empty() {
            params.push(("product_ids", join_ids(&self.product_ids)));
        }
        if let Some(collection_id) = self.collection_id {
            params.push(("collection_id", collection_id.to_string()));
        }
        if let Some(handle) = &self.handle {
            params.push(("handle", handle.clone()));
        }
        push_paging(&mut params, self.page, self.limit);
        params
    }
}

/// Filter criteria for collection queries. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionQuery {
    /// Only these collections.
    pub collection_ids: Vec<CollectionId>,
    /// Only the collection with this handle.
    pub handle: Option<String>,
    /// Page number, 1-indexed.
    pub page: Option<u32>,
    /// Page size (default [`DEFAULT_LIMIT`]).
    pub limit: Option<u32>,
}

impl CollectionQuery {
    /// Query parameters for the listings API.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.collection_ids.is_empty() {
            params.push(("collection_ids", join_ids(&self.collection_ids)));
        }
        if let Some(handle) = &self.handle {
            params.push(("handle", handle.clone()));
        }
        push_paging(&mut params, self.page, self.limit);
        params
    }
}

fn join_ids<T: std::fmt::Display>(ids: &[T]) -> String {
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}

fn push_paging(params: &mut Vec<(&'static str, String)>, page: Option<u32>, limit: Option<u32>) {
    if let Some(page) = page {
        params.push(("page", page.to_string()));
    }
    if let Some(limit) = limit {
        params.push(("limit", limit.to_string()));
    }
}

/// Apply 1-indexed `page` / `limit` paging to an ordered list.
pub(crate) fn paginate<T>(items: Vec<T>, page: Option<u32>, limit: Option<u32>) -> Vec<T> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT) as usize;
    let skip = (page.unwrap_or(1).max(1) as usize - 1).saturating_mul(limit);
    items.into_iter().skip(skip).take(limit).collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_query_params() {
        let query = ProductQuery {
            product_ids: vec![ProductId::new(1), ProductId::new(22)],
            collection_id: Some(CollectionId::new(5)),
            handle: None,
            page: Some(2),
            limit: Some(10),
        };
        assert_eq!(
            query.to_params(),
            vec![
                ("product_ids", "1,22".to_string()),
                ("collection_id", "5".to_string()),
                ("page", "2".to_string()),
                ("limit", "10".to_string()),
            ]
        );
        assert!(ProductQuery::default().to_params().is_empty());
    }

    #[test]
    fn test_collection_query_params() {
        let query = CollectionQuery {
            handle: Some("summer".to_string()),
            ..CollectionQuery::default()
        };
        assert_eq!(query.to_params(), vec![("handle", "summer".to_string())]);
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=7).collect();
        assert_eq!(paginate(items.clone(), None, Some(3)), [1, 2, 3]);
        assert_eq!(paginate(items.clone(), Some(3), Some(3)), [7]);
        assert_eq!(paginate(items.clone(), Some(4), Some(3)), Vec::<u32>::new());
        assert_eq!(paginate(items, Some(0), None).len(), 7);
    }
}
