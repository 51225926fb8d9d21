//! Cache types for listings API responses.

use buy_sdk_core::{CollectionId, ProductId};

use super::listings::{CollectionListing, ProductListing};

/// Cache key for single-entity fetches.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Collection(CollectionId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<ProductListing>),
    Collection(Box<CollectionListing>),
}
