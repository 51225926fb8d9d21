//! Wire types for the publication listings API.
//!
//! These mirror the JSON documents returned under
//! `/api/apps/{app_id}/product_listings` and `/collection_listings`. They
//! are also the seed format of [`super::MemoryCatalog`].

use buy_sdk_core::{CollectionId, Price, ProductId, VariantId};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::models::{Image, OptionValue};

const fn default_true() -> bool {
    true
}

/// A published product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductListing {
    /// Product ID.
    pub product_id: ProductId,
    /// Product title.
    pub title: String,
    /// URL handle.
    #[serde(default)]
    pub handle: String,
    /// HTML description.
    #[serde(default)]
    pub body_html: Option<String>,
    /// Product images.
    #[serde(default)]
    pub images: Vec<Image>,
    /// Option definitions.
    #[serde(default)]
    pub options: Vec<OptionListing>,
    /// Variants.
    #[serde(default)]
    pub variants: Vec<VariantListing>,
    /// Publication timestamp.
    #[serde(default)]
    pub published_at: Option<DateTime<FixedOffset>>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

/// An option definition on a product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionListing {
    /// Option name (e.g., "Size").
    pub name: String,
    /// Position among the product's options (1-indexed).
    #[serde(default)]
    pub position: u32,
    /// Declared values. When absent, values are collected from variants.
    #[serde(default)]
    pub values: Vec<String>,
}

/// A variant on a product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantListing {
    /// Variant ID.
    pub id: VariantId,
    /// Variant title.
    pub title: String,
    /// Price.
    pub price: Price,
    /// Compare-at price.
    #[serde(default)]
    pub compare_at_price: Option<Price>,
    /// Weight in grams.
    #[serde(default)]
    pub grams: u32,
    /// Whether the variant can be purchased.
    #[serde(default = "default_true")]
    pub available: bool,
    /// Option values for this variant.
    #[serde(default)]
    pub option_values: Vec<OptionValue>,
    /// Position among the product's variants (1-indexed).
    #[serde(default)]
    pub position: u32,
}

/// A published collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionListing {
    /// Collection ID.
    pub collection_id: CollectionId,
    /// Collection title.
    pub title: String,
    /// URL handle.
    #[serde(default)]
    pub handle: String,
    /// HTML description.
    #[serde(default)]
    pub body_html: Option<String>,
    /// Collection image.
    #[serde(default)]
    pub image: Option<CollectionImage>,
    /// Publication timestamp.
    #[serde(default)]
    pub published_at: Option<DateTime<FixedOffset>>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

/// Image attached to a collection listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionImage {
    /// Image URL.
    pub src: String,
}

// Response envelopes

#[derive(Debug, Deserialize)]
pub(crate) struct ProductListingEnvelope {
    pub product_listing: ProductListing,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductListingsEnvelope {
    #[serde(default)]
    pub product_listings: Vec<ProductListing>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CollectionListingEnvelope {
    pub collection_listing: CollectionListing,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CollectionListingsEnvelope {
    #[serde(default)]
    pub collection_listings: Vec<CollectionListing>,
}
