//! Product images.

use std::collections::BTreeSet;

use buy_sdk_core::{ImageId, ProductId, VariantId};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A product image as published in the listings API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image ID.
    pub id: ImageId,
    /// Image URL.
    pub src: String,
    /// Position in the product's image list (1-indexed).
    #[serde(default)]
    pub position: u32,
    /// Product the image belongs to.
    pub product_id: ProductId,
    /// Variants that use this image.
    #[serde(default)]
    pub variant_ids: BTreeSet<VariantId>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl Image {
    /// Whether this image is associated with the given variant.
    #[must_use]
    pub fn shows_variant(&self, variant_id: VariantId) -> bool {
        self.variant_ids.contains(&variant_id)
    }
}
