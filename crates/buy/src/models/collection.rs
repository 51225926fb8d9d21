//! Collections.

use buy_sdk_core::CollectionId;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// A published collection of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionModel {
    /// Collection ID.
    pub id: CollectionId,
    /// Collection title.
    pub title: String,
    /// URL handle.
    pub handle: String,
    /// HTML description.
    pub description: String,
    /// Collection image URL.
    pub image_src: Option<String>,
    /// Publication timestamp.
    pub published_at: Option<DateTime<FixedOffset>>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<FixedOffset>>,
}
