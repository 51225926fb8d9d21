//! Cart models.
//!
//! A line item refers to its variant by ID and carries a snapshot of the
//! variant data needed to price and display it, so a persisted cart can be
//! restored without re-fetching the catalog. Line items are unique per
//! variant; the variant ID doubles as the line item ID.

use std::collections::BTreeMap;

use buy_sdk_core::{CartId, Price, ProductId, VariantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{CartRecord, CartStore};
use crate::error::{BuyError, Result};
use crate::models::variant::{OptionValue, ProductVariantModel};

/// A `(variant, quantity)` pairing within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Variant ID (also the line item ID).
    pub variant_id: VariantId,
    /// Product the variant belongs to.
    pub product_id: ProductId,
    /// Variant title.
    pub title: String,
    /// Product title.
    pub product_title: String,
    /// Unit price when the item was added.
    pub price: Price,
    /// Unit compare-at price when the item was added.
    #[serde(default)]
    pub compare_at_price: Option<Price>,
    /// Unit weight in grams.
    #[serde(default)]
    pub grams: u32,
    /// Option values of the variant.
    #[serde(default)]
    pub option_values: Vec<OptionValue>,
    /// Variant image URL.
    #[serde(default)]
    pub image_src: Option<String>,
    /// Quantity, always greater than zero.
    pub quantity: u32,
}

impl LineItem {
    /// Line item ID.
    #[must_use]
    pub const fn id(&self) -> VariantId {
        self.variant_id
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_price(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// An item to be added to a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem(LineItem);

impl CartItem {
    /// Pair a variant with a quantity.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::Validation` if `quantity` is zero.
    pub fn new(variant: &ProductVariantModel, quantity: u32) -> Result<Self> {
        if quantity == 0 {
            return Err(BuyError::Validation(format!(
                "quantity for variant {} must be greater than zero",
                variant.id()
            )));
        }

        Ok(Self(LineItem {
            variant_id: variant.id(),
            product_id: variant.product_id(),
            title: variant.title().to_string(),
            product_title: variant.product_title().to_string(),
            price: variant.price_amount(),
            compare_at_price: variant.compare_at_price_amount(),
            grams: variant.grams(),
            option_values: variant.option_values().to_vec(),
            image_src: variant.image().map(|image| image.src.clone()),
            quantity,
        }))
    }

    /// Variant ID.
    #[must_use]
    pub const fn variant_id(&self) -> VariantId {
        self.0.variant_id
    }

    /// Quantity to add.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.0.quantity
    }

    pub(crate) fn into_line_item(self) -> LineItem {
        self.0
    }
}

/// Attributes for a new cart.
#[derive(Debug, Clone, Default)]
pub struct CartAttrs {
    /// Initial line items; repeated variants are combined.
    pub line_items: Vec<CartItem>,
    /// Custom attributes.
    pub attributes: BTreeMap<String, String>,
    /// Cart note.
    pub note: Option<String>,
}

impl CartAttrs {
    /// Add an initial line item.
    #[must_use]
    pub fn with_item(mut self, item: CartItem) -> Self {
        self.line_items.push(item);
        self
    }

    /// Add a custom attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set the cart note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        validate_attributes(&self.attributes)
    }
}

/// Changes to apply to an existing cart. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct CartUpdate {
    /// Replacement line items.
    pub line_items: Option<Vec<CartItem>>,
    /// Replacement custom attributes.
    pub attributes: Option<BTreeMap<String, String>>,
    /// Replacement note; `Some(None)` clears it.
    pub note: Option<Option<String>>,
}

impl CartUpdate {
    pub(crate) fn validate(&self) -> Result<()> {
        self.attributes.as_ref().map_or(Ok(()), validate_attributes)
    }
}

fn validate_attributes(attributes: &BTreeMap<String, String>) -> Result<()> {
    if attributes.keys().any(|key| key.trim().is_empty()) {
        return Err(BuyError::Validation(
            "cart attribute keys must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// A shopping cart.
///
/// A snapshot of the persisted cart plus a handle to the store that owns
/// it. Mutating methods persist through the store before updating the
/// snapshot.
#[derive(Debug, Clone)]
pub struct CartModel {
    record: CartRecord,
    store: CartStore,
}

impl CartModel {
    pub(crate) const fn new(record: CartRecord, store: CartStore) -> Self {
        Self { record, store }
    }

    /// Cart ID.
    #[must_use]
    pub const fn id(&self) -> CartId {
        self.record.id
    }

    /// Current line items, in the order they were first added.
    #[must_use]
    pub fn line_items(&self) -> &[LineItem] {
        &self.record.line_items
    }

    /// Line item for the given variant.
    #[must_use]
    pub fn line_item(&self, id: VariantId) -> Option<&LineItem> {
        self.record.line_item(id)
    }

    /// Custom attributes.
    #[must_use]
    pub const fn attributes(&self) -> &BTreeMap<String, String> {
        &self.record.attributes
    }

    /// Cart note.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.record.note.as_deref()
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.record.created_at
    }

    /// Last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.record.updated_at
    }

    /// Total quantity across line items.
    #[must_use]
    pub fn line_item_count(&self) -> u32 {
        self.record.line_item_count()
    }

    /// Subtotal for all line items, formatted as a two-decimal amount.
    #[must_use]
    pub fn subtotal(&self) -> String {
        self.record.subtotal().formatted()
    }

    /// Subtotal as a decimal amount.
    #[must_use]
    pub fn subtotal_amount(&self) -> Price {
        self.record.subtotal()
    }

    /// Checkout URL for the current line items.
    #[must_use]
    pub fn checkout_url(&self) -> String {
        self.store.checkout().lines(
            self.record
                .line_items
                .iter()
                .map(|line| (line.variant_id, line.quantity)),
        )
    }

    /// The persisted state behind this snapshot.
    #[must_use]
    pub const fn record(&self) -> &CartRecord {
        &self.record
    }

    /// Add items to the cart. Quantities for variants already in the cart
    /// are combined.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::NotFound` if the cart no longer exists, or a
    /// storage error if it cannot be persisted.
    pub async fn add_variants(&mut self, item: CartItem, next_items: Vec<CartItem>) -> Result<&Self> {
        let updated = self.store.add_variants(self.id(), item, next_items).await?;
        *self = updated;
        Ok(&*self)
    }

    /// Set a line item's quantity; zero removes it.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::NotFound` if there is no such line item.
    pub async fn update_line_item(&mut self, id: VariantId, quantity: u32) -> Result<&Self> {
        let updated = self.store.update_line_item(self.id(), id, quantity).await?;
        *self = updated;
        Ok(&*self)
    }

    /// Remove a line item.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::NotFound` if there is no such line item.
    pub async fn remove_line_item(&mut self, id: VariantId) -> Result<&Self> {
        let updated = self.store.remove_line_item(self.id(), id).await?;
        *self = updated;
        Ok(&*self)
    }

    /// Remove all line items.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the cart cannot be persisted.
    pub async fn clear_line_items(&mut self) -> Result<&Self> {
        let updated = self.store.clear_line_items(self.id()).await?;
        *self = updated;
        Ok(&*self)
    }

    /// Apply a [`CartUpdate`].
    ///
    /// # Errors
    ///
    /// Returns `BuyError::Validation` for malformed attributes.
    pub async fn update(&mut self, update: CartUpdate) -> Result<&Self> {
        let updated = self.store.update_cart(self.id(), update).await?;
        *self = updated;
        Ok(&*self)
    }

    /// Reload the snapshot from storage.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::NotFound` if the cart no longer exists.
    pub async fn reload(&mut self) -> Result<&Self> {
        let updated = self.store.fetch_cart(self.id()).await?;
        *self = updated;
        Ok(&*self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;

    #[test]
    fn test_cart_item_snapshots_variant() {
        let product = fixtures::sample_product();
        let variant = product.variant(VariantId::new(104)).unwrap();
        let item = CartItem::new(variant, 2).unwrap().into_line_item();

        assert_eq!(item.id(), VariantId::new(104));
        assert_eq!(item.product_title, "Classic Tee");
        assert_eq!(item.price.formatted(), "24.00");
        assert_eq!(item.compare_at_price.map(|p| p.formatted()).as_deref(), Some("30.00"));
        assert_eq!(item.line_price().formatted(), "48.00");
        assert_eq!(
            item.image_src.as_deref(),
            Some("https://cdn.shopify.com/s/files/tee-white.png")
        );
    }

    #[test]
    fn test_cart_item_rejects_zero_quantity() {
        let product = fixtures::sample_product();
        let variant = product.variant(VariantId::new(101)).unwrap();
        assert!(matches!(CartItem::new(variant, 0), Err(BuyError::Validation(_))));
    }

    #[test]
    fn test_cart_attrs_rejects_blank_attribute_key() {
        let attrs = CartAttrs::default().with_attribute(" ", "gift");
        assert!(matches!(attrs.validate(), Err(BuyError::Validation(_))));
        assert!(CartAttrs::default().with_attribute("gift", "yes").validate().is_ok());
    }
}
