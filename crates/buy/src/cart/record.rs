//! Persisted cart state and the pure line item operations on it.

use std::collections::BTreeMap;

use buy_sdk_core::{CartId, Price, VariantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BuyError, Result};
use crate::models::LineItem;

/// The durable representation of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartRecord {
    /// Cart ID.
    pub id: CartId,
    /// Line items, unique per variant, in first-added order.
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    /// Custom attributes supplied at creation or update.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Cart note.
    #[serde(default)]
    pub note: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl CartRecord {
    /// A new, empty cart.
    #[must_use]
    pub fn new(id: CartId) -> Self {
        let now = Utc::now();
        Self {
            id,
            line_items: Vec::new(),
            attributes: BTreeMap::new(),
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Line item for the given variant.
    #[must_use]
    pub fn line_item(&self, id: VariantId) -> Option<&LineItem> {
        self.line_items.iter().find(|line| line.variant_id == id)
    }

    /// Sum of price times quantity across line items.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.line_items.iter().map(LineItem::line_price).sum()
    }

    /// Total quantity across line items.
    #[must_use]
    pub fn line_item_count(&self) -> u32 {
        self.line_items
            .iter()
            .fold(0_u32, |total, line| total.saturating_add(line.quantity))
    }

    /// Add line items, combining quantities for variants already present.
    ///
    /// The newly added snapshot replaces the stored one so that price and
    /// title reflect the most recent fetch. Either every item is applied or
    /// none is.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::Validation` if a combined quantity exceeds
    /// `u32::MAX`.
    pub fn add(&mut self, items: impl IntoIterator<Item = LineItem>) -> Result<()> {
        let mut lines = self.line_items.clone();
        for item in items {
            if let Some(existing) = lines
                .iter_mut()
                .find(|line| line.variant_id == item.variant_id)
            {
                let quantity = existing.quantity.checked_add(item.quantity).ok_or_else(|| {
                    BuyError::Validation(format!(
                        "quantity for variant {} is too large",
                        item.variant_id
                    ))
                })?;
                *existing = LineItem { quantity, ..item };
            } else {
                lines.push(item);
            }
        }
        self.line_items = lines;
        Ok(())
    }

    /// Set a line item's quantity; zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::NotFound` if there is no line for `id`.
    pub fn set_quantity(&mut self, id: VariantId, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return self.remove(id);
        }

        let cart = self.id;
        let line = self
            .line_items
            .iter_mut()
            .find(|line| line.variant_id == id)
            .ok_or_else(|| line_not_found(cart, id))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Remove a line item.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::NotFound` if there is no line for `id`.
    pub fn remove(&mut self, id: VariantId) -> Result<()> {
        let before = self.line_items.len();
        self.line_items.retain(|line| line.variant_id != id);
        if self.line_items.len() == before {
            return Err(line_not_found(self.id, id));
        }
        Ok(())
    }

    /// Remove all line items.
    pub fn clear(&mut self) {
        self.line_items.clear();
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn line_not_found(cart: CartId, line: VariantId) -> BuyError {
    BuyError::NotFound(format!("Line item {line} not found in cart {cart}"))
}
