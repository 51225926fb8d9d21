//! Product variants.

use std::sync::Arc;

use buy_sdk_core::{Price, ProductId, VariantId};
use serde::{Deserialize, Serialize};

use crate::checkout::CheckoutUrls;
use crate::models::image::Image;

/// An option value on a variant (e.g., `{name: "Color", value: "Blue"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionValue {
    /// Option name.
    pub name: String,
    /// Value of that option for this variant.
    pub value: String,
}

/// A specific purchasable configuration of a product.
#[derive(Debug, Clone)]
pub struct ProductVariantModel {
    pub(crate) id: VariantId,
    pub(crate) title: String,
    pub(crate) price: Price,
    pub(crate) compare_at_price: Option<Price>,
    pub(crate) grams: u32,
    pub(crate) available: bool,
    pub(crate) option_values: Vec<OptionValue>,
    pub(crate) product_id: ProductId,
    pub(crate) product_title: String,
    pub(crate) image: Option<Image>,
    pub(crate) checkout: Arc<CheckoutUrls>,
}

impl ProductVariantModel {
    /// Variant ID.
    #[must_use]
    pub const fn id(&self) -> VariantId {
        self.id
    }

    /// Variant title (combination of option values).
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Price formatted as a two-decimal amount.
    #[must_use]
    pub fn price(&self) -> String {
        self.price.formatted()
    }

    /// Price as a decimal amount.
    #[must_use]
    pub const fn price_amount(&self) -> Price {
        self.price
    }

    /// Compare-at price formatted as a two-decimal amount.
    #[must_use]
    pub fn compare_at_price(&self) -> Option<String> {
        self.compare_at_price.map(|p| p.formatted())
    }

    /// Compare-at price as a decimal amount.
    #[must_use]
    pub const fn compare_at_price_amount(&self) -> Option<Price> {
        self.compare_at_price
    }

    /// Variant weight in grams.
    #[must_use]
    pub const fn grams(&self) -> u32 {
        self.grams
    }

    /// Whether the variant is available for sale.
    #[must_use]
    pub const fn available(&self) -> bool {
        self.available
    }

    /// Option values for this variant, in option order.
    #[must_use]
    pub fn option_values(&self) -> &[OptionValue] {
        &self.option_values
    }

    /// Value of the named option, if this variant has it.
    #[must_use]
    pub fn option_value(&self, name: &str) -> Option<&str> {
        self.option_values
            .iter()
            .find(|ov| ov.name == name)
            .map(|ov| ov.value.as_str())
    }

    /// ID of the product this variant belongs to.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Title of the product this variant belongs to.
    #[must_use]
    pub fn product_title(&self) -> &str {
        &self.product_title
    }

    /// Image for this variant.
    ///
    /// The product image listing this variant, falling back to the
    /// product's first image.
    #[must_use]
    pub const fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }

    /// Checkout URL for purchasing this variant with `quantity`.
    #[must_use]
    pub fn checkout_url(&self, quantity: u32) -> String {
        self.checkout.variant(self.id, quantity)
    }
}
