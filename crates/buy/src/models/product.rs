//! Products and option resolution.
//!
//! A product's options each hold a selected value. The selected variant is
//! derived from those selections on every read:
//!
//! - The first variant (in listing order) whose option values agree with
//!   every option that has a selection is selected.
//! - An option with no selection (possible only when it has no values)
//!   matches any variant.
//! - If no variant agrees, nothing is selected.
//!
//! The selected variant image is that variant's image; when no variant is
//! selected it falls back to the product's first image.

use std::collections::BTreeMap;

use buy_sdk_core::{ProductId, VariantId};

use crate::error::BuyError;
use crate::models::image::Image;
use crate::models::option::ProductOption;
use crate::models::variant::ProductVariantModel;

/// A product in the shop's published catalog.
#[derive(Debug, Clone)]
pub struct ProductModel {
    pub(crate) id: ProductId,
    pub(crate) title: String,
    pub(crate) handle: String,
    pub(crate) description: String,
    pub(crate) images: Vec<Image>,
    pub(crate) variants: Vec<ProductVariantModel>,
    pub(crate) options: Vec<ProductOption>,
}

impl ProductModel {
    /// Product ID.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.id
    }

    /// Product title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// URL handle.
    #[must_use]
    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// HTML description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// All images associated with the product, in position order.
    #[must_use]
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// All variants of the product, in listing order.
    #[must_use]
    pub fn variants(&self) -> &[ProductVariantModel] {
        &self.variants
    }

    /// Variant with the given ID.
    #[must_use]
    pub fn variant(&self, id: VariantId) -> Option<&ProductVariantModel> {
        self.variants.iter().find(|v| v.id == id)
    }

    /// Options with their values and current selections.
    #[must_use]
    pub fn options(&self) -> &[ProductOption] {
        &self.options
    }

    /// Option with the given name.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&ProductOption> {
        self.options.iter().find(|o| o.name() == name)
    }

    /// Select `value` for the option named `name`.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::InvalidSelection` if the product has no such
    /// option or the value is not permitted; selections are unchanged.
    pub fn select(&mut self, name: &str, value: &str) -> Result<(), BuyError> {
        self.options
            .iter_mut()
            .find(|o| o.name() == name)
            .ok_or_else(|| BuyError::InvalidSelection {
                option: name.to_string(),
                value: value.to_string(),
            })?
            .select(value)
    }

    /// Apply several selections at once.
    ///
    /// Every pair is validated before any is applied, so a failure leaves
    /// all selections unchanged.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::InvalidSelection` for the first invalid pair.
    pub fn select_all<'a, I>(&mut self, selections: I) -> Result<(), BuyError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let selections: Vec<(&str, &str)> = selections.into_iter().collect();

        for &(name, value) in &selections {
            if !self.option(name).is_some_and(|o| o.has_value(value)) {
                return Err(BuyError::InvalidSelection {
                    option: name.to_string(),
                    value: value.to_string(),
                });
            }
        }

        for (name, value) in selections {
            self.select(name, value)?;
        }
        Ok(())
    }

    /// Currently selected value per option, keyed by option name.
    #[must_use]
    pub fn selections(&self) -> BTreeMap<String, String> {
        self.options
            .iter()
            .filter_map(|o| o.selected().map(|v| (o.name().to_string(), v.to_string())))
            .collect()
    }

    /// Variant matching the current selections.
    #[must_use]
    pub fn selected_variant(&self) -> Option<&ProductVariantModel> {
        self.variants.iter().find(|variant| {
            self.options.iter().all(|option| {
                option
                    .selected()
                    .is_none_or(|value| variant.option_value(option.name()) == Some(value))
            })
        })
    }

    /// Image for the selected variant, or the product's first image.
    #[must_use]
    pub fn selected_variant_image(&self) -> Option<&Image> {
        self.selected_variant()
            .map_or_else(|| self.images.first(), ProductVariantModel::image)
    }
}
