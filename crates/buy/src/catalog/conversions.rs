//! Listing to model conversion functions.

use std::sync::Arc;

use crate::checkout::CheckoutUrls;
use crate::models::{CollectionModel, Image, ProductModel, ProductOption, ProductVariantModel};

use super::listings::{CollectionListing, OptionListing, ProductListing, VariantListing};

/// Convert a product listing into a [`ProductModel`].
///
/// Images and variants are ordered by position. Option values come from
/// the option definition when present, otherwise from the variants in
/// listing order.
pub fn convert_product(listing: ProductListing, checkout: &Arc<CheckoutUrls>) -> ProductModel {
    let mut images = listing.images;
    images.sort_by_key(|image| image.position);

    let mut variants = listing.variants;
    variants.sort_by_key(|variant| variant.position);

    let options = convert_options(listing.options, &variants);

    let variants = variants
        .into_iter()
        .map(|variant| convert_variant(variant, listing.product_id, &listing.title, &images, checkout))
        .collect();

    ProductModel {
        id: listing.product_id,
        title: listing.title,
        handle: listing.handle,
        description: listing.body_html.unwrap_or_default(),
        images,
        variants,
        options,
    }
}

fn convert_options(mut definitions: Vec<OptionListing>, variants: &[VariantListing]) -> Vec<ProductOption> {
    definitions.sort_by_key(|option| option.position);

    let mut names: Vec<(String, Vec<String>)> = definitions
        .into_iter()
        .map(|option| (option.name, option.values))
        .collect();

    // Listings without option definitions still name their options on
    // each variant.
    if names.is_empty() {
        for variant in variants {
            for ov in &variant.option_values {
                if !names.iter().any(|(name, _)| name == &ov.name) {
                    names.push((ov.name.clone(), Vec::new()));
                }
            }
        }
    }

    names
        .into_iter()
        .map(|(name, declared)| {
            if declared.is_empty() {
                let values = variants.iter().filter_map(|variant| {
                    variant
                        .option_values
                        .iter()
                        .find(|ov| ov.name == name)
                        .map(|ov| ov.value.clone())
                });
                ProductOption::new(name.clone(), values)
            } else {
                ProductOption::new(name, declared)
            }
        })
        .collect()
}

fn convert_variant(
    variant: VariantListing,
    product_id: buy_sdk_core::ProductId,
    product_title: &str,
    images: &[Image],
    checkout: &Arc<CheckoutUrls>,
) -> ProductVariantModel {
    let image = images
        .iter()
        .find(|image| image.shows_variant(variant.id))
        .or_else(|| images.first())
        .cloned();

    ProductVariantModel {
        id: variant.id,
        title: variant.title,
        price: variant.price,
        compare_at_price: variant.compare_at_price,
        grams: variant.grams,
        available: variant.available,
        option_values: variant.option_values,
        product_id,
        product_title: product_title.to_string(),
        image,
        checkout: Arc::clone(checkout),
    }
}

/// Convert a collection listing into a [`CollectionModel`].
pub fn convert_collection(listing: CollectionListing) -> CollectionModel {
    CollectionModel {
        id: listing.collection_id,
        title: listing.title,
        handle: listing.handle,
        description: listing.body_html.unwrap_or_default(),
        image_src: listing.image.map(|image| image.src),
        published_at: listing.published_at,
        updated_at: listing.updated_at,
    }
}
