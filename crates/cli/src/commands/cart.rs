//! Cart commands.
//!
//! Each command loads the cart given by `--cart`, or the most recent cart
//! when omitted, applies one change and prints the resulting cart.

use serde_json::{Value, json};
use shopify_buy::{CartAttrs, CartId, CartItem, CartModel, ProductId, ShopClient, VariantId};
use tracing::info;

use super::emit;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

fn cart_json(cart: &CartModel) -> Value {
    json!({
        "id": cart.id().to_string(),
        "line_items": cart.line_items().iter().map(|item| json!({
            "variant_id": item.variant_id,
            "product_title": item.product_title,
            "title": item.title,
            "quantity": item.quantity,
            "price": item.price.formatted(),
            "line_price": item.line_price().formatted(),
        })).collect::<Vec<_>>(),
        "attributes": cart.attributes(),
        "note": cart.note(),
        "line_item_count": cart.line_item_count(),
        "subtotal": cart.subtotal(),
        "checkout_url": cart.checkout_url(),
    })
}

async fn load(client: &ShopClient, cart: Option<&str>) -> Result<CartModel, Box<dyn std::error::Error>> {
    match cart {
        Some(raw) => Ok(client.fetch_cart(raw.parse::<CartId>()?).await?),
        None => Ok(client.fetch_recent_cart().await?),
    }
}

/// Create a cart.
///
/// # Errors
///
/// Returns an error if an attribute is invalid or the cart cannot be saved.
pub async fn create(
    client: &ShopClient,
    note: Option<String>,
    attributes: Vec<(String, String)>,
) -> CommandResult {
    let mut attrs = attributes
        .into_iter()
        .fold(CartAttrs::default(), |attrs, (k, v)| attrs.with_attribute(k, v));
    if let Some(note) = note {
        attrs = attrs.with_note(note);
    }
    let cart = client.create_cart(attrs).await?;
    info!(cart_id = %cart.id(), "Created cart");
    emit(&cart_json(&cart))
}

/// Show a cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be loaded.
pub async fn show(client: &ShopClient, cart: Option<&str>) -> CommandResult {
    emit(&cart_json(&load(client, cart).await?))
}

/// Resolve `options` against a product and add the selected variant.
///
/// # Errors
///
/// Returns an error if a selection is invalid, no variant matches, or the
/// cart cannot be updated.
pub async fn add(
    client: &ShopClient,
    cart: Option<&str>,
    product: u64,
    options: &[(String, String)],
    quantity: u32,
) -> CommandResult {
    let mut product = client.fetch_product(ProductId::new(product)).await?;
    product.select_all(options.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;

    let variant = product.selected_variant().ok_or_else(|| {
        format!(
            "no variant of {:?} matches {:?}",
            product.title(),
            product.selections()
        )
    })?;
    let item = CartItem::new(variant, quantity)?;

    let mut cart = load(client, cart).await?;
    cart.add_variants(item, Vec::new()).await?;
    info!(cart_id = %cart.id(), variant_id = %variant.id(), quantity, "Added to cart");
    emit(&cart_json(&cart))
}

/// Set a line item's quantity.
///
/// # Errors
///
/// Returns an error if the cart or line item does not exist.
pub async fn update(
    client: &ShopClient,
    cart: Option<&str>,
    variant: u64,
    quantity: u32,
) -> CommandResult {
    let mut cart = load(client, cart).await?;
    cart.update_line_item(VariantId::new(variant), quantity)
        .await?;
    emit(&cart_json(&cart))
}

/// Remove a line item.
///
/// # Errors
///
/// Returns an error if the cart or line item does not exist.
pub async fn remove(client: &ShopClient, cart: Option<&str>, variant: u64) -> CommandResult {
    let mut cart = load(client, cart).await?;
    cart.remove_line_item(VariantId::new(variant)).await?;
    emit(&cart_json(&cart))
}

/// Remove every line item.
///
/// # Errors
///
/// Returns an error if the cart cannot be loaded or saved.
pub async fn clear(client: &ShopClient, cart: Option<&str>) -> CommandResult {
    let mut cart = load(client, cart).await?;
    cart.clear_line_items().await?;
    emit(&cart_json(&cart))
}

/// Print the checkout URL.
///
/// # Errors
///
/// Returns an error if the cart cannot be loaded.
pub async fn checkout(client: &ShopClient, cart: Option<&str>) -> CommandResult {
    let cart = load(client, cart).await?;
    emit(&json!({ "id": cart.id().to_string(), "checkout_url": cart.checkout_url() }))
}
