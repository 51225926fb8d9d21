//! Catalog browsing commands.

use serde_json::{Value, json};
use shopify_buy::{
    CollectionId, CollectionModel, ProductId, ProductModel, ProductQuery, ShopClient,
};
use tracing::info;

use super::emit;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// JSON view of a product, including its default selection.
pub fn product_json(product: &ProductModel) -> Value {
    let options: Vec<Value> = product
        .options()
        .iter()
        .map(|o| json!({ "name": o.name(), "values": o.values(), "selected": o.selected() }))
        .collect();

    let variants: Vec<Value> = product
        .variants()
        .iter()
        .map(|v| {
            json!({
                "id": v.id(),
                "title": v.title(),
                "price": v.price(),
                "compare_at_price": v.compare_at_price(),
                "available": v.available(),
                "option_values": v.option_values(),
                "image": v.image().map(|i| i.src.as_str()),
            })
        })
        .collect();

    json!({
        "id": product.id(),
        "title": product.title(),
        "handle": product.handle(),
        "description": product.description(),
        "images": product.images().iter().map(|i| i.src.as_str()).collect::<Vec<_>>(),
        "options": options,
        "variants": variants,
        "selected_variant": product.selected_variant().map(|v| v.id()),
        "selected_variant_image": product.selected_variant_image().map(|i| i.src.as_str()),
    })
}

fn collection_json(collection: &CollectionModel) -> Result<Value, serde_json::Error> {
    serde_json::to_value(collection)
}

/// Show one product.
///
/// # Errors
///
/// Returns an error if the product does not exist or the catalog fails.
pub async fn product(client: &ShopClient, id: u64) -> CommandResult {
    let product = client.fetch_product(ProductId::new(id)).await?;
    emit(&product_json(&product))
}

/// List products matching the given filters.
///
/// # Errors
///
/// Returns an error if the catalog fails.
pub async fn products(
    client: &ShopClient,
    ids: Vec<u64>,
    collection: Option<u64>,
    handle: Option<String>,
    page: Option<u32>,
) -> CommandResult {
    let query = ProductQuery {
        product_ids: ids.into_iter().map(ProductId::new).collect(),
        collection_id: collection.map(CollectionId::new),
        handle,
        page,
        limit: None,
    };
    let products = client.fetch_query_products(&query).await?;
    info!(count = products.len(), "Fetched products");
    emit(&Value::Array(products.iter().map(product_json).collect()))
}

/// Show one collection.
///
/// # Errors
///
/// Returns an error if the collection does not exist or the catalog fails.
pub async fn collection(client: &ShopClient, id: u64) -> CommandResult {
    let collection = client.fetch_collection(CollectionId::new(id)).await?;
    emit(&collection_json(&collection)?)
}

/// List every collection.
///
/// # Errors
///
/// Returns an error if the catalog fails.
pub async fn collections(client: &ShopClient) -> CommandResult {
    let collections = client.fetch_all_collections().await?;
    info!(count = collections.len(), "Fetched collections");
    let values = collections
        .iter()
        .map(collection_json)
        .collect::<Result<Vec<_>, _>>()?;
    emit(&Value::Array(values))
}
