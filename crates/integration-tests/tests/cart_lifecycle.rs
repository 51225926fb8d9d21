//! Cart lifecycle through the public client, with in-memory and file
//! storage.

#![allow(clippy::indexing_slicing)]

use std::sync::Arc;

use buy_integration_tests::{catalog_seed, shop_config};
use shopify_buy::{
    CartAttrs, CartItem, CartUpdate, FileStorage, MemoryCatalog, MemoryStorage, ProductId,
    ProductModel, ShopClient, VariantId,
};

fn catalog() -> Arc<MemoryCatalog> {
    Arc::new(MemoryCatalog::from_json(&catalog_seed().to_string()).expect("seed"))
}

fn memory_client() -> ShopClient {
    ShopClient::with_parts(shop_config(), catalog(), Arc::new(MemoryStorage::new()))
}

fn file_client(dir: &std::path::Path) -> ShopClient {
    ShopClient::with_parts(shop_config(), catalog(), Arc::new(FileStorage::new(dir)))
}

async fn tee(client: &ShopClient) -> ProductModel {
    client
        .fetch_product(ProductId::new(1001))
        .await
        .expect("tee")
}

fn item(product: &ProductModel, variant: u64, quantity: u32) -> CartItem {
    let variant = product
        .variant(VariantId::new(variant))
        .expect("variant in fixture");
    CartItem::new(variant, quantity).expect("item")
}

#[tokio::test]
async fn test_add_update_remove_scenario() {
    let client = memory_client();
    let product = tee(&client).await;
    let v1 = VariantId::new(101);

    let mut cart = client.create_cart(CartAttrs::default()).await.expect("cart");
    assert!(cart.line_items().is_empty());

    cart.add_variants(item(&product, 101, 2), Vec::new())
        .await
        .expect("add");
    assert_eq!(cart.line_items().len(), 1);
    assert_eq!(cart.line_items()[0].quantity, 2);

    cart.update_line_item(v1, 5).await.expect("update");
    assert_eq!(cart.line_items()[0].quantity, 5);

    cart.remove_line_item(v1).await.expect("remove");
    assert!(cart.line_items().is_empty());
}

#[tokio::test]
async fn test_create_then_fetch_round_trips() {
    let client = memory_client();
    let product = tee(&client).await;

    let cart = client
        .create_cart(
            CartAttrs::default()
                .with_item(item(&product, 104, 1))
                .with_item(item(&product, 102, 3))
                .with_attribute("channel", "buy-button"),
        )
        .await
        .expect("cart");

    let fetched = client.fetch_cart(cart.id()).await.expect("fetch");
    assert_eq!(fetched.id(), cart.id());
    assert_eq!(fetched.line_items(), cart.line_items());
    assert_eq!(fetched.attributes()["channel"], "buy-button");
}

#[tokio::test]
async fn test_subtotal_and_checkout_url() {
    let client = memory_client();
    let product = tee(&client).await;

    let mut cart = client.create_cart(CartAttrs::default()).await.expect("cart");
    assert_eq!(cart.subtotal(), "0.00");
    assert_eq!(
        cart.checkout_url(),
        "https://embeds.myshopify.com/cart?api_key=abc123"
    );

    cart.add_variants(item(&product, 101, 2), vec![item(&product, 104, 1)])
        .await
        .expect("add");

    // 2 x 19.99 + 1 x 24.00
    assert_eq!(cart.subtotal(), "63.98");
    assert_eq!(
        cart.checkout_url(),
        "https://embeds.myshopify.com/cart/101:2,104:1?api_key=abc123"
    );
}

#[tokio::test]
async fn test_update_cart_and_fetch_recent() {
    let client = memory_client();
    let product = tee(&client).await;

    let first = client.fetch_recent_cart().await.expect("recent");
    let second = client
        .create_cart(CartAttrs::default().with_note("hello"))
        .await
        .expect("cart");
    assert_ne!(first.id(), second.id());
    assert_eq!(client.fetch_recent_cart().await.expect("recent").id(), second.id());

    let updated = client
        .update_cart(
            second.id(),
            CartUpdate {
                line_items: Some(vec![item(&product, 103, 1)]),
                attributes: None,
                note: Some(Some("bye".to_string())),
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.note(), Some("bye"));
    assert_eq!(updated.line_items()[0].variant_id, VariantId::new(103));
}

#[tokio::test]
async fn test_file_storage_survives_client_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cart_id = {
        let client = file_client(dir.path());
        let product = tee(&client).await;
        let mut cart = client
            .create_cart(CartAttrs::default().with_attribute("gift", "yes"))
            .await
            .expect("cart");
        cart.add_variants(item(&product, 102, 2), Vec::new())
            .await
            .expect("add");
        cart.id()
    };

    let reopened = file_client(dir.path());
    let cart = reopened.fetch_cart(cart_id).await.expect("fetch after restart");
    assert_eq!(cart.line_items()[0].variant_id, VariantId::new(102));
    assert_eq!(cart.line_items()[0].quantity, 2);
    assert_eq!(cart.attributes()["gift"], "yes");
    assert_eq!(cart.subtotal(), "39.98");

    let recent = reopened.fetch_recent_cart().await.expect("recent");
    assert_eq!(recent.id(), cart_id);
}

#[tokio::test]
async fn test_destroyed_cart_is_gone() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = file_client(dir.path());

    let cart = client.create_cart(CartAttrs::default()).await.expect("cart");
    client.carts().destroy_cart(cart.id()).await.expect("destroy");

    assert!(client.fetch_cart(cart.id()).await.expect_err("gone").is_not_found());
    assert!(!dir.path().join(format!("{}.json", cart.id())).exists());
}

#[tokio::test]
async fn test_concurrent_adds_are_not_lost() {
    let client = memory_client();
    let product = tee(&client).await;
    let cart = client.create_cart(CartAttrs::default()).await.expect("cart");

    let mut tasks = Vec::new();
    for _ in 0..25 {
        let store = client.carts().clone();
        let next = item(&product, 105, 1);
        let id = cart.id();
        tasks.push(tokio::spawn(async move {
            store.add_variants(id, next, Vec::new()).await
        }));
    }
    for task in tasks {
        task.await.expect("join").expect("add");
    }

    let cart = client.fetch_cart(cart.id()).await.expect("fetch");
    assert_eq!(cart.line_item_count(), 25);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_with_file_storage() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = file_client(dir.path());

    for _ in 0..5 {
        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let store = client.carts().clone();
                tokio::spawn(async move { store.create_cart(CartAttrs::default()).await })
            })
            .collect();

        let mut created = Vec::new();
        for task in tasks {
            created.push(task.await.expect("join").expect("create").id());
        }

        for id in &created {
            client.fetch_cart(*id).await.expect("persisted");
        }
        let recent = client.fetch_recent_cart().await.expect("recent").id();
        assert!(created.contains(&recent));
    }
}
