//! Listings API client against the mock shop.

#![allow(clippy::indexing_slicing)]

use std::time::Duration;

use buy_integration_tests::{MockShop, shop_config};
use shopify_buy::{
    BuyError, CollectionId, CollectionQuery, ProductId, ProductQuery, ShopClient, VariantId,
    build_client,
};

async fn client() -> (MockShop, ShopClient) {
    let shop = MockShop::start().await;
    let client = build_client(shop.config()).expect("client");
    (shop, client)
}

#[tokio::test]
async fn test_fetch_product_decodes_listing() {
    let (_shop, client) = client().await;

    let product = client
        .fetch_product(ProductId::new(1001))
        .await
        .expect("product");

    assert_eq!(product.title(), "Classic Tee");
    assert_eq!(product.variants().len(), 5);
    assert_eq!(product.images().len(), 2);
    assert_eq!(product.options()[0].values(), ["Small", "Medium", "Large"]);
    assert_eq!(
        product.selected_variant().map(|v| v.id()),
        Some(VariantId::new(101))
    );
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let (_shop, client) = client().await;

    let err = client
        .fetch_product(ProductId::new(123))
        .await
        .expect_err("missing product");
    assert!(err.is_not_found(), "unexpected error: {err}");
}

#[tokio::test]
async fn test_query_for_unknown_ids_is_empty_not_an_error() {
    let (_shop, client) = client().await;

    let products = client
        .fetch_query_products(&ProductQuery {
            product_ids: vec![ProductId::new(123)],
            ..ProductQuery::default()
        })
        .await
        .expect("query");
    assert!(products.is_empty());
}

#[tokio::test]
async fn test_query_filters_are_sent() {
    let (_shop, client) = client().await;

    let by_ids = client
        .fetch_query_products(&ProductQuery {
            product_ids: vec![ProductId::new(1001), ProductId::new(1002)],
            ..ProductQuery::default()
        })
        .await
        .expect("by ids");
    assert_eq!(by_ids.len(), 2);

    let in_summer = client
        .fetch_query_products(&ProductQuery {
            collection_id: Some(CollectionId::new(77)),
            ..ProductQuery::default()
        })
        .await
        .expect("by collection");
    assert_eq!(in_summer.len(), 1);
    assert_eq!(in_summer[0].title(), "Enamel Mug");

    let by_handle = client
        .fetch_query_products(&ProductQuery {
            handle: Some("classic-tee".to_string()),
            ..ProductQuery::default()
        })
        .await
        .expect("by handle");
    assert_eq!(by_handle[0].id(), ProductId::new(1001));
}

#[tokio::test]
async fn test_collections() {
    let (_shop, client) = client().await;

    let summer = client
        .fetch_collection(CollectionId::new(77))
        .await
        .expect("collection");
    assert_eq!(summer.title, "Summer");
    assert_eq!(summer.description, "<p>Hot weather picks.</p>");

    assert!(
        client
            .fetch_collection(CollectionId::new(1))
            .await
            .expect_err("missing collection")
            .is_not_found()
    );

    let none = client
        .fetch_query_collections(&CollectionQuery {
            collection_ids: vec![CollectionId::new(1)],
            ..CollectionQuery::default()
        })
        .await
        .expect("query");
    assert!(none.is_empty());

    assert_eq!(client.fetch_all_collections().await.expect("all").len(), 1);
}

#[tokio::test]
async fn test_fetch_all_products() {
    let (_shop, client) = client().await;
    let all = client.fetch_all_products().await.expect("all products");
    let ids: Vec<ProductId> = all.iter().map(|p| p.id()).collect();
    assert_eq!(ids, [ProductId::new(1001), ProductId::new(1002)]);
}

#[tokio::test]
async fn test_single_fetches_are_cached_until_invalidated() {
    let (shop, client) = client().await;

    client.fetch_product(ProductId::new(1001)).await.expect("first");
    client.fetch_product(ProductId::new(1001)).await.expect("second");
    assert_eq!(shop.hits(), 1);

    client.invalidate_product(ProductId::new(1001)).await;
    client.fetch_product(ProductId::new(1001)).await.expect("third");
    assert_eq!(shop.hits(), 2);

    client.fetch_collection(CollectionId::new(77)).await.expect("collection");
    client.invalidate_all().await;
    client.fetch_collection(CollectionId::new(77)).await.expect("collection again");
    assert_eq!(shop.hits(), 4);
}

#[tokio::test]
async fn test_rate_limit_reports_retry_after() {
    let (_shop, client) = client().await;
    let err = client
        .fetch_product(ProductId::new(4290))
        .await
        .expect_err("rate limited");
    assert!(matches!(err, BuyError::RateLimited(7)), "unexpected error: {err}");
}

#[tokio::test]
async fn test_server_error_carries_status_and_body() {
    let (_shop, client) = client().await;
    let err = client
        .fetch_product(ProductId::new(5000))
        .await
        .expect_err("server error");
    match err {
        BuyError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_wrong_api_key_is_rejected() {
    let shop = MockShop::start().await;
    let config = shopify_buy::Config::new("wrong", "6", "embeds.myshopify.com")
        .expect("config")
        .with_api_url(shop.api_url());
    let client = build_client(config).expect("client");

    let err = client
        .fetch_product(ProductId::new(1001))
        .await
        .expect_err("unauthorized");
    assert!(matches!(err, BuyError::Api { status: 401, .. }), "unexpected error: {err}");
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let shop = MockShop::start().await;
    let config = shop.config().with_timeout(Duration::from_millis(200));
    let client = build_client(config).expect("client");

    let err = client
        .fetch_product(ProductId::new(9999))
        .await
        .expect_err("timeout");
    assert!(matches!(err, BuyError::Timeout), "unexpected error: {err}");
}

#[tokio::test]
async fn test_unreachable_host_is_http_error() {
    // Nothing listens on the discard port.
    let config = shop_config().with_api_url("http://127.0.0.1:9/api/apps/6/".parse().expect("url"));
    let client = build_client(config).expect("client");

    let err = client
        .fetch_product(ProductId::new(1001))
        .await
        .expect_err("connection refused");
    assert!(matches!(err, BuyError::Http(_)), "unexpected error: {err}");
}
