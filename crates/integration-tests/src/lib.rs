//! Integration tests for the Shopify Buy SDK.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p buy-integration-tests
//! ```
//!
//! No external services are needed: [`MockShop`] serves the publication
//! listings API from an `axum` router bound to an ephemeral local port.
//!
//! # Mock Catalog
//!
//! | ID | Behavior |
//! |----|----------|
//! | product 1001 | "Classic Tee" in Small/Medium/Large x Black/White |
//! | product 1002 | "Enamel Mug", single variant |
//! | product 4290 | 429 with `Retry-After: 7` |
//! | product 5000 | 500 with a plain-text body |
//! | product 9999 | responds after 2 seconds |
//! | collection 77 | "Summer", containing product 1002 |
//!
//! Any other ID is a 404. Requests without the expected `Authorization`
//! header get a 401.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use shopify_buy::Config;
use tokio::task::JoinHandle;
use url::Url;

/// API key the mock shop accepts.
pub const API_KEY: &str = "abc123";
/// App ID the mock shop serves listings for.
pub const APP_ID: &str = "6";
/// Shop domain used for checkout URLs.
pub const DOMAIN: &str = "embeds.myshopify.com";

/// `Basic base64("abc123")`.
const EXPECTED_AUTH: &str = "Basic YWJjMTIz";

/// Listing of product 1001.
#[must_use]
pub fn tee_listing() -> Value {
    let variant = |id: u64, size: &str, color: &str, price: &str, position: u32| {
        json!({
            "id": id,
            "title": format!("{size} / {color}"),
            "price": price,
            "grams": 200,
            "position": position,
            "option_values": [
                {"name": "Size", "value": size},
                {"name": "Color", "value": color}
            ]
        })
    };
    json!({
        "product_id": 1001,
        "title": "Classic Tee",
        "handle": "classic-tee",
        "body_html": "<p>Soft cotton tee.</p>",
        "images": [
            {"id": 501, "src": "https://cdn.shopify.com/s/files/tee-black.png", "position": 1,
             "product_id": 1001, "variant_ids": [101, 105]},
            {"id": 502, "src": "https://cdn.shopify.com/s/files/tee-white.png", "position": 2,
             "product_id": 1001, "variant_ids": [102, 104]}
        ],
        "options": [
            {"name": "Size", "position": 1},
            {"name": "Color", "position": 2}
        ],
        "variants": [
            variant(101, "Small", "Black", "19.99", 1),
            variant(102, "Small", "White", "19.99", 2),
            variant(103, "Medium", "Black", "19.99", 3),
            variant(104, "Large", "White", "24.00", 4),
            variant(105, "Large", "Black", "24.00", 5)
        ]
    })
}

/// Listing of product 1002.
#[must_use]
pub fn mug_listing() -> Value {
    json!({
        "product_id": 1002,
        "title": "Enamel Mug",
        "handle": "enamel-mug",
        "images": [],
        "options": [{"name": "Title", "position": 1, "values": ["Default Title"]}],
        "variants": [{
            "id": 201, "title": "Default Title", "price": "12.50", "position": 1,
            "option_values": [{"name": "Title", "value": "Default Title"}]
        }]
    })
}

/// Listing of collection 77.
#[must_use]
pub fn summer_listing() -> Value {
    json!({
        "collection_id": 77,
        "title": "Summer",
        "handle": "summer",
        "body_html": "<p>Hot weather picks.</p>",
        "image": {"src": "https://cdn.shopify.com/s/files/summer.png"}
    })
}

/// Seed document equivalent to the mock shop's catalog.
#[must_use]
pub fn catalog_seed() -> Value {
    let mut summer = summer_listing();
    summer["product_ids"] = json!([1002]);
    json!({
        "products": [tee_listing(), mug_listing()],
        "collections": [summer]
    })
}

/// Client configuration for the mock shop's domain with no API override.
///
/// # Panics
///
/// Never; the constants are valid.
#[must_use]
pub fn shop_config() -> Config {
    Config::new(API_KEY, APP_ID, DOMAIN).expect("valid test config")
}

#[derive(Clone, Default)]
struct MockState {
    hits: Arc<AtomicUsize>,
}

/// A running mock listings API.
pub struct MockShop {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl MockShop {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = MockState::default();
        let hits = Arc::clone(&state.hits);

        let app = Router::new()
            .route("/api/apps/6/product_listings", get(product_listings))
            .route("/api/apps/6/product_listings/{id}", get(product_listing))
            .route("/api/apps/6/collection_listings", get(collection_listings))
            .route("/api/apps/6/collection_listings/{id}", get(collection_listing))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock shop");
        let addr = listener.local_addr().expect("mock shop address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock shop server");
        });

        Self { addr, hits, handle }
    }

    /// Base URL of the listings API.
    ///
    /// # Panics
    ///
    /// Never; the address is always a valid host.
    #[must_use]
    pub fn api_url(&self) -> Url {
        Url::parse(&format!("http://{}/api/apps/{APP_ID}/", self.addr)).expect("valid mock URL")
    }

    /// Configuration pointing at this server.
    #[must_use]
    pub fn config(&self) -> Config {
        shop_config().with_api_url(self.api_url())
    }

    /// Number of requests served so far.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for MockShop {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(EXPECTED_AUTH)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "invalid api key").into_response()
}

fn ids_param(params: &HashMap<String, String>, key: &str) -> Option<Vec<u64>> {
    params
        .get(key)
        .map(|raw| raw.split(',').filter_map(|id| id.trim().parse().ok()).collect())
}

async fn product_listing(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }
    match id {
        1001 => Json(json!({ "product_listing": tee_listing() })).into_response(),
        1002 => Json(json!({ "product_listing": mug_listing() })).into_response(),
        4290 => (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, "7")],
            "slow down",
        )
            .into_response(),
        5000 => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
        9999 => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({ "product_listing": tee_listing() })).into_response()
        }
        _ => (StatusCode::NOT_FOUND, Json(json!({ "errors": "Not Found" }))).into_response(),
    }
}

async fn product_listings(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }

    let mut listings = vec![tee_listing(), mug_listing()];
    if let Some(ids) = ids_param(&params, "product_ids") {
        listings.retain(|l| l["product_id"].as_u64().is_some_and(|id| ids.contains(&id)));
    }
    if let Some(collection) = params.get("collection_id") {
        if collection == "77" {
            listings.retain(|l| l["product_id"] == 1002);
        } else {
            listings.clear();
        }
    }
    if let Some(handle) = params.get("handle") {
        listings.retain(|l| l["handle"] == handle.as_str());
    }
    if params.get("page").is_some_and(|p| p != "1") {
        listings.clear();
    }

    Json(json!({ "product_listings": listings })).into_response()
}

async fn collection_listing(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }
    if id == 77 {
        Json(json!({ "collection_listing": summer_listing() })).into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "errors": "Not Found" }))).into_response()
    }
}

async fn collection_listings(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut listings = vec![summer_listing()];
    if let Some(ids) = ids_param(&params, "collection_ids") {
        listings.retain(|l| l["collection_id"].as_u64().is_some_and(|id| ids.contains(&id)));
    }
    if params.get("page").is_some_and(|p| p != "1") {
        listings.clear();
    }
    Json(json!({ "collection_listings": listings })).into_response()
}
