//! Integration tests for the catalog service.
//!
//! Requests go through the full router (request IDs, tracing, error
//! rendering) with [`tower::ServiceExt::oneshot`]. Most suites run on the
//! in-memory store, so no database or running server is needed.
//!
//! `tests/postgres.rs` drives the same router over [`PgCatalogStore`] and is
//! ignored unless asked for, since it needs a live database.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p catalog-integration-tests
//! CATALOG_DATABASE_URL=postgres://localhost/catalog_test \
//!     cargo test -p catalog-integration-tests --test postgres -- --ignored
//! ```
//!
//! [`PgCatalogStore`]: catalog_api::db::PgCatalogStore

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use catalog_api::config::ApiConfig;
use catalog_api::db::{CatalogStore, MemoryCatalogStore};
use catalog_api::routes;
use catalog_api::services::MerchantService;
use catalog_api::state::AppState;
use catalog_core::MerchantId;

/// Store URL of the merchant every [`TestApp`] starts with.
pub const STORE_URL: &str = "test-store.myshopify.com";

/// Response captured by [`TestApp`].
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// JSON body, or `Value::String` for non-JSON bodies.
    pub body: Value,
}

/// A catalog app over a store with one merchant already registered.
pub struct TestApp<S: CatalogStore = MemoryCatalogStore> {
    router: Router,
    state: AppState<S>,
    /// ID of the merchant the app was started with.
    pub merchant_id: MerchantId,
}

impl TestApp<MemoryCatalogStore> {
    /// Fresh in-memory store with a merchant under [`STORE_URL`].
    pub async fn new() -> Self {
        Self::with_store(MemoryCatalogStore::new(), STORE_URL).await
    }
}

impl<S: CatalogStore> TestApp<S> {
    /// Wrap an existing store, registering a merchant under `store_url`.
    pub async fn with_store(store: S, store_url: &str) -> Self {
        let state = AppState::new(ApiConfig::default(), store);
        let router = routes::app(state.clone());
        let mut app = Self {
            router,
            state,
            merchant_id: MerchantId::new(0),
        };
        app.merchant_id = app.add_merchant("Test Store", store_url).await;
        app
    }

    /// The store behind the router.
    pub fn store(&self) -> &S {
        self.state.store()
    }

    /// Register another merchant.
    pub async fn add_merchant(&self, name: &str, store_url: &str) -> MerchantId {
        MerchantService::new(self.state.store())
            .create(name, "owner@example.com", store_url)
            .await
            .expect("merchant should be created")
            .id
    }

    /// Send a request with an optional raw body.
    pub async fn send(&self, method: Method, uri: &str, body: Option<String>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.map_or_else(Body::empty, Body::from))
            .expect("request should build");
        self.request(request).await
    }

    /// Send a fully built request.
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: &Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body.to_string())).await
    }

    /// Import a product and return the response.
    pub async fn import(&self, payload: &Value) -> TestResponse {
        self.post("/api/products/import/", payload).await
    }

    /// Import a product that must succeed, returning its ID.
    pub async fn import_ok(&self, payload: &Value) -> i64 {
        let response = self.import(payload).await;
        assert!(
            response.status.is_success(),
            "import failed: {} {}",
            response.status,
            response.body
        );
        response.body["id"].as_i64().expect("product id")
    }
}

/// Build an import payload for the default merchant.
#[must_use]
pub fn product_payload(external_id: i64, title: &str, variants: &Value) -> Value {
    json!({
        "store_url": STORE_URL,
        "product": {
            "id": external_id,
            "title": title,
            "description": format!("Description of {title}"),
            "product_type": "Apparel",
            "variants": variants,
        }
    })
}

/// Build one variant for an import payload.
#[must_use]
pub fn variant(external_id: i64, price: &str, inventory: i64) -> Value {
    json!({
        "id": external_id,
        "title": format!("Variant {external_id}"),
        "sku": format!("SKU-{external_id}"),
        "price": price,
        "inventory_quantity": inventory,
    })
}
