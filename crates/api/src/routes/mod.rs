//! HTTP routes for the catalog API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (pings the store)
//!
//! # Products
//! POST /api/products/import/            - Import a product with its variants
//! GET  /api/products/?merchant_id=...   - List/search a merchant's products
//! GET  /api/products/{id}/              - Product detail
//! POST /api/products/bulk-activate/     - Bulk activate/deactivate
//! POST /api/products/{id}/remove/       - Soft delete
//! ```
//!
//! Every API path is also served without the trailing slash.

pub mod health;
pub mod products;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::routing::{MethodRouter, get, post};
use axum::{Router, middleware};
use tower::ServiceBuilder;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::db::CatalogStore;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Register a route under `path` and `path/`.
fn route_both<S: CatalogStore>(
    router: Router<AppState<S>>,
    path: &str,
    method_router: MethodRouter<AppState<S>>,
) -> Router<AppState<S>> {
    router
        .route(path, method_router.clone())
        .route(&format!("{path}/"), method_router)
}

/// Product API routes.
pub fn product_routes<S: CatalogStore>() -> Router<AppState<S>> {
    let router = Router::new();
    let router = route_both(router, "/api/products", get(products::list::<S>));
    let router = route_both(router, "/api/products/import", post(products::import::<S>));
    let router = route_both(
        router,
        "/api/products/bulk-activate",
        post(products::bulk_activate::<S>),
    );
    let router = route_both(router, "/api/products/{id}", get(products::detail::<S>));
    route_both(router, "/api/products/{id}/remove", post(products::remove::<S>))
}

/// Build the full application with tracing and request IDs.
pub fn app<S: CatalogStore>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness::<S>))
        .merge(product_routes())
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &Request<Body>| {
                            tracing::info_span!(
                                "http_request",
                                method = %request.method(),
                                uri = %request.uri(),
                                request_id = tracing::field::Empty,
                                status = tracing::field::Empty,
                                latency_ms = tracing::field::Empty,
                            )
                        })
                        .on_response(
                            |response: &Response<Body>,
                             latency: std::time::Duration,
                             span: &Span| {
                                span.record("status", response.status().as_u16());
                                span.record(
                                    "latency_ms",
                                    u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                                );
                                DefaultOnResponse::default().on_response(response, latency, span);
                            },
                        ),
                )
                .layer(middleware::from_fn(request_id_middleware)),
        )
        .with_state(state)
}
