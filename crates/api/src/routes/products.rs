//! Product API handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use serde_json::Value;

use catalog_core::{BulkActivation, ProductId, ProductImport};

use crate::db::CatalogStore;
use crate::error::AppError;
use crate::middleware::RequestId;
use crate::models::ProductDetail;
use crate::services::{
    BulkUpdate, CatalogService, ListParams, ProductImporter, ProductList, Removed,
};
use crate::state::AppState;

fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

fn product_id(raw: &str) -> Result<ProductId, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound("Product not found".to_string()))
}

fn catalog<S: CatalogStore>(state: &AppState<S>) -> CatalogService<'_, S> {
    CatalogService::new(state.store(), state.config().pages)
}

/// Import a product from an external platform.
///
/// Answers 201 when the product is new and 200 when it was updated. The
/// request ID is logged so a sync run upstream can be matched to the rows
/// it wrote.
pub async fn import<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductDetail>), AppError> {
    let import = ProductImport::from_json(&json_body(payload)?)?;
    let result = ProductImporter::new(state.store()).import(&import).await?;
    tracing::info!(
        request_id = %request_id,
        product_id = %result.product.id,
        external_id = %result.product.external_id,
        created = result.created,
        "Import request handled"
    );

    let status = if result.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(result.product)))
}

/// List a merchant's products.
pub async fn list<S: CatalogStore>(
    State(state): State<AppState<S>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ProductList>, AppError> {
    let Query(params) = params.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    Ok(Json(catalog(&state).list(&params).await?))
}

/// Get one product with its variants.
pub async fn detail<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<ProductDetail>, AppError> {
    let id = product_id(&id)?;
    Ok(Json(catalog(&state).get(id).await?))
}

/// Activate or deactivate many products.
pub async fn bulk_activate<S: CatalogStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BulkUpdate>, AppError> {
    let bulk = BulkActivation::from_json(&json_body(payload)?)?;
    Ok(Json(catalog(&state).bulk_set_active(&bulk).await?))
}

/// Soft-delete a product.
pub async fn remove<S: CatalogStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Removed>, AppError> {
    let id = product_id(&id)?;
    Ok(Json(catalog(&state).remove(id).await?))
}
