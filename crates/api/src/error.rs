//! Unified error handling for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::CatalogError;

/// Application-level error type for HTTP handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Catalog operation failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Resource not found (e.g. a malformed path ID).
    #[error("{0}")]
    NotFound(String),

    /// Bad request from client (e.g. malformed JSON).
    #[error("{0}")]
    BadRequest(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        Self::Catalog(err.into())
    }
}

impl From<catalog_core::ValidationErrors> for AppError {
    fn from(errors: catalog_core::ValidationErrors) -> Self {
        Self::Catalog(errors.into())
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(err) => match err {
                CatalogError::Validation(_) | CatalogError::MissingParameter(_) => {
                    StatusCode::BAD_REQUEST
                }
                CatalogError::UnknownStoreUrl(_)
                | CatalogError::UnknownMerchant(_)
                | CatalogError::ProductNotFound(_) => StatusCode::NOT_FOUND,
                CatalogError::Conflict(_) => StatusCode::CONFLICT,
                CatalogError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Catalog request error"
            );
        }

        let body = match &self {
            // Don't expose internal error details to clients
            _ if status.is_server_error() => json!({"error": "Internal server error"}),
            Self::Catalog(CatalogError::Validation(errors)) => json!({
                "error": "Invalid input.",
                "fields": errors,
            }),
            _ => json!({"error": self.to_string()}),
        };

        (status, Json(body)).into_response()
    }
}
