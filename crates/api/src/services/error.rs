//! Catalog service error types.

use thiserror::Error;

use catalog_core::{MerchantId, ProductId, ValidationErrors};

use crate::db::RepositoryError;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Request body or query failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// A required query parameter was not sent.
    #[error("{0} query parameter is required")]
    MissingParameter(&'static str),

    /// No merchant is registered under the store URL.
    #[error("Merchant with store_url {0} not found")]
    UnknownStoreUrl(String),

    /// No merchant has the given ID.
    #[error("Merchant with id {0} does not exist")]
    UnknownMerchant(MerchantId),

    /// No product has the given ID.
    #[error("Product not found")]
    ProductNotFound(ProductId),

    /// A uniqueness rule was violated.
    #[error("{0}")]
    Conflict(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CatalogError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(message) => Self::Conflict(message),
            other => Self::Repository(other),
        }
    }
}
