//! Product import from external commerce platforms.

use catalog_core::ProductImport;
use tracing::instrument;

use super::CatalogError;
use crate::db::{CatalogStore, RepositoryError};
use crate::models::ProductDetail;

/// Outcome of a successful import.
#[derive(Debug, Clone)]
pub struct ImportResult {
    /// The product as stored after the import.
    pub product: ProductDetail,
    /// `true` if the product was new (201), `false` if it was updated (200).
    pub created: bool,
}

/// Imports validated product payloads into a merchant's catalog.
pub struct ProductImporter<'a, S> {
    store: &'a S,
}

impl<'a, S: CatalogStore> ProductImporter<'a, S> {
    /// Create a new importer over a store.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Upsert the product and merge its variants.
    ///
    /// The merchant is resolved before anything is written.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownStoreUrl` if no merchant owns the store URL.
    /// Returns `CatalogError::Repository` if the write fails; nothing is kept.
    #[instrument(skip(self, import), fields(store_url = %import.store_url, external_id = %import.product.external_id))]
    pub async fn import(&self, import: &ProductImport) -> Result<ImportResult, CatalogError> {
        let merchant = self
            .store
            .merchant_by_store_url(&import.store_url)
            .await?
            .ok_or_else(|| CatalogError::UnknownStoreUrl(import.store_url.clone()))?;

        let outcome = match self.store.import_product(merchant.id, &import.product).await {
            Ok(outcome) => outcome,
            // Merchant removed between lookup and write
            Err(RepositoryError::NotFound) => {
                return Err(CatalogError::UnknownStoreUrl(import.store_url.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let product = self
            .store
            .product_detail(outcome.product_id)
            .await?
            .ok_or(CatalogError::ProductNotFound(outcome.product_id))?;

        tracing::info!(
            product_id = %outcome.product_id,
            merchant_id = %merchant.id,
            created = outcome.created,
            variants = import.product.variants.len(),
            "Product imported"
        );

        Ok(ImportResult {
            product,
            created: outcome.created,
        })
    }
}
