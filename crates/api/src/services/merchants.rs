//! Merchant registration.
//!
//! Merchants are created by operators through the CLI, never over HTTP.

use catalog_core::{Email, ValidationErrors};
use tracing::instrument;

use super::CatalogError;
use crate::db::CatalogStore;
use crate::models::{Merchant, NewMerchant};

/// Administrative merchant operations.
pub struct MerchantService<'a, S> {
    store: &'a S,
}

impl<'a, S: CatalogStore> MerchantService<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Register a merchant.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for a blank name or store URL or an
    /// invalid email, and `CatalogError::Conflict` if the store URL is taken.
    #[instrument(skip(self, email))]
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        store_url: &str,
    ) -> Result<Merchant, CatalogError> {
        let mut errors = ValidationErrors::new();
        let name = name.trim();
        let store_url = store_url.trim();
        if name.is_empty() {
            errors.add("name", "This field may not be blank.");
        }
        if store_url.is_empty() {
            errors.add("store_url", "This field may not be blank.");
        }
        let email = Email::parse(email)
            .map_err(|e| errors.add("email", e.to_string()))
            .ok();

        let new = match email {
            Some(email) if errors.is_empty() => NewMerchant {
                name: name.to_owned(),
                email,
                store_url: store_url.to_owned(),
            },
            _ => return Err(errors.into()),
        };
        let merchant = self.store.create_merchant(&new).await?;

        tracing::info!(merchant_id = %merchant.id, store_url = %merchant.store_url, "Merchant created");
        Ok(merchant)
    }

    /// All merchants ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the store fails.
    pub async fn list(&self) -> Result<Vec<Merchant>, CatalogError> {
        Ok(self.store.list_merchants().await?)
    }
}
