//! Product catalog queries and status changes.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use catalog_core::{BulkActivation, MerchantId, ProductId, ValidationErrors};

use super::CatalogError;
use crate::config::PageSettings;
use crate::db::CatalogStore;
use crate::models::{ProductDetail, ProductQuery, ProductSummary};

/// Raw query string of the list endpoint.
///
/// Every field is kept as text so malformed values become field errors
/// instead of a generic rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub merchant_id: Option<String>,
    pub search: Option<String>,
    pub active: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// A validated list request.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ListRequest {
    query: ProductQuery,
    page: u64,
    page_size: u64,
}

fn positive(raw: Option<&str>, field: &str, errors: &mut ValidationErrors) -> Option<u64> {
    let raw = raw?.trim();
    match raw.parse::<u64>() {
        Ok(0) => {
            errors.add(field, "Ensure this value is greater than or equal to 1.");
            None
        }
        Ok(n) => Some(n),
        Err(_) => {
            errors.add(field, "A valid integer is required.");
            None
        }
    }
}

impl ListParams {
    fn validate(&self, pages: PageSettings) -> Result<ListRequest, CatalogError> {
        let Some(raw_merchant) = self.merchant_id.as_deref().filter(|s| !s.trim().is_empty()) else {
            return Err(CatalogError::MissingParameter("merchant_id"));
        };

        let mut errors = ValidationErrors::new();
        let merchant_id = raw_merchant.parse::<MerchantId>().map_or_else(
            |_| {
                errors.add("merchant_id", "A valid integer is required.");
                None
            },
            Some,
        );

        let active = match self.active.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Some(s) if s.eq_ignore_ascii_case("false") => Some(false),
            Some(_) => {
                errors.add("active", "Must be a valid boolean.");
                None
            }
        };

        let page = positive(self.page.as_deref(), "page", &mut errors).unwrap_or(1);
        let page_size = positive(self.page_size.as_deref(), "page_size", &mut errors)
            .unwrap_or(pages.default_size)
            .min(pages.max_size);

        let search = self
            .search
            .clone()
            .filter(|s| !s.trim().is_empty());

        let Some(merchant_id) = merchant_id else {
            return Err(errors.into());
        };
        let request = ListRequest {
            query: ProductQuery {
                merchant_id,
                search,
                active,
                offset: (page - 1).saturating_mul(page_size),
                limit: page_size,
            },
            page,
            page_size,
        };
        errors.into_result(request).map_err(CatalogError::from)
    }
}

/// One page of a merchant's products.
#[derive(Debug, Clone, Serialize)]
pub struct ProductList {
    /// Products matching the filters across all pages.
    pub count: u64,
    pub page: u64,
    pub page_size: u64,
    pub results: Vec<ProductSummary>,
}

/// Response of a bulk activation.
#[derive(Debug, Clone, Serialize)]
pub struct BulkUpdate {
    pub message: String,
    pub updated_count: u64,
    pub active: bool,
}

/// Response of a product removal.
#[derive(Debug, Clone, Serialize)]
pub struct Removed {
    pub message: String,
    pub product_id: ProductId,
}

/// Read and status operations over the catalog.
pub struct CatalogService<'a, S> {
    store: &'a S,
    pages: PageSettings,
}

impl<'a, S: CatalogStore> CatalogService<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S, pages: PageSettings) -> Self {
        Self { store, pages }
    }

    /// List a merchant's products, filtered and paginated.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::MissingParameter` without a `merchant_id`,
    /// `CatalogError::Validation` for malformed parameters and
    /// `CatalogError::UnknownMerchant` if the merchant does not exist.
    #[instrument(skip(self))]
    pub async fn list(&self, params: &ListParams) -> Result<ProductList, CatalogError> {
        let request = params.validate(self.pages)?;
        let merchant_id = request.query.merchant_id;

        if self.store.merchant_by_id(merchant_id).await?.is_none() {
            return Err(CatalogError::UnknownMerchant(merchant_id));
        }

        let page = self.store.list_products(&request.query).await?;
        Ok(ProductList {
            count: page.total,
            page: request.page,
            page_size: request.page_size,
            results: page.items,
        })
    }

    /// Get a product with its variants. Inactive products are included.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` if the product does not exist.
    pub async fn get(&self, id: ProductId) -> Result<ProductDetail, CatalogError> {
        self.store
            .product_detail(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))
    }

    /// Activate or deactivate many products at once. Unknown IDs are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the update fails.
    #[instrument(skip(self, bulk), fields(ids = bulk.product_ids.len(), active = bulk.active))]
    pub async fn bulk_set_active(&self, bulk: &BulkActivation) -> Result<BulkUpdate, CatalogError> {
        let updated_count = self.store.set_active(&bulk.product_ids, bulk.active).await?;
        tracing::info!(updated_count, "Bulk activation applied");

        Ok(BulkUpdate {
            message: format!("Successfully updated {updated_count} products"),
            updated_count,
            active: bulk.active,
        })
    }

    /// Soft-delete a product by marking it inactive. Repeating it succeeds.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: ProductId) -> Result<Removed, CatalogError> {
        let product = self
            .store
            .deactivate_product(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?;
        tracing::info!(product_id = %id, "Product deactivated");

        Ok(Removed {
            message: format!("Product \"{}\" has been deactivated", product.title),
            product_id: product.id,
        })
    }
}
