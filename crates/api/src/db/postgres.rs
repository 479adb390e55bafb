//! `PostgreSQL`-backed [`CatalogStore`].

use sqlx::PgPool;

use catalog_core::{MerchantId, ProductId, ProductInput};

use super::{CatalogStore, MerchantRepository, ProductRepository, RepositoryError};
use crate::models::{
    ImportOutcome, Merchant, NewMerchant, ProductDetail, ProductPage, ProductQuery, ProductSummary,
};

/// Catalog store over a `PostgreSQL` connection pool.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    const fn merchants(&self) -> MerchantRepository<'_> {
        MerchantRepository::new(&self.pool)
    }

    const fn products(&self) -> ProductRepository<'_> {
        ProductRepository::new(&self.pool)
    }
}

impl CatalogStore for PgCatalogStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_merchant(&self, merchant: &NewMerchant) -> Result<Merchant, RepositoryError> {
        self.merchants().create(merchant).await
    }

    async fn list_merchants(&self) -> Result<Vec<Merchant>, RepositoryError> {
        self.merchants().list_all().await
    }

    async fn merchant_by_id(&self, id: MerchantId) -> Result<Option<Merchant>, RepositoryError> {
        self.merchants().get_by_id(id).await
    }

    async fn merchant_by_store_url(
        &self,
        store_url: &str,
    ) -> Result<Option<Merchant>, RepositoryError> {
        self.merchants().get_by_store_url(store_url).await
    }

    async fn import_product(
        &self,
        merchant_id: MerchantId,
        product: &ProductInput,
    ) -> Result<ImportOutcome, RepositoryError> {
        self.products().import(merchant_id, product).await
    }

    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, RepositoryError> {
        self.products().list(query).await
    }

    async fn product_detail(&self, id: ProductId) -> Result<Option<ProductDetail>, RepositoryError> {
        self.products().get_detail(id).await
    }

    async fn set_active(&self, ids: &[ProductId], active: bool) -> Result<u64, RepositoryError> {
        self.products().set_active(ids, active).await
    }

    async fn deactivate_product(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductSummary>, RepositoryError> {
        self.products().deactivate(id).await
    }
}
