//! Catalog storage.
//!
//! # Database: `catalog` schema
//!
//! ## Tables
//!
//! - `merchant` - Tenants, keyed by their unique store URL
//! - `product` - Products, unique per `(merchant_id, external_id)`
//! - `variant` - Variants, unique per `(product_id, external_id)`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p catalog-cli -- migrate
//! ```
//!
//! Handlers and services only see the [`CatalogStore`] trait. The `PostgreSQL`
//! implementation lives in [`postgres`]; [`memory`] keeps everything in
//! process for tests and local runs without a database.

pub mod memory;
pub mod merchants;
pub mod postgres;
pub mod products;

use std::future::Future;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use catalog_core::{MerchantId, ProductId, ProductInput};

pub use memory::MemoryCatalogStore;
pub use merchants::MerchantRepository;
pub use postgres::PgCatalogStore;
pub use products::ProductRepository;

use crate::models::{
    ImportOutcome, Merchant, NewMerchant, ProductDetail, ProductPage, ProductQuery, ProductSummary,
};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate store URL).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persistence operations the catalog needs.
///
/// Every write is atomic: an import either lands completely (product,
/// variants and recomputed base price) or not at all, and two concurrent
/// imports of the same product never create duplicate rows.
pub trait CatalogStore: Send + Sync + 'static {
    /// Check that the backing store is reachable.
    fn ping(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Register a merchant.
    ///
    /// Returns `RepositoryError::Conflict` if the store URL is taken.
    fn create_merchant(
        &self,
        merchant: &NewMerchant,
    ) -> impl Future<Output = Result<Merchant, RepositoryError>> + Send;

    /// All merchants ordered by ID.
    fn list_merchants(&self) -> impl Future<Output = Result<Vec<Merchant>, RepositoryError>> + Send;

    fn merchant_by_id(
        &self,
        id: MerchantId,
    ) -> impl Future<Output = Result<Option<Merchant>, RepositoryError>> + Send;

    fn merchant_by_store_url(
        &self,
        store_url: &str,
    ) -> impl Future<Output = Result<Option<Merchant>, RepositoryError>> + Send;

    /// Upsert a product and merge its variants.
    ///
    /// New products start active. Existing products keep their `active`
    /// flag, and a `None` description or product type keeps the stored
    /// value. Variants missing from the input are left untouched.
    fn import_product(
        &self,
        merchant_id: MerchantId,
        product: &ProductInput,
    ) -> impl Future<Output = Result<ImportOutcome, RepositoryError>> + Send;

    /// One page of a merchant's products, ordered by ID.
    fn list_products(
        &self,
        query: &ProductQuery,
    ) -> impl Future<Output = Result<ProductPage, RepositoryError>> + Send;

    fn product_detail(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<ProductDetail>, RepositoryError>> + Send;

    /// Set `active` on every listed product that exists.
    ///
    /// Returns the number of products matched; unknown IDs are skipped.
    fn set_active(
        &self,
        ids: &[ProductId],
        active: bool,
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;

    /// Mark one product inactive, returning it, or `None` if it does not exist.
    fn deactivate_product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<ProductSummary>, RepositoryError>> + Send;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
