//! Merchant repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use catalog_core::{Email, MerchantId};

use super::RepositoryError;
use crate::models::{Merchant, NewMerchant};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` merchant queries.
#[derive(Debug, sqlx::FromRow)]
struct MerchantRow {
    id: i32,
    name: String,
    email: String,
    store_url: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MerchantRow> for Merchant {
    type Error = RepositoryError;

    fn try_from(row: MerchantRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: MerchantId::new(row.id),
            name: row.name,
            email,
            store_url: row.store_url,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for merchant database operations.
pub struct MerchantRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MerchantRepository<'a> {
    /// Create a new merchant repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all merchants, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<Merchant>, RepositoryError> {
        let rows = sqlx::query_as::<_, MerchantRow>(
            r"
            SELECT id, name, email, store_url, created_at
            FROM catalog.merchant
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a merchant by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: MerchantId) -> Result<Option<Merchant>, RepositoryError> {
        let row = sqlx::query_as::<_, MerchantRow>(
            r"
            SELECT id, name, email, store_url, created_at
            FROM catalog.merchant
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a merchant by its store URL (exact match).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_store_url(&self, store_url: &str) -> Result<Option<Merchant>, RepositoryError> {
        let row = sqlx::query_as::<_, MerchantRow>(
            r"
            SELECT id, name, email, store_url, created_at
            FROM catalog.merchant
            WHERE store_url = $1
            ",
        )
        .bind(store_url)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Register a new merchant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the store URL already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, merchant: &NewMerchant) -> Result<Merchant, RepositoryError> {
        let row = sqlx::query_as::<_, MerchantRow>(
            r"
            INSERT INTO catalog.merchant (name, email, store_url)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, store_url, created_at
            ",
        )
        .bind(&merchant.name)
        .bind(merchant.email.as_str())
        .bind(&merchant.store_url)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("store URL already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }
}
