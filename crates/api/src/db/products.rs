//! Product and variant repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use catalog_core::{MerchantId, Price, ProductId, ProductInput, VariantId};

use super::RepositoryError;
use crate::models::{
    ImportOutcome, ProductDetail, ProductPage, ProductQuery, ProductSummary, Variant,
};

// =============================================================================
// Internal Row Types
// =============================================================================

fn price(amount: Decimal, column: &str) -> Result<Price, RepositoryError> {
    Price::new(amount)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {column} in database: {e}")))
}

#[derive(Debug, sqlx::FromRow)]
struct ProductSummaryRow {
    id: i32,
    external_id: String,
    title: String,
    base_price: Decimal,
    active: bool,
}

impl TryFrom<ProductSummaryRow> for ProductSummary {
    type Error = RepositoryError;

    fn try_from(row: ProductSummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProductId::new(row.id),
            external_id: row.external_id,
            title: row.title,
            base_price: price(row.base_price, "base_price")?,
            active: row.active,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductDetailRow {
    id: i32,
    merchant_id: i32,
    merchant_name: String,
    external_id: String,
    title: String,
    description: String,
    product_type: String,
    active: bool,
    base_price: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct VariantRow {
    id: i32,
    external_id: String,
    title: String,
    sku: String,
    price: Decimal,
    retail_price: Decimal,
    inventory_quantity: i32,
    active: bool,
}

impl TryFrom<VariantRow> for Variant {
    type Error = RepositoryError;

    fn try_from(row: VariantRow) -> Result<Self, Self::Error> {
        if row.inventory_quantity < 0 {
            return Err(RepositoryError::DataCorruption(format!(
                "negative inventory for variant {}",
                row.id
            )));
        }

        Ok(Self {
            id: VariantId::new(row.id),
            external_id: row.external_id,
            title: row.title,
            sku: row.sku,
            price: price(row.price, "price")?,
            retail_price: price(row.retail_price, "retail_price")?,
            inventory_quantity: row.inventory_quantity,
            active: row.active,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UpsertRow {
    id: i32,
    created: bool,
}

// =============================================================================
// Query Helpers
// =============================================================================

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Append the `WHERE` clause shared by the count and page queries.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ProductQuery) {
    builder
        .push(" WHERE merchant_id = ")
        .push_bind(query.merchant_id.as_i32());

    if let Some(active) = query.active {
        builder.push(" AND active = ").push_bind(active);
    }

    if let Some(search) = &query.search {
        let pattern = format!("%{}%", escape_like(search));
        builder
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product and variant database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upsert a product with its variants in a single transaction.
    ///
    /// Conflicts on `(merchant_id, external_id)` and `(product_id,
    /// external_id)` are resolved by the database, so concurrent imports of
    /// the same product converge on one row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails. Nothing is
    /// written in that case.
    pub async fn import(
        &self,
        merchant_id: MerchantId,
        product: &ProductInput,
    ) -> Result<ImportOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let upserted = sqlx::query_as::<_, UpsertRow>(
            r"
            INSERT INTO catalog.product AS p
                (merchant_id, external_id, title, description, product_type)
            VALUES ($1, $2, $3, COALESCE($4, ''), COALESCE($5, ''))
            ON CONFLICT (merchant_id, external_id) DO UPDATE
            SET title = EXCLUDED.title,
                description = COALESCE($4, p.description),
                product_type = COALESCE($5, p.product_type),
                updated_at = NOW()
            RETURNING id, (xmax = 0) AS created
            ",
        )
        .bind(merchant_id.as_i32())
        .bind(&product.external_id)
        .bind(&product.title)
        .bind(product.description.as_deref())
        .bind(product.product_type.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        for variant in &product.variants {
            sqlx::query(
                r"
                INSERT INTO catalog.variant
                    (product_id, external_id, title, sku, price, retail_price, inventory_quantity)
                VALUES ($1, $2, $3, COALESCE($4, ''), $5, $6, $7)
                ON CONFLICT (product_id, external_id) DO UPDATE
                SET price = EXCLUDED.price,
                    retail_price = EXCLUDED.retail_price,
                    inventory_quantity = EXCLUDED.inventory_quantity,
                    updated_at = NOW()
                ",
            )
            .bind(upserted.id)
            .bind(&variant.external_id)
            .bind(&variant.title)
            .bind(variant.sku.as_deref())
            .bind(variant.price.amount())
            .bind(variant.retail_price().amount())
            .bind(variant.inventory_quantity)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r"
            UPDATE catalog.product
            SET base_price = COALESCE(
                (SELECT MIN(price) FROM catalog.variant WHERE product_id = $1),
                0
            )
            WHERE id = $1
            ",
        )
        .bind(upserted.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ImportOutcome {
            product_id: ProductId::new(upserted.id),
            created: upserted.created,
        })
    }

    /// Count and fetch one page of a merchant's products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list(&self, query: &ProductQuery) -> Result<ProductPage, RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM catalog.product");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        let mut page = QueryBuilder::<Postgres>::new(
            "SELECT id, external_id, title, base_price, active FROM catalog.product",
        );
        push_filters(&mut page, query);
        page.push(" ORDER BY id LIMIT ")
            .push_bind(to_i64(query.limit))
            .push(" OFFSET ")
            .push_bind(to_i64(query.offset));

        let rows: Vec<ProductSummaryRow> = page.build_query_as().fetch_all(self.pool).await?;
        let items = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProductPage {
            total: u64::try_from(total).unwrap_or_default(),
            items,
        })
    }

    /// Get a product with its merchant name and variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_detail(&self, id: ProductId) -> Result<Option<ProductDetail>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, ProductDetailRow>(
            r"
            SELECT p.id, p.merchant_id, m.name AS merchant_name, p.external_id,
                   p.title, p.description, p.product_type, p.active, p.base_price,
                   p.created_at, p.updated_at
            FROM catalog.product p
            JOIN catalog.merchant m ON m.id = p.merchant_id
            WHERE p.id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let variants = sqlx::query_as::<_, VariantRow>(
            r"
            SELECT id, external_id, title, sku, price, retail_price,
                   inventory_quantity, active
            FROM catalog.variant
            WHERE product_id = $1
            ORDER BY id
            ",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(ProductDetail {
            id: ProductId::new(row.id),
            merchant_id: MerchantId::new(row.merchant_id),
            merchant_name: row.merchant_name,
            external_id: row.external_id,
            title: row.title,
            description: row.description,
            product_type: row.product_type,
            active: row.active,
            base_price: price(row.base_price, "base_price")?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            variants,
        }))
    }

    /// Set `active` on the given products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_active(&self, ids: &[ProductId], active: bool) -> Result<u64, RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();

        let result = sqlx::query(
            r"
            UPDATE catalog.product
            SET active = $1, updated_at = NOW()
            WHERE id = ANY($2)
            ",
        )
        .bind(active)
        .bind(ids)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Mark a product inactive.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn deactivate(&self, id: ProductId) -> Result<Option<ProductSummary>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductSummaryRow>(
            r"
            UPDATE catalog.product
            SET active = FALSE, updated_at = NOW()
            WHERE id = $1
            RETURNING id, external_id, title, base_price, active
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("shirt"), "shirt");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_to_i64_saturates() {
        assert_eq!(to_i64(20), 20);
        assert_eq!(to_i64(u64::MAX), i64::MAX);
    }
}
