//! Product and variant domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use catalog_core::{MerchantId, Price, ProductId, VariantId};

/// Product row as shown in list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub external_id: String,
    pub title: String,
    /// Lowest variant price.
    pub base_price: Price,
    pub active: bool,
}

/// A product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    pub id: VariantId,
    pub external_id: String,
    pub title: String,
    pub sku: String,
    pub price: Price,
    /// Compare-at price from the source platform, or the price itself.
    pub retail_price: Price,
    pub inventory_quantity: i32,
    pub active: bool,
}

/// Full product with its variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetail {
    pub id: ProductId,
    pub merchant_id: MerchantId,
    pub merchant_name: String,
    pub external_id: String,
    pub title: String,
    pub description: String,
    pub product_type: String,
    pub active: bool,
    pub base_price: Price,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Variants ordered by ID.
    pub variants: Vec<Variant>,
}

/// Filters and window for listing a merchant's products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub merchant_id: MerchantId,
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
    pub active: Option<bool>,
    pub offset: u64,
    pub limit: u64,
}

/// One page of list results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPage {
    /// Number of products matching the filters, across all pages.
    pub total: u64,
    /// Products in this page, ordered by ID.
    pub items: Vec<ProductSummary>,
}

/// What an import did to the product row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    pub product_id: ProductId,
    /// `true` if the product did not exist before the import.
    pub created: bool,
}
