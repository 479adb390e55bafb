//! Merchant domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use catalog_core::{Email, MerchantId};

/// A merchant (tenant) owning a product catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Merchant {
    /// Unique merchant ID.
    pub id: MerchantId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: Email,
    /// Store URL, the key external platforms send with imports.
    pub store_url: String,
    /// When the merchant was registered.
    pub created_at: DateTime<Utc>,
}

/// Input for registering a merchant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMerchant {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: Email,
    /// Store URL (unique).
    pub store_url: String,
}
