//! Business logic services for the catalog.
//!
//! # Services
//!
//! - `importer` - Product import (upsert with variant merge)
//! - `catalog` - Listing, detail, bulk activation and removal
//! - `merchants` - Merchant registration (administrative)

pub mod catalog;
pub mod error;
pub mod importer;
pub mod merchants;

pub use catalog::{BulkUpdate, CatalogService, ListParams, ProductList, Removed};
pub use error::CatalogError;
pub use importer::{ImportResult, ProductImporter};
pub use merchants::MerchantService;
