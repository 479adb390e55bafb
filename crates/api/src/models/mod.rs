//! Domain models for the catalog.
//!
//! These are validated domain objects returned by the storage layer and
//! serialized directly as API responses.

pub mod merchant;
pub mod product;

pub use merchant::{Merchant, NewMerchant};
pub use product::{
    ImportOutcome, ProductDetail, ProductPage, ProductQuery, ProductSummary, Variant,
};
