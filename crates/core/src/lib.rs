//! Catalog Core - Shared types library.
//!
//! This crate provides the types shared by every catalog component:
//! - `api` - JSON catalog service (product import, listing, activation)
//! - `cli` - Command-line tools for migrations and merchant management
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. Incoming JSON payloads are validated here so that every
//! offending field is reported in a single pass before anything touches storage.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and emails
//! - [`payload`] - Validation of import and bulk-activation request bodies
//! - [`validation`] - Field-level validation error collection

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod payload;
pub mod types;
pub mod validation;

pub use payload::{BulkActivation, ProductImport, ProductInput, VariantInput};
pub use types::*;
pub use validation::ValidationErrors;
