//! Catalog API library.
//!
//! Product import and catalog query service for multi-merchant commerce
//! backends. External platforms push products through the import endpoint;
//! merchants query, filter and (de)activate their catalog over JSON.
//!
//! The binary in `main.rs` wires configuration, tracing and Sentry around
//! [`routes::app`]; everything else lives here so it can be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
