//! Merchant management commands.
//!
//! # Usage
//!
//! ```bash
//! catalog-cli merchant create -n "Test Store" -e owner@example.com -s test-store.myshopify.com
//! catalog-cli merchant list
//! ```

use catalog_api::db::PgCatalogStore;
use catalog_api::services::MerchantService;

use super::{CommandError, connect};

/// Register a merchant and print its ID.
pub async fn create(name: &str, email: &str, store_url: &str) -> Result<(), CommandError> {
    let store = PgCatalogStore::new(connect().await?);

    let merchant = MerchantService::new(&store)
        .create(name, email, store_url)
        .await?;

    tracing::info!(
        "Created merchant {} ({}) with ID {}",
        merchant.name,
        merchant.store_url,
        merchant.id
    );
    Ok(())
}

/// Print every merchant, one per line.
pub async fn list() -> Result<(), CommandError> {
    let store = PgCatalogStore::new(connect().await?);
    let merchants = MerchantService::new(&store).list().await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{:<6} {:<32} {:<40} EMAIL", "ID", "NAME", "STORE URL");
        for merchant in &merchants {
            println!(
                "{:<6} {:<32} {:<40} {}",
                merchant.id.as_i32(),
                merchant.name,
                merchant.store_url,
                merchant.email.as_str()
            );
        }
    }
    tracing::info!("{} merchant(s)", merchants.len());
    Ok(())
}
