//! Catalog CLI - database migrations and merchant administration.
//!
//! # Usage
//!
//! ```bash
//! # Apply catalog database migrations
//! catalog-cli migrate
//!
//! # Register a merchant
//! catalog-cli merchant create -n "Test Store" -e owner@example.com -s test-store.myshopify.com
//!
//! # List merchants
//! catalog-cli merchant list
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "catalog-cli")]
#[command(author, version, about = "Catalog service CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Manage merchants
    Merchant {
        #[command(subcommand)]
        action: MerchantAction,
    },
}

#[derive(Subcommand)]
enum MerchantAction {
    /// Register a new merchant
    Create {
        /// Merchant display name
        #[arg(short, long)]
        name: String,

        /// Contact email address
        #[arg(short, long)]
        email: String,

        /// Store URL sent by the platform with every import
        #[arg(short, long)]
        store_url: String,
    },
    /// List all merchants
    List,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Merchant { action } => match action {
            MerchantAction::Create {
                name,
                email,
                store_url,
            } => {
                commands::merchant::create(&name, &email, &store_url).await?;
            }
            MerchantAction::List => commands::merchant::list().await?,
        },
    }
    Ok(())
}
