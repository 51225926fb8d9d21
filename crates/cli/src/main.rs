//! Buy CLI - browse a shop's published catalog and drive a persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # Show a product with its options and variants
//! buy product 1001
//!
//! # List products in a collection
//! buy products --collection 77
//!
//! # Start a cart and add the Large/White variant
//! buy cart create --note "gift wrap"
//! buy cart add 1001 --option Size=Large --option Color=White --quantity 2
//!
//! # Print the checkout URL of the most recent cart
//! buy cart checkout
//! ```
//!
//! Configuration comes from `SHOPIFY_BUY_*` environment variables (a `.env`
//! file is honored). Carts are stored under `SHOPIFY_BUY_CART_DIR`, or
//! `--cart-dir`, defaulting to `.buy-carts`. Output is JSON on stdout.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "buy")]
#[command(author, version, about = "Shopify Buy SDK command-line client")]
struct Cli {
    /// Serve the catalog from a JSON seed file instead of the listings API
    #[arg(long, global = true)]
    catalog_file: Option<PathBuf>,

    /// Directory for persisted carts
    #[arg(long, global = true)]
    cart_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one product
    Product {
        /// Product ID
        id: u64,
    },
    /// List products
    Products {
        /// Only these product IDs (comma-separated)
        #[arg(long, value_delimiter = ',')]
        ids: Vec<u64>,

        /// Only products in this collection
        #[arg(long)]
        collection: Option<u64>,

        /// Only the product with this handle
        #[arg(long)]
        handle: Option<String>,

        /// Page number (1-indexed)
        #[arg(long)]
        page: Option<u32>,
    },
    /// Show one collection
    Collection {
        /// Collection ID
        id: u64,
    },
    /// List all collections
    Collections,
    /// Manage the persisted cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Create a new cart and make it the most recent one
    Create {
        /// Cart note
        #[arg(long)]
        note: Option<String>,

        /// Custom attribute as KEY=VALUE (repeatable)
        #[arg(long = "attr", value_parser = parse_pair)]
        attributes: Vec<(String, String)>,
    },
    /// Show a cart
    Show {
        /// Cart ID (default: most recent cart)
        #[arg(long)]
        cart: Option<String>,
    },
    /// Add the variant selected by options to a cart
    Add {
        /// Product ID
        product: u64,

        /// Option selection as NAME=VALUE (repeatable)
        #[arg(short, long = "option", value_parser = parse_pair)]
        options: Vec<(String, String)>,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Cart ID (default: most recent cart)
        #[arg(long)]
        cart: Option<String>,
    },
    /// Set a line item's quantity (0 removes it)
    Update {
        /// Variant ID of the line item
        variant: u64,

        /// New quantity
        quantity: u32,

        /// Cart ID (default: most recent cart)
        #[arg(long)]
        cart: Option<String>,
    },
    /// Remove a line item
    Remove {
        /// Variant ID of the line item
        variant: u64,

        /// Cart ID (default: most recent cart)
        #[arg(long)]
        cart: Option<String>,
    },
    /// Remove all line items
    Clear {
        /// Cart ID (default: most recent cart)
        #[arg(long)]
        cart: Option<String>,
    },
    /// Print the checkout URL
    Checkout {
        /// Cart ID (default: most recent cart)
        #[arg(long)]
        cart: Option<String>,
    },
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected NAME=VALUE, got {raw:?}"))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shopify_buy=info,buy_cli=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let client = commands::connect(cli.catalog_file.as_deref(), cli.cart_dir).await?;

    match cli.command {
        Commands::Product { id } => commands::catalog::product(&client, id).await?,
        Commands::Products {
            ids,
            collection,
            handle,
            page,
        } => commands::catalog::products(&client, ids, collection, handle, page).await?,
        Commands::Collection { id } => commands::catalog::collection(&client, id).await?,
        Commands::Collections => commands::catalog::collections(&client).await?,
        Commands::Cart { action } => match action {
            CartAction::Create { note, attributes } => {
                commands::cart::create(&client, note, attributes).await?;
            }
            CartAction::Show { cart } => commands::cart::show(&client, cart.as_deref()).await?,
            CartAction::Add {
                product,
                options,
                quantity,
                cart,
            } => {
                commands::cart::add(&client, cart.as_deref(), product, &options, quantity).await?;
            }
            CartAction::Update {
                variant,
                quantity,
                cart,
            } => commands::cart::update(&client, cart.as_deref(), variant, quantity).await?,
            CartAction::Remove { variant, cart } => {
                commands::cart::remove(&client, cart.as_deref(), variant).await?;
            }
            CartAction::Clear { cart } => commands::cart::clear(&client, cart.as_deref()).await?,
            CartAction::Checkout { cart } => {
                commands::cart::checkout(&client, cart.as_deref()).await?;
            }
        },
    }
    Ok(())
}
