//! CLI command implementations.

pub mod cart;
pub mod catalog;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use shopify_buy::{Config, FileStorage, MemoryCatalog, ShopClient};
use tracing::info;

const DEFAULT_CART_DIR: &str = ".buy-carts";

/// Build a client from the environment.
///
/// Carts always go to disk so they survive between invocations: the
/// `--cart-dir` flag wins over `SHOPIFY_BUY_CART_DIR`, which wins over
/// `.buy-carts`.
///
/// # Errors
///
/// Returns an error if configuration is missing or the seed file cannot be
/// loaded.
pub async fn connect(
    catalog_file: Option<&Path>,
    cart_dir: Option<PathBuf>,
) -> Result<ShopClient, Box<dyn std::error::Error>> {
    let mut config = Config::from_env()?;
    if let Some(dir) = cart_dir {
        config = config.with_cart_dir(dir);
    } else if config.cart_dir().is_none() {
        config = config.with_cart_dir(DEFAULT_CART_DIR);
    }

    let Some(path) = catalog_file else {
        return Ok(ShopClient::new(config)?);
    };

    info!(path = %path.display(), "Loading catalog from file");
    let catalog = MemoryCatalog::from_file(path).await?;
    let storage = Arc::new(FileStorage::new(
        config.cart_dir().cloned().unwrap_or_else(|| DEFAULT_CART_DIR.into()),
    ));
    Ok(ShopClient::with_parts(config, Arc::new(catalog), storage))
}

/// Write a JSON document to stdout.
#[allow(clippy::print_stdout)]
pub fn emit(value: &serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
