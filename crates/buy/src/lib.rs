//! Shopify Buy SDK.
//!
//! Retrieves products and collections from a shop's published listings,
//! resolves option selections to purchasable variants, and keeps a cart
//! that is persisted locally on every change and can produce a checkout URL.
//!
//! # Architecture
//!
//! - [`catalog`] - Listings API client (`reqwest` + `moka` cache) and an
//!   in-memory catalog, both behind the [`Catalog`] trait
//! - [`models`] - Products, variants, options, images, collections, carts
//! - [`cart`] - [`CartStore`] and the [`CartStorage`] backends it persists to
//! - [`client`] - [`ShopClient`], the configured entry point
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_buy::{CartAttrs, CartItem, Config, ProductId, build_client};
//!
//! let client = build_client(Config::from_env()?)?;
//!
//! let mut product = client.fetch_product(ProductId::new(12345)).await?;
//! product.select("Size", "Large")?;
//!
//! let variant = product.selected_variant().ok_or("sold out")?;
//! let mut cart = client.create_cart(CartAttrs::default()).await?;
//! cart.add_variants(CartItem::new(variant, 2)?, Vec::new()).await?;
//!
//! println!("{}", cart.checkout_url());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use buy_sdk_core::{CartId, CollectionId, ImageId, Price, ProductId, VariantId};
pub use cart::{CartRecord, CartStorage, CartStore, FileStorage, MemoryStorage, StorageError};
pub use catalog::{Catalog, CollectionQuery, ListingsClient, MemoryCatalog, ProductQuery};
pub use checkout::CheckoutUrls;
pub use client::{ShopClient, build_client};
pub use config::{Config, ConfigError};
pub use error::{BuyError, Result};
pub use models::{
    CartAttrs, CartItem, CartModel, CartUpdate, CollectionModel, Image, LineItem, OptionValue,
    ProductModel, ProductOption, ProductVariantModel,
};
