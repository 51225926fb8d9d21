//! Buy SDK Core - Shared types library.
//!
//! This crate provides the value types shared by the Buy SDK components:
//! - `shopify-buy` - Catalog client, option resolver and cart store
//! - `buy-cli` - Command-line front end over the SDK
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! storage. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and decimal prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
