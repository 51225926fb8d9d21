//! Domain models returned by the catalog and cart APIs.
//!
//! Catalog models ([`ProductModel`], [`ProductVariantModel`],
//! [`CollectionModel`]) are plain values owned by the caller once fetched.
//! [`CartModel`] is a snapshot of a persisted cart plus a handle to the
//! [`crate::CartStore`] that owns it; its mutating methods go through the
//! store and refresh the snapshot.

pub mod cart;
pub mod collection;
pub mod image;
pub mod option;
pub mod product;
pub mod variant;

pub use cart::{CartAttrs, CartItem, CartModel, CartUpdate, LineItem};
pub use collection::CollectionModel;
pub use image::Image;
pub use option::ProductOption;
pub use product::ProductModel;
pub use variant::{OptionValue, ProductVariantModel};
