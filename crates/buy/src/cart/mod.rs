//! Cart store.
//!
//! The [`CartStore`] owns the authoritative state of every cart it creates.
//! Each mutation runs load → modify → save under a per-cart lock before it
//! returns, so concurrent mutations of one cart are applied one at a time
//! and a later [`CartStore::fetch_cart`] sees exactly what was returned.
//! Different carts do not contend.

mod file;
mod record;
mod storage;

use std::collections::HashMap;
use std::sync::Arc;

use buy_sdk_core::{CartId, VariantId};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::checkout::CheckoutUrls;
use crate::error::{BuyError, Result};
use crate::models::{CartAttrs, CartItem, CartModel, CartUpdate};

pub use file::FileStorage;
pub use record::CartRecord;
pub use storage::{CartStorage, MemoryStorage, StorageError};

/// Creates, persists and mutates carts.
///
/// Cheaply cloneable via `Arc`; clones share storage and locks.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    storage: Arc<dyn CartStorage>,
    checkout: Arc<CheckoutUrls>,
    locks: Mutex<HashMap<CartId, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("checkout", &self.inner.checkout)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create a store persisting to `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn CartStorage>, checkout: Arc<CheckoutUrls>) -> Self {
        Self {
            inner: Arc::new(CartStoreInner {
                storage,
                checkout,
                locks: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub(crate) fn checkout(&self) -> &CheckoutUrls {
        &self.inner.checkout
    }

    fn model(&self, record: CartRecord) -> CartModel {
        CartModel::new(record, self.clone())
    }

    /// Run `work` while holding the lock for cart `id`.
    ///
    /// Lock entries only live while some caller holds or waits on them, so
    /// the map does not grow with every ID the store has seen.
    async fn with_lock<T, F, Fut>(&self, id: CartId, work: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let lock = {
            let mut locks = self.inner.locks.lock().await;
            Arc::clone(locks.entry(id).or_default())
        };

        let result = {
            let _guard = lock.lock().await;
            work().await
        };

        let mut locks = self.inner.locks.lock().await;
        // One reference in the map, one here: nobody else is waiting.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&id);
        }
        result
    }

    /// Run `apply` against the stored cart under its lock and persist the
    /// result.
    async fn mutate<F>(&self, id: CartId, apply: F) -> Result<CartModel>
    where
        F: FnOnce(&mut CartRecord) -> Result<()> + Send,
    {
        self.with_lock(id, || async move {
            let mut record = self
                .inner
                .storage
                .load(&id)
                .await?
                .ok_or_else(|| cart_not_found(id))?;

            apply(&mut record)?;
            record.touch();
            self.inner.storage.save(&record).await?;

            Ok::<_, BuyError>(self.model(record))
        })
        .await
    }

    #[cfg(test)]
    async fn tracked_locks(&self) -> usize {
        self.inner.locks.lock().await.len()
    }

    /// Create a new cart, optionally seeded with line items, attributes and
    /// a note, and make it the most recent cart.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::Validation` for malformed attributes, or a storage
    /// error if the cart cannot be persisted.
    #[instrument(skip(self, attrs), fields(line_items = attrs.line_items.len()))]
    pub async fn create_cart(&self, attrs: CartAttrs) -> Result<CartModel> {
        attrs.validate()?;

        let mut record = CartRecord::new(CartId::generate());
        record.add(attrs.line_items.into_iter().map(CartItem::into_line_item))?;
        record.attributes = attrs.attributes;
        record.note = attrs.note;

        let id = record.id;
        self.with_lock(id, || async {
            self.inner.storage.save(&record).await?;
            self.inner.storage.set_recent(&id).await?;
            Ok::<_, BuyError>(())
        })
        .await?;

        info!(cart_id = %id, "Cart created");
        Ok(self.model(record))
    }

    /// Load a previously created cart.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::NotFound` if no cart with this ID is stored.
    #[instrument(skip(self), fields(cart_id = %id))]
    pub async fn fetch_cart(&self, id: CartId) -> Result<CartModel> {
        let record = self
            .inner
            .storage
            .load(&id)
            .await?
            .ok_or_else(|| cart_not_found(id))?;
        Ok(self.model(record))
    }

    /// The most recently created cart, or a new empty cart if there is none.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the cart cannot be loaded or created.
    #[instrument(skip(self))]
    pub async fn fetch_recent_cart(&self) -> Result<CartModel> {
        if let Some(id) = self.inner.storage.recent().await? {
            match self.fetch_cart(id).await {
                Ok(cart) => return Ok(cart),
                Err(BuyError::NotFound(_)) => {
                    debug!(cart_id = %id, "Recent cart is gone, creating a new one");
                }
                Err(e) => return Err(e),
            }
        }
        self.create_cart(CartAttrs::default()).await
    }

    /// Apply a [`CartUpdate`] to a cart.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::Validation` for malformed attributes or
    /// `BuyError::NotFound` if the cart does not exist.
    #[instrument(skip(self, update), fields(cart_id = %id))]
    pub async fn update_cart(&self, id: CartId, update: CartUpdate) -> Result<CartModel> {
        update.validate()?;
        self.mutate(id, move |record| {
            if let Some(items) = update.line_items {
                record.clear();
                record.add(items.into_iter().map(CartItem::into_line_item))?;
            }
            if let Some(attributes) = update.attributes {
                record.attributes = attributes;
            }
            if let Some(note) = update.note {
                record.note = note;
            }
            Ok(())
        })
        .await
    }

    /// Add items to a cart, combining quantities for repeated variants.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::NotFound` if the cart does not exist, or
    /// `BuyError::Validation` if a combined quantity would overflow.
    #[instrument(skip(self, item, next_items), fields(cart_id = %id, variant_id = %item.variant_id()))]
    pub async fn add_variants(
        &self,
        id: CartId,
        item: CartItem,
        next_items: Vec<CartItem>,
    ) -> Result<CartModel> {
        self.mutate(id, move |record| {
            record.add(
                std::iter::once(item)
                    .chain(next_items)
                    .map(CartItem::into_line_item),
            )
        })
        .await
    }

    /// Set a line item's quantity; zero removes it.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::NotFound` if the cart or line item does not exist.
    #[instrument(skip(self), fields(cart_id = %id, line_item = %line_item))]
    pub async fn update_line_item(
        &self,
        id: CartId,
        line_item: VariantId,
        quantity: u32,
    ) -> Result<CartModel> {
        self.mutate(id, move |record| record.set_quantity(line_item, quantity))
            .await
    }

    /// Remove a line item.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::NotFound` if the cart or line item does not exist.
    #[instrument(skip(self), fields(cart_id = %id, line_item = %line_item))]
    pub async fn remove_line_item(&self, id: CartId, line_item: VariantId) -> Result<CartModel> {
        self.mutate(id, move |record| record.remove(line_item)).await
    }

    /// Remove all line items from a cart.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::NotFound` if the cart does not exist.
    #[instrument(skip(self), fields(cart_id = %id))]
    pub async fn clear_line_items(&self, id: CartId) -> Result<CartModel> {
        self.mutate(id, |record| {
            record.clear();
            Ok(())
        })
        .await
    }

    /// Delete a cart's persisted state.
    ///
    /// # Errors
    ///
    /// Returns `BuyError::NotFound` if the cart does not exist.
    #[instrument(skip(self), fields(cart_id = %id))]
    pub async fn destroy_cart(&self, id: CartId) -> Result<()> {
        let existed = self
            .with_lock(id, || self.inner.storage.delete(&id))
            .await?;
        if !existed {
            return Err(cart_not_found(id));
        }

        info!("Cart destroyed");
        Ok(())
    }
}

fn cart_not_found(id: CartId) -> BuyError {
    BuyError::NotFound(format!("Cart not found: {id}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;
    use crate::config::Config;

    fn store() -> (CartStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let config = Config::new("abc123", "6", "embeds.myshopify.com").unwrap();
        let store = CartStore::new(storage.clone(), Arc::new(CheckoutUrls::new(&config)));
        (store, storage)
    }

    fn item(variant: u64, quantity: u32) -> CartItem {
        let product = fixtures::sample_product();
        CartItem::new(product.variant(VariantId::new(variant)).unwrap(), quantity).unwrap()
    }

    #[tokio::test]
    async fn test_create_cart_persists_seed_attrs() {
        let (store, storage) = store();
        let cart = store
            .create_cart(
                CartAttrs::default()
                    .with_item(item(101, 1))
                    .with_attribute("source", "buy-button")
                    .with_note("gift wrap"),
            )
            .await
            .unwrap();

        let stored = storage.load(&cart.id()).await.unwrap().unwrap();
        assert_eq!(&stored, cart.record());
        assert_eq!(stored.attributes["source"], "buy-button");
        assert_eq!(storage.recent().await.unwrap(), Some(cart.id()));
    }

    #[tokio::test]
    async fn test_create_cart_rejects_invalid_attrs() {
        let (store, storage) = store();
        let err = store
            .create_cart(CartAttrs::default().with_attribute("", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, BuyError::Validation(_)));
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_fetch_unknown_cart_is_not_found() {
        let (store, _) = store();
        assert!(store.fetch_cart(CartId::generate()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_line_item_lifecycle() {
        let (store, _) = store();
        let mut cart = store.create_cart(CartAttrs::default()).await.unwrap();
        let variant = VariantId::new(101);

        cart.add_variants(item(101, 2), Vec::new()).await.unwrap();
        assert_eq!(cart.line_items().len(), 1);
        assert_eq!(cart.line_items()[0].quantity, 2);

        cart.update_line_item(variant, 5).await.unwrap();
        assert_eq!(cart.line_item(variant).unwrap().quantity, 5);

        cart.remove_line_item(variant).await.unwrap();
        assert!(cart.line_items().is_empty());

        let err = cart.remove_line_item(variant).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_add_variants_merges_and_prices() {
        let (store, _) = store();
        let mut cart = store.create_cart(CartAttrs::default()).await.unwrap();

        cart.add_variants(item(101, 1), vec![item(104, 2), item(101, 2)])
            .await
            .unwrap();

        assert_eq!(cart.line_items().len(), 2);
        assert_eq!(cart.line_item(VariantId::new(101)).unwrap().quantity, 3);
        // 3 x 19.99 + 2 x 24.00
        assert_eq!(cart.subtotal(), "107.97");
        assert_eq!(cart.line_item_count(), 5);
        assert_eq!(
            cart.checkout_url(),
            "https://embeds.myshopify.com/cart/101:3,104:2?api_key=abc123"
        );
    }

    #[tokio::test]
    async fn test_clear_line_items_keeps_cart() {
        let (store, _) = store();
        let mut cart = store
            .create_cart(CartAttrs::default().with_item(item(102, 4)))
            .await
            .unwrap();

        cart.clear_line_items().await.unwrap();
        assert!(cart.line_items().is_empty());
        assert_eq!(cart.subtotal(), "0.00");

        let reloaded = store.fetch_cart(cart.id()).await.unwrap();
        assert!(reloaded.line_items().is_empty());
    }

    #[tokio::test]
    async fn test_update_cart_replaces_fields() {
        let (store, _) = store();
        let mut cart = store
            .create_cart(CartAttrs::default().with_item(item(101, 1)).with_note("old"))
            .await
            .unwrap();

        cart.update(CartUpdate {
            line_items: Some(vec![item(103, 2)]),
            attributes: None,
            note: Some(None),
        })
        .await
        .unwrap();

        assert_eq!(cart.line_items().len(), 1);
        assert_eq!(cart.line_items()[0].variant_id, VariantId::new(103));
        assert_eq!(cart.note(), None);
    }

    #[tokio::test]
    async fn test_fetch_recent_cart_creates_when_missing() {
        let (store, _) = store();
        let first = store.fetch_recent_cart().await.unwrap();
        let again = store.fetch_recent_cart().await.unwrap();
        assert_eq!(first.id(), again.id());

        store.destroy_cart(first.id()).await.unwrap();
        let replacement = store.fetch_recent_cart().await.unwrap();
        assert_ne!(replacement.id(), first.id());
    }

    #[tokio::test]
    async fn test_destroy_unknown_cart_is_not_found() {
        let (store, _) = store();
        assert!(store.destroy_cart(CartId::generate()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_serialized() {
        let (store, _) = store();
        let cart = store.create_cart(CartAttrs::default()).await.unwrap();
        let id = cart.id();

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.add_variants(id, item(101, 1), Vec::new()).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let cart = store.fetch_cart(id).await.unwrap();
        assert_eq!(cart.line_item(VariantId::new(101)).unwrap().quantity, 20);
    }

    #[tokio::test]
    async fn test_locks_are_released_after_use() {
        let (store, _) = store();

        for _ in 0..10 {
            let err = store
                .add_variants(CartId::generate(), item(101, 1), Vec::new())
                .await
                .unwrap_err();
            assert!(err.is_not_found());
        }
        assert_eq!(store.tracked_locks().await, 0);

        let mut cart = store.create_cart(CartAttrs::default()).await.unwrap();
        cart.add_variants(item(101, 1), Vec::new()).await.unwrap();
        cart.clear_line_items().await.unwrap();
        assert_eq!(store.tracked_locks().await, 0);

        store.destroy_cart(cart.id()).await.unwrap();
        assert_eq!(store.tracked_locks().await, 0);
    }

    #[tokio::test]
    async fn test_quantity_overflow_leaves_cart_unchanged() {
        let (store, _) = store();
        let mut cart = store
            .create_cart(CartAttrs::default().with_item(item(101, 1)))
            .await
            .unwrap();

        let err = cart
            .add_variants(item(101, u32::MAX), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BuyError::Validation(_)));

        let stored = store.fetch_cart(cart.id()).await.unwrap();
        assert_eq!(stored.line_item(VariantId::new(101)).unwrap().quantity, 1);
    }
}
