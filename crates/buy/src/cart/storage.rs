//! Cart persistence backends.

use std::collections::HashMap;

use async_trait::async_trait;
use buy_sdk_core::CartId;
use thiserror::Error;
use tokio::sync::RwLock;

use super::CartRecord;

/// Errors from a [`CartStorage`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing store failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored cart could not be decoded.
    #[error("Corrupt cart record {id}: {source}")]
    Corrupt {
        /// ID (or file name) of the unreadable cart.
        id: String,
        /// Decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// A cart could not be encoded.
    #[error("Failed to encode cart: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Durable storage for carts.
///
/// The cart store is the only writer and serializes mutations per cart, so
/// implementations only need each individual call to be atomic.
#[async_trait]
pub trait CartStorage: Send + Sync {
    /// Load a cart, or `None` if it was never saved or has been deleted.
    async fn load(&self, id: &CartId) -> Result<Option<CartRecord>, StorageError>;

    /// Save a cart, replacing any previous state.
    async fn save(&self, record: &CartRecord) -> Result<(), StorageError>;

    /// Delete a cart. Returns whether it existed.
    async fn delete(&self, id: &CartId) -> Result<bool, StorageError>;

    /// ID of the most recently created cart.
    async fn recent(&self) -> Result<Option<CartId>, StorageError>;

    /// Record the most recently created cart.
    async fn set_recent(&self, id: &CartId) -> Result<(), StorageError>;
}

/// In-memory storage. Carts live as long as the storage value.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    carts: RwLock<HashMap<CartId, CartRecord>>,
    recent: RwLock<Option<CartId>>,
}

impl MemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored carts.
    pub async fn len(&self) -> usize {
        self.carts.read().await.len()
    }

    /// Whether no carts are stored.
    pub async fn is_empty(&self) -> bool {
        self.carts.read().await.is_empty()
    }
}

#[async_trait]
impl CartStorage for MemoryStorage {
    async fn load(&self, id: &CartId) -> Result<Option<CartRecord>, StorageError> {
        Ok(self.carts.read().await.get(id).cloned())
    }

    async fn save(&self, record: &CartRecord) -> Result<(), StorageError> {
        self.carts.write().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn delete(&self, id: &CartId) -> Result<bool, StorageError> {
        let existed = self.carts.write().await.remove(id).is_some();
        let mut recent = self.recent.write().await;
        if recent.as_ref() == Some(id) {
            *recent = None;
        }
        Ok(existed)
    }

    async fn recent(&self) -> Result<Option<CartId>, StorageError> {
        Ok(*self.recent.read().await)
    }

    async fn set_recent(&self, id: &CartId) -> Result<(), StorageError> {
        *self.recent.write().await = Some(*id);
        Ok(())
    }
}
