//! File-backed cart storage.
//!
//! # Layout
//!
//! - `{dir}/{cart_id}.json` - one JSON document per cart
//! - `{dir}/recent` - ID of the most recently created cart
//!
//! Every write goes to a uniquely named sibling temporary file that is then
//! renamed over the target, so readers see either the old or the new
//! document and concurrent writers never share a temporary file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use buy_sdk_core::CartId;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{CartRecord, CartStorage, StorageError};

const RECENT_FILE: &str = "recent";

/// Stores each cart as a JSON file in a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    // Guards the read-compare-write sequences on the `recent` marker.
    recent_lock: Arc<Mutex<()>>,
}

impl FileStorage {
    /// Use `dir` for cart files. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            recent_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Directory holding the cart files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn cart_path(&self, id: &CartId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    async fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = self.dir.join(format!(".{name}.{}.tmp", Uuid::new_v4().simple()));

        tokio::fs::write(&tmp, contents).await?;
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn read_recent(&self) -> Result<Option<CartId>, StorageError> {
        let Some(bytes) = read_optional(&self.dir.join(RECENT_FILE)).await? else {
            return Ok(None);
        };
        let raw = String::from_utf8_lossy(&bytes);
        match raw.parse::<CartId>() {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable recent cart marker");
                Ok(None)
            }
        }
    }
}

/// Read a file, mapping "not found" to `None`.
async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl CartStorage for FileStorage {
    async fn load(&self, id: &CartId) -> Result<Option<CartRecord>, StorageError> {
        let Some(bytes) = read_optional(&self.cart_path(id)).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                id: id.to_string(),
                source,
            })
    }

    async fn save(&self, record: &CartRecord) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(record).map_err(StorageError::Encode)?;
        let path = self.cart_path(&record.id);
        self.write_atomic(&path, &json).await?;
        debug!(cart_id = %record.id, path = %path.display(), "Cart saved");
        Ok(())
    }

    async fn delete(&self, id: &CartId) -> Result<bool, StorageError> {
        let existed = match tokio::fs::remove_file(self.cart_path(id)).await {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };

        let _marker = self.recent_lock.lock().await;
        if self.read_recent().await?.as_ref() == Some(id) {
            match tokio::fs::remove_file(self.dir.join(RECENT_FILE)).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(existed)
    }

    async fn recent(&self) -> Result<Option<CartId>, StorageError> {
        let _marker = self.recent_lock.lock().await;
        self.read_recent().await
    }

    async fn set_recent(&self, id: &CartId) -> Result<(), StorageError> {
        let _marker = self.recent_lock.lock().await;
        self.write_atomic(&self.dir.join(RECENT_FILE), id.to_string().as_bytes())
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_storage_roundtrip_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let record = CartRecord::new(CartId::generate());

        FileStorage::new(dir.path()).save(&record).await.unwrap();

        let reopened = FileStorage::new(dir.path());
        assert_eq!(reopened.load(&record.id).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_file_storage_creates_directory_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("carts"));
        let record = CartRecord::new(CartId::generate());

        assert!(storage.load(&record.id).await.unwrap().is_none());
        storage.save(&record).await.unwrap();
        assert!(storage.load(&record.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_file_storage_corrupt_record() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        let id = CartId::generate();
        tokio::fs::write(dir.path().join(format!("{id}.json")), b"{not json")
            .await
            .unwrap();

        let err = storage.load(&id).await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_file_storage_delete_and_recent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        let record = CartRecord::new(CartId::generate());

        storage.save(&record).await.unwrap();
        storage.set_recent(&record.id).await.unwrap();
        assert_eq!(storage.recent().await.unwrap(), Some(record.id));

        assert!(storage.delete(&record.id).await.unwrap());
        assert_eq!(storage.recent().await.unwrap(), None);
        assert!(!storage.delete(&record.id).await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_do_not_share_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        let tasks: Vec<_> = (0..32)
            .map(|_| {
                let storage = storage.clone();
                tokio::spawn(async move {
                    let record = CartRecord::new(CartId::generate());
                    storage.save(&record).await?;
                    storage.set_recent(&record.id).await?;
                    Ok::<_, StorageError>(record.id)
                })
            })
            .collect();

        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap().unwrap());
        }

        for id in &ids {
            assert!(storage.load(id).await.unwrap().is_some());
        }
        let recent = storage.recent().await.unwrap().unwrap();
        assert!(ids.contains(&recent));

        let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            let name = entry.file_name().to_string_lossy().into_owned();
            assert!(!name.ends_with(".tmp"), "leftover temp file {name}");
        }
    }
}
