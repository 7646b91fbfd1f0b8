//! In-memory storage implementation.

use super::{PixelSnapshot, SnapshotStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    snapshots: RwLock<HashMap<String, PixelSnapshot>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStorage {
    fn save(&self, key: &str, snapshot: &PixelSnapshot) -> StorageResult<()> {
        let mut map = self
            .snapshots
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        map.insert(key.to_string(), snapshot.clone());
        Ok(())
    }

    fn load(&self, key: &str) -> StorageResult<PixelSnapshot> {
        let map = self
            .snapshots
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        map.get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let mut map = self
            .snapshots
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        map.remove(key);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let map = self
            .snapshots
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        Ok(map.keys().cloned().collect())
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        let map = self
            .snapshots
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        Ok(map.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PixelSnapshot {
        PixelSnapshot {
            w: 4,
            h: 4,
            b64: "AAAA".to_string(),
            s: Some(1),
        }
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        storage.save("board", &sample()).unwrap();
        let loaded = storage.load("board").unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = storage.load("nonexistent");
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_exists_and_delete() {
        let storage = MemoryStorage::new();
        assert!(!storage.exists("board").unwrap());
        storage.save("board", &sample()).unwrap();
        assert!(storage.exists("board").unwrap());
        storage.delete("board").unwrap();
        assert!(!storage.exists("board").unwrap());
    }

    #[test]
    fn test_list() {
        let storage = MemoryStorage::new();
        storage.save("a", &sample()).unwrap();
        storage.save("b", &sample()).unwrap();
        let mut keys = storage.list().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }
}
