//! Snapshot persistence backends.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Persisted board snapshot: dimensions, base64 of the raw pixel buffer,
/// and the selected palette slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelSnapshot {
    pub w: usize,
    pub h: usize,
    pub b64: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u8>,
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Snapshot not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for snapshot storage backends.
///
/// Implementations can keep snapshots in memory or on the filesystem; the
/// engine only ever hands them the wire-shaped [`PixelSnapshot`].
pub trait SnapshotStore {
    /// Save a snapshot under a key.
    fn save(&self, key: &str, snapshot: &PixelSnapshot) -> StorageResult<()>;

    /// Load a snapshot by key.
    fn load(&self, key: &str) -> StorageResult<PixelSnapshot>;

    /// Delete a snapshot.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// List all stored keys.
    fn list(&self) -> StorageResult<Vec<String>>;

    /// Check if a snapshot exists.
    fn exists(&self, key: &str) -> StorageResult<bool>;
}
