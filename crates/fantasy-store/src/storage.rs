//! Backing stores for collection documents
//!
//! A backing store maps a collection name to one text document holding the
//! whole collection. [`FileStorage`] keeps one JSON file per collection and
//! replaces it atomically; [`MemoryStorage`] keeps documents in a map and is
//! meant for tests.

use crate::error::StorageError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::fs as async_fs;
use tracing::debug;

/// Result type for backing store operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Whole-document persistence for named collections
#[async_trait]
pub trait BackingStore: Send + Sync {
    /// Read the document for `name`, or `None` if it has never been written
    async fn read(&self, name: &str) -> StorageResult<Option<String>>;

    /// Replace the document for `name` entirely
    async fn write(&self, name: &str, contents: &str) -> StorageResult<()>;

    /// Snapshot the current document for `name` before a destructive rewrite.
    ///
    /// Returns a locator for the snapshot, or `None` if there was nothing to
    /// back up.
    async fn backup(&self, name: &str) -> StorageResult<Option<String>>;
}

/// File storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Base directory for collection files
    pub base_dir: PathBuf,
    /// File extension for collection files
    pub extension: String,
    /// Enable atomic writes (write to temp, then rename)
    pub atomic_writes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("data"),
            extension: "json".to_string(),
            atomic_writes: true,
        }
    }
}

impl StorageConfig {
    /// Create a new storage configuration with the specified base directory
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Default::default()
        }
    }

    /// Set atomic write option
    pub fn with_atomic_writes(mut self, enabled: bool) -> Self {
        self.atomic_writes = enabled;
        self
    }
}

/// One JSON file per collection under a base directory
#[derive(Debug)]
pub struct FileStorage {
    config: StorageConfig,
}

impl FileStorage {
    /// Create a new file storage instance, creating the base directory if
    /// it does not exist
    pub async fn new(base_dir: &Path) -> StorageResult<Self> {
        Self::with_config(StorageConfig::new(base_dir)).await
    }

    /// Create with custom configuration
    pub async fn with_config(config: StorageConfig) -> StorageResult<Self> {
        async_fs::create_dir_all(&config.base_dir)
            .await
            .map_err(|e| StorageError::directory_creation_failed(&config.base_dir, e))?;

        Ok(Self { config })
    }

    /// Path of the document backing a collection
    pub fn collection_path(&self, name: &str) -> PathBuf {
        self.config
            .base_dir
            .join(format!("{}.{}", name, self.config.extension))
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &Path {
        &self.config.base_dir
    }

    /// Write content to a file atomically
    ///
    /// The content goes to a sibling temp file which is then renamed over the
    /// target, so the previous document survives a failed write.
    pub async fn write_atomic(&self, path: &Path, content: &str) -> StorageResult<()> {
        debug!(path = ?path, "Writing file atomically");

        let temp_path = path.with_extension("tmp");

        async_fs::write(&temp_path, content)
            .await
            .map_err(|e| StorageError::write_failed(&temp_path, e))?;

        if let Err(e) = async_fs::rename(&temp_path, path).await {
            if let Err(cleanup) = async_fs::remove_file(&temp_path).await {
                debug!(path = ?temp_path, error = %cleanup, "Failed to remove temp file");
            }
            return Err(StorageError::atomic_write_failed(temp_path, path, e));
        }

        debug!(path = ?path, "File written successfully");
        Ok(())
    }
}

#[async_trait]
impl BackingStore for FileStorage {
    async fn read(&self, name: &str) -> StorageResult<Option<String>> {
        let path = self.collection_path(name);
        debug!(path = ?path, "Reading collection file");

        match async_fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?path, "Collection file not found, treating as empty");
                Ok(None)
            }
            Err(e) => Err(StorageError::read_failed(path, e)),
        }
    }

    async fn write(&self, name: &str, contents: &str) -> StorageResult<()> {
        let path = self.collection_path(name);
        if self.config.atomic_writes {
            self.write_atomic(&path, contents).await
        } else {
            async_fs::write(&path, contents)
                .await
                .map_err(|e| StorageError::write_failed(path, e))
        }
    }

    async fn backup(&self, name: &str) -> StorageResult<Option<String>> {
        let source = self.collection_path(name);
        if !async_fs::try_exists(&source)
            .await
            .map_err(|e| StorageError::read_failed(&source, e))?
        {
            return Ok(None);
        }

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S%3f");
        let backup_dir = self.config.base_dir.join("backups");
        let backup_path = backup_dir.join(format!(
            "{}_{}.{}.bak",
            name, timestamp, self.config.extension
        ));

        async_fs::create_dir_all(&backup_dir)
            .await
            .map_err(|e| StorageError::directory_creation_failed(&backup_dir, e))?;

        async_fs::copy(&source, &backup_path)
            .await
            .map_err(|e| StorageError::write_failed(&backup_path, e))?;

        debug!(source = ?source, backup = ?backup_path, "Backup created");
        Ok(Some(backup_path.display().to_string()))
    }
}

/// In-memory documents, for tests and ephemeral stores
#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, String>>,
    backups: RwLock<Vec<(String, String)>>,
    writes: AtomicUsize,
}

impl MemoryStorage {
    /// Create an empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document directly, bypassing the write counter
    pub fn with_document(self, name: impl Into<String>, contents: impl Into<String>) -> Self {
        self.documents.write().insert(name.into(), contents.into());
        self
    }

    /// Current document for a collection
    pub fn document(&self, name: &str) -> Option<String> {
        self.documents.read().get(name).cloned()
    }

    /// Number of successful writes since creation
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Backups taken so far, as (collection, contents)
    pub fn backups(&self) -> Vec<(String, String)> {
        self.backups.read().clone()
    }
}

#[async_trait]
impl BackingStore for MemoryStorage {
    async fn read(&self, name: &str) -> StorageResult<Option<String>> {
        Ok(self.documents.read().get(name).cloned())
    }

    async fn write(&self, name: &str, contents: &str) -> StorageResult<()> {
        self.documents
            .write()
            .insert(name.to_string(), contents.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn backup(&self, name: &str) -> StorageResult<Option<String>> {
        let Some(current) = self.document(name) else {
            return Ok(None);
        };
        let mut backups = self.backups.write();
        backups.push((name.to_string(), current));
        Ok(Some(format!("memory://{}/{}", name, backups.len())))
    }
}
