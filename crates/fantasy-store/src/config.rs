//! Store configuration

use crate::storage::StorageConfig;
use std::path::PathBuf;

/// Environment variable naming the data directory
pub const DATA_DIR_ENV: &str = "FANTASY_DATA_DIR";

/// Record store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding one JSON file per collection
    pub data_dir: PathBuf,
    /// Write collection files via temp file + rename
    pub atomic_writes: bool,
    /// Require result `driver_id`/`race_id` to name existing records
    pub check_result_references: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            atomic_writes: true,
            check_result_references: true,
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with the specified data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Configuration whose data directory comes from `FANTASY_DATA_DIR`,
    /// falling back to the default
    pub fn from_env() -> Self {
        match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Self::new(dir),
            _ => Self::default(),
        }
    }

    /// Set atomic write option.
    ///
    /// With atomic writes off a save truncates the file in place, so plain
    /// reads also take the collection lock and wait behind writers.
    pub fn with_atomic_writes(mut self, enabled: bool) -> Self {
        self.atomic_writes = enabled;
        self
    }

    /// Set result reference checking
    pub fn with_result_reference_checks(mut self, enabled: bool) -> Self {
        self.check_result_references = enabled;
        self
    }

    /// File storage settings derived from this configuration
    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig::new(&self.data_dir).with_atomic_writes(self.atomic_writes)
    }
}
