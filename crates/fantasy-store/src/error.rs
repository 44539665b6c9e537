//! Error types for record store operations

use crate::record::RecordId;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during record store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Requested identifier is absent from the target collection
    #[error("{kind} with ID {id} not found")]
    NotFound {
        /// Human-readable record kind, e.g. "Driver" or "Sprint result"
        kind: String,
        /// The missing identifier
        id: RecordId,
    },

    /// A result for this driver in this race already exists in the category
    #[error("A {category} result for driver {driver_id} in race {race_id} already exists")]
    DuplicateResult {
        /// Result category label
        category: String,
        /// Race the result belongs to
        race_id: RecordId,
        /// Driver the result belongs to
        driver_id: RecordId,
    },

    /// Transfer target is already on a team roster
    #[error("Driver {driver_id} is already in team {team_id}")]
    AlreadyRostered {
        /// Driver being transferred in
        driver_id: RecordId,
        /// Team currently rostering the driver
        team_id: RecordId,
    },

    /// Transfer source is not on the given team
    #[error("Driver {driver_id} is not in team {team_id}")]
    NotOnTeam {
        /// Driver expected on the roster
        driver_id: RecordId,
        /// Team whose roster was checked
        team_id: RecordId,
    },

    /// The collection already holds the largest representable id
    #[error("{kind} identifiers exhausted: ID {} is already in use", u64::MAX)]
    IdsExhausted {
        /// Record kind that could not be allocated
        kind: String,
    },

    /// Caller payload does not decode into the record shape
    #[error("Invalid {kind} payload: {source}")]
    InvalidPayload {
        /// Record kind the payload was meant for
        kind: String,
        /// Decoding error
        source: serde_json::Error,
    },

    /// Backing document exists but could not be decoded
    #[error("Collection {collection} is corrupt: {source}")]
    Corrupt {
        /// Collection name
        collection: String,
        /// Decoding error
        source: serde_json::Error,
    },

    /// Backing store could not be read or written
    #[error("Storage unavailable for {collection}: {source}")]
    Storage {
        /// Collection name
        collection: String,
        /// Underlying storage failure
        source: StorageError,
    },
}

/// Classification of store errors as seen by request handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Referenced record does not exist
    NotFound,
    /// Operation would break a uniqueness or roster invariant
    Conflict,
    /// Request is malformed or inconsistent with current state
    InvalidRequest,
    /// Backing store unreadable, unwritable or corrupt
    StorageUnavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "not_found"),
            ErrorKind::Conflict => write!(f, "conflict"),
            ErrorKind::InvalidRequest => write!(f, "invalid_request"),
            ErrorKind::StorageUnavailable => write!(f, "storage_unavailable"),
        }
    }
}

impl StoreError {
    /// Get the error kind for classification
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DuplicateResult { .. }
            | Self::AlreadyRostered { .. }
            | Self::IdsExhausted { .. } => ErrorKind::Conflict,
            Self::NotOnTeam { .. } | Self::InvalidPayload { .. } => ErrorKind::InvalidRequest,
            Self::Corrupt { .. } | Self::Storage { .. } => ErrorKind::StorageUnavailable,
        }
    }

    /// Check if retrying the same call could succeed without caller changes
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }

    /// Create a not-found error
    pub fn not_found(kind: impl Into<String>, id: RecordId) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id,
        }
    }

    /// Create a duplicate result error
    pub fn duplicate_result(
        category: impl Into<String>,
        race_id: RecordId,
        driver_id: RecordId,
    ) -> Self {
        Self::DuplicateResult {
            category: category.into(),
            race_id,
            driver_id,
        }
    }

    /// Create an id exhaustion error
    pub fn ids_exhausted(kind: impl Into<String>) -> Self {
        Self::IdsExhausted { kind: kind.into() }
    }

    /// Create an invalid payload error
    pub fn invalid_payload(kind: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidPayload {
            kind: kind.into(),
            source,
        }
    }

    /// Wrap a storage failure with the collection it happened on
    pub fn storage(collection: impl Into<String>, source: StorageError) -> Self {
        Self::Storage {
            collection: collection.into(),
            source,
        }
    }

    /// Create a corrupt collection error
    pub fn corrupt(collection: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Corrupt {
            collection: collection.into(),
            source,
        }
    }
}

/// Storage-specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to read file
    #[error("Failed to read file {path}: {source}")]
    ReadFailed {
        /// Path to the file
        path: PathBuf,
        /// Source error
        source: std::io::Error,
    },

    /// Failed to write file
    #[error("Failed to write file {path}: {source}")]
    WriteFailed {
        /// Path to the file
        path: PathBuf,
        /// Source error
        source: std::io::Error,
    },

    /// Failed to create directory
    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreationFailed {
        /// Path to the directory
        path: PathBuf,
        /// Source error
        source: std::io::Error,
    },

    /// Temp file was written but could not replace the target
    #[error("Atomic write failed: temp file at {temp_path}, target at {target_path}: {source}")]
    AtomicWriteFailed {
        /// Path to the temporary file
        temp_path: PathBuf,
        /// Path to the target file
        target_path: PathBuf,
        /// Source error
        source: std::io::Error,
    },

    /// Serializing records for persistence failed
    #[error("Failed to encode {collection}: {source}")]
    EncodeFailed {
        /// Collection name
        collection: String,
        /// Source error
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Create a read error
    pub fn read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a write error
    pub fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a directory creation error
    pub fn directory_creation_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreationFailed {
            path: path.into(),
            source,
        }
    }

    /// Create an atomic write error
    pub fn atomic_write_failed(
        temp: impl Into<PathBuf>,
        target: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::AtomicWriteFailed {
            temp_path: temp.into(),
            target_path: target.into(),
            source,
        }
    }
}
