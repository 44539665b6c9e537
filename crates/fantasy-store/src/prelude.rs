//! Convenience re-exports for common types

pub use crate::config::StoreConfig;
pub use crate::dedupe::{DedupeReport, RemovedResult};
pub use crate::error::{ErrorKind, StorageError, StoreError};
pub use crate::record::{Attributes, Driver, Race, RecordId, ResultCategory, SessionResult, Team};
pub use crate::standings::{DriverStanding, Standings, TeamStanding};
pub use crate::storage::{BackingStore, FileStorage, MemoryStorage};
pub use crate::store::{decode_payload, DriverPoints, FantasyStore, TeamPoints};
