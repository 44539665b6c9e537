//! Record store for an F1 fantasy league
//!
//! This crate keeps drivers, fantasy teams, race weekends and four kinds of
//! session results in flat JSON documents, one per collection, and enforces
//! the rules that keep them consistent:
//! - Store-assigned identifiers (`max + 1` within a collection)
//! - One result per (race, driver) pair in each result category
//! - A driver sits on at most one team roster
//! - Driver transfers that swap a rostered driver for a free agent
//!
//! # Architecture
//!
//! - [`store`]: `FantasyStore` facade and per-kind record operations
//! - [`transfer`]: the team/driver transfer operation
//! - [`dedupe`]: cleanup of duplicate results written by older data
//! - [`standings`]: driver and team tables
//! - [`collection`]: typed collections with load/save against a backing store
//! - [`storage`]: file and in-memory backing stores
//! - [`rules`]: uniqueness and roster checks over loaded snapshots
//! - [`scoring`]: fantasy point tables and weekend scoring
//! - [`error`]: error types and their classification
//!
//! # Consistency
//!
//! Every mutation is one load → validate → mutate → save cycle under the
//! lock of each collection it touches. Collections are always locked in
//! [`CollectionId`] order. A failed check writes nothing, and file saves go
//! through a temp file and rename.
//!
//! # Example
//!
//! ```ignore
//! use fantasy_store::prelude::*;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = FantasyStore::open(StoreConfig::new("data")).await?;
//!
//! let max = store.create_driver(Driver::named("Max")).await?;
//! let lando = store.create_driver(Driver::named("Lando")).await?;
//! let team = store.create_team(Team::named("Grid Walkers", vec![max.id])).await?;
//!
//! let team = store.transfer(team.id, max.id, lando.id).await?;
//! assert_eq!(team.driver_ids, vec![lando.id]);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod collection;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod id;
pub mod prelude;
pub mod record;
pub mod rules;
pub mod scoring;
pub mod standings;
pub mod storage;
pub mod store;
pub mod transfer;

pub use collection::{Collection, CollectionId, Records};
pub use config::StoreConfig;
pub use dedupe::{DedupeReport, RemovedResult};
pub use error::{ErrorKind, StorageError, StoreError};
pub use record::{Driver, Race, Record, RecordId, ResultCategory, SessionResult, Team};
pub use storage::{BackingStore, FileStorage, MemoryStorage, StorageConfig};
pub use standings::{DriverStanding, Standings, TeamStanding};
pub use store::{decode_payload, DriverPoints, FantasyStore, TeamPoints};

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
