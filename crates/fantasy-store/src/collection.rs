//! Generic record collections backed by one document each
//!
//! A [`Collection`] knows where its records live and how to load and save
//! them. The loaded [`Records`] snapshot is a plain in-memory sequence in
//! insertion order; all validation and mutation happens on the snapshot
//! before it is saved back in one piece.

use crate::error::{StorageError, StoreError};
use crate::id::next_id;
use crate::record::{Record, RecordId, ResultCategory};
use crate::storage::BackingStore;
use crate::Result;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Names every persisted collection.
///
/// The derived ordering is the global lock order: operations that touch
/// several collections lock them in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CollectionId {
    /// Driver records
    Drivers,
    /// Team records
    Teams,
    /// Race records
    Races,
    /// Result records of one category
    Results(ResultCategory),
}

impl CollectionId {
    /// Every collection, in lock order
    pub const ALL: [CollectionId; 7] = [
        CollectionId::Drivers,
        CollectionId::Teams,
        CollectionId::Races,
        CollectionId::Results(ResultCategory::Race),
        CollectionId::Results(ResultCategory::Sprint),
        CollectionId::Results(ResultCategory::Qualifying),
        CollectionId::Results(ResultCategory::SprintQualifying),
    ];

    /// Document name in the backing store
    pub fn name(self) -> &'static str {
        match self {
            CollectionId::Drivers => "drivers",
            CollectionId::Teams => "teams",
            CollectionId::Races => "races",
            CollectionId::Results(ResultCategory::Race) => "race_results",
            CollectionId::Results(ResultCategory::Sprint) => "sprint_results",
            CollectionId::Results(ResultCategory::Qualifying) => "qualifying_results",
            CollectionId::Results(ResultCategory::SprintQualifying) => {
                "sprint_qualifying_results"
            }
        }
    }

    /// Record kind used in error messages
    pub fn kind(self) -> &'static str {
        match self {
            CollectionId::Drivers => "Driver",
            CollectionId::Teams => "Team",
            CollectionId::Races => "Race",
            CollectionId::Results(category) => category.kind(),
        }
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed handle on one persisted collection
pub struct Collection<T: Record> {
    id: CollectionId,
    storage: Arc<dyn BackingStore>,
    lock: Arc<Mutex<()>>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            storage: Arc::clone(&self.storage),
            lock: Arc::clone(&self.lock),
            _record: PhantomData,
        }
    }
}

impl<T: Record> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection").field("id", &self.id).finish()
    }
}

impl<T: Record> Collection<T> {
    /// Create a handle over a backing store
    pub fn new(id: CollectionId, storage: Arc<dyn BackingStore>) -> Self {
        Self {
            id,
            storage,
            lock: Arc::new(Mutex::new(())),
            _record: PhantomData,
        }
    }

    /// Which collection this is
    pub fn id(&self) -> CollectionId {
        self.id
    }

    /// Acquire exclusive access for one load-modify-save cycle.
    ///
    /// Every handle cloned from the same collection shares the lock.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }

    /// Load the current persisted contents.
    ///
    /// A collection that has never been saved loads as empty.
    pub async fn load(&self) -> Result<Records<T>> {
        let name = self.id.name();
        let Some(document) = self
            .storage
            .read(name)
            .await
            .map_err(|e| StoreError::storage(name, e))?
        else {
            debug!(collection = name, "No backing document, starting empty");
            return Ok(Records::default());
        };

        if document.trim().is_empty() {
            return Ok(Records::default());
        }

        let items: Vec<T> =
            serde_json::from_str(&document).map_err(|e| StoreError::corrupt(name, e))?;
        debug!(collection = name, count = items.len(), "Collection loaded");
        Ok(Records::new(items))
    }

    /// Overwrite the persisted contents with `records`
    pub async fn save(&self, records: &Records<T>) -> Result<()> {
        let name = self.id.name();
        let document = serde_json::to_string_pretty(records.as_slice()).map_err(|e| {
            StoreError::storage(
                name,
                StorageError::EncodeFailed {
                    collection: name.to_string(),
                    source: e,
                },
            )
        })?;

        self.storage
            .write(name, &document)
            .await
            .map_err(|e| StoreError::storage(name, e))?;
        debug!(collection = name, count = records.len(), "Collection saved");
        Ok(())
    }

    /// Snapshot the persisted document before a destructive rewrite
    pub async fn backup(&self) -> Result<Option<String>> {
        let name = self.id.name();
        self.storage
            .backup(name)
            .await
            .map_err(|e| StoreError::storage(name, e))
    }
}

/// In-memory snapshot of a collection, in insertion order
#[derive(Debug, Clone, PartialEq)]
pub struct Records<T> {
    items: Vec<T>,
}

impl<T> Default for Records<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Record> Records<T> {
    /// Wrap loaded records
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Records as a slice
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Unwrap into the record sequence
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// First record matching `predicate`
    pub fn find<P>(&self, mut predicate: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.items.iter().find(|record| predicate(record))
    }

    /// Record with the given id
    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.find(|record| record.id() == id)
    }

    /// Every record matching `predicate`, cloned, in insertion order
    pub fn filter<P>(&self, mut predicate: P) -> Vec<T>
    where
        P: FnMut(&T) -> bool,
    {
        self.items
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }

    /// Identifiers currently present
    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.items.iter().map(Record::id)
    }

    /// Identifier the next inserted record would receive, or `None` when the
    /// largest id is already taken
    pub fn next_id(&self) -> Option<RecordId> {
        next_id(self.ids())
    }

    /// Assign a fresh id to `record`, append it, and return the stored copy.
    ///
    /// Any id already on `record` is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IdsExhausted`] if no fresh id is left; the
    /// snapshot is unchanged.
    pub fn insert(&mut self, mut record: T) -> Result<T> {
        let id = self.next_id().ok_or_else(|| StoreError::ids_exhausted(T::KIND))?;
        record.set_id(id);
        self.items.push(record.clone());
        Ok(record)
    }

    /// Replace the record with `id` by `record`, keeping `id`.
    ///
    /// Returns the stored copy, or `None` if no record has that id.
    pub fn replace(&mut self, id: RecordId, mut record: T) -> Option<T> {
        let slot = self.items.iter_mut().find(|existing| existing.id() == id)?;
        record.set_id(id);
        *slot = record.clone();
        Some(record)
    }

    /// Remove the record with `id`, returning it
    pub fn remove(&mut self, id: RecordId) -> Option<T> {
        let index = self.items.iter().position(|record| record.id() == id)?;
        Some(self.items.remove(index))
    }

    /// Keep only records matching `predicate`, returning the dropped ones
    pub fn retain<P>(&mut self, mut predicate: P) -> Vec<T>
    where
        P: FnMut(&T) -> bool,
    {
        let (kept, dropped): (Vec<T>, Vec<T>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|record| predicate(record));
        self.items = kept;
        dropped
    }

    /// Produce the updated sequence by passing every record through
    /// `transform`
    pub fn replace_all<F>(self, transform: F) -> Self
    where
        F: FnMut(T) -> T,
    {
        Self {
            items: self.items.into_iter().map(transform).collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Records<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Driver, Team};
    use crate::storage::MemoryStorage;

    fn must<T, E: std::fmt::Debug>(r: std::result::Result<T, E>) -> T {
        match r {
            Ok(v) => v,
            Err(e) => panic!("unexpected Err: {e:?}"),
        }
    }

    fn drivers(storage: Arc<MemoryStorage>) -> Collection<Driver> {
        Collection::new(CollectionId::Drivers, storage)
    }

    #[tokio::test]
    async fn test_missing_document_loads_empty() {
        let collection = drivers(Arc::new(MemoryStorage::new()));

        let records = must(collection.load().await);
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_blank_document_loads_empty() {
        let storage = Arc::new(MemoryStorage::new().with_document("drivers", "  \n"));

        let records = must(drivers(storage).load().await);
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_storage_error() {
        let storage = Arc::new(MemoryStorage::new().with_document("drivers", "{not json"));

        let result = drivers(storage).load().await;
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn test_save_then_load_keeps_order() {
        let storage = Arc::new(MemoryStorage::new());
        let collection = drivers(Arc::clone(&storage));

        let mut records = Records::default();
        must(records.insert(Driver::named("Max")));
        must(records.insert(Driver::named("Charles")));
        must(collection.save(&records).await);

        let loaded = must(collection.load().await);
        let names: Vec<_> = loaded.iter().filter_map(Driver::name).collect();
        assert_eq!(names, vec!["Max", "Charles"]);
        assert_eq!(storage.write_count(), 1);
    }

    #[tokio::test]
    async fn test_saved_document_is_pretty_json_array() {
        let storage = Arc::new(MemoryStorage::new());
        let collection = drivers(Arc::clone(&storage));

        let mut records = Records::default();
        must(records.insert(Driver::named("Oscar")));
        must(collection.save(&records).await);

        let document = must(storage.document("drivers").ok_or("document"));
        assert!(document.starts_with("[\n  {"));
    }

    #[test]
    fn test_insert_discards_caller_id() {
        let mut records = Records::default();
        let mut driver = Driver::named("Lewis");
        driver.id = RecordId::new(44);

        let stored = must(records.insert(driver));

        assert_eq!(stored.id, RecordId::new(1));
        assert_eq!(records.next_id(), Some(RecordId::new(2)));
    }

    #[test]
    fn test_insert_fails_when_ids_exhausted() {
        let mut full = Driver::named("Last");
        full.id = RecordId::new(u64::MAX);
        let mut records = Records::new(vec![full]);

        let result = records.insert(Driver::named("One more"));

        assert!(matches!(result, Err(StoreError::IdsExhausted { .. })));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_replace_forces_id() {
        let mut records = Records::default();
        must(records.insert(Driver::named("George")));
        must(records.insert(Driver::named("Kimi")));

        let mut update = Driver::named("Andrea Kimi");
        update.id = RecordId::new(77);
        let stored = must(records.replace(RecordId::new(2), update).ok_or("replace"));

        assert_eq!(stored.id, RecordId::new(2));
        assert_eq!(records.get(RecordId::new(1)).and_then(Driver::name), Some("George"));
        assert_eq!(
            records.get(RecordId::new(2)).and_then(Driver::name),
            Some("Andrea Kimi")
        );
        assert!(records.replace(RecordId::new(9), Driver::named("x")).is_none());
    }

    #[test]
    fn test_remove_and_find() {
        let mut records = Records::default();
        must(records.insert(Driver::named("Fernando")));
        must(records.insert(Driver::named("Lance")));

        let removed = must(records.remove(RecordId::new(1)).ok_or("remove"));
        assert_eq!(removed.name(), Some("Fernando"));
        assert!(records.remove(RecordId::new(1)).is_none());
        assert!(records.find(|d| d.name() == Some("Lance")).is_some());
    }

    #[test]
    fn test_replace_all_maps_every_record() {
        let mut records = Records::default();
        must(records.insert(Team::named("A", vec![RecordId::new(1)])));
        must(records.insert(Team::named("B", vec![RecordId::new(2)])));

        let updated = records.replace_all(|mut team| {
            team.driver_ids.push(RecordId::new(9));
            team
        });

        assert!(updated.iter().all(|team| team.has_driver(RecordId::new(9))));
    }

    #[test]
    fn test_collection_names() {
        let names: Vec<_> = CollectionId::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "drivers",
                "teams",
                "races",
                "race_results",
                "sprint_results",
                "qualifying_results",
                "sprint_qualifying_results"
            ]
        );
        let mut sorted = CollectionId::ALL;
        sorted.sort();
        assert_eq!(sorted, CollectionId::ALL);
    }
}
