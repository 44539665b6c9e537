//! Duplicate result cleanup
//!
//! Repairs result collections written before uniqueness was enforced.

use crate::record::{RecordId, ResultCategory};
use crate::rules;
use crate::store::FantasyStore;
use crate::Result;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// A result dropped by cleanup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedResult {
    /// Id of the dropped result
    pub id: RecordId,
    /// Race of the duplicated pair
    pub race_id: RecordId,
    /// Driver of the duplicated pair
    pub driver_id: RecordId,
}

/// Outcome of cleaning one result collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DedupeReport {
    /// Category cleaned
    pub category: ResultCategory,
    /// Records present before cleanup
    pub scanned: usize,
    /// Records dropped, in their original order
    pub removed: Vec<RemovedResult>,
    /// Records left after cleanup
    pub kept: usize,
    /// Where the pre-cleanup document was saved, if anything was removed
    pub backup: Option<String>,
}

impl DedupeReport {
    /// Whether cleanup changed the collection
    pub fn changed(&self) -> bool {
        !self.removed.is_empty()
    }
}

impl FantasyStore {
    /// Drop every result that repeats an earlier (race, driver) pair.
    ///
    /// The first occurrence of each pair is kept. When anything is dropped the
    /// current document is backed up before the cleaned collection is saved;
    /// a clean collection is neither backed up nor rewritten.
    pub async fn clean_duplicates(&self, category: ResultCategory) -> Result<DedupeReport> {
        let collection = self.results(category);
        let _guard = collection.lock().await;

        let mut records = collection.load().await?;
        let scanned = records.len();
        let duplicates = rules::duplicate_results(&records);

        if duplicates.is_empty() {
            debug!(collection = %collection.id(), scanned, "No duplicate results");
            return Ok(DedupeReport {
                category,
                scanned,
                removed: Vec::new(),
                kept: scanned,
                backup: None,
            });
        }

        warn!(
            collection = %collection.id(),
            duplicates = duplicates.len(),
            "Duplicate results found"
        );
        let backup = collection.backup().await?;

        // Legacy documents may repeat ids, so records are dropped by position
        let mut seen = BTreeSet::new();
        let dropped = records.retain(|result| seen.insert(result.key()));
        collection.save(&records).await?;

        let removed: Vec<RemovedResult> = dropped
            .into_iter()
            .map(|r| RemovedResult {
                id: r.id,
                race_id: r.race_id,
                driver_id: r.driver_id,
            })
            .collect();
        info!(
            collection = %collection.id(),
            removed = removed.len(),
            kept = records.len(),
            backup = ?backup,
            "Duplicate results removed"
        );

        Ok(DedupeReport {
            category,
            scanned,
            kept: records.len(),
            removed,
            backup,
        })
    }

    /// [`clean_duplicates`](Self::clean_duplicates) over every category
    pub async fn clean_all_duplicates(&self) -> Result<Vec<DedupeReport>> {
        let mut reports = Vec::with_capacity(ResultCategory::ALL.len());
        for category in ResultCategory::ALL {
            reports.push(self.clean_duplicates(category).await?);
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{Collection, CollectionId, Records};
    use crate::config::StoreConfig;
    use crate::record::SessionResult;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    fn must<T, E: std::fmt::Debug>(r: std::result::Result<T, E>) -> T {
        match r {
            Ok(v) => v,
            Err(e) => panic!("unexpected Err: {e:?}"),
        }
    }

    /// Seed a collection directly, since the store refuses duplicates
    async fn seed(storage: Arc<MemoryStorage>, category: ResultCategory, pairs: &[(u64, u64)]) {
        let collection: Collection<SessionResult> =
            Collection::new(CollectionId::Results(category), storage);
        let mut records = Records::default();
        for (race, driver) in pairs {
            must(records.insert(SessionResult::new(RecordId::new(*race), RecordId::new(*driver))));
        }
        must(collection.save(&records).await);
    }

    #[tokio::test]
    async fn test_keeps_first_occurrence() {
        let storage = Arc::new(MemoryStorage::new());
        seed(storage.clone(), ResultCategory::Race, &[(1, 1), (1, 2), (1, 1)]).await;
        let store = FantasyStore::with_storage(StoreConfig::default(), storage.clone());

        let report = must(store.clean_duplicates(ResultCategory::Race).await);

        assert_eq!(report.scanned, 3);
        assert_eq!(report.kept, 2);
        assert_eq!(
            report.removed,
            vec![RemovedResult {
                id: RecordId::new(3),
                race_id: RecordId::new(1),
                driver_id: RecordId::new(1),
            }]
        );
        assert_eq!(report.backup.as_deref(), Some("memory://race_results/1"));

        let ids: Vec<_> = must(store.list_results(ResultCategory::Race).await)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![RecordId::new(1), RecordId::new(2)]);
    }

    fn triples(results: &[SessionResult]) -> Vec<(u64, u64, u64)> {
        results
            .iter()
            .map(|r| (r.id.value(), r.race_id.value(), r.driver_id.value()))
            .collect()
    }

    #[tokio::test]
    async fn test_shared_id_keeps_unique_pair() {
        let document = r#"[
            {"id": 1, "race_id": 1, "driver_id": 1},
            {"id": 2, "race_id": 1, "driver_id": 2},
            {"id": 2, "race_id": 1, "driver_id": 1}
        ]"#;
        let storage = Arc::new(MemoryStorage::new().with_document("race_results", document));
        let store = FantasyStore::with_storage(StoreConfig::default(), storage);

        let report = must(store.clean_duplicates(ResultCategory::Race).await);

        assert_eq!(report.kept, 2);
        assert_eq!(
            report.removed,
            vec![RemovedResult {
                id: RecordId::new(2),
                race_id: RecordId::new(1),
                driver_id: RecordId::new(1),
            }]
        );
        let left = must(store.list_results(ResultCategory::Race).await);
        assert_eq!(triples(&left), vec![(1, 1, 1), (2, 1, 2)]);
    }

    #[tokio::test]
    async fn test_exact_copy_keeps_one() {
        let document = r#"[
            {"id": 1, "race_id": 1, "driver_id": 1},
            {"id": 1, "race_id": 1, "driver_id": 1}
        ]"#;
        let storage = Arc::new(MemoryStorage::new().with_document("race_results", document));
        let store = FantasyStore::with_storage(StoreConfig::default(), storage);

        let report = must(store.clean_duplicates(ResultCategory::Race).await);

        assert_eq!(report.scanned, 2);
        assert_eq!(report.kept, 1);
        assert_eq!(report.removed.len(), 1);
        let left = must(store.list_results(ResultCategory::Race).await);
        assert_eq!(triples(&left), vec![(1, 1, 1)]);
    }

    #[tokio::test]
    async fn test_clean_collection_is_untouched() {
        let storage = Arc::new(MemoryStorage::new());
        seed(storage.clone(), ResultCategory::Sprint, &[(1, 1), (2, 1)]).await;
        let store = FantasyStore::with_storage(StoreConfig::default(), storage.clone());
        let writes = storage.write_count();

        let report = must(store.clean_duplicates(ResultCategory::Sprint).await);

        assert!(!report.changed());
        assert!(report.backup.is_none());
        assert_eq!(storage.write_count(), writes);
        assert!(storage.backups().is_empty());
    }

    #[tokio::test]
    async fn test_clean_all_reports_every_category() {
        let storage = Arc::new(MemoryStorage::new());
        seed(storage.clone(), ResultCategory::Qualifying, &[(4, 4), (4, 4)]).await;
        let store = FantasyStore::with_storage(StoreConfig::default(), storage.clone());

        let reports = must(store.clean_all_duplicates().await);

        let changed: Vec<_> = reports
            .iter()
            .filter(|r| r.changed())
            .map(|r| r.category)
            .collect();
        assert_eq!(reports.len(), 4);
        assert_eq!(changed, vec![ResultCategory::Qualifying]);
    }
}
