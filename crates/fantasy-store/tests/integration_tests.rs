//! Integration tests for the fantasy record store

use fantasy_store::prelude::*;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::task::JoinSet;

fn must<T, E: std::fmt::Debug>(r: std::result::Result<T, E>) -> T {
    match r {
        Ok(v) => v,
        Err(e) => panic!("unexpected Err: {e:?}"),
    }
}

fn must_err<T: std::fmt::Debug>(r: fantasy_store::Result<T>) -> StoreError {
    match r {
        Ok(v) => panic!("expected Err, got Ok({v:?})"),
        Err(e) => e,
    }
}

fn id(value: u64) -> RecordId {
    RecordId::new(value)
}

fn ids(values: &[u64]) -> Vec<RecordId> {
    values.iter().copied().map(RecordId::new).collect()
}

async fn create_file_store() -> (FantasyStore, TempDir) {
    let temp_dir = must(TempDir::new());
    let store = must(FantasyStore::open(StoreConfig::new(temp_dir.path())).await);
    (store, temp_dir)
}

fn create_memory_store() -> (FantasyStore, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let store = FantasyStore::with_storage(StoreConfig::default(), storage.clone());
    (store, storage)
}

mod scenarios {
    use super::*;

    #[tokio::test]
    async fn test_sequential_driver_ids() {
        let (store, _temp_dir) = create_file_store().await;

        let a = must(store.create_driver(Driver::named("A")).await);
        let b = must(store.create_driver(Driver::named("B")).await);

        assert_eq!(a.id, id(1));
        assert_eq!(b.id, id(2));
    }

    #[tokio::test]
    async fn test_transfer_frees_outgoing_driver() {
        let (store, _temp_dir) = create_file_store().await;
        for name in ["A", "B", "C"] {
            must(store.create_driver(Driver::named(name)).await);
        }
        must(store.create_team(Team::named("T", ids(&[1, 2]))).await);

        let team = must(store.transfer(id(1), id(1), id(3)).await);
        assert_eq!(team.driver_ids, ids(&[3, 2]));

        let free: Vec<_> = must(store.list_free_agents().await)
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(free, ids(&[1]));
        assert_eq!(must(store.get_team(id(1)).await).driver_ids, ids(&[3, 2]));
    }

    #[tokio::test]
    async fn test_duplicate_result_conflict() {
        let (store, storage) = create_memory_store();
        for _ in 0..7 {
            must(store.create_driver(Driver::named("D")).await);
        }
        for _ in 0..5 {
            must(store.create_race(Race::named("R")).await);
        }
        must(
            store
                .create_result(ResultCategory::Race, SessionResult::new(id(5), id(7)))
                .await,
        );
        let before = storage.document("race_results");

        let err = must_err(
            store
                .create_result(ResultCategory::Race, SessionResult::new(id(5), id(7)))
                .await,
        );

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(
            err.to_string(),
            "A race result for driver 7 in race 5 already exists"
        );
        assert_eq!(must(store.list_results(ResultCategory::Race).await).len(), 1);
        assert_eq!(storage.document("race_results"), before);
    }

    #[tokio::test]
    async fn test_transfer_missing_team_writes_nothing() {
        let (store, temp_dir) = create_file_store().await;

        let err = must_err(store.transfer(id(99), id(1), id(2)).await);

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Team with ID 99 not found");
        assert!(!temp_dir.path().join("teams.json").exists());
    }
}

mod record_lifecycle {
    use super::*;

    #[tokio::test]
    async fn test_full_lifecycle_survives_reopen() {
        let (store, temp_dir) = create_file_store().await;

        let payload = json!({"id": 500, "name": "Suzuka", "has_sprint": false, "round": 4});
        let race: Race = must(decode_payload("Race", payload));
        let created = must(store.create_race(race).await);
        assert_eq!(created.id, id(1));

        drop(store);
        let reopened = must(FantasyStore::open(StoreConfig::new(temp_dir.path())).await);

        let loaded = must(reopened.get_race(id(1)).await);
        assert_eq!(loaded.attributes.get("round"), Some(&json!(4)));

        let document = must(std::fs::read_to_string(temp_dir.path().join("races.json")));
        let parsed: serde_json::Value = must(serde_json::from_str(&document));
        assert_eq!(parsed, json!([{"id": 1, "name": "Suzuka", "has_sprint": false, "round": 4}]));
        assert!(document.contains("\n  {\n    \""));
    }

    #[tokio::test]
    async fn test_update_and_delete_leave_others_alone() {
        let (store, _storage) = create_memory_store();
        for name in ["A", "B", "C"] {
            must(store.create_driver(Driver::named(name)).await);
        }

        let updated = must(store.update_driver(id(2), Driver::named("B2")).await);
        assert_eq!(updated.id, id(2));
        must(store.delete_driver(id(1)).await);

        let drivers = must(store.list_drivers().await);
        let summary: Vec<_> = drivers.iter().map(|d| (d.id, d.name())).collect();
        assert_eq!(summary, vec![(id(2), Some("B2")), (id(3), Some("C"))]);
    }

    #[tokio::test]
    async fn test_ids_follow_highest_present() {
        let (store, _storage) = create_memory_store();
        for name in ["A", "B", "C"] {
            must(store.create_race(Race::named(name)).await);
        }
        must(store.delete_race(id(2)).await);

        let next = must(store.create_race(Race::named("D")).await);
        assert_eq!(next.id, id(4));

        must(store.delete_race(id(4)).await);
        let reused = must(store.create_race(Race::named("E")).await);
        assert_eq!(reused.id, id(4));
    }

    #[tokio::test]
    async fn test_corrupt_document_is_storage_unavailable() {
        let storage = Arc::new(MemoryStorage::new().with_document("teams", "[{\"id\": "));
        let store = FantasyStore::with_storage(StoreConfig::default(), storage);

        let err = must_err(store.list_teams().await);
        assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
    }

    #[tokio::test]
    async fn test_missing_records_are_not_found() {
        let (store, storage) = create_memory_store();

        assert_eq!(must_err(store.get_driver(id(1)).await).kind(), ErrorKind::NotFound);
        assert_eq!(
            must_err(store.update_team(id(1), Team::named("x", vec![])).await).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            must_err(store.delete_result(ResultCategory::Sprint, id(1)).await).to_string(),
            "Sprint result with ID 1 not found"
        );
        assert_eq!(storage.write_count(), 0);
    }
}

mod concurrency {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_distinct_ids() {
        let (store, _temp_dir) = create_file_store().await;
        let store = Arc::new(store);

        let mut tasks = JoinSet::new();
        for n in 0..20 {
            let store = Arc::clone(&store);
            tasks.spawn(async move { store.create_driver(Driver::named(format!("D{n}"))).await });
        }

        let mut created = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            created.push(must(must(joined)).id);
        }
        created.sort();

        assert_eq!(created, (1..=20).map(RecordId::new).collect::<Vec<_>>());
        assert_eq!(must(store.list_drivers().await).len(), 20);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_duplicate_results_admit_one() {
        let storage = Arc::new(MemoryStorage::new());
        let config = StoreConfig::default().with_result_reference_checks(false);
        let store = Arc::new(FantasyStore::with_storage(config, storage));

        let mut tasks = JoinSet::new();
        for _ in 0..10 {
            let store = Arc::clone(&store);
            tasks.spawn(async move {
                store
                    .create_result(ResultCategory::Qualifying, SessionResult::new(id(1), id(1)))
                    .await
            });
        }

        let mut accepted = 0;
        let mut conflicts = 0;
        while let Some(joined) = tasks.join_next().await {
            match must(joined) {
                Ok(_) => accepted += 1,
                Err(e) if e.kind() == ErrorKind::Conflict => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!((accepted, conflicts), (1, 9));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_transfers_of_one_free_agent() {
        let (store, _storage) = create_memory_store();
        for n in 0..3 {
            must(store.create_driver(Driver::named(format!("D{n}"))).await);
        }
        must(store.create_team(Team::named("T1", ids(&[1]))).await);
        must(store.create_team(Team::named("T2", ids(&[2]))).await);
        let store = Arc::new(store);

        let first = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.transfer(id(1), id(1), id(3)).await })
        };
        let second = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.transfer(id(2), id(2), id(3)).await })
        };
        let outcomes = [must(first.await), must(second.await)];

        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        let rosters: Vec<_> = must(store.list_teams().await)
            .into_iter()
            .flat_map(|t| t.driver_ids)
            .filter(|d| *d == id(3))
            .collect();
        assert_eq!(rosters.len(), 1);
    }
}

mod results {
    use super::*;

    #[tokio::test]
    async fn test_categories_are_independent() {
        let (store, _temp_dir) = create_file_store().await;
        must(store.create_driver(Driver::named("A")).await);
        must(store.create_race(Race::named("R")).await);

        for category in ResultCategory::ALL {
            let created = must(
                store
                    .create_result(category, SessionResult::new(id(1), id(1)))
                    .await,
            );
            assert_eq!(created.id, id(1));
        }
    }

    #[tokio::test]
    async fn test_dedupe_writes_backup_file() {
        let temp_dir = must(TempDir::new());
        let duplicated = json!([
            {"id": 1, "race_id": 1, "driver_id": 1, "position": 1},
            {"id": 2, "race_id": 1, "driver_id": 1, "position": 2},
            {"id": 3, "race_id": 1, "driver_id": 2, "position": 3}
        ]);
        must(std::fs::write(
            temp_dir.path().join("sprint_results.json"),
            must(serde_json::to_string_pretty(&duplicated)),
        ));
        let store = must(FantasyStore::open(StoreConfig::new(temp_dir.path())).await);

        let report = must(store.clean_duplicates(ResultCategory::Sprint).await);

        assert_eq!(report.kept, 2);
        assert_eq!(report.removed.len(), 1);
        let backup = must(report.backup.ok_or("backup locator"));
        let backed_up: serde_json::Value =
            must(serde_json::from_str(&must(std::fs::read_to_string(&backup))));
        assert_eq!(backed_up, duplicated);

        let kept: Vec<_> = must(store.list_results(ResultCategory::Sprint).await)
            .into_iter()
            .map(|r| (r.id, r.position()))
            .collect();
        assert_eq!(kept, vec![(id(1), Some(1)), (id(3), Some(3))]);
    }

    #[tokio::test]
    async fn test_team_points_across_categories() {
        let (store, _storage) = create_memory_store();
        for name in ["A", "B"] {
            must(store.create_driver(Driver::named(name)).await);
        }
        must(store.create_race(Race::named("R")).await);
        must(store.create_team(Team::named("T", ids(&[2, 1]))).await);

        let sprint_win = SessionResult::new(id(1), id(1)).with_attribute("position", 1);
        must(store.create_result(ResultCategory::Sprint, sprint_win).await);
        let shootout = SessionResult::new(id(1), id(2)).with_attribute("position", 3);
        must(store.create_result(ResultCategory::SprintQualifying, shootout).await);

        let points = must(store.team_points(id(1)).await);

        let per_driver: Vec<_> = points.drivers.iter().map(|d| (d.driver_id, d.points)).collect();
        assert_eq!(per_driver, vec![(id(2), 6), (id(1), 8)]);
        assert_eq!(points.total, 14);
    }
}

mod standings {
    use super::*;

    fn driver(name: &str, constructor: &str) -> Driver {
        let mut driver = Driver::named(name);
        driver
            .attributes
            .insert("constructor".to_string(), json!(constructor));
        driver
    }

    fn placed(race: u64, driver: u64, position: u32) -> SessionResult {
        SessionResult::new(id(race), id(driver)).with_attribute("position", position)
    }

    #[tokio::test]
    async fn test_weekend_scoring_feeds_standings() {
        let (store, _temp_dir) = create_file_store().await;
        must(store.create_driver(driver("Charles", "Ferrari")).await);
        must(store.create_driver(driver("Lewis", "Ferrari")).await);
        must(store.create_driver(driver("Max", "Red Bull")).await);
        must(store.create_race(Race::named("Monza")).await);
        must(store.create_team(Team::named("Tifosi", ids(&[1, 2]))).await);
        must(store.create_team(Team::named("Bulls", ids(&[3]))).await);

        for (driver, position) in [(1, 5), (2, 2), (3, 1)] {
            must(store.create_result(ResultCategory::Qualifying, placed(1, driver, position)).await);
        }
        for (driver, position) in [(1, 1), (2, 3), (3, 2)] {
            must(store.create_result(ResultCategory::Race, placed(1, driver, position)).await);
        }

        let standings = must(store.standings().await);

        // Charles: Q5 2, race win 25 + 4 gained + 2 beating Lewis
        // Lewis: Q2 8 + 2 beating Charles, race P3 15
        // Max: Q1 12, race P2 18, no teammate
        let drivers: Vec<_> = standings
            .drivers
            .iter()
            .map(|row| (row.name.as_deref(), row.points))
            .collect();
        assert_eq!(
            drivers,
            vec![(Some("Charles"), 33), (Some("Max"), 30), (Some("Lewis"), 25)]
        );
        let teams: Vec<_> = standings.teams.iter().map(|row| (row.team_id, row.points)).collect();
        assert_eq!(teams, vec![(id(1), 58), (id(2), 30)]);

        let tifosi = must(store.team_points(id(1)).await);
        assert_eq!(tifosi.total, 58);
    }

    #[tokio::test]
    async fn test_deleted_driver_drops_from_both_tables() {
        let (store, _storage) = create_memory_store();
        for name in ["A", "B"] {
            must(store.create_driver(Driver::named(name)).await);
        }
        must(store.create_race(Race::named("R")).await);
        must(store.create_team(Team::named("T", ids(&[1, 2]))).await);
        must(store.create_result(ResultCategory::Sprint, placed(1, 1, 1)).await);
        must(store.create_result(ResultCategory::Sprint, placed(1, 2, 2)).await);

        must(store.delete_driver(id(1)).await);
        let standings = must(store.standings().await);

        assert_eq!(standings.drivers.len(), 1);
        assert_eq!(standings.drivers[0].points, 7);
        assert_eq!(standings.teams[0].points, 7);
        assert_eq!(must(store.team_points(id(1)).await).total, 7);
    }
}
