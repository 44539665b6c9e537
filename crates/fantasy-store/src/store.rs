//! Record store facade
//!
//! [`FantasyStore`] owns one [`Collection`] per persisted document and
//! exposes the record operations request handlers call. Every mutation runs
//! a full load → validate → mutate → save cycle under the lock of each
//! collection it touches; validation failures return before anything is
//! written.

use crate::collection::{Collection, CollectionId, Records};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::record::{Driver, Race, Record, RecordId, ResultCategory, SessionResult, Team};
use crate::rules;
use crate::scoring::Season;
use crate::storage::{BackingStore, FileStorage};
use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::MutexGuard;
use tracing::{debug, info, warn};

/// Fantasy points earned by one rostered driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverPoints {
    /// Driver identifier
    pub driver_id: RecordId,
    /// Points across every stored result
    pub points: i64,
}

/// Fantasy points for a team, per driver in roster order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamPoints {
    /// Team identifier
    pub team_id: RecordId,
    /// Per-driver totals
    pub drivers: Vec<DriverPoints>,
    /// Sum of per-driver totals
    pub total: i64,
}

/// Decode a caller payload into a record, discarding any caller-supplied id
pub fn decode_payload<T: DeserializeOwned>(kind: &str, mut payload: Value) -> Result<T> {
    if let Some(object) = payload.as_object_mut() {
        object.remove("id");
    }
    serde_json::from_value(payload).map_err(|e| StoreError::invalid_payload(kind, e))
}

/// Record store over drivers, teams, races and the four result categories
pub struct FantasyStore {
    config: StoreConfig,
    pub(crate) drivers: Collection<Driver>,
    pub(crate) teams: Collection<Team>,
    pub(crate) races: Collection<Race>,
    pub(crate) race_results: Collection<SessionResult>,
    pub(crate) sprint_results: Collection<SessionResult>,
    pub(crate) qualifying_results: Collection<SessionResult>,
    pub(crate) sprint_qualifying_results: Collection<SessionResult>,
}

impl std::fmt::Debug for FantasyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FantasyStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FantasyStore {
    /// Open a file-backed store, creating the data directory if needed
    pub async fn open(config: StoreConfig) -> Result<Self> {
        let storage = FileStorage::with_config(config.storage_config())
            .await
            .map_err(|e| StoreError::storage(config.data_dir.display().to_string(), e))?;
        info!(data_dir = ?config.data_dir, "Opened record store");
        Ok(Self::with_storage(config, Arc::new(storage)))
    }

    /// Build a store over any backing store
    pub fn with_storage(config: StoreConfig, storage: Arc<dyn BackingStore>) -> Self {
        let results = |category| {
            Collection::new(CollectionId::Results(category), Arc::clone(&storage))
        };
        Self {
            drivers: Collection::new(CollectionId::Drivers, Arc::clone(&storage)),
            teams: Collection::new(CollectionId::Teams, Arc::clone(&storage)),
            races: Collection::new(CollectionId::Races, Arc::clone(&storage)),
            race_results: results(ResultCategory::Race),
            sprint_results: results(ResultCategory::Sprint),
            qualifying_results: results(ResultCategory::Qualifying),
            sprint_qualifying_results: results(ResultCategory::SprintQualifying),
            config,
        }
    }

    /// Get the store configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Plain reads take the collection lock only when saves are not atomic
    fn locks_reads(&self) -> bool {
        !self.config.atomic_writes
    }

    pub(crate) fn results(&self, category: ResultCategory) -> &Collection<SessionResult> {
        match category {
            ResultCategory::Race => &self.race_results,
            ResultCategory::Sprint => &self.sprint_results,
            ResultCategory::Qualifying => &self.qualifying_results,
            ResultCategory::SprintQualifying => &self.sprint_qualifying_results,
        }
    }

    // Drivers

    /// All drivers in insertion order
    pub async fn list_drivers(&self) -> Result<Vec<Driver>> {
        list_in(&self.drivers, self.locks_reads()).await
    }

    /// Driver by id
    pub async fn get_driver(&self, id: RecordId) -> Result<Driver> {
        get_in(&self.drivers, id, self.locks_reads()).await
    }

    /// Create a driver with a fresh id
    pub async fn create_driver(&self, driver: Driver) -> Result<Driver> {
        let _guard = self.drivers.lock().await;
        let mut records = self.drivers.load().await?;
        let created = records.insert(driver)?;
        self.drivers.save(&records).await?;
        log_created(self.drivers.id(), created.id);
        Ok(created)
    }

    /// Replace a driver's payload, keeping its id
    pub async fn update_driver(&self, id: RecordId, driver: Driver) -> Result<Driver> {
        update_in(&self.drivers, id, driver).await
    }

    /// Delete a driver.
    ///
    /// Rosters that still name the driver are left as they are.
    pub async fn delete_driver(&self, id: RecordId) -> Result<Driver> {
        delete_in(&self.drivers, id).await
    }

    /// Drivers that appear on no team roster
    pub async fn list_free_agents(&self) -> Result<Vec<Driver>> {
        let _drivers_guard = self.drivers.lock().await;
        let _teams_guard = self.teams.lock().await;
        let drivers = self.drivers.load().await?;
        let teams = self.teams.load().await?;
        let free = rules::free_agents(&drivers, &teams);
        debug!(
            drivers = drivers.len(),
            free_agents = free.len(),
            "Computed free agents"
        );
        Ok(free)
    }

    // Teams

    /// All teams in insertion order
    pub async fn list_teams(&self) -> Result<Vec<Team>> {
        list_in(&self.teams, self.locks_reads()).await
    }

    /// Team by id
    pub async fn get_team(&self, id: RecordId) -> Result<Team> {
        get_in(&self.teams, id, self.locks_reads()).await
    }

    /// Create a team with a fresh id.
    ///
    /// Fails with a conflict if the roster names a driver already on another
    /// team.
    pub async fn create_team(&self, team: Team) -> Result<Team> {
        let _guard = self.teams.lock().await;
        let mut records = self.teams.load().await?;
        ensure_roster_free(&records, &team, None)?;
        let created = records.insert(team)?;
        self.teams.save(&records).await?;
        log_created(self.teams.id(), created.id);
        Ok(created)
    }

    /// Replace a team's payload, keeping its id.
    ///
    /// Fails with a conflict if the new roster names a driver on another team.
    pub async fn update_team(&self, id: RecordId, team: Team) -> Result<Team> {
        let _guard = self.teams.lock().await;
        let mut records = self.teams.load().await?;
        if records.get(id).is_none() {
            return Err(StoreError::not_found(self.teams.id().kind(), id));
        }
        ensure_roster_free(&records, &team, Some(id))?;
        let updated = records
            .replace(id, team)
            .ok_or_else(|| StoreError::not_found(self.teams.id().kind(), id))?;
        self.teams.save(&records).await?;
        log_updated(self.teams.id(), id);
        Ok(updated)
    }

    /// Delete a team; its drivers become free agents
    pub async fn delete_team(&self, id: RecordId) -> Result<Team> {
        delete_in(&self.teams, id).await
    }

    /// Fantasy points for a team's current roster across every stored result.
    ///
    /// Roster entries naming a deleted driver are reported with zero points.
    pub async fn team_points(&self, team_id: RecordId) -> Result<TeamPoints> {
        let _drivers_guard = self.drivers.lock().await;
        let _teams_guard = self.teams.lock().await;
        let drivers = self.drivers.load().await?;
        let team = self
            .teams
            .load()
            .await?
            .get(team_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(self.teams.id().kind(), team_id))?;
        let season = self.load_season(&drivers).await?;

        let roster: Vec<DriverPoints> = team
            .driver_ids
            .iter()
            .map(|driver_id| DriverPoints {
                driver_id: *driver_id,
                points: if drivers.get(*driver_id).is_some() {
                    season.driver_points(*driver_id)
                } else {
                    0
                },
            })
            .collect();

        let total: i64 = roster.iter().map(|d| d.points).sum();
        debug!(team_id = %team_id, total, "Computed team points");
        Ok(TeamPoints {
            team_id,
            drivers: roster,
            total,
        })
    }

    /// Load every result category for scoring.
    ///
    /// Caller must already hold any driver and team locks it needs; result
    /// locks are taken here, in order, and released once all are loaded.
    pub(crate) async fn load_season(&self, drivers: &Records<Driver>) -> Result<Season> {
        let mut guards = Vec::with_capacity(ResultCategory::ALL.len());
        let mut season = Season::new(drivers.as_slice());
        for category in ResultCategory::ALL {
            let collection = self.results(category);
            guards.push(collection.lock().await);
            season = season.with_results(category, collection.load().await?.into_vec());
        }
        drop(guards);
        Ok(season)
    }

    // Races

    /// All races in insertion order
    pub async fn list_races(&self) -> Result<Vec<Race>> {
        list_in(&self.races, self.locks_reads()).await
    }

    /// Race by id
    pub async fn get_race(&self, id: RecordId) -> Result<Race> {
        get_in(&self.races, id, self.locks_reads()).await
    }

    /// Create a race with a fresh id
    pub async fn create_race(&self, race: Race) -> Result<Race> {
        let _guard = self.races.lock().await;
        let mut records = self.races.load().await?;
        let created = records.insert(race)?;
        self.races.save(&records).await?;
        log_created(self.races.id(), created.id);
        Ok(created)
    }

    /// Replace a race's payload, keeping its id
    pub async fn update_race(&self, id: RecordId, race: Race) -> Result<Race> {
        update_in(&self.races, id, race).await
    }

    /// Delete a race
    pub async fn delete_race(&self, id: RecordId) -> Result<Race> {
        delete_in(&self.races, id).await
    }

    // Results

    /// All results of a category in insertion order
    pub async fn list_results(&self, category: ResultCategory) -> Result<Vec<SessionResult>> {
        list_in(self.results(category), self.locks_reads()).await
    }

    /// Results of a category for one race
    pub async fn list_results_by_race(
        &self,
        category: ResultCategory,
        race_id: RecordId,
    ) -> Result<Vec<SessionResult>> {
        let collection = self.results(category);
        let _guard = read_guard(collection, self.locks_reads()).await;
        let records = collection.load().await?;
        Ok(records.filter(|result| result.race_id == race_id))
    }

    /// Result by id
    pub async fn get_result(&self, category: ResultCategory, id: RecordId) -> Result<SessionResult> {
        get_in(self.results(category), id, self.locks_reads()).await
    }

    /// Create a result with a fresh id.
    ///
    /// Checks, in order: no existing result for the same driver in the same
    /// race (conflict), then, when reference checks are enabled, that the
    /// driver and race exist (not found).
    pub async fn create_result(
        &self,
        category: ResultCategory,
        result: SessionResult,
    ) -> Result<SessionResult> {
        let collection = self.results(category);
        let _drivers_guard = self.drivers.lock().await;
        let _races_guard = self.races.lock().await;
        let _results_guard = collection.lock().await;

        let mut records = collection.load().await?;
        if let Err(e) = rules::ensure_unique_result(category, &records, &result) {
            warn!(
                category = %category,
                race_id = %result.race_id,
                driver_id = %result.driver_id,
                "Rejected duplicate result"
            );
            return Err(e);
        }
        self.ensure_result_references(&result).await?;

        let created = records.insert(result)?;
        collection.save(&records).await?;
        log_created(collection.id(), created.id);
        Ok(created)
    }

    /// Replace a result's payload, keeping its id.
    ///
    /// The new (race, driver) pair must not belong to a different result of
    /// the same category.
    pub async fn update_result(
        &self,
        category: ResultCategory,
        id: RecordId,
        result: SessionResult,
    ) -> Result<SessionResult> {
        let collection = self.results(category);
        let _drivers_guard = self.drivers.lock().await;
        let _races_guard = self.races.lock().await;
        let _results_guard = collection.lock().await;

        let mut records = collection.load().await?;
        if records.get(id).is_none() {
            return Err(StoreError::not_found(collection.id().kind(), id));
        }
        let key = result.key();
        if records
            .find(|existing| existing.id != id && existing.key() == key)
            .is_some()
        {
            return Err(StoreError::duplicate_result(
                category.label(),
                result.race_id,
                result.driver_id,
            ));
        }
        self.ensure_result_references(&result).await?;

        let updated = records
            .replace(id, result)
            .ok_or_else(|| StoreError::not_found(collection.id().kind(), id))?;
        collection.save(&records).await?;
        log_updated(collection.id(), id);
        Ok(updated)
    }

    /// Delete a result
    pub async fn delete_result(&self, category: ResultCategory, id: RecordId) -> Result<SessionResult> {
        delete_in(self.results(category), id).await
    }

    /// Caller must hold the driver and race locks
    async fn ensure_result_references(&self, result: &SessionResult) -> Result<()> {
        if !self.config.check_result_references {
            return Ok(());
        }
        if self.drivers.load().await?.get(result.driver_id).is_none() {
            return Err(StoreError::not_found(
                self.drivers.id().kind(),
                result.driver_id,
            ));
        }
        if self.races.load().await?.get(result.race_id).is_none() {
            return Err(StoreError::not_found(self.races.id().kind(), result.race_id));
        }
        Ok(())
    }
}

/// A roster may not name a driver that another team already holds.
/// `own_id` excludes the team being updated from the check.
fn ensure_roster_free(teams: &Records<Team>, team: &Team, own_id: Option<RecordId>) -> Result<()> {
    for driver_id in &team.driver_ids {
        if let Some(holder) = teams.find(|t| Some(t.id) != own_id && t.has_driver(*driver_id)) {
            return Err(StoreError::AlreadyRostered {
                driver_id: *driver_id,
                team_id: holder.id,
            });
        }
    }
    Ok(())
}

/// Without temp-file renames a reader could see a half-written document
async fn read_guard<T: Record>(
    collection: &Collection<T>,
    lock: bool,
) -> Option<MutexGuard<'_, ()>> {
    if lock {
        Some(collection.lock().await)
    } else {
        None
    }
}

async fn list_in<T: Record>(collection: &Collection<T>, lock: bool) -> Result<Vec<T>> {
    let _guard = read_guard(collection, lock).await;
    let records = collection.load().await?;
    debug!(collection = %collection.id(), count = records.len(), "Listed records");
    Ok(records.into_vec())
}

async fn get_in<T: Record>(collection: &Collection<T>, id: RecordId, lock: bool) -> Result<T> {
    let _guard = read_guard(collection, lock).await;
    collection
        .load()
        .await?
        .get(id)
        .cloned()
        .ok_or_else(|| StoreError::not_found(collection.id().kind(), id))
}

async fn update_in<T: Record>(collection: &Collection<T>, id: RecordId, record: T) -> Result<T> {
    let _guard = collection.lock().await;
    let mut records = collection.load().await?;
    let updated = records
        .replace(id, record)
        .ok_or_else(|| StoreError::not_found(collection.id().kind(), id))?;
    collection.save(&records).await?;
    log_updated(collection.id(), id);
    Ok(updated)
}

async fn delete_in<T: Record>(collection: &Collection<T>, id: RecordId) -> Result<T> {
    let _guard = collection.lock().await;
    let mut records = collection.load().await?;
    let removed = records
        .remove(id)
        .ok_or_else(|| StoreError::not_found(collection.id().kind(), id))?;
    collection.save(&records).await?;
    info!(collection = %collection.id(), id = %id, "Record deleted");
    Ok(removed)
}

fn log_created(collection: CollectionId, id: RecordId) {
    info!(collection = %collection, id = %id, "Record created");
}

fn log_updated(collection: CollectionId, id: RecordId) {
    info!(collection = %collection, id = %id, "Record updated");
}
