//! Uniqueness and roster integrity rules
//!
//! Pure checks over loaded snapshots. Nothing here touches storage; callers
//! run these before mutating and saving.

use crate::collection::Records;
use crate::error::StoreError;
use crate::record::{Driver, RecordId, ResultCategory, SessionResult, Team};
use crate::Result;
use std::collections::BTreeSet;

/// Reject `candidate` if its category already holds a result for the same
/// driver in the same race
pub fn ensure_unique_result(
    category: ResultCategory,
    existing: &Records<SessionResult>,
    candidate: &SessionResult,
) -> Result<()> {
    let key = candidate.key();
    if existing.find(|result| result.key() == key).is_some() {
        return Err(StoreError::duplicate_result(
            category.label(),
            candidate.race_id,
            candidate.driver_id,
        ));
    }
    Ok(())
}

/// Union of every team's roster
pub fn assigned_driver_ids<'a, I>(teams: I) -> BTreeSet<RecordId>
where
    I: IntoIterator<Item = &'a Team>,
{
    teams
        .into_iter()
        .flat_map(|team| team.driver_ids.iter().copied())
        .collect()
}

/// Drivers that appear on no roster, in driver insertion order
pub fn free_agents(drivers: &Records<Driver>, teams: &Records<Team>) -> Vec<Driver> {
    let assigned = assigned_driver_ids(teams);
    drivers.filter(|driver| !assigned.contains(&driver.id))
}

/// First team whose roster holds `driver_id`
pub fn rostering_team(teams: &Records<Team>, driver_id: RecordId) -> Option<&Team> {
    teams.find(|team| team.has_driver(driver_id))
}

/// Results that repeat an earlier (race, driver) pair, in insertion order.
///
/// The first occurrence of each pair is not included.
pub fn duplicate_results(results: &Records<SessionResult>) -> Vec<SessionResult> {
    let mut seen = BTreeSet::new();
    results.filter(|result| !seen.insert(result.key()))
}
