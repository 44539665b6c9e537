//! Fantasy point tables
//!
//! Points are signed because a non-finish costs points. The free functions
//! score one session in isolation; [`Season`] scores stored results against
//! the rest of the weekend (grid position, teammates).

use crate::record::{Driver, RecordId, ResultCategory, SessionResult};
use std::collections::BTreeMap;

const RACE_POINTS: [i64; 10] = [25, 18, 15, 12, 10, 8, 6, 4, 2, 1];
const SPRINT_POINTS: [i64; 8] = [8, 7, 6, 5, 4, 3, 2, 1];
const QUALIFYING_POINTS: [i64; 6] = [12, 8, 6, 4, 2, 1];

/// Bonus for the fastest lap, awarded only inside the points
pub const FASTEST_LAP_BONUS: i64 = 1;
/// Penalty for not finishing
pub const DNF_PENALTY: i64 = -5;
/// Points for finishing ahead of every teammate in a session
pub const TEAMMATE_BONUS: i64 = 2;

fn table_points(table: &[i64], position: u32) -> i64 {
    usize::try_from(position)
        .ok()
        .and_then(|p| p.checked_sub(1))
        .and_then(|index| table.get(index))
        .copied()
        .unwrap_or(0)
}

/// Grand prix points, with the fastest-lap bonus for a top-ten finish
pub fn race_points(position: u32, fastest_lap: bool) -> i64 {
    let mut points = table_points(&RACE_POINTS, position);
    if fastest_lap && (1..=10).contains(&position) {
        points += FASTEST_LAP_BONUS;
    }
    points
}

/// Sprint points
pub fn sprint_points(position: u32) -> i64 {
    table_points(&SPRINT_POINTS, position)
}

/// Qualifying and sprint qualifying points
pub fn qualifying_points(position: u32) -> i64 {
    table_points(&QUALIFYING_POINTS, position)
}

/// One point per place gained from the grid; places lost cost nothing
pub fn position_gain_points(qualifying_position: u32, finish_position: u32) -> i64 {
    i64::from(qualifying_position.saturating_sub(finish_position))
}

/// Penalty applied when a driver does not finish
pub fn dnf_penalty(finished: bool) -> i64 {
    if finished { 0 } else { DNF_PENALTY }
}

/// [`TEAMMATE_BONUS`] when at least one teammate was classified and every
/// one of them finished behind `position`
pub fn teammate_points(position: u32, teammate_positions: &[u32]) -> i64 {
    if !teammate_positions.is_empty() && teammate_positions.iter().all(|p| *p > position) {
        TEAMMATE_BONUS
    } else {
        0
    }
}

/// Race weekend points for one driver: race points plus places gained from
/// qualifying, minus the non-finish penalty
pub fn driver_race_points(race: &SessionResult, qualifying: &SessionResult) -> i64 {
    let (Some(finish), Some(grid)) = (race.position(), qualifying.position()) else {
        return 0;
    };
    race_points(finish, race.fastest_lap())
        + position_gain_points(grid, finish)
        + dnf_penalty(race.finished().unwrap_or(true))
}

/// Sprint points for one driver plus places gained from the sprint grid
pub fn driver_sprint_points(sprint: &SessionResult, sprint_qualifying: &SessionResult) -> i64 {
    let (Some(finish), Some(grid)) = (sprint.position(), sprint_qualifying.position()) else {
        return 0;
    };
    sprint_points(finish) + position_gain_points(grid, finish)
}

/// Points for a single stored result in its category.
///
/// A result with no recorded position scores nothing. Only race results
/// carry the fastest-lap bonus and the non-finish penalty, and the penalty
/// applies only when `finished` is explicitly false.
pub fn result_points(category: ResultCategory, result: &SessionResult) -> i64 {
    let Some(position) = result.position() else {
        return 0;
    };
    match category {
        ResultCategory::Race => {
            race_points(position, result.fastest_lap())
                + dnf_penalty(result.finished().unwrap_or(true))
        }
        ResultCategory::Sprint => sprint_points(position),
        ResultCategory::Qualifying | ResultCategory::SprintQualifying => {
            qualifying_points(position)
        }
    }
}

/// Snapshot of every result category plus driver constructors.
///
/// Scores each stored result the way a weekend is scored:
/// - race and sprint results gain places against the matching qualifying
///   result for the same race and driver, when one was classified
/// - every category adds [`teammate_points`] against drivers of the same
///   constructor in the same session
#[derive(Debug, Default)]
pub struct Season {
    constructors: BTreeMap<RecordId, String>,
    results: BTreeMap<ResultCategory, Vec<SessionResult>>,
}

impl Season {
    /// Start a season over the current drivers
    pub fn new(drivers: &[Driver]) -> Self {
        let constructors = drivers
            .iter()
            .filter_map(|d| d.constructor().map(|c| (d.id, c.to_string())))
            .collect();
        Self {
            constructors,
            results: BTreeMap::new(),
        }
    }

    /// Add the stored results of one category
    pub fn with_results(mut self, category: ResultCategory, results: Vec<SessionResult>) -> Self {
        self.results.insert(category, results);
        self
    }

    fn results(&self, category: ResultCategory) -> &[SessionResult] {
        self.results.get(&category).map(Vec::as_slice).unwrap_or_default()
    }

    /// Classified result of `category` for the same race and driver
    fn grid(&self, category: ResultCategory, result: &SessionResult) -> Option<&SessionResult> {
        self.results(category)
            .iter()
            .find(|grid| grid.key() == result.key() && grid.position().is_some())
    }

    fn teammate_bonus(&self, category: ResultCategory, result: &SessionResult) -> i64 {
        let (Some(position), Some(constructor)) =
            (result.position(), self.constructors.get(&result.driver_id))
        else {
            return 0;
        };
        let teammates: Vec<u32> = self
            .results(category)
            .iter()
            .filter(|other| other.race_id == result.race_id && other.driver_id != result.driver_id)
            .filter(|other| self.constructors.get(&other.driver_id) == Some(constructor))
            .filter_map(SessionResult::position)
            .collect();
        teammate_points(position, &teammates)
    }

    /// Points for one stored result of `category`
    pub fn points(&self, category: ResultCategory, result: &SessionResult) -> i64 {
        let session = match category {
            ResultCategory::Race => match self.grid(ResultCategory::Qualifying, result) {
                Some(grid) => driver_race_points(result, grid),
                None => result_points(category, result),
            },
            ResultCategory::Sprint => match self.grid(ResultCategory::SprintQualifying, result) {
                Some(grid) => driver_sprint_points(result, grid),
                None => result_points(category, result),
            },
            ResultCategory::Qualifying | ResultCategory::SprintQualifying => {
                result_points(category, result)
            }
        };
        session + self.teammate_bonus(category, result)
    }

    /// Total across every stored result of one driver
    pub fn driver_points(&self, driver_id: RecordId) -> i64 {
        self.results
            .iter()
            .flat_map(|(category, results)| {
                results
                    .iter()
                    .filter(move |result| result.driver_id == driver_id)
                    .map(move |result| self.points(*category, result))
            })
            .sum()
    }
}
