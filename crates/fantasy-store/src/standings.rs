//! League standings for drivers and fantasy teams

use crate::record::RecordId;
use crate::store::FantasyStore;
use crate::Result;
use serde::Serialize;
use tracing::debug;

/// One row of the driver table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverStanding {
    /// Driver identifier
    pub driver_id: RecordId,
    /// Driver name, if the record carries one
    pub name: Option<String>,
    /// Points across every stored result
    pub points: i64,
}

/// One row of the team table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamStanding {
    /// Team identifier
    pub team_id: RecordId,
    /// Team name, if the record carries one
    pub name: Option<String>,
    /// Sum of the points of rostered drivers that still exist
    pub points: i64,
}

/// Driver and team tables, each ordered by points, highest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standings {
    /// Every driver
    pub drivers: Vec<DriverStanding>,
    /// Every team
    pub teams: Vec<TeamStanding>,
}

impl FantasyStore {
    /// Score every driver and team over all stored results.
    ///
    /// Results for deleted drivers are ignored, and so are roster entries
    /// naming them. Ties keep insertion order.
    pub async fn standings(&self) -> Result<Standings> {
        let _drivers_guard = self.drivers.lock().await;
        let _teams_guard = self.teams.lock().await;
        let drivers = self.drivers.load().await?;
        let teams = self.teams.load().await?;
        let season = self.load_season(&drivers).await?;

        let mut driver_table: Vec<DriverStanding> = drivers
            .iter()
            .map(|driver| DriverStanding {
                driver_id: driver.id,
                name: driver.name().map(str::to_string),
                points: season.driver_points(driver.id),
            })
            .collect();

        let mut team_table: Vec<TeamStanding> = teams
            .iter()
            .map(|team| TeamStanding {
                team_id: team.id,
                name: team.name().map(str::to_string),
                points: team
                    .driver_ids
                    .iter()
                    .filter_map(|id| driver_table.iter().find(|row| row.driver_id == *id))
                    .map(|row| row.points)
                    .sum(),
            })
            .collect();

        driver_table.sort_by(|a, b| b.points.cmp(&a.points));
        team_table.sort_by(|a, b| b.points.cmp(&a.points));
        debug!(
            drivers = driver_table.len(),
            teams = team_table.len(),
            "Computed standings"
        );
        Ok(Standings {
            drivers: driver_table,
            teams: team_table,
        })
    }
}
