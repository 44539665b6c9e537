//! Driver transfers between a team and the free-agent pool

use crate::error::StoreError;
use crate::record::{RecordId, Team};
use crate::rules;
use crate::store::FantasyStore;
use crate::Result;
use tracing::{info, warn};

impl FantasyStore {
    /// Swap `current_driver_id` on a team's roster for the free agent
    /// `new_driver_id`.
    ///
    /// Preconditions are checked in this order and the first failure is
    /// returned:
    ///
    /// 1. the team exists (not found)
    /// 2. the current driver is on its roster (invalid request)
    /// 3. the new driver exists (not found)
    /// 4. the new driver is on no roster, this team's included (conflict)
    ///
    /// An already-rostered driver is an
    /// [`ErrorKind::Conflict`](crate::ErrorKind::Conflict), the same
    /// class as the roster checks on team create and update.
    ///
    /// Every roster slot holding the current driver is replaced, so order and
    /// length are preserved. Nothing is written unless all checks pass.
    pub async fn transfer(
        &self,
        team_id: RecordId,
        current_driver_id: RecordId,
        new_driver_id: RecordId,
    ) -> Result<Team> {
        let _drivers_guard = self.drivers.lock().await;
        let _teams_guard = self.teams.lock().await;

        let teams = self.teams.load().await?;
        let team = teams
            .get(team_id)
            .ok_or_else(|| StoreError::not_found(self.teams.id().kind(), team_id))?;

        if !team.has_driver(current_driver_id) {
            warn!(
                team_id = %team_id,
                driver_id = %current_driver_id,
                "Transfer rejected: driver not on team"
            );
            return Err(StoreError::NotOnTeam {
                driver_id: current_driver_id,
                team_id,
            });
        }

        let drivers = self.drivers.load().await?;
        if drivers.get(new_driver_id).is_none() {
            return Err(StoreError::not_found(
                self.drivers.id().kind(),
                new_driver_id,
            ));
        }

        if let Some(holder) = rules::rostering_team(&teams, new_driver_id) {
            warn!(
                team_id = %team_id,
                driver_id = %new_driver_id,
                holder = %holder.id,
                "Transfer rejected: driver already rostered"
            );
            return Err(StoreError::AlreadyRostered {
                driver_id: new_driver_id,
                team_id: holder.id,
            });
        }

        let mut updated = None;
        let teams = teams.replace_all(|mut team| {
            if team.id == team_id {
                team.replace_driver(current_driver_id, new_driver_id);
                updated = Some(team.clone());
            }
            team
        });
        let updated =
            updated.ok_or_else(|| StoreError::not_found(self.teams.id().kind(), team_id))?;

        self.teams.save(&teams).await?;
        info!(
            team_id = %team_id,
            current_driver_id = %current_driver_id,
            new_driver_id = %new_driver_id,
            "Driver transferred"
        );
        Ok(updated)
    }
}
