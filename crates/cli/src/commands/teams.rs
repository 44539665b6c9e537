//! Team and transfer commands

use anyhow::Result;
use fantasy_store::{FantasyStore, Team, decode_payload};
use tracing::debug;

use crate::commands::{TeamCommands, read_payload};
use crate::error::CliError;
use crate::output;

/// Execute team command
pub async fn execute(store: &FantasyStore, cmd: &TeamCommands, json: bool) -> Result<()> {
    match cmd {
        TeamCommands::List => {
            let teams = store.list_teams().await.map_err(CliError::from)?;
            output::print_records("Teams", &teams, json);
        }
        TeamCommands::Get { id } => {
            let team = store.get_team(*id).await.map_err(CliError::from)?;
            output::print_record(&team, json);
        }
        TeamCommands::Create { payload } => {
            let team: Team =
                decode_payload("Team", read_payload(payload)?).map_err(CliError::from)?;
            let created = store.create_team(team).await.map_err(CliError::from)?;
            output::print_saved(&format!("Team {} created", created.id), &created, json);
        }
        TeamCommands::Update { id, payload } => {
            let team: Team =
                decode_payload("Team", read_payload(payload)?).map_err(CliError::from)?;
            let updated = store.update_team(*id, team).await.map_err(CliError::from)?;
            output::print_saved(&format!("Team {} updated", id), &updated, json);
        }
        TeamCommands::Delete { id } => {
            store.delete_team(*id).await.map_err(CliError::from)?;
            output::print_success(&format!("Team {} deleted", id), json);
        }
        TeamCommands::Transfer {
            team,
            current,
            new_driver,
        } => {
            debug!(team = %team, current = %current, new = %new_driver, "Requesting transfer");
            let updated = store
                .transfer(*team, *current, *new_driver)
                .await
                .map_err(CliError::from)?;
            output::print_saved(
                &format!("Driver {} replaced by {} on team {}", current, new_driver, team),
                &updated,
                json,
            );
        }
        TeamCommands::Points { team } => {
            let points = store.team_points(*team).await.map_err(CliError::from)?;
            output::print_team_points(&points, json);
        }
    }
    Ok(())
}
