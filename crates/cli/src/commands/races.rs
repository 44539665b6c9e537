//! Race commands

use anyhow::Result;
use fantasy_store::{FantasyStore, Race, decode_payload};

use crate::commands::{RaceCommands, read_payload};
use crate::error::CliError;
use crate::output;

/// Execute race command
pub async fn execute(store: &FantasyStore, cmd: &RaceCommands, json: bool) -> Result<()> {
    match cmd {
        RaceCommands::List => {
            let races = store.list_races().await.map_err(CliError::from)?;
            output::print_records("Races", &races, json);
        }
        RaceCommands::Get { id } => {
            let race = store.get_race(*id).await.map_err(CliError::from)?;
            output::print_record(&race, json);
        }
        RaceCommands::Create { payload } => {
            let race: Race =
                decode_payload("Race", read_payload(payload)?).map_err(CliError::from)?;
            let created = store.create_race(race).await.map_err(CliError::from)?;
            output::print_saved(&format!("Race {} created", created.id), &created, json);
        }
        RaceCommands::Update { id, payload } => {
            let race: Race =
                decode_payload("Race", read_payload(payload)?).map_err(CliError::from)?;
            let updated = store.update_race(*id, race).await.map_err(CliError::from)?;
            output::print_saved(&format!("Race {} updated", id), &updated, json);
        }
        RaceCommands::Delete { id } => {
            store.delete_race(*id).await.map_err(CliError::from)?;
            output::print_success(&format!("Race {} deleted", id), json);
        }
    }
    Ok(())
}
