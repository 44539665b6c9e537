//! Driver commands

use anyhow::Result;
use fantasy_store::{Driver, FantasyStore, decode_payload};

use crate::commands::{DriverCommands, read_payload};
use crate::error::CliError;
use crate::output;

/// Execute driver command
pub async fn execute(store: &FantasyStore, cmd: &DriverCommands, json: bool) -> Result<()> {
    match cmd {
        DriverCommands::List => {
            let drivers = store.list_drivers().await.map_err(CliError::from)?;
            output::print_records("Drivers", &drivers, json);
        }
        DriverCommands::Get { id } => {
            let driver = store.get_driver(*id).await.map_err(CliError::from)?;
            output::print_record(&driver, json);
        }
        DriverCommands::Create { payload } => {
            let driver: Driver = decode_payload("Driver", read_payload(payload)?)
                .map_err(CliError::from)?;
            let created = store.create_driver(driver).await.map_err(CliError::from)?;
            output::print_saved(&format!("Driver {} created", created.id), &created, json);
        }
        DriverCommands::Update { id, payload } => {
            let driver: Driver = decode_payload("Driver", read_payload(payload)?)
                .map_err(CliError::from)?;
            let updated = store.update_driver(*id, driver).await.map_err(CliError::from)?;
            output::print_saved(&format!("Driver {} updated", id), &updated, json);
        }
        DriverCommands::Delete { id } => {
            store.delete_driver(*id).await.map_err(CliError::from)?;
            output::print_success(&format!("Driver {} deleted", id), json);
        }
        DriverCommands::FreeAgents => {
            let free = store.list_free_agents().await.map_err(CliError::from)?;
            output::print_records("Free agents", &free, json);
        }
    }
    Ok(())
}
