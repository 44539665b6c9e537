//! League-wide commands

use anyhow::Result;
use fantasy_store::FantasyStore;

use crate::error::CliError;
use crate::output;

/// Print driver and team standings
pub async fn standings(store: &FantasyStore, json: bool) -> Result<()> {
    let standings = store.standings().await.map_err(CliError::from)?;
    output::print_standings(&standings, json);
    Ok(())
}

/// Remove duplicate results from every category
pub async fn clean_duplicates(store: &FantasyStore, json: bool) -> Result<()> {
    let reports = store.clean_all_duplicates().await.map_err(CliError::from)?;
    output::print_dedupe_reports(&reports, json);
    Ok(())
}
