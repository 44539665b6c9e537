//! Session result commands

use anyhow::Result;
use fantasy_store::{FantasyStore, ResultCategory, SessionResult, decode_payload};

use crate::commands::{ResultCommands, ResultsArgs, read_payload};
use crate::error::CliError;
use crate::output;

/// Execute result command for one category
pub async fn execute(store: &FantasyStore, args: &ResultsArgs, json: bool) -> Result<()> {
    let category = ResultCategory::from(args.category);
    let kind = category.kind();

    match &args.action {
        ResultCommands::List => {
            let results = store.list_results(category).await.map_err(CliError::from)?;
            output::print_records(&format!("{}s", kind), &results, json);
        }
        ResultCommands::Get { id } => {
            let result = store.get_result(category, *id).await.map_err(CliError::from)?;
            output::print_record(&result, json);
        }
        ResultCommands::Create { payload } => {
            let result: SessionResult =
                decode_payload(kind, read_payload(payload)?).map_err(CliError::from)?;
            let created = store
                .create_result(category, result)
                .await
                .map_err(CliError::from)?;
            output::print_saved(&format!("{} {} created", kind, created.id), &created, json);
        }
        ResultCommands::Update { id, payload } => {
            let result: SessionResult =
                decode_payload(kind, read_payload(payload)?).map_err(CliError::from)?;
            let updated = store
                .update_result(category, *id, result)
                .await
                .map_err(CliError::from)?;
            output::print_saved(&format!("{} {} updated", kind, id), &updated, json);
        }
        ResultCommands::Delete { id } => {
            store
                .delete_result(category, *id)
                .await
                .map_err(CliError::from)?;
            output::print_success(&format!("{} {} deleted", kind, id), json);
        }
        ResultCommands::ByRace { race } => {
            let results = store
                .list_results_by_race(category, *race)
                .await
                .map_err(CliError::from)?;
            output::print_records(&format!("{}s for race {}", kind, race), &results, json);
        }
        ResultCommands::CleanDuplicates => {
            let report = store
                .clean_duplicates(category)
                .await
                .map_err(CliError::from)?;
            output::print_dedupe_report(&report, json);
        }
    }
    Ok(())
}
