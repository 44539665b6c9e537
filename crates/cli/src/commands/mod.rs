//! Command implementations for fantasyctl CLI

pub mod drivers;
pub mod league;
pub mod races;
pub mod results;
pub mod teams;

use clap::{Args, Subcommand, ValueEnum};
use fantasy_store::{RecordId, ResultCategory};
use serde_json::Value;
use std::path::PathBuf;

use crate::error::CliError;

#[derive(Subcommand, Debug)]
pub enum DriverCommands {
    /// List all drivers
    List,

    /// Show one driver
    Get {
        /// Driver ID
        id: RecordId,
    },

    /// Create a driver from a JSON payload
    Create {
        /// Inline JSON or @path to a JSON file
        payload: String,
    },

    /// Replace a driver's fields
    Update {
        /// Driver ID
        id: RecordId,
        /// Inline JSON or @path to a JSON file
        payload: String,
    },

    /// Delete a driver
    Delete {
        /// Driver ID
        id: RecordId,
    },

    /// List drivers on no team
    FreeAgents,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommands {
    /// List all teams
    List,

    /// Show one team
    Get {
        /// Team ID
        id: RecordId,
    },

    /// Create a team from a JSON payload
    Create {
        /// Inline JSON or @path to a JSON file
        payload: String,
    },

    /// Replace a team's fields and roster
    Update {
        /// Team ID
        id: RecordId,
        /// Inline JSON or @path to a JSON file
        payload: String,
    },

    /// Delete a team
    Delete {
        /// Team ID
        id: RecordId,
    },

    /// Swap a rostered driver for a free agent
    Transfer {
        /// Team ID
        team: RecordId,
        /// Driver leaving the team
        #[arg(long)]
        current: RecordId,
        /// Free agent joining the team
        #[arg(long = "new")]
        new_driver: RecordId,
    },

    /// Fantasy points for a team's current roster
    Points {
        /// Team ID
        team: RecordId,
    },
}

#[derive(Subcommand, Debug)]
pub enum RaceCommands {
    /// List all races
    List,

    /// Show one race
    Get {
        /// Race ID
        id: RecordId,
    },

    /// Create a race from a JSON payload
    Create {
        /// Inline JSON or @path to a JSON file
        payload: String,
    },

    /// Replace a race's fields
    Update {
        /// Race ID
        id: RecordId,
        /// Inline JSON or @path to a JSON file
        payload: String,
    },

    /// Delete a race
    Delete {
        /// Race ID
        id: RecordId,
    },
}

#[derive(Args, Debug)]
pub struct ResultsArgs {
    /// Result category
    #[arg(value_enum)]
    pub category: CategoryArg,

    #[command(subcommand)]
    pub action: ResultCommands,
}

#[derive(Subcommand, Debug)]
pub enum ResultCommands {
    /// List all results in the category
    List,

    /// Show one result
    Get {
        /// Result ID
        id: RecordId,
    },

    /// Record a result from a JSON payload
    Create {
        /// Inline JSON or @path to a JSON file
        payload: String,
    },

    /// Replace a result's fields
    Update {
        /// Result ID
        id: RecordId,
        /// Inline JSON or @path to a JSON file
        payload: String,
    },

    /// Delete a result
    Delete {
        /// Result ID
        id: RecordId,
    },

    /// List results for one race
    ByRace {
        /// Race ID
        race: RecordId,
    },

    /// Remove repeated (race, driver) results, keeping the first
    CleanDuplicates,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoryArg {
    Race,
    Sprint,
    Qualifying,
    SprintQualifying,
}

impl From<CategoryArg> for ResultCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Race => ResultCategory::Race,
            CategoryArg::Sprint => ResultCategory::Sprint,
            CategoryArg::Qualifying => ResultCategory::Qualifying,
            CategoryArg::SprintQualifying => ResultCategory::SprintQualifying,
        }
    }
}

/// Read a payload argument: inline JSON, or `@path` naming a JSON file
pub fn read_payload(arg: &str) -> Result<Value, CliError> {
    let text = match arg.strip_prefix('@') {
        Some(path) => {
            let path = PathBuf::from(path);
            std::fs::read_to_string(&path).map_err(|source| CliError::PayloadRead { path, source })?
        }
        None => arg.to_string(),
    };
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn inline_payload() -> TestResult {
        assert_eq!(read_payload(r#"{"name": "Yuki"}"#)?, json!({"name": "Yuki"}));
        Ok(())
    }

    #[test]
    fn file_payload() -> TestResult {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("driver.json");
        std::fs::write(&path, r#"{"name": "Alex"}"#)?;

        let payload = read_payload(&format!("@{}", path.display()))?;
        assert_eq!(payload, json!({"name": "Alex"}));
        Ok(())
    }

    #[test]
    fn missing_payload_file() {
        let err = read_payload("@/definitely/not/here.json");
        assert!(matches!(err, Err(CliError::PayloadRead { .. })));
    }
}
