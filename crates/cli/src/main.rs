//! fantasyctl - F1 fantasy record store CLI
//!
//! Command-line front end over the fantasy record store: drivers, teams,
//! races, session results, driver transfers, fantasy points and standings.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod completion;
mod error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fantasy_store::{FantasyStore, StoreConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::*;
use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "fantasyctl")]
#[command(about = "F1 Fantasy CLI - Manage drivers, teams, races and results")]
#[command(version)]
#[command(long_about = "
fantasyctl manages the records of an F1 fantasy league: drivers, fantasy
teams and their rosters, race weekends, and race, sprint, qualifying and
sprint qualifying results. Each collection is stored as one JSON file in the
data directory.

Payloads are JSON objects given inline or as @path to a file.
Use --json flag for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory holding the collection files
    #[arg(long, global = true, env = "FANTASY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Accept results whose driver or race does not exist
    #[arg(long, global = true)]
    skip_reference_checks: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Driver management commands
    #[command(subcommand)]
    Drivers(DriverCommands),

    /// Team, roster and transfer commands
    #[command(subcommand)]
    Teams(TeamCommands),

    /// Race weekend commands
    #[command(subcommand)]
    Races(RaceCommands),

    /// Session result commands
    Results(ResultsArgs),

    /// Driver and team standings over every stored result
    Standings,

    /// Remove repeated (race, driver) results from all four categories
    CleanDuplicates,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Cli {
    fn store_config(&self) -> StoreConfig {
        let config = match &self.data_dir {
            Some(dir) => StoreConfig::new(dir),
            None => StoreConfig::from_env(),
        };
        config.with_result_reference_checks(!self.skip_reference_checks)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("fantasyctl={level},fantasy_store={level}", level = log_level).into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute_command(&cli).await {
        Ok(()) => Ok(()),
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let exit_code = match e.downcast_ref::<CliError>() {
                Some(cli_error) => cli_error.exit_code(),
                None => 1,
            };

            std::process::exit(exit_code);
        }
    }
}

async fn execute_command(cli: &Cli) -> Result<()> {
    if let Commands::Completion { shell } = &cli.command {
        completion::generate_completion(*shell);
        return Ok(());
    }

    let store = FantasyStore::open(cli.store_config())
        .await
        .map_err(CliError::from)?;

    match &cli.command {
        Commands::Drivers(cmd) => commands::drivers::execute(&store, cmd, cli.json).await,
        Commands::Teams(cmd) => commands::teams::execute(&store, cmd, cli.json).await,
        Commands::Races(cmd) => commands::races::execute(&store, cmd, cli.json).await,
        Commands::Results(args) => commands::results::execute(&store, args, cli.json).await,
        Commands::Standings => commands::league::standings(&store, cli.json).await,
        Commands::CleanDuplicates => commands::league::clean_duplicates(&store, cli.json).await,
        Commands::Completion { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use fantasy_store::RecordId;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    // --- Global flag parsing ---

    #[test]
    fn parse_driver_list_defaults() -> TestResult {
        let cli = Cli::try_parse_from(["fantasyctl", "drivers", "list"])?;
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.skip_reference_checks);
        assert!(matches!(cli.command, Commands::Drivers(DriverCommands::List)));
        Ok(())
    }

    #[test]
    fn parse_global_flags_after_subcommand() -> TestResult {
        let cli = Cli::try_parse_from([
            "fantasyctl",
            "races",
            "list",
            "--json",
            "-vv",
            "--data-dir",
            "/tmp/league",
        ])?;
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.store_config().data_dir, PathBuf::from("/tmp/league"));
        Ok(())
    }

    #[test]
    fn parse_skip_reference_checks() -> TestResult {
        let cli = Cli::try_parse_from(["fantasyctl", "--skip-reference-checks", "drivers", "list"])?;
        assert!(!cli.store_config().check_result_references);
        Ok(())
    }

    // --- Command parsing ---

    #[test]
    fn parse_transfer() -> TestResult {
        let cli = Cli::try_parse_from([
            "fantasyctl",
            "teams",
            "transfer",
            "1",
            "--current",
            "4",
            "--new",
            "16",
        ])?;
        match &cli.command {
            Commands::Teams(TeamCommands::Transfer {
                team,
                current,
                new_driver,
            }) => {
                assert_eq!(*team, RecordId::new(1));
                assert_eq!(*current, RecordId::new(4));
                assert_eq!(*new_driver, RecordId::new(16));
            }
            _ => return Err("expected Teams Transfer command".into()),
        }
        Ok(())
    }

    #[test]
    fn parse_result_categories() -> TestResult {
        for (arg, expected) in [
            ("race", CategoryArg::Race),
            ("sprint", CategoryArg::Sprint),
            ("qualifying", CategoryArg::Qualifying),
            ("sprint-qualifying", CategoryArg::SprintQualifying),
        ] {
            let cli = Cli::try_parse_from(["fantasyctl", "results", arg, "by-race", "3"])?;
            match &cli.command {
                Commands::Results(args) => {
                    assert_eq!(args.category, expected);
                    assert!(matches!(
                        args.action,
                        ResultCommands::ByRace { race } if race == RecordId::new(3)
                    ));
                }
                _ => return Err("expected Results command".into()),
            }
        }
        Ok(())
    }

    #[test]
    fn parse_league_commands() -> TestResult {
        let cli = Cli::try_parse_from(["fantasyctl", "standings", "--json"])?;
        assert!(matches!(cli.command, Commands::Standings));
        assert!(cli.json);

        let cli = Cli::try_parse_from(["fantasyctl", "clean-duplicates"])?;
        assert!(matches!(cli.command, Commands::CleanDuplicates));
        Ok(())
    }

    #[test]
    fn reject_non_numeric_id() {
        let parsed = Cli::try_parse_from(["fantasyctl", "drivers", "get", "max"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn reject_unknown_category() {
        let parsed = Cli::try_parse_from(["fantasyctl", "results", "practice", "list"]);
        assert!(parsed.is_err());
    }
}
