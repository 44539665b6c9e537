//! Error types for fantasyctl CLI

use fantasy_store::{ErrorKind, StoreError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Cannot read payload file {path}: {source}")]
    PayloadRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Payload is not valid JSON: {0}")]
    PayloadJson(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CliError {
    /// Short machine-readable error type for JSON output
    pub fn type_name(&self) -> String {
        match self {
            CliError::PayloadRead { .. } | CliError::PayloadJson(_) => {
                ErrorKind::InvalidRequest.to_string()
            }
            CliError::Store(e) => e.kind().to_string(),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::PayloadRead { .. } | CliError::PayloadJson(_) => 4,
            CliError::Store(e) => exit_code_for(e.kind()),
        }
    }
}

/// Exit code for a store error kind
pub fn exit_code_for(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::NotFound => 3,
        ErrorKind::InvalidRequest => 4,
        ErrorKind::Conflict => 5,
        ErrorKind::StorageUnavailable => 6,
    }
}
