//! CLI-specific error types and exit code mapping.
//!
//! Errors here stop the wrapper before the child is started. Failures of the
//! child itself are never errors: they surface as the session's exit code.

use stdiotap_core::{EXIT_USAGE, EXIT_WRAPPER_FAILURE, PathError, SinkError};
use thiserror::Error;

/// Usage line shown when no command is given.
pub const USAGE: &str = "Usage: stdiotap [OPTIONS] <command> [args...]";

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// No command to wrap.
    #[error("no command given\n\n{USAGE}")]
    MissingCommand,

    /// The log directory or file could not be prepared.
    #[error("cannot open log file: {0}")]
    LogSetup(String),

    /// The wrapper could not set itself up.
    #[error("{0}")]
    Wrapper(String),
}

impl CliError {
    /// Map error to the wrapper's exit code.
    ///
    /// - 1: usage (no command)
    /// - 74: log file could not be prepared (`EX_IOERR`)
    /// - 125: any other wrapper failure
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::MissingCommand => EXIT_USAGE,
            Self::LogSetup(_) => 74, // EX_IOERR
            Self::Wrapper(_) => EXIT_WRAPPER_FAILURE,
        }
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::LogSetup(err.to_string())
    }
}

impl From<SinkError> for CliError {
    fn from(err: SinkError) -> Self {
        Self::LogSetup(err.to_string())
    }
}
