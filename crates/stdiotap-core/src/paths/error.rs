//! Path-related error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while choosing where the audit log goes.
#[derive(Debug, Error)]
pub enum PathError {
    /// The wrapper's own executable location could not be determined.
    #[error("Cannot determine executable directory: {0}")]
    NoExecutableDir(String),

    /// A path was expected to be a directory but was not.
    #[error("{0} exists but is not a directory")]
    NotADirectory(PathBuf),

    /// Failed to create the log directory.
    #[error("Failed to create directory {path}: {reason}")]
    CreateFailed { path: PathBuf, reason: String },

    /// An empty path was provided.
    #[error("Path cannot be empty")]
    EmptyPath,
}
