use std::io;
use thiserror::Error;

/// Errors that keep the child from starting.
///
/// These are the only fatal errors of a session: the supervisor records them
/// and finishes with the wrapper-failure exit code.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The program could not be found on `PATH`.
    #[error("command not found: {0}")]
    NotFound(String),

    /// The OS refused to start the process.
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The child was started without one of its three pipes.
    #[error("child process has no {0} pipe")]
    MissingPipe(&'static str),
}
