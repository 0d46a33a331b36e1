//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the forwarding engine expects from
//! infrastructure. They contain no implementation details and use only
//! domain types.

pub mod log_sink;

use thiserror::Error;

pub use log_sink::{LogSink, NoopLogSink};

/// Errors reported by a [`LogSink`].
///
/// These are never fatal for the caller: forwarding continues and the error
/// is only reported.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink was closed and accepts no further records.
    #[error("log sink is closed")]
    Closed,

    /// Writing or syncing the record failed.
    #[error("failed to write log record: {0}")]
    Io(#[from] std::io::Error),
}
