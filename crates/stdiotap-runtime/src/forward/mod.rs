//! Copy loops between the wrapper's standard streams and the child's pipes.
//!
//! - [`forward_stdin`]: wrapper stdin → child stdin, fixed-size chunks,
//!   each chunk logged before it is written.
//! - [`forward_output`]: child stdout/stderr → wrapper stdout/stderr, one
//!   record per line, each line logged before it is written.
//!
//! Every loop owns its pipe and closes it when the loop ends. Sink failures
//! are reported and never stop forwarding.

mod output;
mod stdin;

use std::fmt;
use std::io;

use stdiotap_core::{Direction, LogLine, LogSink};
use tracing::{debug, warn};

pub use output::{OutputConfig, forward_output};
pub use stdin::{DEFAULT_STDIN_CHUNK, forward_stdin};

/// Why a forwarding loop stopped.
#[derive(Debug)]
pub enum StreamEnd {
    /// The source reached end of stream.
    EndOfStream,
    /// The supervisor stopped the loop because the child exited.
    Cancelled,
    /// Reading the source failed.
    ReadFailed(io::Error),
    /// Writing to the destination failed.
    WriteFailed(io::Error),
}

impl fmt::Display for StreamEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfStream => f.write_str("end of stream"),
            Self::Cancelled => f.write_str("child exited"),
            Self::ReadFailed(e) => write!(f, "read error: {e}"),
            Self::WriteFailed(e) => write!(f, "write error: {e}"),
        }
    }
}

/// Summary of one finished forwarding loop.
#[derive(Debug)]
pub struct ForwardReport {
    pub direction: Direction,
    /// Bytes delivered to the destination.
    pub bytes: u64,
    /// Records handed to the sink.
    pub records: u64,
    /// Records the sink failed to store.
    pub sink_failures: u64,
    pub end: StreamEnd,
}

/// Appends records on behalf of one forwarder and keeps count of failures.
///
/// The first failure is reported as a warning; later ones only at debug
/// level, so a full disk does not flood the wrapper's stderr.
pub(crate) struct Recorder<'a> {
    sink: &'a dyn LogSink,
    direction: Direction,
    records: u64,
    failures: u64,
}

impl<'a> Recorder<'a> {
    pub(crate) fn new(sink: &'a dyn LogSink, direction: Direction) -> Self {
        Self {
            sink,
            direction,
            records: 0,
            failures: 0,
        }
    }

    pub(crate) async fn record(&mut self, line: LogLine) {
        self.records += 1;
        if let Err(e) = self.sink.append(&line).await {
            self.failures += 1;
            if self.failures == 1 {
                warn!(stream = %self.direction, error = %e, "Failed to write audit log; forwarding continues");
            } else {
                debug!(stream = %self.direction, error = %e, failures = self.failures, "Audit log write failed");
            }
        }
    }

    pub(crate) fn finish(self, bytes: u64, end: StreamEnd) -> ForwardReport {
        ForwardReport {
            direction: self.direction,
            bytes,
            records: self.records,
            sink_failures: self.failures,
            end,
        }
    }
}
