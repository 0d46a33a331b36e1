//! Log sink port for the audit trail.
//!
//! The sink is the only resource shared by all forwarders. Implementations
//! must make each record durable before `append` returns and must never let
//! two concurrent records interleave mid-line.

use async_trait::async_trait;

use super::SinkError;
use crate::domain::LogLine;

/// Port for appending audit records.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Append one record.
    ///
    /// On `Ok(())` the whole record has been written and flushed to storage.
    /// On error nothing about the record is guaranteed; callers report the
    /// error and keep forwarding.
    async fn append(&self, line: &LogLine) -> Result<(), SinkError>;

    /// Final flush and release of the underlying resource.
    ///
    /// Appends after a successful close fail with [`SinkError::Closed`].
    async fn close(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// A sink that discards every record.
///
/// Useful when the audit trail is not wanted, e.g. embedding the supervisor
/// where only passthrough matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogSink;

#[async_trait]
impl LogSink for NoopLogSink {
    async fn append(&self, _line: &LogLine) -> Result<(), SinkError> {
        Ok(())
    }
}
