//! In-memory sink for tests.
//!
//! Enabled by the `test-utils` feature so downstream crates can assert on the
//! audit trail without touching the filesystem.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::LogLine;
use crate::ports::{LogSink, SinkError};

/// Collects appended records in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogSink {
    lines: Arc<Mutex<Vec<LogLine>>>,
    closed: Arc<Mutex<bool>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record appended so far, in append order.
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rendered records with the leading timestamp and its separator removed,
    /// trailing newline stripped. Handy for exact comparisons.
    pub fn transcript(&self) -> Vec<String> {
        self.lines()
            .iter()
            .map(|line| {
                let rendered = String::from_utf8_lossy(&line.render()).into_owned();
                let body = rendered.split_once(' ').map_or("", |(_, rest)| rest);
                body.strip_suffix('\n').unwrap_or(body).to_string()
            })
            .collect()
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LogSink for MemoryLogSink {
    async fn append(&self, line: &LogLine) -> Result<(), SinkError> {
        if self.is_closed() {
            return Err(SinkError::Closed);
        }
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.clone());
        Ok(())
    }

    async fn close(&self) -> Result<(), SinkError> {
        *self.closed.lock().unwrap_or_else(PoisonError::into_inner) = true;
        Ok(())
    }
}
