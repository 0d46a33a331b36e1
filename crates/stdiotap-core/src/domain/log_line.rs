//! Audit log records and their on-disk rendering.
//!
//! Every record is a single line:
//!
//! ```text
//! <YYYY-MM-DDTHH:MM:SS.mmmZ> <label> <payload>\n
//! ```
//!
//! Data payloads are written byte-for-byte; the log is not required to be
//! valid UTF-8.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;

/// Separator between the label and the payload.
const SEPARATOR: u8 = b' ';

/// Sentinel that opens and closes notice records.
const NOTICE_SENTINEL: &str = "---";

/// Sentinel that opens failure records.
const FAILURE_SENTINEL: &str = "!!!";

/// Which stream a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Bytes read from the wrapper's stdin and forwarded to the child.
    Input,
    /// Bytes read from the child's stdout.
    Output,
    /// Bytes read from the child's stderr.
    Error,
    /// Messages emitted by the wrapper itself.
    Control,
}

impl Direction {
    /// Label written in front of the payload.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Input => "in:",
            Self::Output => "out:",
            Self::Error => "err:",
            Self::Control => NOTICE_SENTINEL,
        }
    }

    /// Whether `chunk` already starts with this direction's label and separator.
    #[must_use]
    pub fn is_prefix_of(self, chunk: &[u8]) -> bool {
        let label = self.label().as_bytes();
        chunk.starts_with(label) && chunk.get(label.len()) == Some(&SEPARATOR)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Input => "stdin",
            Self::Output => "stdout",
            Self::Error => "stderr",
            Self::Control => "control",
        };
        f.write_str(name)
    }
}

/// Body of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Raw forwarded bytes.
    Data(Vec<u8>),
    /// Lifecycle message from the wrapper, e.g. a stream closing.
    Notice(String),
    /// Wrapper failure, e.g. the child could not be launched.
    Failure(String),
}

/// One immutable audit log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    timestamp: DateTime<Utc>,
    direction: Direction,
    payload: Payload,
}

impl LogLine {
    /// Create a record stamped with an explicit instant.
    #[must_use]
    pub const fn at(timestamp: DateTime<Utc>, direction: Direction, payload: Payload) -> Self {
        Self {
            timestamp,
            direction,
            payload,
        }
    }

    /// Record a chunk forwarded from the wrapper's stdin.
    pub fn input(bytes: impl Into<Vec<u8>>) -> Self {
        Self::at(Utc::now(), Direction::Input, Payload::Data(bytes.into()))
    }

    /// Record a chunk read from one of the child's output streams.
    pub fn data(direction: Direction, bytes: impl Into<Vec<u8>>) -> Self {
        Self::at(Utc::now(), direction, Payload::Data(bytes.into()))
    }

    /// Record a wrapper lifecycle notice.
    pub fn notice(message: impl Into<String>) -> Self {
        Self::at(Utc::now(), Direction::Control, Payload::Notice(message.into()))
    }

    /// Record a wrapper failure.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::at(
            Utc::now(),
            Direction::Control,
            Payload::Failure(message.into()),
        )
    }

    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Render the record exactly as it is appended to the log file.
    ///
    /// The result always ends with a single `\n` added if the payload did not
    /// already end with one.
    #[must_use]
    pub fn render(&self) -> Vec<u8> {
        let stamp = self
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        let mut out = Vec::with_capacity(stamp.len() + 8 + self.payload_len());
        out.extend_from_slice(stamp.as_bytes());
        out.push(SEPARATOR);

        match &self.payload {
            Payload::Data(bytes) => {
                let labelled = matches!(self.direction, Direction::Output | Direction::Error)
                    && self.direction.is_prefix_of(bytes);
                if !labelled {
                    out.extend_from_slice(self.direction.label().as_bytes());
                    out.push(SEPARATOR);
                }
                out.extend_from_slice(bytes);
            }
            Payload::Notice(message) => {
                out.extend_from_slice(NOTICE_SENTINEL.as_bytes());
                out.push(SEPARATOR);
                out.extend_from_slice(message.as_bytes());
                out.push(SEPARATOR);
                out.extend_from_slice(NOTICE_SENTINEL.as_bytes());
            }
            Payload::Failure(message) => {
                out.extend_from_slice(FAILURE_SENTINEL.as_bytes());
                out.push(SEPARATOR);
                out.extend_from_slice(message.as_bytes());
            }
        }

        if out.last() != Some(&b'\n') {
            out.push(b'\n');
        }
        out
    }

    fn payload_len(&self) -> usize {
        match &self.payload {
            Payload::Data(bytes) => bytes.len(),
            Payload::Notice(message) | Payload::Failure(message) => message.len(),
        }
    }
}
