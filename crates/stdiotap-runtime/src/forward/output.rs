use std::io::{self, ErrorKind};
use std::sync::Arc;
use std::time::Duration;

use stdiotap_core::{Direction, LogLine, LogSink};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{ForwardReport, Recorder, StreamEnd};

/// Pipe read size. Lines are reassembled from these reads.
const READ_CHUNK: usize = 8192;

/// How the output forwarders cut the byte stream into records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// A partial line is emitted in slices of this many bytes once it grows
    /// longer than that.
    pub max_line_bytes: usize,
    /// A partial line is emitted once no byte has arrived for this long.
    /// `None` holds partial lines until a newline or end of stream.
    pub partial_flush_after: Option<Duration>,
}

impl OutputConfig {
    pub const DEFAULT_MAX_LINE_BYTES: usize = 64 * 1024;
    pub const DEFAULT_PARTIAL_FLUSH: Duration = Duration::from_millis(200);
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_line_bytes: Self::DEFAULT_MAX_LINE_BYTES,
            partial_flush_after: Some(Self::DEFAULT_PARTIAL_FLUSH),
        }
    }
}

/// Forward one of the child's output pipes to the wrapper's matching stream.
///
/// The pipe is read line by line. Each line (including a final line without
/// a newline) is logged with `direction`'s label and then written unchanged
/// to `target`. Partial lines are cut early according to `config`.
///
/// The loop stops on end of stream, a read error, or a failed write to
/// `target`. Dropping the pipe on a write failure lets the child see a
/// broken pipe, as it would if it wrote to the closed stream directly.
pub async fn forward_output<R, W>(
    direction: Direction,
    mut source: R,
    target: W,
    sink: Arc<dyn LogSink>,
    config: OutputConfig,
) -> ForwardReport
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = LineWriter {
        recorder: Recorder::new(sink.as_ref(), direction),
        target,
        bytes: 0,
    };
    let max_line = config.max_line_bytes.max(1);
    let mut pending: Vec<u8> = Vec::with_capacity(1024);
    let mut buf = vec![0u8; READ_CHUNK];

    let end = loop {
        let read = match config.partial_flush_after {
            Some(idle) if !pending.is_empty() => {
                if let Ok(read) = timeout(idle, source.read(&mut buf)).await {
                    read
                } else {
                    let partial = std::mem::take(&mut pending);
                    if let Err(e) = lines.emit(partial).await {
                        break StreamEnd::WriteFailed(e);
                    }
                    continue;
                }
            }
            _ => source.read(&mut buf).await,
        };

        match read {
            Ok(0) => break StreamEnd::EndOfStream,
            Ok(n) => {
                pending.extend_from_slice(&buf[..n]);
                if let Err(e) = lines.emit_complete(&mut pending, max_line).await {
                    break StreamEnd::WriteFailed(e);
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => break StreamEnd::ReadFailed(e),
        }
    };

    // Whatever was read before the stream ended still has to go out.
    let end = match end {
        StreamEnd::WriteFailed(_) => end,
        _ if pending.is_empty() => end,
        _ => match lines.emit(pending).await {
            Ok(()) => end,
            Err(e) => StreamEnd::WriteFailed(e),
        },
    };

    let LineWriter {
        mut recorder, bytes, ..
    } = lines;
    match &end {
        StreamEnd::ReadFailed(_) | StreamEnd::WriteFailed(_) => {
            warn!(stream = %direction, bytes, reason = %end, "Output forwarding stopped early");
            recorder.record(LogLine::failure(format!("{direction} {end}"))).await;
        }
        _ => debug!(stream = %direction, bytes, reason = %end, "Output forwarder finished"),
    }
    recorder.finish(bytes, end)
}

/// Logs a line, then writes it to the wrapper's stream.
struct LineWriter<'a, W> {
    recorder: Recorder<'a>,
    target: W,
    bytes: u64,
}

impl<W: AsyncWrite + Unpin> LineWriter<'_, W> {
    /// Emit every complete line in `pending`, plus a leading slice of
    /// `max_line` bytes whenever a line has grown longer than that.
    async fn emit_complete(&mut self, pending: &mut Vec<u8>, max_line: usize) -> io::Result<()> {
        while let Some(line) = take_line(pending, max_line) {
            self.emit(line).await?;
        }
        Ok(())
    }

    async fn emit(&mut self, line: Vec<u8>) -> io::Result<()> {
        let direction = self.recorder.direction;
        self.recorder
            .record(LogLine::data(direction, line.clone()))
            .await;
        self.target.write_all(&line).await?;
        self.target.flush().await?;
        self.bytes += line.len() as u64;
        Ok(())
    }
}

/// Split the next record off the front of `pending`.
fn take_line(pending: &mut Vec<u8>, max_line: usize) -> Option<Vec<u8>> {
    match pending.iter().position(|&b| b == b'\n') {
        Some(pos) if pos <= max_line => Some(pending.drain(..=pos).collect()),
        _ if pending.len() > max_line => Some(pending.drain(..max_line).collect()),
        _ => None,
    }
}
