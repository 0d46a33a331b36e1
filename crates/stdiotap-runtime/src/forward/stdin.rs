use std::io::ErrorKind;
use std::sync::Arc;

use stdiotap_core::{Direction, LogLine, LogSink};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{ForwardReport, Recorder, StreamEnd};

/// Default stdin read size.
pub const DEFAULT_STDIN_CHUNK: usize = 4096;

/// Forward the wrapper's stdin to the child's stdin.
///
/// Each chunk read from `source` is logged as one `in:` record and then
/// written to `child_stdin`. The loop stops on end of stream, a read error,
/// a failed write to the child, or cancellation. In every case the child's
/// stdin is shut down and dropped (the child sees EOF) and an
/// `input closed: <reason>` notice is logged.
pub async fn forward_stdin<R, W>(
    mut source: R,
    mut child_stdin: W,
    sink: Arc<dyn LogSink>,
    chunk_size: usize,
    cancel: CancellationToken,
) -> ForwardReport
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut recorder = Recorder::new(sink.as_ref(), Direction::Input);
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut forwarded: u64 = 0;

    let end = loop {
        let read = tokio::select! {
            biased;
            () = cancel.cancelled() => break StreamEnd::Cancelled,
            read = source.read(&mut buf) => read,
        };

        match read {
            Ok(0) => break StreamEnd::EndOfStream,
            Ok(n) => {
                let chunk = &buf[..n];
                recorder.record(LogLine::input(chunk)).await;
                if let Err(e) = write_chunk(&mut child_stdin, chunk).await {
                    break StreamEnd::WriteFailed(e);
                }
                forwarded += n as u64;
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => break StreamEnd::ReadFailed(e),
        }
    };

    if let Err(e) = child_stdin.shutdown().await {
        debug!(error = %e, "Closing child stdin failed");
    }
    drop(child_stdin);

    debug!(bytes = forwarded, reason = %end, "Stdin forwarder finished");
    recorder
        .record(LogLine::notice(format!("input closed: {end}")))
        .await;
    recorder.finish(forwarded, end)
}

async fn write_chunk<W: AsyncWrite + Unpin>(dst: &mut W, chunk: &[u8]) -> std::io::Result<()> {
    dst.write_all(chunk).await?;
    dst.flush().await
}
