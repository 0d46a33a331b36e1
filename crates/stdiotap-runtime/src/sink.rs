//! Durable append-only log file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use stdiotap_core::{LogLine, LogSink, SinkError};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

/// Log sink backed by a file opened in append mode.
///
/// Each record is written, flushed and `sync_data`'d while holding the file
/// lock, so a record is on disk when `append` returns and concurrent records
/// never interleave. The lock is FIFO-fair: a flood of output records cannot
/// starve the stdin forwarder.
#[derive(Debug)]
pub struct FileLogSink {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileLogSink {
    /// Open `path` for appending, creating it if absent.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        debug!(path = %path.display(), "Opened log file");
        Ok(Self {
            path,
            file: Mutex::new(Some(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LogSink for FileLogSink {
    async fn append(&self, line: &LogLine) -> Result<(), SinkError> {
        let record = line.render();
        let mut guard = self.file.lock().await;
        let file = guard.as_mut().ok_or(SinkError::Closed)?;
        file.write_all(&record).await?;
        file.flush().await?;
        file.sync_data().await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), SinkError> {
        let Some(mut file) = self.file.lock().await.take() else {
            return Ok(());
        };
        file.flush().await?;
        file.sync_all().await?;
        debug!(path = %self.path.display(), "Closed log file");
        Ok(())
    }
}
