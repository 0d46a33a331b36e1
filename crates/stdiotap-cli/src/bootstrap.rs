//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together:
//! - Log directory and file naming (via stdiotap-core)
//! - File log sink, command builder and supervisor (via stdiotap-runtime)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use stdiotap_core::{CommandSpec, LogSink, log_file_path, resolve_log_dir};
use stdiotap_runtime::{
    CommandBuilder, DirectCommandBuilder, FileLogSink, SessionReport, ShellCommandBuilder,
    Supervisor,
};
use tracing::{debug, warn};

use crate::config::{LaunchMode, WrapperConfig};
use crate::error::CliError;

/// A ready-to-run session: the log file is open, the child not yet started.
pub struct Session {
    supervisor: Supervisor,
    sink: Arc<FileLogSink>,
    command: CommandSpec,
}

impl Session {
    /// Path of this session's log file.
    pub fn log_path(&self) -> &Path {
        self.sink.path()
    }

    /// Run the command on the wrapper's own streams, then close the log.
    pub async fn run(mut self) -> SessionReport {
        let report = self.supervisor.run(&self.command).await;

        if let Err(e) = self.sink.close().await {
            warn!(path = %self.sink.path().display(), error = %e, "Failed to close audit log");
        }
        let lost = report.sink_failures();
        if lost > 0 {
            warn!(
                path = %self.sink.path().display(),
                lost,
                "Audit log is incomplete"
            );
        }
        debug!(termination = ?report.termination, "Session finished");
        report
    }
}

/// Open the log file and assemble the supervisor for `config`.
pub async fn bootstrap(config: WrapperConfig) -> Result<Session, CliError> {
    let started_at = Utc::now();
    let dir = resolve_log_dir(config.log_dir.as_deref())?;
    let path: PathBuf = log_file_path(&dir, started_at)?;
    let sink = Arc::new(FileLogSink::open(&path).await?);
    debug!(path = %path.display(), "Audit log opened");

    let builder: Arc<dyn CommandBuilder> = match config.launch {
        LaunchMode::Shell(interpreter) => Arc::new(ShellCommandBuilder::new(interpreter)),
        LaunchMode::Direct => Arc::new(DirectCommandBuilder),
    };
    let shared: Arc<dyn LogSink> = sink.clone();

    Ok(Session {
        supervisor: Supervisor::new(builder, shared, config.supervisor),
        sink,
        command: config.command,
    })
}
