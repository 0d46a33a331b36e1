//! Session supervision: launch, forward, wait, clean up.
//!
//! ```text
//! Idle → Launching → Running → Draining → Terminating → Done
//!            │                                           ▲
//!            └──────────── launch failure ───────────────┘
//! ```
//!
//! The supervisor owns the child. Each pipe is moved into exactly one
//! forwarding task; the log sink is shared by the three tasks and the
//! supervisor. The stdin forwarder is cancelled only once the child has
//! exited, so an idle terminal cannot hold the session open. The sink is not
//! closed here: whoever opened it closes it after [`Supervisor::run`]
//! returns.

use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use stdiotap_core::{CommandSpec, Direction, LogLine, LogSink, Termination};
use tokio::io::{AsyncRead, AsyncWrite, Stderr, Stdin, Stdout};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::command::CommandBuilder;
use crate::error::LaunchError;
use crate::forward::{DEFAULT_STDIN_CHUNK, ForwardReport, OutputConfig, forward_output, forward_stdin};
use crate::process::{DEFAULT_SHUTDOWN_GRACE, kill_if_running, shutdown_child};

/// Tunables for one supervised session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Read size for the wrapper's stdin.
    pub stdin_chunk_size: usize,
    /// Line splitting for the child's stdout and stderr.
    pub output: OutputConfig,
    /// SIGTERM → SIGKILL grace period when the child's status is unknown.
    pub shutdown_grace: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            stdin_chunk_size: DEFAULT_STDIN_CHUNK,
            output: OutputConfig::default(),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

/// Lifecycle of a supervised session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Launching,
    Running,
    Draining,
    Terminating,
    Done,
}

/// The wrapper-side ends of the three streams.
pub struct SessionIo<I, O, E> {
    pub stdin: I,
    pub stdout: O,
    pub stderr: E,
}

impl SessionIo<Stdin, Stdout, Stderr> {
    /// The wrapper process's own standard streams.
    pub fn process() -> Self {
        Self {
            stdin: tokio::io::stdin(),
            stdout: tokio::io::stdout(),
            stderr: tokio::io::stderr(),
        }
    }
}

/// Outcome of a finished session.
#[derive(Debug)]
pub struct SessionReport {
    pub termination: Termination,
    /// One report per forwarder that ran to completion (empty when the
    /// child never started).
    pub forwarders: Vec<ForwardReport>,
}

impl SessionReport {
    /// Exit code the wrapper should terminate with.
    pub const fn exit_code(&self) -> i32 {
        self.termination.exit_code()
    }

    /// Total number of records the sink failed to store.
    pub fn sink_failures(&self) -> u64 {
        self.forwarders.iter().map(|r| r.sink_failures).sum()
    }

    pub fn report_for(&self, direction: Direction) -> Option<&ForwardReport> {
        self.forwarders.iter().find(|r| r.direction == direction)
    }
}

struct Launched {
    child: Child,
    stdin: ChildStdin,
    stdout: ChildStdout,
    stderr: ChildStderr,
}

/// Runs one wrapped command from launch to cleanup.
pub struct Supervisor {
    builder: Arc<dyn CommandBuilder>,
    sink: Arc<dyn LogSink>,
    config: SupervisorConfig,
    state: SupervisorState,
}

impl Supervisor {
    pub fn new(
        builder: Arc<dyn CommandBuilder>,
        sink: Arc<dyn LogSink>,
        config: SupervisorConfig,
    ) -> Self {
        Self {
            builder,
            sink,
            config,
            state: SupervisorState::Idle,
        }
    }

    pub const fn state(&self) -> SupervisorState {
        self.state
    }

    /// Run `spec` wired to the wrapper's own standard streams.
    pub async fn run(&mut self, spec: &CommandSpec) -> SessionReport {
        self.run_with(spec, SessionIo::process()).await
    }

    /// Run `spec` wired to the given streams.
    ///
    /// Never fails: launch and wait errors are logged as `!!!` records and
    /// reflected in the returned [`Termination`].
    pub async fn run_with<I, O, E>(
        &mut self,
        spec: &CommandSpec,
        io: SessionIo<I, O, E>,
    ) -> SessionReport
    where
        I: AsyncRead + Unpin + Send + 'static,
        O: AsyncWrite + Unpin + Send + 'static,
        E: AsyncWrite + Unpin + Send + 'static,
    {
        self.transition(SupervisorState::Launching);
        let launched = match self.launch(spec) {
            Ok(launched) => launched,
            Err(e) => {
                error!(command = %spec, error = %e, "Failed to launch command");
                self.control(LogLine::failure(format!("Logger Error: {e}")))
                    .await;
                self.transition(SupervisorState::Done);
                return SessionReport {
                    termination: Termination::LaunchFailed,
                    forwarders: Vec::new(),
                };
            }
        };
        let Launched {
            mut child,
            stdin,
            stdout,
            stderr,
        } = launched;

        self.transition(SupervisorState::Running);
        let cancel = CancellationToken::new();
        let mut stdin_task = tokio::spawn(forward_stdin(
            io.stdin,
            stdin,
            Arc::clone(&self.sink),
            self.config.stdin_chunk_size,
            cancel.clone(),
        ));
        let stdout_task = tokio::spawn(forward_output(
            Direction::Output,
            stdout,
            io.stdout,
            Arc::clone(&self.sink),
            self.config.output,
        ));
        let stderr_task = tokio::spawn(forward_output(
            Direction::Error,
            stderr,
            io.stderr,
            Arc::clone(&self.sink),
            self.config.output,
        ));

        let mut forwarders = Vec::with_capacity(3);
        forwarders.extend(finished_forwarder(stdout_task.await, Direction::Output));
        forwarders.extend(finished_forwarder(stderr_task.await, Direction::Error));

        // A child may close its output and keep reading, so stdin runs until
        // its own end of stream or until the child is gone.
        let stdin_joined = tokio::select! {
            joined = &mut stdin_task => Some(joined),
            _ = child.wait() => None,
        };
        let stdin_joined = match stdin_joined {
            Some(joined) => joined,
            None => {
                cancel.cancel();
                stdin_task.await
            }
        };
        forwarders.extend(finished_forwarder(stdin_joined, Direction::Input));

        self.transition(SupervisorState::Draining);
        let termination = match child.wait().await {
            Ok(status) => self.classify(status).await,
            Err(e) => {
                warn!(error = %e, "Failed to collect child exit status");
                self.control(LogLine::failure(format!("Command Error: {e}")))
                    .await;
                Termination::WaitFailed
            }
        };

        self.transition(SupervisorState::Terminating);
        if termination == Termination::WaitFailed {
            match shutdown_child(&mut child, self.config.shutdown_grace).await {
                Ok(status) => debug!(%status, "Child shut down"),
                Err(e) => warn!(error = %e, "Failed to shut down child"),
            }
        } else {
            kill_if_running(&mut child);
        }

        self.transition(SupervisorState::Done);
        SessionReport {
            termination,
            forwarders,
        }
    }

    fn launch(&self, spec: &CommandSpec) -> Result<Launched, LaunchError> {
        let mut cmd = self.builder.build(spec)?;
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| LaunchError::Spawn {
            command: spec.to_string(),
            source,
        })?;
        debug!(command = %spec, pid = ?child.id(), "Child started");

        let stdin = child.stdin.take().ok_or(LaunchError::MissingPipe("stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or(LaunchError::MissingPipe("stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or(LaunchError::MissingPipe("stderr"))?;

        Ok(Launched {
            child,
            stdin,
            stdout,
            stderr,
        })
    }

    async fn classify(&self, status: ExitStatus) -> Termination {
        let termination = termination_of(status);
        debug!(%status, ?termination, "Child exited");
        match termination {
            Termination::Signaled(signal) => {
                self.control(LogLine::failure(format!(
                    "Command Error: terminated by signal {signal}"
                )))
                .await;
            }
            Termination::WaitFailed => {
                self.control(LogLine::failure(format!(
                    "Command Error: unrecognized exit status ({status})"
                )))
                .await;
            }
            Termination::Exited(_) | Termination::LaunchFailed => {}
        }
        termination
    }

    async fn control(&self, line: LogLine) {
        if let Err(e) = self.sink.append(&line).await {
            warn!(error = %e, "Failed to write control record to audit log");
        }
    }

    fn transition(&mut self, next: SupervisorState) {
        debug!(from = ?self.state, to = ?next, "Supervisor state change");
        self.state = next;
    }
}

fn finished_forwarder(
    joined: Result<ForwardReport, JoinError>,
    direction: Direction,
) -> Option<ForwardReport> {
    match joined {
        Ok(report) => {
            debug!(
                stream = %report.direction,
                bytes = report.bytes,
                records = report.records,
                end = %report.end,
                "Forwarder finished"
            );
            Some(report)
        }
        Err(e) => {
            error!(stream = %direction, error = %e, "Forwarder task failed");
            None
        }
    }
}

fn termination_of(status: ExitStatus) -> Termination {
    if let Some(code) = status.code() {
        return Termination::Exited(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Termination::Signaled(signal);
        }
    }
    Termination::WaitFailed
}

#[cfg(test)]
mod tests {
    use super::*;
    use stdiotap_core::Payload;
    use stdiotap_core::testing::MemoryLogSink;

    struct MissingProgram;

    impl CommandBuilder for MissingProgram {
        fn build(&self, spec: &CommandSpec) -> Result<tokio::process::Command, LaunchError> {
            Err(LaunchError::NotFound(spec.program().to_string()))
        }
    }

    #[test]
    fn test_default_config() {
        let config = SupervisorConfig::default();
        assert_eq!(config.stdin_chunk_size, 4096);
        assert_eq!(config.output, OutputConfig::default());
        assert_eq!(config.shutdown_grace, Duration::from_secs(5));
    }

    #[test]
    #[cfg(unix)]
    fn test_termination_from_status() {
        use std::os::unix::process::ExitStatusExt;

        assert_eq!(
            termination_of(ExitStatus::from_raw(3 << 8)),
            Termination::Exited(3)
        );
        assert_eq!(
            termination_of(ExitStatus::from_raw(9)),
            Termination::Signaled(9)
        );
    }

    #[tokio::test]
    async fn test_launch_failure_is_recorded_and_skips_forwarding() {
        let sink = MemoryLogSink::new();
        let mut supervisor = Supervisor::new(
            Arc::new(MissingProgram),
            Arc::new(sink.clone()),
            SupervisorConfig::default(),
        );
        assert_eq!(supervisor.state(), SupervisorState::Idle);

        let spec = CommandSpec::from_argv(["nope", "arg"]).unwrap();
        let io = SessionIo {
            stdin: tokio::io::empty(),
            stdout: tokio::io::sink(),
            stderr: tokio::io::sink(),
        };
        let report = supervisor.run_with(&spec, io).await;

        assert_eq!(report.termination, Termination::LaunchFailed);
        assert_eq!(report.exit_code(), 125);
        assert!(report.forwarders.is_empty());
        assert_eq!(supervisor.state(), SupervisorState::Done);

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].direction(), Direction::Control);
        assert_eq!(
            lines[0].payload(),
            &Payload::Failure("Logger Error: command not found: nope".into())
        );
    }
}
