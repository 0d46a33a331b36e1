//! Resolved wrapper configuration.

use std::path::PathBuf;
use std::time::Duration;

use stdiotap_core::CommandSpec;
use stdiotap_runtime::{Interpreter, OutputConfig, SupervisorConfig};

use crate::error::CliError;
use crate::parser::Cli;

/// How the command line becomes a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchMode {
    /// Through an interpreter (`sh -c`, `cmd.exe /C`).
    Shell(Interpreter),
    /// The program itself, arguments passed verbatim.
    Direct,
}

/// Everything the composition root needs to start a session.
#[derive(Debug, Clone)]
pub struct WrapperConfig {
    pub command: CommandSpec,
    /// `None` places the log next to the executable.
    pub log_dir: Option<PathBuf>,
    pub launch: LaunchMode,
    pub supervisor: SupervisorConfig,
}

impl WrapperConfig {
    /// Fold parsed arguments into a configuration.
    ///
    /// `--no-shell` wins over `--shell`/`STDIOTAP_SHELL`, so an exported
    /// shell override never blocks direct mode.
    pub fn from_cli(cli: Cli) -> Result<Self, CliError> {
        let command = CommandSpec::from_argv(cli.command).ok_or(CliError::MissingCommand)?;

        let launch = if cli.no_shell {
            LaunchMode::Direct
        } else {
            LaunchMode::Shell(
                cli.shell
                    .map_or_else(Interpreter::platform_default, Interpreter::from_path),
            )
        };

        let partial_flush_after =
            (cli.line_flush_ms > 0).then(|| Duration::from_millis(cli.line_flush_ms));

        Ok(Self {
            command,
            log_dir: cli.log_dir,
            launch,
            supervisor: SupervisorConfig {
                stdin_chunk_size: cli.chunk_size,
                output: OutputConfig {
                    max_line_bytes: cli.max_line_bytes,
                    partial_flush_after,
                },
                ..SupervisorConfig::default()
            },
        })
    }
}
