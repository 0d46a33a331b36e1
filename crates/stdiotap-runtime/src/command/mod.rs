//! Command construction for the wrapped child.
//!
//! The supervisor does not know how a [`CommandSpec`] becomes a process; it
//! asks an injected [`CommandBuilder`]. Two builders are provided:
//!
//! - [`ShellCommandBuilder`] hands the joined command line to the platform
//!   interpreter (`sh -c` / `cmd.exe /C`) so built-ins and operators work.
//! - [`DirectCommandBuilder`] executes the program itself with its
//!   arguments, no interpreter involved.
//!
//! Builders only describe the process. Stdio wiring is the supervisor's job.

pub mod resolve;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use stdiotap_core::CommandSpec;
use tokio::process::Command;
use tracing::debug;

use crate::error::LaunchError;
use resolve::{find_executable, resolve_for_shell};

/// Turns a [`CommandSpec`] into a launchable command.
pub trait CommandBuilder: Send + Sync {
    /// Build the command, or fail with a launch error (e.g. program missing).
    fn build(&self, spec: &CommandSpec) -> Result<Command, LaunchError>;
}

/// Command interpreter used to run the joined command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpreter {
    /// `<shell> -c "<program> <args...>"`.
    Posix(PathBuf),
    /// `<cmd> /C <program> <args...>`.
    Cmd(PathBuf),
}

impl Interpreter {
    /// `cmd.exe` on Windows, `sh` everywhere else.
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            Self::Cmd(PathBuf::from("cmd.exe"))
        } else {
            Self::Posix(PathBuf::from("sh"))
        }
    }

    /// Pick the calling convention from the interpreter's file name:
    /// `cmd`/`cmd.exe` get `/C`, anything else `-c`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_cmd = path
            .file_stem()
            .and_then(OsStr::to_str)
            .is_some_and(|stem| stem.eq_ignore_ascii_case("cmd"));
        if is_cmd {
            Self::Cmd(path)
        } else {
            Self::Posix(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Posix(path) | Self::Cmd(path) => path,
        }
    }

    fn command(&self, spec: &CommandSpec) -> Command {
        match self {
            Self::Posix(shell) => {
                let mut cmd = Command::new(shell);
                cmd.arg("-c").arg(spec.joined());
                cmd
            }
            Self::Cmd(cmd_exe) => {
                let mut cmd = Command::new(cmd_exe);
                cmd.arg("/C").arg(spec.program()).args(spec.args());
                cmd
            }
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::platform_default()
    }
}

/// Runs the command line through a shell.
#[derive(Debug, Clone)]
pub struct ShellCommandBuilder {
    interpreter: Interpreter,
    check_program: bool,
}

impl ShellCommandBuilder {
    pub const fn new(interpreter: Interpreter) -> Self {
        Self {
            interpreter,
            check_program: true,
        }
    }

    /// Skip the executable lookup and let the shell report missing programs.
    #[must_use]
    pub const fn without_program_check(mut self) -> Self {
        self.check_program = false;
        self
    }

    pub const fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }
}

impl Default for ShellCommandBuilder {
    fn default() -> Self {
        Self::new(Interpreter::platform_default())
    }
}

impl CommandBuilder for ShellCommandBuilder {
    fn build(&self, spec: &CommandSpec) -> Result<Command, LaunchError> {
        if self.check_program {
            let resolution = resolve_for_shell(spec.program())?;
            debug!(program = spec.program(), ?resolution, "Checked program before shell launch");
        }
        Ok(self.interpreter.command(spec))
    }
}

/// Executes the program directly, without an interpreter.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectCommandBuilder;

impl CommandBuilder for DirectCommandBuilder {
    fn build(&self, spec: &CommandSpec) -> Result<Command, LaunchError> {
        let program = find_executable(spec.program())?;
        let mut cmd = Command::new(program);
        cmd.args(spec.args());
        Ok(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    fn spec(argv: &[&str]) -> CommandSpec {
        CommandSpec::from_argv(argv.iter().copied()).unwrap()
    }

    fn argv(cmd: &Command) -> (OsString, Vec<OsString>) {
        let std_cmd = cmd.as_std();
        (
            std_cmd.get_program().to_os_string(),
            std_cmd.get_args().map(OsStr::to_os_string).collect(),
        )
    }

    #[test]
    fn test_posix_shell_receives_joined_command_line() {
        let builder = ShellCommandBuilder::new(Interpreter::Posix("sh".into()));

        let cmd = builder.build(&spec(&["exit", "3"])).unwrap();

        let (program, args) = argv(&cmd);
        assert_eq!(program, "sh");
        assert_eq!(args, ["-c", "exit 3"]);
    }

    #[test]
    fn test_cmd_receives_separate_arguments() {
        let builder =
            ShellCommandBuilder::new(Interpreter::Cmd("cmd.exe".into())).without_program_check();

        let cmd = builder.build(&spec(&["dir", "/b"])).unwrap();

        let (program, args) = argv(&cmd);
        assert_eq!(program, "cmd.exe");
        assert_eq!(args, ["/C", "dir", "/b"]);
    }

    #[test]
    fn test_interpreter_from_path() {
        assert!(matches!(
            Interpreter::from_path("C:/Windows/System32/CMD.EXE"),
            Interpreter::Cmd(_)
        ));
        assert!(matches!(
            Interpreter::from_path("/bin/bash"),
            Interpreter::Posix(_)
        ));
        assert_eq!(Interpreter::from_path("/bin/zsh").path(), Path::new("/bin/zsh"));
    }

    #[test]
    fn test_shell_builder_rejects_missing_program() {
        let builder = ShellCommandBuilder::default();

        let result = builder.build(&spec(&["stdiotap-no-such-program", "--flag"]));

        assert!(matches!(result, Err(LaunchError::NotFound(_))));
    }

    #[test]
    fn test_program_check_can_be_disabled() {
        let builder =
            ShellCommandBuilder::new(Interpreter::Posix("sh".into())).without_program_check();

        assert!(builder.build(&spec(&["stdiotap-no-such-program"])).is_ok());
    }

    #[test]
    #[cfg(unix)]
    fn test_direct_builder_uses_resolved_path() {
        let cmd = DirectCommandBuilder.build(&spec(&["sh", "-c", "exit 0"])).unwrap();

        let (program, args) = argv(&cmd);
        assert!(Path::new(&program).is_absolute());
        assert_eq!(args, ["-c", "exit 0"]);
    }

    #[test]
    fn test_direct_builder_has_no_builtins() {
        let result = DirectCommandBuilder.build(&spec(&["stdiotap-no-such-program"]));
        assert!(matches!(result, Err(LaunchError::NotFound(_))));
    }
}
