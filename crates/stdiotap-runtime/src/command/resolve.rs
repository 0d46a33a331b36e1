//! Executable lookup before launch.
//!
//! A shell turns a missing program into exit status 127, which would be
//! indistinguishable from a child that legitimately exits 127. Looking the
//! program up first lets the supervisor report it as a launch failure.
//! Words the shell handles itself (built-ins, keywords, anything with shell
//! syntax in it) are passed through unchecked.

use std::path::PathBuf;

use tracing::debug;

use crate::error::LaunchError;

/// POSIX shell built-ins and reserved words.
#[cfg(not(windows))]
const SHELL_BUILTINS: &[&str] = &[
    "!", ".", ":", "[", "alias", "bg", "break", "case", "cd", "command", "continue", "do",
    "done", "echo", "elif", "else", "esac", "eval", "exec", "exit", "export", "false", "fc",
    "fg", "fi", "for", "getopts", "hash", "if", "jobs", "kill", "printf", "pwd", "read",
    "readonly", "return", "set", "shift", "source", "test", "then", "times", "trap", "true",
    "type", "ulimit", "umask", "unalias", "unset", "until", "wait", "while", "{", "}",
];

/// `cmd.exe` internal commands.
#[cfg(windows)]
const SHELL_BUILTINS: &[&str] = &[
    "assoc", "break", "call", "cd", "chdir", "cls", "color", "copy", "date", "del", "dir",
    "echo", "endlocal", "erase", "exit", "for", "ftype", "goto", "if", "md", "mkdir", "mklink",
    "move", "path", "pause", "popd", "prompt", "pushd", "rd", "rem", "ren", "rename", "rmdir",
    "set", "setlocal", "shift", "start", "time", "title", "type", "ver", "verify", "vol",
];

/// Characters that make a word shell syntax rather than a program name.
const SHELL_SYNTAX: &[char] = &[
    '|', '&', ';', '<', '>', '(', ')', '$', '`', '"', '\'', '*', '?', '#', '~', '=', '%', '{',
    '}', '^', '!',
];

/// What the first word of a command turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A shell built-in or reserved word.
    Builtin,
    /// Contains shell syntax (operators, expansions, assignments).
    ShellSyntax,
    /// An executable found at this path.
    Executable(PathBuf),
}

/// Classify `program` for a shell launch, failing when it is a plain name
/// that cannot be found.
pub fn resolve_for_shell(program: &str) -> Result<Resolution, LaunchError> {
    if is_builtin(program) {
        return Ok(Resolution::Builtin);
    }
    if program.chars().any(|c| c.is_whitespace() || SHELL_SYNTAX.contains(&c)) {
        return Ok(Resolution::ShellSyntax);
    }
    find_executable(program).map(Resolution::Executable)
}

/// Look `program` up on `PATH` (or check it directly when it contains a path
/// separator).
pub fn find_executable(program: &str) -> Result<PathBuf, LaunchError> {
    match which::which(program) {
        Ok(path) => {
            debug!(program, path = %path.display(), "Resolved executable");
            Ok(path)
        }
        Err(e) => {
            debug!(program, error = %e, "Executable lookup failed");
            Err(LaunchError::NotFound(program.to_string()))
        }
    }
}

fn is_builtin(program: &str) -> bool {
    if cfg!(windows) {
        SHELL_BUILTINS
            .iter()
            .any(|b| b.eq_ignore_ascii_case(program))
    } else {
        SHELL_BUILTINS.contains(&program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_skip_lookup() {
        assert_eq!(resolve_for_shell("exit").unwrap(), Resolution::Builtin);
        assert_eq!(resolve_for_shell("cd").unwrap(), Resolution::Builtin);
    }

    #[test]
    fn test_shell_syntax_skips_lookup() {
        assert_eq!(
            resolve_for_shell("FOO=1").unwrap(),
            Resolution::ShellSyntax
        );
        assert_eq!(
            resolve_for_shell("ls|wc").unwrap(),
            Resolution::ShellSyntax
        );
        assert_eq!(
            resolve_for_shell("echo hi").unwrap(),
            Resolution::ShellSyntax
        );
    }

    #[test]
    fn test_missing_program_is_not_found() {
        let err = resolve_for_shell("stdiotap-definitely-missing-program").unwrap_err();
        assert!(matches!(err, LaunchError::NotFound(ref p) if p == "stdiotap-definitely-missing-program"));
        assert_eq!(
            err.to_string(),
            "command not found: stdiotap-definitely-missing-program"
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_program_on_path_resolves() {
        let Resolution::Executable(path) = resolve_for_shell("sh").unwrap() else {
            panic!("sh should resolve to an executable");
        };
        assert!(path.is_absolute());
    }

    #[test]
    #[cfg(unix)]
    fn test_explicit_path_is_checked_directly() {
        assert!(find_executable("/bin/sh").is_ok());
        assert!(find_executable("/nonexistent/dir/tool").is_err());
    }
}
