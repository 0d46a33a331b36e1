//! The command line being wrapped.

use std::fmt;

/// Program and arguments to run under the wrapper.
///
/// The program is always non-empty; construct through [`CommandSpec::from_argv`]
/// when the input comes straight from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    /// Build a spec from an argv-style list. Returns `None` when the list is
    /// empty or the program is an empty string.
    pub fn from_argv<I, S>(argv: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv.next().filter(|p| !p.is_empty())?;
        Some(Self {
            program,
            args: argv.collect(),
        })
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Program and arguments joined with single spaces, as handed to a shell.
    #[must_use]
    pub fn joined(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_argv_splits_program_and_args() {
        let spec = CommandSpec::from_argv(["grep", "-n", "foo bar"]).unwrap();
        assert_eq!(spec.program(), "grep");
        assert_eq!(spec.args(), ["-n", "foo bar"]);
        assert_eq!(spec.joined(), "grep -n foo bar");
    }

    #[test]
    fn test_empty_argv_is_rejected() {
        assert!(CommandSpec::from_argv(Vec::<String>::new()).is_none());
        assert!(CommandSpec::from_argv([""]).is_none());
    }

    #[test]
    fn test_display_matches_joined() {
        let spec = CommandSpec::from_argv(["exit", "3"]).unwrap();
        assert_eq!(spec.to_string(), "exit 3");
    }
}
