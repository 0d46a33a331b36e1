//! How a wrapped session ended and which exit code the wrapper reports.

/// Exit code used when no command was given.
pub const EXIT_USAGE: i32 = 1;

/// Exit code used when the wrapper itself failed: the child could not be
/// launched, or its exit status could not be interpreted.
///
/// Matches the convention of `env(1)` and `timeout(1)`, which reserve 125 for
/// their own failures (126/127 are taken by shells for "not executable" and
/// "not found").
pub const EXIT_WRAPPER_FAILURE: i32 = 125;

/// Final state of the wrapped child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The child exited normally with this code.
    Exited(i32),
    /// The child was terminated by this signal number.
    Signaled(i32),
    /// The child could not be started.
    LaunchFailed,
    /// The child's exit status could not be collected.
    WaitFailed,
}

impl Termination {
    /// Exit code the wrapper process should terminate with.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Exited(code) => code,
            Self::Signaled(_) | Self::LaunchFailed | Self::WaitFailed => EXIT_WRAPPER_FAILURE,
        }
    }

    /// Whether the outcome was decided by the wrapper rather than the child.
    #[must_use]
    pub const fn is_wrapper_failure(self) -> bool {
        !matches!(self, Self::Exited(_))
    }
}
