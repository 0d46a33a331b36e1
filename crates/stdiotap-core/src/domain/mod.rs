//! Domain types shared by every stdiotap crate.

mod command;
mod log_line;
mod outcome;

pub use command::CommandSpec;
pub use log_line::{Direction, LogLine, Payload};
pub use outcome::{EXIT_USAGE, EXIT_WRAPPER_FAILURE, Termination};
