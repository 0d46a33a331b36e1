#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unsafe_code)]

pub mod command;
mod error;
pub mod forward;
pub mod process;
mod sink;
mod supervisor;

pub use command::{CommandBuilder, DirectCommandBuilder, Interpreter, ShellCommandBuilder};
pub use error::LaunchError;
pub use forward::{ForwardReport, OutputConfig, StreamEnd};
pub use sink::FileLogSink;
pub use supervisor::{SessionIo, SessionReport, Supervisor, SupervisorConfig, SupervisorState};
