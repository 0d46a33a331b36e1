#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod paths;
pub mod ports;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types for convenience
pub use domain::{
    CommandSpec, Direction, EXIT_USAGE, EXIT_WRAPPER_FAILURE, LogLine, Payload, Termination,
};
pub use paths::{LOG_FILE_PREFIX, PathError, default_log_dir, log_file_path, resolve_log_dir};
pub use ports::{LogSink, NoopLogSink, SinkError};
