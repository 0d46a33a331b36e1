//! Log directory and log file naming.
//!
//! Log files live next to the wrapper executable unless a directory is
//! configured, and are named after the UTC instant the wrapper started:
//! `stdio-2026-10-16_091403.log`.

mod error;
mod log_file;

pub use error::PathError;
pub use log_file::{
    LOG_FILE_EXTENSION, LOG_FILE_PREFIX, default_log_dir, log_file_name, log_file_path,
    resolve_log_dir,
};
