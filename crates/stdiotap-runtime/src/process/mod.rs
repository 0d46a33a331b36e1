//! Child process helpers.

mod shutdown;

pub use shutdown::{DEFAULT_SHUTDOWN_GRACE, kill_if_running, shutdown_child};
