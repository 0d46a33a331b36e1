//! Diagnostics for the wrapper itself.
//!
//! Stdout belongs to the wrapped command, so diagnostics always go to stderr.
//! Quiet by default: only warnings and errors unless `STDIOTAP_LOG` says
//! otherwise.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the diagnostics filter.
pub const LOG_FILTER_ENV: &str = "STDIOTAP_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Install the global tracing subscriber.
pub fn init() -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to install diagnostics subscriber: {e}"))
}
