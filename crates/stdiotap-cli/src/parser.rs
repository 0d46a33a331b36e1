//! Command-line surface: `stdiotap [OPTIONS] <command> [args...]`.

use std::path::PathBuf;

use clap::Parser;
use stdiotap_runtime::OutputConfig;
use stdiotap_runtime::forward::DEFAULT_STDIN_CHUNK;

/// Run a command and record its standard streams to a timestamped log file.
///
/// Everything after the first positional argument belongs to the wrapped
/// command, flags included.
#[derive(Debug, Parser)]
#[command(name = "stdiotap")]
#[command(version)]
#[command(about = "Run a command transparently while logging its stdin, stdout and stderr")]
#[command(override_usage = "stdiotap [OPTIONS] <command> [args...]")]
pub struct Cli {
    /// Directory for the log file (default: next to the stdiotap executable)
    #[arg(long = "log-dir", env = "STDIOTAP_LOG_DIR", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Interpreter used to run the command line (`<shell> -c`, or `/C` for cmd.exe)
    #[arg(long, env = "STDIOTAP_SHELL", value_name = "PATH")]
    pub shell: Option<PathBuf>,

    /// Execute the program directly instead of through a shell
    #[arg(long = "no-shell")]
    pub no_shell: bool,

    /// Read size for stdin forwarding
    #[arg(
        long = "chunk-size",
        value_name = "BYTES",
        default_value_t = DEFAULT_STDIN_CHUNK,
        value_parser = parse_positive
    )]
    pub chunk_size: usize,

    /// Longest output line logged as one record before it is split
    #[arg(
        long = "max-line-bytes",
        value_name = "BYTES",
        default_value_t = OutputConfig::DEFAULT_MAX_LINE_BYTES,
        value_parser = parse_positive
    )]
    pub max_line_bytes: usize,

    /// Log an unterminated output line after this many idle milliseconds (0 disables)
    #[arg(
        long = "line-flush-ms",
        env = "STDIOTAP_LINE_FLUSH_MS",
        value_name = "MS",
        default_value_t = 200
    )]
    pub line_flush_ms: u64,

    /// Command to run, followed by its arguments
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

fn parse_positive(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
