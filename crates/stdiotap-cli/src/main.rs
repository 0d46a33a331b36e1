//! CLI entry point.
//!
//! Parses arguments, opens the log through the composition root, runs the
//! session and exits with the child's exit code.

use clap::Parser;
use stdiotap_cli::{Cli, CliError, WrapperConfig, bootstrap, logging};
use stdiotap_core::EXIT_USAGE;

#[tokio::main]
async fn main() {
    let code = run().await;
    // Exit without waiting on the runtime: a stdin read blocked on the
    // terminal cannot be cancelled and would hold up shutdown.
    std::process::exit(code);
}

async fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { EXIT_USAGE } else { 0 };
        }
    };

    if let Err(e) = logging::init() {
        return fail(&CliError::Wrapper(format!("{e:#}")));
    }

    let session = match WrapperConfig::from_cli(cli) {
        Ok(config) => bootstrap(config).await,
        Err(e) => Err(e),
    };
    match session {
        Ok(session) => session.run().await.exit_code(),
        Err(e) => fail(&e),
    }
}

fn fail(err: &CliError) -> i32 {
    eprintln!("stdiotap: {err}");
    err.exit_code()
}
