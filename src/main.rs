//! deep-research CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use deep_research::cli::{Cli, execute};

#[allow(clippy::print_stdout)]
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = execute(&cli)?;
    print!("{output}");
    Ok(())
}

/// Logs go to stderr so stdout carries only the command output.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
