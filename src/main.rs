#![deny(rust_2018_idioms)]

use clap::Parser;
use console::style;
use fork_sweeper::{cli, Cli};
use std::{io, process::ExitCode};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if cli::is_informational(&err) => err.exit(),
        Err(err) => {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };
    debug!(?cli, "launched");

    let mut stdout = io::stdout();
    match fork_sweeper::run(cli, &mut stdout).await {
        Ok(outcome) => {
            debug!(?outcome, "exiting");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{} {:#}", style("Error:").for_stderr().red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
