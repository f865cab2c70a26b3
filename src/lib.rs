mod display;
mod types;

pub mod app;
pub mod cli;
pub mod filter;
pub mod github;

pub use crate::{
    app::{App, GitHubClient, Outcome, SweepConfig},
    cli::Cli,
    types::{Activity, Fork},
};

use crate::github::GhClient;
use anyhow::Error;
use std::{io::Write, sync::Arc};

/// Runs one sweep against the API root named on the command line, reporting to `out`.
pub async fn run(cli: Cli, out: &mut impl Write) -> Result<Outcome, Error> {
    let client = GhClient::new(cli.api_url.clone(), &cli.token)?;
    let app = App::new(Arc::new(client), cli.sweep_config());
    app.run(out).await
}
