use crate::{
    app::{SweepConfig, DEFAULT_MAX_PAGES, DEFAULT_OLDER_THAN_DAYS, DEFAULT_PER_PAGE},
    github::BearerToken,
    types::Activity,
};
use clap::{error::ErrorKind, ArgAction, Parser};
use url::Url;

/// Delete stale forks of a GitHub user.
///
/// Without --delete the forks are only listed.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    /// GitHub user whose forks are swept.
    #[clap(long, value_parser)]
    pub owner: String,

    /// Token authorized to list and delete the owner's repositories.
    #[clap(long, env = "GITHUB_TOKEN", hide_env_values = true, value_parser)]
    pub token: BearerToken,

    /// Repositories per listing page.
    #[clap(
        long,
        default_value_t = DEFAULT_PER_PAGE,
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    pub per_page: u8,

    /// Most listing pages fetched.
    #[clap(
        long = "max-page",
        default_value_t = DEFAULT_MAX_PAGES,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_pages: u32,

    /// Forks active within this many days are kept.
    #[clap(long, default_value_t = DEFAULT_OLDER_THAN_DAYS, value_parser)]
    pub older_than_days: u32,

    /// Keep forks whose `owner/name` contains this, ignoring case. Repeatable, comma separated.
    #[clap(
        short = 'g',
        long = "guard",
        value_name = "SUBSTRING",
        value_parser,
        action = ArgAction::Append,
        value_delimiter = ','
    )]
    pub guards: Vec<String>,

    /// Timestamps that count as activity.
    #[clap(long, value_enum, default_value_t)]
    pub activity: Activity,

    /// Actually delete the unguarded forks.
    #[clap(long, action)]
    pub delete: bool,

    /// GitHub REST API root, for GitHub Enterprise.
    #[clap(
        long,
        env = "GITHUB_API_URL",
        default_value = "https://api.github.com/",
        value_parser
    )]
    pub api_url: Url,
}

impl Cli {
    pub fn sweep_config(&self) -> SweepConfig {
        SweepConfig {
            owner: self.owner.clone(),
            per_page: self.per_page,
            max_pages: self.max_pages,
            older_than_days: self.older_than_days,
            guards: self.guards.clone(),
            activity: self.activity,
            delete: self.delete,
        }
    }
}

/// Whether a parse error is really a `--help` or `--version` request, which ends the process
/// successfully.
pub fn is_informational(err: &clap::Error) -> bool {
    matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}
