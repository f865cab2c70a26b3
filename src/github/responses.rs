use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Entry of the user repositories listing.
///
/// [GitHub Docs].
///
/// [GitHub Docs]: https://docs.github.com/en/rest/repos/repos#list-repositories-for-a-user
#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct Repository {
    pub name: String,
    pub html_url: String,
    #[serde(default)]
    pub fork: bool,
    pub owner: User,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct User {
    pub login: String,
}
