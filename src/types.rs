//! Defines application domain data types.

use crate::github::responses::Repository;
use chrono::{DateTime, Utc};
use std::fmt;

// types ------------------------------

/// A forked repository as seen by the sweep.
///
/// Only built from listing entries flagged as forks.
#[derive(Debug, PartialEq, Clone)]
pub struct Fork {
    pub owner: String,
    pub name: String,
    pub url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
}

/// Which timestamps count as activity when judging staleness.
#[derive(clap::ValueEnum, Default, Debug, PartialEq, Eq, Copy, Clone)]
pub enum Activity {
    /// Any of creation, last update or last push.
    #[default]
    Any,
    /// Creation time only.
    Created,
    /// Last update only.
    Updated,
    /// Last push only.
    Pushed,
}

// end: types ------------------------------

// Fork impls ------------------------------

impl Fork {
    /// Converts a listing entry, `None` when the entry is not a fork.
    pub fn from_repository(repo: Repository) -> Option<Self> {
        if !repo.fork {
            return None;
        }
        let s = Self {
            owner: repo.owner.login,
            name: repo.name,
            url: repo.html_url,
            created_at: repo.created_at,
            updated_at: repo.updated_at,
            pushed_at: repo.pushed_at,
        };
        Some(s)
    }

    /// `owner/name`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Timestamps selected by `activity`, missing ones skipped.
    pub fn activity(&self, activity: Activity) -> impl Iterator<Item = DateTime<Utc>> {
        use Activity::*;
        let stamps = match activity {
            Any => [self.created_at, self.updated_at, self.pushed_at],
            Created => [self.created_at, None, None],
            Updated => [self.updated_at, None, None],
            Pushed => [self.pushed_at, None, None],
        };
        stamps.into_iter().flatten()
    }

    /// Most recent timestamp selected by `activity`.
    pub fn last_active(&self, activity: Activity) -> Option<DateTime<Utc>> {
        self.activity(activity).max()
    }
}

impl fmt::Display for Fork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// end: Fork impls ------------------------------

// Activity impls ------------------------------

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Activity::*;
        let s = match self {
            Any => "any",
            Created => "created",
            Updated => "updated",
            Pushed => "pushed",
        };
        f.write_str(s)
    }
}

// end: Activity impls ------------------------------
