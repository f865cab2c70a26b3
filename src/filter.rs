//! Splits forks into the ones to keep and the ones up for deletion.

use crate::types::{Activity, Fork};
use chrono::{DateTime, Duration, Utc};

/// Case-insensitive name fragments that protect a fork from deletion.
///
/// Entries are trimmed, blank entries are dropped and match nothing.
#[derive(PartialEq, Clone, Default, Debug)]
pub struct Guards(Vec<String>);

impl Guards {
    pub fn new<I, S>(guards: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let guards = guards
            .into_iter()
            .map(|x| x.as_ref().trim().to_lowercase())
            .filter(|x| !x.is_empty())
            .collect();
        Self(guards)
    }

    /// Whether any guard is a substring of `name`, ignoring case.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.0.iter().any(|x| name.contains(x.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outcome of [`partition`], both halves keep the input order.
#[derive(PartialEq, Clone, Default, Debug)]
pub struct Partition {
    /// Stale and unmatched, deletion candidates.
    pub unguarded: Vec<Fork>,
    /// Recently active or matched by a guard.
    pub guarded: Vec<Fork>,
}

/// Instant before which activity no longer protects a fork.
///
/// Saturates at the earliest representable instant, so any recorded activity guards.
pub fn cutoff(now: DateTime<Utc>, older_than_days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(Duration::days(i64::from(older_than_days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// A fork is guarded when it was active at or after `cutoff`, or when its full name matches a
/// guard.
pub fn is_guarded(fork: &Fork, guards: &Guards, cutoff: DateTime<Utc>, activity: Activity) -> bool {
    let active = fork.activity(activity).any(|x| x >= cutoff);
    active || guards.matches(&fork.full_name())
}

/// [`partition_at`] with the current time.
pub fn partition(
    forks: impl IntoIterator<Item = Fork>,
    guards: &Guards,
    older_than_days: u32,
    activity: Activity,
) -> Partition {
    partition_at(forks, guards, older_than_days, activity, Utc::now())
}

pub fn partition_at(
    forks: impl IntoIterator<Item = Fork>,
    guards: &Guards,
    older_than_days: u32,
    activity: Activity,
    now: DateTime<Utc>,
) -> Partition {
    let cutoff = cutoff(now, older_than_days);
    let (guarded, unguarded) =
        forks.into_iter().partition(|x| is_guarded(x, guards, cutoff, activity));
    Partition { unguarded, guarded }
}
