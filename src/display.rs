use crate::{
    filter::Partition,
    types::{Activity, Fork},
};
use chrono::{DateTime, TimeZone, Utc};
use console::style;
use std::{
    fmt,
    io::{self, Write},
};
use tabwriter::TabWriter;

/// Relative time from now.
pub trait RelativeFromNow {
    fn relative_from_now(&self) -> Since;
}

impl<T> RelativeFromNow for DateTime<T>
where
    T: TimeZone,
{
    fn relative_from_now(&self) -> Since {
        Since::between(self.clone(), Utc::now())
    }
}

#[derive(PartialEq, Copy, Clone, Debug)]
pub struct Since(chrono::Duration);

impl Since {
    pub fn between<T: TimeZone>(then: DateTime<T>, now: DateTime<Utc>) -> Self {
        Self(now.signed_duration_since(then))
    }
}

impl fmt::Display for Since {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self.0.num_days();
        match days {
            _ if days < 1 => {
                let hours = self.0.num_hours();
                if hours < 1 {
                    let minutes = self.0.num_minutes();
                    match minutes {
                        _ if minutes < 1 => write!(f, "just now"),
                        1 => write!(f, "1 minute ago"),
                        _ => write!(f, "{minutes} minutes ago"),
                    }
                } else if hours == 1 {
                    write!(f, "1 hour ago")
                } else {
                    write!(f, "{hours} hours ago")
                }
            }
            _ if days < 7 => {
                write!(f, "this week")
            }
            _ if days < 30 => {
                write!(f, "this month")
            }
            _ if days < 365 => {
                write!(f, "{days} days ago")
            }
            _ => {
                let years = days / 365;
                if years == 1 {
                    write!(f, "{years} year ago")
                } else {
                    write!(f, "{years} years ago")
                }
            }
        }
    }
}

/// Writes the guarded and unguarded forks, one URL per line with its last activity.
pub fn write_partition(
    w: &mut impl Write,
    partition: &Partition,
    activity: Activity,
) -> io::Result<()> {
    let Partition { unguarded, guarded } = partition;
    write_section(w, "Guarded forks", guarded, activity)?;
    writeln!(w)?;
    write_section(w, "Unguarded forks", unguarded, activity)?;
    Ok(())
}

fn write_section(
    w: &mut impl Write,
    heading: &str,
    forks: &[Fork],
    activity: Activity,
) -> io::Result<()> {
    writeln!(w, "{} ({}):", style(heading).cyan().bold(), forks.len())?;
    if forks.is_empty() {
        writeln!(w, "  (none)")?;
        return Ok(());
    }
    // aligns the activity column
    let mut tw = TabWriter::new(&mut *w).padding(4);
    for fork in forks {
        let active = fork
            .last_active(activity)
            .map(|x| x.relative_from_now().to_string())
            .unwrap_or_else(|| "no activity".to_owned());
        writeln!(tw, "  - {}\t{}", fork.url, active)?;
    }
    tw.flush()?;
    Ok(())
}
