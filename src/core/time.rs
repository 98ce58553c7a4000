//! Time formatting for human-facing progress output

use chrono::{DateTime, TimeZone};
use std::time::Duration;

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS <zone>`
pub fn format_timestamp<Tz>(when: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    when.format("%Y-%m-%d %H:%M:%S %Z").to_string()
}

/// Current local time, formatted with [`format_timestamp`]
pub fn now_timestamp() -> String {
    format_timestamp(&chrono::Local::now())
}

/// Format an elapsed duration as `H:MM:SS`
pub fn format_elapsed(elapsed: Duration) -> String {
    let s = elapsed.as_secs();
    format!("{}:{:02}:{:02}", s / 3600, (s % 3600) / 60, s % 60)
}
