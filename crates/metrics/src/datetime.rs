//! Clock formatting with user-configurable strftime patterns.

use std::fmt::Display;

use chrono::{
    DateTime, Local, TimeZone,
    format::{Item, StrftimeItems},
};

use crate::DateTimeInfo;

/// Pattern used for `date` when none is configured.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
/// Pattern used for `time` when none is configured.
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";
/// Pattern used for `datetime` when none is configured.
pub const DEFAULT_DATETIME_FORMAT: &str = "%A, %b %-d, %Y %H:%M:%S";

/// Optional strftime overrides taken from the global configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateTimeFormats {
    /// Override for `date`.
    pub date: Option<String>,
    /// Override for `time`.
    pub time: Option<String>,
    /// Override for `datetime`.
    pub datetime: Option<String>,
}

impl DateTimeInfo {
    /// Format the current local time.
    pub fn now(formats: &DateTimeFormats) -> Self {
        Self::at(&Local::now(), formats)
    }

    /// Format `when` with `formats`, substituting the default for any pattern chrono rejects.
    pub fn at<Tz>(when: &DateTime<Tz>, formats: &DateTimeFormats) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            formatted: render(when, formats.datetime.as_deref(), DEFAULT_DATETIME_FORMAT),
            date: render(when, formats.date.as_deref(), DEFAULT_DATE_FORMAT),
            time: render(when, formats.time.as_deref(), DEFAULT_TIME_FORMAT),
            weekday: render(when, None, "%A"),
        }
    }
}

/// Render a single pattern, never panicking on malformed input.
fn render<Tz>(when: &DateTime<Tz>, pattern: Option<&str>, fallback: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let pattern = match pattern {
        Some(p) if is_valid_pattern(p) => p,
        _ => fallback,
    };
    when.format(pattern).to_string()
}

/// True when chrono can format every item in `pattern`.
fn is_valid_pattern(pattern: &str) -> bool {
    StrftimeItems::new(pattern).all(|item| !matches!(item, Item::Error))
}
