//! Display formatting for list and detail renders

use chrono::{DateTime, Local, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Display;

static GENERATION_PREFIX: Lazy<Regex> = Lazy::new(|| {
    // ASCII word class, matching the key generator's `{millis}-` prefix
    Regex::new(r"^[A-Za-z0-9_]+-").expect("static pattern compiles")
});

const DATE_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Strip the upload-time prefix from an attachment key
///
/// `"1700000000-report.pdf"` becomes `"report.pdf"`. Keys without a prefix
/// are returned unchanged.
#[must_use]
pub fn format_filename(key: &str) -> &str {
    match GENERATION_PREFIX.find(key) {
        Some(prefix) => &key[prefix.end()..],
        None => key,
    }
}

/// Human-readable creation date in the local time zone; empty when absent
#[must_use]
pub fn format_created_at(created_at: Option<DateTime<Utc>>) -> String {
    format_created_at_in(created_at, &Local)
}

/// Human-readable creation date in `tz`; empty when absent
#[must_use]
pub fn format_created_at_in<Tz>(created_at: Option<DateTime<Utc>>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    created_at
        .map(|ts| ts.with_timezone(tz).format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}
