// src/data/datetime.rs

//! Functions to perform regular expression ("regex") searches on a line of
//! text and transform matches to an hour-of-day or a chrono
//! [`NaiveDateTime`].
//!
//! Extraction is "best effort". Free-text log files use many datetime
//! formats; only two shapes are searched:
//! - `HH:MM:SS` anywhere in the line, for the hour-of-day
//! - `YYYY-MM-DD HH:MM:SS` anywhere in the line, for a full datetime
//!
//! A failed search or a failed parse is not an error, it is `None`.
//!
//! [`NaiveDateTime`]: https://docs.rs/chrono/0.4.40/chrono/naive/struct.NaiveDateTime.html

#![allow(non_upper_case_globals)]

use ::chrono::{Local, NaiveDateTime};
use ::const_format::concatcp;
use ::lazy_static::lazy_static;
use ::regex::Regex;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Hour of the day, `0` to `23`
pub type Hour = u8;

/// Count of hours in a day, also the count of histogram buckets
pub const HOURS_PER_DAY: usize = 24;

/// A local datetime without timezone information.
///
/// Free-text log lines rarely declare a timezone so none is assumed.
pub type DateTimeL = NaiveDateTime;
pub type DateTimeLOpt = Option<DateTimeL>;

/// `strftime` format of a datetime found by [`extract_timestamp`]
pub const DATETIME_FORMAT_LOG: &str = "%Y-%m-%d %H:%M:%S";
/// `strftime` format for ISO 8601 output
pub const DATETIME_FORMAT_ISO8601: &str = "%Y-%m-%dT%H:%M:%S";

/// Capture Group Name for the hour
const CGN_HOUR: &str = "hour";
/// Capture Group Name for the date, `YYYY-MM-DD`
const CGN_DATE: &str = "date";
/// Capture Group Name for the time, `HH:MM:SS`
const CGN_TIME: &str = "time";

/// Capture Group Pattern for `HH`
const CGP_HOUR: &str = concatcp!("(?P<", CGN_HOUR, r">\d{2})");
/// Capture Group Pattern for `YYYY-MM-DD`
const CGP_DATE: &str = concatcp!("(?P<", CGN_DATE, r">\d{4}-\d{2}-\d{2})");
/// Capture Group Pattern for `HH:MM:SS`
const CGP_TIME: &str = concatcp!("(?P<", CGN_TIME, r">\d{2}:\d{2}:\d{2})");

/// regex pattern for `HH:MM:SS`
pub const RP_HOUR_MINUTE_SECOND: &str = concatcp!(r"\b", CGP_HOUR, r":\d{2}:\d{2}\b");
/// regex pattern for `YYYY-MM-DD HH:MM:SS`
pub const RP_DATE_TIME: &str = concatcp!(r"\b", CGP_DATE, r"\s+", CGP_TIME, r"\b");

lazy_static! {
    static ref REGEX_HOUR_MINUTE_SECOND: Regex = {
        defñ!("lazy_static! REGEX_HOUR_MINUTE_SECOND::new()");

        Regex::new(RP_HOUR_MINUTE_SECOND).unwrap()
    };
    static ref REGEX_DATE_TIME: Regex = {
        defñ!("lazy_static! REGEX_DATE_TIME::new()");

        Regex::new(RP_DATE_TIME).unwrap()
    };
}

/// Return the hour of the **first** `HH:MM:SS` substring in `line`.
///
/// Returns `None` if there is no such substring or if the hour of that first
/// substring is greater than 23. Later substrings are not considered.
pub fn extract_hour(line: &str) -> Option<Hour> {
    let captures = REGEX_HOUR_MINUTE_SECOND.captures(line)?;
    let hour: Hour = captures
        .name(CGN_HOUR)?
        .as_str()
        .parse::<Hour>()
        .ok()?;
    if hour as usize >= HOURS_PER_DAY {
        return None;
    }

    Some(hour)
}

/// Return the datetime of the **first** `YYYY-MM-DD HH:MM:SS` substring in
/// `line`.
///
/// Any amount of whitespace may separate the date and time. Returns `None`
/// if there is no such substring or it is not a valid datetime
/// (e.g. `2024-02-30 10:00:00`).
pub fn extract_timestamp(line: &str) -> DateTimeLOpt {
    let captures = REGEX_DATE_TIME.captures(line)?;
    // collapse the whitespace between date and time to one space
    let dt_str: String = format!(
        "{} {}",
        captures.name(CGN_DATE)?.as_str(),
        captures.name(CGN_TIME)?.as_str(),
    );

    NaiveDateTime::parse_from_str(dt_str.as_str(), DATETIME_FORMAT_LOG).ok()
}

/// The current local datetime, the fallback when a line has no datetime.
pub fn now_local() -> DateTimeL {
    Local::now().naive_local()
}

/// Format `dt` as ISO 8601, e.g. `"2024-01-05T10:15:32"`.
pub fn datetime_to_iso8601(dt: &DateTimeL) -> String {
    dt.format(DATETIME_FORMAT_ISO8601).to_string()
}
