//! Date and time utility functions
//!
//! Due dates arrive from Todoist in several shapes (plain date, floating
//! datetime, RFC 3339 with offset). Tasks only keep the day, so everything
//! funnels through [`start_of_day`].

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Standard date format used throughout the application for Todoist API compatibility
pub const TODOIST_DATE_FORMAT: &str = "%Y-%m-%d";

/// Floating datetime formats Todoist uses when no timezone is attached
const FLOATING_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// Parse a date string in YYYY-MM-DD format to NaiveDate
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str, TODOIST_DATE_FORMAT)
}

/// Parse the calendar day out of a Todoist date or datetime string.
///
/// Datetimes with an explicit offset are converted to local time before the
/// day is taken; floating datetimes keep their written day.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = parse_date(value) {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local).date_naive());
    }

    FLOATING_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}

/// Normalize a due date to midnight of its day.
///
/// # Arguments
/// * `value` - Date or datetime string as sent by Todoist
///
/// # Returns
/// * `Option<NaiveDateTime>` - Start of the day, or `None` when unparseable
pub fn start_of_day(value: &str) -> Option<NaiveDateTime> {
    parse_day(value).map(|day| day.and_time(NaiveTime::MIN))
}

/// Current instant as an RFC 3339 string, used to stamp local completions
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
