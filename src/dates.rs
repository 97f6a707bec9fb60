//! Calendar arithmetic on plain dates and times of day.
//!
//! Dates carry no time zone. Everything here is total: arithmetic that would
//! leave chrono's supported range yields `None` instead of panicking.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveTime, Timelike};

pub const ISO_DATE: &str = "%Y-%m-%d";
pub const TIME_OF_DAY: &str = "%H:%M";

pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_DATE).to_string()
}

pub fn parse_iso(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), ISO_DATE).ok()
}

pub fn add_days(date: NaiveDate, amount: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(amount))
}

/// Same day-of-month `amount` months later. A day that does not exist in the
/// target month clamps to that month's last day (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, amount: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(amount))
}

/// Monday through Sunday of the week containing `date`.
pub fn week_days(date: NaiveDate) -> Vec<NaiveDate> {
    let start = week_start(date);
    start.iter_days().take(7).collect()
}

pub fn is_in_same_week(date: NaiveDate, anchor: NaiveDate) -> bool {
    week_start(date) == week_start(anchor)
}

fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as i64;
    add_days(date, -offset).unwrap_or(date)
}

/// Adds minutes to a time of day, wrapping around midnight.
pub fn add_minutes_to_time(time: NaiveTime, minutes: i64) -> NaiveTime {
    let (wrapped, _) = time.overflowing_add_signed(Duration::minutes(minutes));
    wrapped
}

/// Builds a time of day from user-typed parts. Minutes default to zero.
pub fn parse_time_parts(hours: &str, minutes: Option<&str>) -> Option<NaiveTime> {
    let hours: u32 = hours.trim().parse().ok()?;
    let minutes: u32 = match minutes {
        Some(raw) => raw.trim().parse().ok()?,
        None => 0,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    NaiveTime::from_hms_opt(hours, minutes, 0)
}

pub fn format_time(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Serde adapter storing an optional time of day as `"HH:MM"`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_str(&super::format_time(*time)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => NaiveTime::parse_from_str(text, super::TIME_OF_DAY)
                .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
