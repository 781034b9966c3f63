//! Schedule time handling.
//!
//! The route schedule provides times of day as "H:MM" / "HH:MM" strings and
//! stand durations as "<N>мин" / "<N>ч" strings. This module parses both and
//! formats durations back into the "<H>ч <M>мин" form used in answers.

use chrono::{DateTime, Duration, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

/// Error returned when parsing an invalid time or duration string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parse a time of day from "H:MM" or "HH:MM" format.
///
/// The schedule source does not zero-pad hours, so both forms are accepted.
///
/// # Examples
///
/// ```
/// use train_tracker::domain::parse_hhmm;
///
/// assert_eq!(parse_hhmm("1:10").unwrap().to_string(), "01:10:00");
/// assert_eq!(parse_hhmm("22:10").unwrap().to_string(), "22:10:00");
/// assert!(parse_hhmm("25:00").is_err());
/// assert!(parse_hhmm("2210").is_err());
/// ```
pub fn parse_hhmm(s: &str) -> Result<NaiveTime, TimeError> {
    let (hour_str, minute_str) = s
        .split_once(':')
        .ok_or_else(|| TimeError::new("expected H:MM format"))?;

    if hour_str.is_empty() || hour_str.len() > 2 {
        return Err(TimeError::new("hour must be 1-2 digits"));
    }
    if minute_str.len() != 2 {
        return Err(TimeError::new("minute must be 2 digits"));
    }

    let hour: u32 = hour_str
        .parse()
        .map_err(|_| TimeError::new("invalid hour digits"))?;
    let minute: u32 = minute_str
        .parse()
        .map_err(|_| TimeError::new("invalid minute digits"))?;

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| TimeError::new("time out of range"))
}

/// Parse a stand duration from "<N>мин" or "<N>ч" format.
///
/// Interior whitespace is ignored ("20 мин" parses as 20 minutes).
///
/// # Examples
///
/// ```
/// use chrono::Duration;
/// use train_tracker::domain::parse_stand_duration;
///
/// assert_eq!(parse_stand_duration("20мин").unwrap(), Duration::minutes(20));
/// assert_eq!(parse_stand_duration("1ч").unwrap(), Duration::hours(1));
/// assert!(parse_stand_duration("20s").is_err());
/// ```
pub fn parse_stand_duration(s: &str) -> Result<Duration, TimeError> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();

    if let Some(hours) = compact.strip_suffix('ч') {
        let hours: i64 = hours
            .parse()
            .map_err(|_| TimeError::new("invalid hour count"))?;
        return Duration::try_hours(hours)
            .ok_or_else(|| TimeError::new("stand duration out of range"));
    }

    if let Some(minutes) = compact.strip_suffix("мин") {
        let minutes: i64 = minutes
            .parse()
            .map_err(|_| TimeError::new("invalid minute count"))?;
        return Duration::try_minutes(minutes)
            .ok_or_else(|| TimeError::new("stand duration out of range"));
    }

    Err(TimeError::new("expected <N>мин or <N>ч"))
}

/// Format a duration as "<H>ч <M>мин", or just "<M>мин" under an hour.
///
/// Negative durations get a leading minus sign.
///
/// # Examples
///
/// ```
/// use chrono::Duration;
/// use train_tracker::domain::format_duration;
///
/// assert_eq!(format_duration(Duration::minutes(95)), "1ч 35мин");
/// assert_eq!(format_duration(Duration::minutes(40)), "40мин");
/// assert_eq!(format_duration(Duration::minutes(-95)), "-1ч 35мин");
/// ```
pub fn format_duration(d: Duration) -> String {
    if d < Duration::zero() {
        return format!("-{}", format_duration(-d));
    }

    let hours = d.num_hours();
    let minutes = d.num_minutes() % 60;

    if hours > 0 {
        format!("{hours}ч {minutes}мин")
    } else {
        format!("{minutes}мин")
    }
}

/// Format an instant in a timezone as "HH:MM DD.MM.YYYY".
pub fn format_local(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%H:%M %d.%m.%Y").to_string()
}

/// Format an instant in a timezone as "HH:MM".
pub fn format_local_short(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%H:%M").to_string()
}

/// UTC offset difference `b - a` at a reference instant.
///
/// Positive means `b` is ahead of `a`.
pub fn timezone_difference(a: Tz, b: Tz, at: DateTime<Utc>) -> Duration {
    let offset_a = a.offset_from_utc_datetime(&at.naive_utc()).fix().local_minus_utc();
    let offset_b = b.offset_from_utc_datetime(&at.naive_utc()).fix().local_minus_utc();
    Duration::seconds(i64::from(offset_b) - i64::from(offset_a))
}
