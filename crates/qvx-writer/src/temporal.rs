//! Date and time text to fractional-day conversion for dual fields.
//!
//! Values are days since 1899-12-30 (so 1970-01-01 is 25569), with the time
//! of day as the fractional part. Two compatibility rules are kept so output
//! matches files produced by existing writers:
//!
//! - Dates in years 2..=1899 are shifted back by one day.
//! - A missing date part defaults to year 0, January 2.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::types::FieldAttrType;

/// Day number (days from CE) of the epoch anchor, 1899-12-30.
const EPOCH_ANCHOR_DAYS_FROM_CE: i64 = 693_594;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Date used when a temporal value has no date part.
pub const DEFAULT_DATE: &str = "0-1-2";

/// Errors from temporal conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemporalError {
    /// The text is not a valid date or time.
    #[error("{reason}")]
    Malformed { input: String, reason: String },

    /// The attribute type has no temporal meaning.
    #[error("no temporal conversion for {0}")]
    UnknownSubtype(FieldAttrType),
}

impl TemporalError {
    fn malformed(input: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convert date/time text to fractional days for a temporal subtype.
///
/// - `DATE`: date part only.
/// - `TIME`, `INTERVAL`: time part only; any date part is ignored.
/// - `TIMESTAMP`: date plus time, each defaulting independently.
pub fn to_fractional_days(subtype: FieldAttrType, text: &str) -> Result<f64, TemporalError> {
    let (date_part, time_part) = split_date_time(text);
    match subtype {
        FieldAttrType::Date => date_to_days_since(date_part.unwrap_or(DEFAULT_DATE)),
        FieldAttrType::Time | FieldAttrType::Interval => match time_part {
            Some(time) => time_to_days_since(time),
            None => Ok(0.0),
        },
        FieldAttrType::Timestamp => {
            let days = date_to_days_since(date_part.unwrap_or(DEFAULT_DATE))?;
            let time = match time_part {
                Some(time) => time_to_days_since(time)?,
                None => 0.0,
            };
            Ok(days + time)
        }
        FieldAttrType::Unknown | FieldAttrType::Fix | FieldAttrType::Real => {
            Err(TemporalError::UnknownSubtype(subtype))
        }
    }
}

/// Split `text` into optional date and time parts.
///
/// Exactly one `T` separates date from time. Otherwise the whole text is a
/// time if it contains `:`, a date if it contains `-`, and neither if it
/// contains neither.
fn split_date_time(text: &str) -> (Option<&str>, Option<&str>) {
    let mut parts: Vec<&str> = text.split('T').collect();
    while parts.len() > 1 && parts.last().is_some_and(|part| part.is_empty()) {
        parts.pop();
    }
    if let [date, time] = parts[..] {
        (Some(date), Some(time))
    } else if text.contains(':') {
        (None, Some(text))
    } else if text.contains('-') {
        (Some(text), None)
    } else {
        (None, None)
    }
}

/// Days from 1899-12-30 to a `YYYY-MM-DD` date.
///
/// The day of month is lenient: day 0 is the last day of the previous month,
/// and days past the end of the month roll into the next one.
pub fn date_to_days_since(date: &str) -> Result<f64, TemporalError> {
    let mut parts = date.split('-');
    let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(TemporalError::malformed(date, "expected YYYY-MM-DD"));
    };

    let year: i32 = parse_component(date, year, "year")?;
    let month: u32 = parse_component(date, month, "month")?;
    let day: i32 = parse_component(date, day, "day")?;

    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| TemporalError::malformed(date, format!("no such month: {year}-{month}")))?;
    let resolved = first
        .num_days_from_ce()
        .checked_add(day)
        .and_then(|days| days.checked_sub(1))
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| TemporalError::malformed(date, format!("day {day} out of range")))?;

    // The year shift applies to the date after day-of-month rollover.
    let mut days_from_ce = i64::from(resolved.num_days_from_ce());
    if resolved.year() > 1 && resolved.year() < 1900 {
        days_from_ce -= 1;
    }

    Ok((days_from_ce - EPOCH_ANCHOR_DAYS_FROM_CE) as f64)
}

/// Fraction of a day for `HH:MM[:SS]`. Components may be fractional.
pub fn time_to_days_since(time: &str) -> Result<f64, TemporalError> {
    let mut parts = time.split(':');
    let (Some(hours), Some(minutes)) = (parts.next(), parts.next()) else {
        return Err(TemporalError::malformed(time, "expected HH:MM[:SS]"));
    };
    let hours: f64 = parse_component(time, hours, "hours")?;
    let minutes: f64 = parse_component(time, minutes, "minutes")?;
    let seconds: f64 = match parts.next() {
        Some(seconds) => parse_component(time, seconds, "seconds")?,
        None => 0.0,
    };

    Ok((hours * 3600.0 + minutes * 60.0 + seconds) / SECONDS_PER_DAY)
}

fn parse_component<T>(input: &str, component: &str, what: &str) -> Result<T, TemporalError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    component
        .trim()
        .parse()
        .map_err(|e| TemporalError::malformed(input, format!("invalid {what} '{component}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_epoch_offset() {
        assert_eq!(date_to_days_since("1970-01-01").unwrap(), 25569.0);
        assert_eq!(date_to_days_since("1899-12-30").unwrap(), -1.0);
        assert_eq!(date_to_days_since("1900-01-01").unwrap(), 2.0);
    }

    #[test]
    fn test_consecutive_days() {
        let a = date_to_days_since("1970-01-01").unwrap();
        let b = date_to_days_since("1970-01-02").unwrap();
        assert_eq!(b, a + 1.0);
    }

    #[test]
    fn test_pre_1900_adjustment() {
        let old = date_to_days_since("1850-06-15").unwrap();
        let new = date_to_days_since("1950-06-15").unwrap();
        // 36525 calendar days apart, plus the one-day shift on 1850.
        assert_eq!(new - old, 36526.0);
        assert_eq!(old, -18096.0);
    }

    #[test]
    fn test_year_one_unadjusted() {
        assert_eq!(date_to_days_since("1-1-2").unwrap(), 2.0 - 693_594.0);
    }

    #[test]
    fn test_default_date() {
        assert_eq!(date_to_days_since(DEFAULT_DATE).unwrap(), -693_958.0);
    }

    #[test]
    fn test_lenient_day_of_month() {
        assert_eq!(
            date_to_days_since("2020-03-00").unwrap(),
            date_to_days_since("2020-02-29").unwrap()
        );
        assert_eq!(
            date_to_days_since("2021-01-32").unwrap(),
            date_to_days_since("2021-02-01").unwrap()
        );
    }

    #[test]
    fn test_pre_1900_shift_uses_rolled_over_year() {
        // 1899-12-32 is 1900-01-01, so no shift.
        assert_eq!(date_to_days_since("1899-12-32").unwrap(), 2.0);
        // 1900-01-00 is 1899-12-31, so it is shifted.
        assert_eq!(date_to_days_since("1900-01-00").unwrap(), 0.0);
    }

    #[test]
    fn test_malformed_dates() {
        assert!(date_to_days_since("2020-13-01").is_err());
        assert!(date_to_days_since("2020-01").is_err());
        assert!(date_to_days_since("abcd-01-01").is_err());
        assert!(date_to_days_since("2020-01-2147483647").is_err());
    }

    #[test]
    fn test_time_fractions() {
        assert_eq!(time_to_days_since("12:00:00").unwrap(), 0.5);
        assert_eq!(time_to_days_since("6:00").unwrap(), 0.25);
        assert_eq!(time_to_days_since("0:0:0").unwrap(), 0.0);
        assert_eq!(time_to_days_since("18:00:00.0").unwrap(), 0.75);
        assert!(time_to_days_since("noon").is_err());
        assert!(time_to_days_since("12:xx").is_err());
    }

    #[test]
    fn test_split_date_time() {
        assert_eq!(
            split_date_time("2020-01-01T06:00"),
            (Some("2020-01-01"), Some("06:00"))
        );
        assert_eq!(split_date_time("06:00"), (None, Some("06:00")));
        assert_eq!(split_date_time("2020-01-01"), (Some("2020-01-01"), None));
        assert_eq!(split_date_time("2020-01-01T"), (Some("2020-01-01T"), None));
        assert_eq!(split_date_time("42"), (None, None));
    }

    #[test]
    fn test_subtype_dispatch() {
        let ts = to_fractional_days(FieldAttrType::Timestamp, "1970-01-01T12:00:00").unwrap();
        assert_eq!(ts, 25569.5);

        let date = to_fractional_days(FieldAttrType::Date, "1970-01-01T12:00:00").unwrap();
        assert_eq!(date, 25569.0);

        let time = to_fractional_days(FieldAttrType::Time, "1970-01-01T06:00:00").unwrap();
        assert_eq!(time, 0.25);

        let interval = to_fractional_days(FieldAttrType::Interval, "2020-01-01").unwrap();
        assert_eq!(interval, 0.0);

        let ts = to_fractional_days(FieldAttrType::Timestamp, "12:00").unwrap();
        assert_eq!(ts, -693_958.0 + 0.5);
    }

    #[test]
    fn test_non_temporal_subtype() {
        assert_eq!(
            to_fractional_days(FieldAttrType::Real, "1.5"),
            Err(TemporalError::UnknownSubtype(FieldAttrType::Real))
        );
    }
}
