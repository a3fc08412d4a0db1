use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Utc};

use crate::error::{AlmanacError, Result};

// Julian date constants
pub const MS_PER_DAY: f64 = 86_400_000.0;
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
pub const J2000_JD: f64 = 2_451_545.0;
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Julian date of an instant, fractional days included.
pub fn julian_date(instant: DateTime<Utc>) -> f64 {
    instant.timestamp_millis() as f64 / MS_PER_DAY + UNIX_EPOCH_JD
}

/// Julian centuries elapsed since J2000.0.
pub fn centuries_since_j2000(jd: f64) -> f64 {
    (jd - J2000_JD) / DAYS_PER_CENTURY
}

/// Wrap an angle into [0, 360).
pub fn normalize_degrees(degrees: f64) -> f64 {
    let angle = degrees % 360.0;
    if angle < 0.0 {
        angle + 360.0
    } else {
        angle
    }
}

/// 1-based day of the year (Jan 1 = 1).
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// Parse a `YYYY-MM-DD` string.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|source| AlmanacError::Parse {
        input: input.to_string(),
        source,
    })
}

/// Parse a `YYYY-MM` string into the first day of that month.
pub fn parse_month(input: &str) -> Result<NaiveDate> {
    let padded = format!("{}-01", input.trim());
    NaiveDate::parse_from_str(&padded, "%Y-%m-%d").map_err(|source| AlmanacError::Parse {
        input: input.to_string(),
        source,
    })
}

pub fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(AlmanacError::InvalidMonth { year, month })
}

pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let first = first_of_month(year, month)?;
    let next = if month == 12 {
        first_of_month(year + 1, 1)?
    } else {
        first_of_month(year, month + 1)?
    };
    Ok(next.signed_duration_since(first).num_days() as u32)
}

/// Midnight of a civil date in the given fixed offset, as a UTC instant.
pub fn local_midnight(date: NaiveDate, offset: FixedOffset) -> Result<DateTime<Utc>> {
    date.and_time(NaiveTime::MIN)
        .and_local_timezone(offset)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or(AlmanacError::OutOfRange(date))
}

pub fn offset_from_minutes(minutes: i32) -> Result<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or(AlmanacError::InvalidOffset(minutes))
}
