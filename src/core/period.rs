//! Calendar ranges used by the reports.
//!
//! All ranges are half-open `[start, end)` in UTC.

use crate::errors::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};

fn midnight(date: NaiveDate) -> Result<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| Error::validation(format!("Invalid date: {date}")))
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::validation(format!("Invalid period: {year}-{month:02}")))
}

/// Bounds of a calendar year.
pub fn year_bounds(year: i32) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start = first_of_month(year, 1)?;
    let end = first_of_month(year + 1, 1)?;
    Ok((midnight(start)?, midnight(end)?))
}

/// Bounds of a calendar month. `month` is 1-based.
pub fn month_bounds(year: i32, month: u32) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start = first_of_month(year, month)?;
    let end = if month == 12 {
        first_of_month(year + 1, 1)?
    } else {
        first_of_month(year, month + 1)?
    };
    Ok((midnight(start)?, midnight(end)?))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_year_bounds() {
        let (start, end) = year_bounds(2024).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_month_bounds_december_wraps() {
        let (start, end) = month_bounds(2024, 12).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_month_bounds_rejects_bad_month() {
        assert!(matches!(month_bounds(2024, 13), Err(Error::Validation { .. })));
        assert!(matches!(month_bounds(2024, 0), Err(Error::Validation { .. })));
    }
}
