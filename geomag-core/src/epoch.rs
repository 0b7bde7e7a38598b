//! Calendar dates as decimal years.
//!
//! Geomagnetic models are indexed by decimal year: `2024.5` is roughly the start of July 2024.
//! The conversion used here is the one the WMM reference software uses,
//!
//! ```text
//! decimal_year = year + (day_of_year - 1) / days_in_year
//! ```
//!
//! so 1 January of any year maps exactly onto the integer year.
//!
//! # Missing components
//!
//! A time request may leave year, month or day unspecified. [`CalendarDate::fill`] completes
//! it from a reference date (normally today in UTC): each missing component is taken from
//! the reference date as-is. The year is never advanced.

use chrono::{Datelike, Utc};

use crate::constants::{CUMULATIVE_DAYS, DAYS_PER_LEAP_YEAR, DAYS_PER_YEAR};
use crate::errors::{GeomagError, GeomagResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    /// Creates a validated Gregorian date.
    pub fn new(year: i32, month: u32, day: u32) -> GeomagResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(GeomagError::invalid_date(
                year,
                month as i32,
                day as i32,
                "month out of range",
            ));
        }
        let last_day = days_in_month(year, month);
        if day < 1 || day > last_day {
            return Err(GeomagError::invalid_date(
                year,
                month as i32,
                day as i32,
                &format!("day out of range (1..={})", last_day),
            ));
        }
        Ok(Self { year, month, day })
    }

    /// Today's date in UTC.
    pub fn today() -> Self {
        let now = Utc::now().date_naive();
        Self {
            year: now.year(),
            month: now.month(),
            day: now.day(),
        }
    }

    /// Completes a partial date from `reference`, then validates the result.
    pub fn fill(
        year: Option<i32>,
        month: Option<u32>,
        day: Option<u32>,
        reference: CalendarDate,
    ) -> GeomagResult<Self> {
        Self::new(
            year.unwrap_or(reference.year),
            month.unwrap_or(reference.month),
            day.unwrap_or(reference.day),
        )
    }

    /// One-based ordinal day within the year.
    pub fn day_of_year(&self) -> u32 {
        let mut doy = CUMULATIVE_DAYS[(self.month - 1) as usize] as u32 + self.day;
        if self.month > 2 && is_leap_year(self.year) {
            doy += 1;
        }
        doy
    }

    pub fn to_decimal_year(&self) -> f64 {
        let days_in_year = if is_leap_year(self.year) {
            DAYS_PER_LEAP_YEAR
        } else {
            DAYS_PER_YEAR
        };
        self.year as f64 + (self.day_of_year() - 1) as f64 / days_in_year
    }
}

/// Validates a calendar date and converts it to a decimal year.
///
/// ```
/// use geomag_core::epoch::decimal_year;
///
/// assert_eq!(decimal_year(2025, 1, 1)?, 2025.0);
/// assert!((decimal_year(2024, 7, 2)? - 2024.5).abs() < 1e-12);
/// # Ok::<(), geomag_core::GeomagError>(())
/// ```
pub fn decimal_year(year: i32, month: u32, day: u32) -> GeomagResult<f64> {
    Ok(CalendarDate::new(year, month, day)?.to_decimal_year())
}

/// Parses a `MM/DD/YYYY` date into a decimal year.
pub fn parse_us_date(text: &str) -> Option<f64> {
    let mut parts = text.trim().split('/');
    let month = parts.next()?.parse::<u32>().ok()?;
    let day = parts.next()?.parse::<u32>().ok()?;
    let year = parts.next()?.parse::<i32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    decimal_year(year, month, day).ok()
}

#[inline]
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_year_is_integral() {
        assert_eq!(decimal_year(2025, 1, 1).unwrap(), 2025.0);
        assert_eq!(decimal_year(2000, 1, 1).unwrap(), 2000.0);
    }

    #[test]
    fn test_mid_year() {
        // 2 July 2027 is day 183 of a common year.
        let dy = decimal_year(2027, 7, 2).unwrap();
        assert!((dy - (2027.0 + 182.0 / 365.0)).abs() < 1e-12);
        // 2 July 2024 is day 184 of a leap year.
        let dy = decimal_year(2024, 7, 2).unwrap();
        assert!((dy - 2024.5).abs() < 1e-12);
    }

    #[test]
    fn test_day_of_year_leap_handling() {
        assert_eq!(CalendarDate::new(2023, 3, 1).unwrap().day_of_year(), 60);
        assert_eq!(CalendarDate::new(2024, 3, 1).unwrap().day_of_year(), 61);
        assert_eq!(CalendarDate::new(2024, 12, 31).unwrap().day_of_year(), 366);
    }

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2024));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2025));
    }

    #[test]
    fn test_invalid_dates_rejected() {
        assert!(matches!(
            decimal_year(2025, 13, 1),
            Err(GeomagError::InvalidDate { .. })
        ));
        assert!(decimal_year(2025, 2, 29).is_err());
        assert!(decimal_year(2024, 2, 29).is_ok());
        assert!(decimal_year(2025, 4, 0).is_err());
    }

    #[test]
    fn test_fill_takes_missing_components_from_reference() {
        let reference = CalendarDate::new(2026, 10, 18).unwrap();
        let filled = CalendarDate::fill(None, Some(3), None, reference).unwrap();
        assert_eq!(filled, CalendarDate::new(2026, 3, 18).unwrap());

        let filled = CalendarDate::fill(Some(2024), None, None, reference).unwrap();
        assert_eq!(filled, CalendarDate::new(2024, 10, 18).unwrap());
    }

    #[test]
    fn test_fill_validates_result() {
        let reference = CalendarDate::new(2026, 1, 31).unwrap();
        assert!(CalendarDate::fill(None, Some(2), None, reference).is_err());
    }

    #[test]
    fn test_parse_us_date() {
        let dy = parse_us_date("12/10/2019").unwrap();
        assert!((dy - (2019.0 + 343.0 / 365.0)).abs() < 1e-12);
        assert!(parse_us_date("2019-12-10").is_none());
        assert!(parse_us_date("13/10/2019").is_none());
    }

    #[test]
    fn test_today_is_valid() {
        let today = CalendarDate::today();
        assert!(CalendarDate::new(today.year, today.month, today.day).is_ok());
    }
}
