//! crates/liturgy_core/src/calendar.rs
//!
//! Pure Gregorian calendar computations: Easter Sunday, the first Sunday of
//! Advent and strict `YYYY-MM-DD` date validation.

use crate::domain::CalendarDate;
use crate::ports::PortError;
use std::str::FromStr;

/// Days between the first and the fourth Sunday of Advent.
const ADVENT_SPAN_DAYS: u64 = 21;

/// Computes the date of Easter Sunday with the anonymous Gregorian algorithm
/// (Meeus/Jones/Butcher).
///
/// Years before 1583 are accepted and give a mathematically defined date.
///
/// # Panics
/// Only for years outside the range `chrono` can represent (about ±262,000).
pub fn compute_easter(year: i32) -> CalendarDate {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b.div_euclid(4);
    let e = b.rem_euclid(4);
    let f = (b + 8).div_euclid(25);
    let g = (b - f + 1).div_euclid(3);
    let h = (19 * a + b - d - g + 15).rem_euclid(30);
    let i = c.div_euclid(4);
    let k = c.rem_euclid(4);
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l).div_euclid(451);
    let month = (h + l - 7 * m + 114).div_euclid(31);
    let day = (h + l - 7 * m + 114).rem_euclid(31) + 1;

    CalendarDate::from_ymd(year, month as u32, day as u32)
        .expect("Easter always falls on a valid day in March or April")
}

/// Computes the first Sunday of Advent: the fourth Sunday strictly before Christmas.
///
/// The result is always 22 to 28 days before December 25.
///
/// # Panics
/// Only for years outside the range `chrono` can represent.
pub fn first_sunday_of_advent(year: i32) -> CalendarDate {
    let christmas =
        CalendarDate::from_ymd(year, 12, 25).expect("December 25 exists in every year");

    // Days back to the Sunday strictly before Christmas.
    let offset = match christmas.weekday().num_days_from_sunday() {
        0 => 7,
        days => u64::from(days),
    };

    christmas
        .checked_sub_days(offset + ADVENT_SPAN_DAYS)
        .expect("Advent lies in the same year as Christmas")
}

/// The day before Easter, whose evening Mass is the Easter Vigil.
pub fn is_holy_saturday(date: CalendarDate) -> bool {
    compute_easter(date.year()).checked_sub_days(1) == Some(date)
}

/// Parses a strict `YYYY-MM-DD` string. Any other shape, or an impossible date
/// such as `2024-02-30`, yields `None`.
pub fn validate_date(s: &str) -> Option<CalendarDate> {
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let all_digits = bytes
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != 4 && *i != 7)
        .all(|(_, b)| b.is_ascii_digit());
    if !all_digits {
        return None;
    }

    let year = s[0..4].parse::<i32>().ok()?;
    let month = s[5..7].parse::<u32>().ok()?;
    let day = s[8..10].parse::<u32>().ok()?;
    CalendarDate::from_ymd(year, month, day)
}

impl FromStr for CalendarDate {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_date(s).ok_or_else(|| PortError::InvalidDateFormat(s.to_string()))
    }
}
