//! Ethiopian/Gregorian calendar conversion.
//!
//! The Ethiopian calendar has thirteen months: months 1-12 hold exactly 30
//! days and Pagume (month 13) holds 5 days, or 6 in a leap year. An Ethiopian
//! year `y` is leap iff `y % 4 == 3`. The Ethiopian New Year falls on
//! Gregorian September 11, shifting to September 12 in the Gregorian year
//! preceding a Gregorian leap year. That rule is exact for Gregorian years
//! 1900-2099, which bounds the supported range; the conversions form a
//! bijection inside it.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Ethiopian years representable without hitting the 2100 century correction.
pub const MIN_ETHIOPIAN_YEAR: i32 = 1893;
pub const MAX_ETHIOPIAN_YEAR: i32 = 2091;

/// Gregorian calendar year in which a given Ethiopian year begins.
const YEAR_OFFSET: i32 = 7;

pub const ETHIOPIAN_MONTH_NAMES: [&str; 13] = [
    "Meskerem", "Tikimt", "Hidar", "Tahsas", "Tir", "Yekatit", "Megabit", "Miyazia", "Ginbot",
    "Sene", "Hamle", "Nehase", "Pagume",
];

/// A date in the Ethiopian calendar. Not guaranteed valid on construction;
/// run it through [`is_valid_ethiopian_date`] before converting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EthiopianDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl EthiopianDate {
    pub const fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("{year}-{month}-{day} is not a valid Ethiopian date")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[error("year {year} is outside the supported Ethiopian range {MIN_ETHIOPIAN_YEAR}-{MAX_ETHIOPIAN_YEAR}")]
    OutOfRange { year: i32 },
}

pub fn is_ethiopian_leap_year(year: i32) -> bool {
    year.rem_euclid(4) == 3
}

fn is_gregorian_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// Number of days in the given Ethiopian month (Pagume varies with the year).
pub fn days_in_ethiopian_month(year: i32, month: u32) -> u32 {
    match month {
        1..=12 => 30,
        13 if is_ethiopian_leap_year(year) => 6,
        13 => 5,
        _ => 0,
    }
}

/// Structural validity check. Rejects rather than normalizes: Pagume 6 in a
/// non-leap year is an error, never silently clamped to Pagume 5.
pub fn is_valid_ethiopian_date(date: EthiopianDate) -> bool {
    (1..=13).contains(&date.month)
        && date.day >= 1
        && date.day <= days_in_ethiopian_month(date.year, date.month)
}

/// Gregorian date of Enkutatash (Ethiopian New Year) in `gregorian_year`.
fn new_year_day(gregorian_year: i32) -> Option<NaiveDate> {
    let day = if is_gregorian_leap_year(gregorian_year + 1) {
        12
    } else {
        11
    };
    NaiveDate::from_ymd_opt(gregorian_year, 9, day)
}

pub fn gregorian_to_ethiopian(date: NaiveDate) -> Result<EthiopianDate, CalendarError> {
    let gregorian_year = date.year();
    let new_year = new_year_day(gregorian_year)
        .ok_or(CalendarError::OutOfRange {
            year: gregorian_year - YEAR_OFFSET,
        })?;

    let (ethiopian_year, anchor) = if date >= new_year {
        (gregorian_year - YEAR_OFFSET, new_year)
    } else {
        let previous = new_year_day(gregorian_year - 1).ok_or(CalendarError::OutOfRange {
            year: gregorian_year - YEAR_OFFSET - 1,
        })?;
        (gregorian_year - YEAR_OFFSET - 1, previous)
    };

    if !(MIN_ETHIOPIAN_YEAR..=MAX_ETHIOPIAN_YEAR).contains(&ethiopian_year) {
        return Err(CalendarError::OutOfRange {
            year: ethiopian_year,
        });
    }

    // 0-based day offset into the Ethiopian year; 30-day months make the
    // month/day split a plain division, Pagume included.
    let offset = (date - anchor).num_days();
    Ok(EthiopianDate {
        year: ethiopian_year,
        month: (offset / 30) as u32 + 1,
        day: (offset % 30) as u32 + 1,
    })
}

pub fn ethiopian_to_gregorian(date: EthiopianDate) -> Result<NaiveDate, CalendarError> {
    if !is_valid_ethiopian_date(date) {
        return Err(CalendarError::InvalidDate {
            year: date.year,
            month: date.month,
            day: date.day,
        });
    }
    if !(MIN_ETHIOPIAN_YEAR..=MAX_ETHIOPIAN_YEAR).contains(&date.year) {
        return Err(CalendarError::OutOfRange { year: date.year });
    }

    let anchor = new_year_day(date.year + YEAR_OFFSET).ok_or(CalendarError::OutOfRange {
        year: date.year,
    })?;
    let offset = i64::from(date.month - 1) * 30 + i64::from(date.day - 1);
    Ok(anchor + Duration::days(offset))
}

/// Render an Ethiopian date with its month name, e.g. `Meskerem 1, 2017`.
pub fn format_ethiopian_date(date: EthiopianDate) -> String {
    let name = (date.month as usize)
        .checked_sub(1)
        .and_then(|index| ETHIOPIAN_MONTH_NAMES.get(index));
    match name {
        Some(name) => format!("{} {}, {}", name, date.day, date.year),
        None => format!("{}-{}-{}", date.year, date.month, date.day),
    }
}

/// Whole years elapsed between a Gregorian birth date and `today`.
pub fn age_in_years(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

/// Age of someone born on an Ethiopian date, as of a Gregorian `today`.
pub fn calculate_ethiopian_age(
    date_of_birth: EthiopianDate,
    today: NaiveDate,
) -> Result<i32, CalendarError> {
    let gregorian = ethiopian_to_gregorian(date_of_birth)?;
    Ok(age_in_years(gregorian, today))
}
