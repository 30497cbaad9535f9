//! Holiday rules of the nearest-Monday jurisdiction.
//!
//! Produces the already-transferred holiday set for a year so that tables can
//! be extended past the years shipped with the crate. Calendar lookups never
//! evaluate these rules; they only read the resulting [`HolidayTable`].
//!
//! [`HolidayTable`]: super::HolidayTable

use super::CalendarError;
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeSet;

/// First year of the Gregorian computus.
const FIRST_GREGORIAN_YEAR: i32 = 1583;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolidayRule {
    /// Observed on the date itself.
    Fixed { month: u32, day: u32 },
    /// Transferred to the following Monday unless it already is one.
    FixedToMonday { month: u32, day: u32 },
    /// Days relative to Easter Sunday, observed as is.
    Easter { offset: i64 },
    /// Days relative to Easter Sunday, transferred to the following Monday.
    EasterToMonday { offset: i64 },
}

pub const RULES: [HolidayRule; 18] = [
    HolidayRule::Fixed { month: 1, day: 1 },
    HolidayRule::FixedToMonday { month: 1, day: 6 },
    HolidayRule::FixedToMonday { month: 3, day: 19 },
    HolidayRule::Easter { offset: -3 },
    HolidayRule::Easter { offset: -2 },
    HolidayRule::Fixed { month: 5, day: 1 },
    HolidayRule::EasterToMonday { offset: 39 },
    HolidayRule::EasterToMonday { offset: 60 },
    HolidayRule::EasterToMonday { offset: 68 },
    HolidayRule::FixedToMonday { month: 6, day: 29 },
    HolidayRule::Fixed { month: 7, day: 20 },
    HolidayRule::Fixed { month: 8, day: 7 },
    HolidayRule::FixedToMonday { month: 8, day: 15 },
    HolidayRule::FixedToMonday { month: 10, day: 12 },
    HolidayRule::FixedToMonday { month: 11, day: 1 },
    HolidayRule::FixedToMonday { month: 11, day: 11 },
    HolidayRule::Fixed { month: 12, day: 8 },
    HolidayRule::Fixed { month: 12, day: 25 },
];

impl HolidayRule {
    pub fn observed_in(&self, year: i32) -> Result<NaiveDate, CalendarError> {
        let unsupported = || CalendarError::UnsupportedYear { year };
        let date = match *self {
            HolidayRule::Fixed { month, day } => {
                NaiveDate::from_ymd_opt(year, month, day).ok_or_else(unsupported)?
            }
            HolidayRule::FixedToMonday { month, day } => {
                let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(unsupported)?;
                next_monday(date)
            }
            HolidayRule::Easter { offset } => {
                easter_sunday(year).ok_or_else(unsupported)? + Duration::days(offset)
            }
            HolidayRule::EasterToMonday { offset } => {
                next_monday(easter_sunday(year).ok_or_else(unsupported)? + Duration::days(offset))
            }
        };
        Ok(date)
    }
}

/// `date` if it is a Monday, otherwise the Monday after it.
pub fn next_monday(date: NaiveDate) -> NaiveDate {
    let days_ahead = (7 - date.weekday().num_days_from_monday()) % 7;
    date + Duration::days(i64::from(days_ahead))
}

/// Easter Sunday by the anonymous Gregorian algorithm (Meeus/Jones/Butcher).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    if year < FIRST_GREGORIAN_YEAR {
        return None;
    }
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
}

/// All observed holidays of `year`. Rules landing on the same Monday collapse
/// into one date.
pub fn holidays_for_year(year: i32) -> Result<BTreeSet<NaiveDate>, CalendarError> {
    if year < FIRST_GREGORIAN_YEAR {
        return Err(CalendarError::UnsupportedYear { year });
    }
    RULES.iter().map(|rule| rule.observed_in(year)).collect()
}
