use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

mod builtin;
pub mod holiday_table;
pub mod movable;

pub use holiday_table::{HolidayTable, HolidayTableConfig};

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("invalid calendar date '{input}'")]
    InvalidDate { input: String },
    #[error("holiday {date} does not belong to year {year}")]
    HolidayOutsideYear { year: i32, date: NaiveDate },
    #[error("holiday table year key '{key}' is not a year")]
    InvalidYear { key: String },
    #[error("holiday rules cannot be evaluated for year {year}")]
    UnsupportedYear { year: i32 },
    #[error("calendar requires at least one working day")]
    NoWorkingDays,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Parse a caller-supplied date, discarding any time-of-day component.
///
/// Accepts `YYYY-MM-DD`, naive timestamps with a `T` or space separator and
/// RFC 3339 timestamps (the date is taken in the timestamp's own offset).
pub fn parse_calendar_date(input: &str) -> Result<NaiveDate, CalendarError> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(stamp.date_naive());
    }
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(stamp.date());
        }
    }
    Err(CalendarError::InvalidDate {
        input: input.to_string(),
    })
}

/// Working-day calendar backed by a per-year holiday table.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessCalendar {
    holidays: HolidayTable,
    non_working_days: HashSet<Weekday>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessCalendarConfig {
    working_days: Vec<Weekday>,
    holidays: HolidayTable,
}

impl Default for BusinessCalendar {
    fn default() -> Self {
        Self::new(HolidayTable::builtin())
    }
}

impl BusinessCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Monday-to-Friday calendar over the given holiday table.
    pub fn new(holidays: HolidayTable) -> Self {
        Self {
            holidays,
            non_working_days: HashSet::from([Weekday::Sat, Weekday::Sun]),
        }
    }

    pub fn builtin() -> Self {
        Self::default()
    }

    /// Replace the working week (e.g. Mon-Sat for six-day crews).
    pub fn with_working_days<I>(mut self, working_days: I) -> Result<Self, CalendarError>
    where
        I: IntoIterator<Item = Weekday>,
    {
        let working: HashSet<Weekday> = working_days.into_iter().collect();
        if working.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }
        self.non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !working.contains(day))
            .collect();
        Ok(self)
    }

    pub fn from_config(config: &BusinessCalendarConfig) -> Result<Self, CalendarError> {
        Self::new(config.holidays.clone()).with_working_days(config.working_days.iter().copied())
    }

    pub fn to_config(&self) -> BusinessCalendarConfig {
        BusinessCalendarConfig::from(self)
    }

    pub fn holidays(&self) -> &HolidayTable {
        &self.holidays
    }

    pub fn working_days(&self) -> Vec<Weekday> {
        Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !self.non_working_days.contains(day))
            .collect()
    }

    /// True iff the date's year has a table entry containing the date.
    /// Years without an entry have no holidays.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(date)
    }

    pub fn is_holiday_str(&self, date: &str) -> Result<bool, CalendarError> {
        Ok(self.is_holiday(parse_calendar_date(date)?))
    }

    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !self.non_working_days.contains(&date.weekday()) && !self.is_holiday(date)
    }

    /// Count business days in `(start, end]`: the start date is day zero and
    /// never counted. Returns 0 when `end <= start`.
    pub fn count_business_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        if end <= start {
            return 0;
        }
        start
            .iter_days()
            .skip(1)
            .take_while(|day| *day <= end)
            .filter(|day| self.is_business_day(*day))
            .count() as i64
    }

    pub fn count_business_days_str(&self, start: &str, end: &str) -> Result<i64, CalendarError> {
        let start = parse_calendar_date(start)?;
        let end = parse_calendar_date(end)?;
        Ok(self.count_business_days(start, end))
    }

    /// Business days in `(start, end]`, matching `count_business_days`.
    pub fn business_days_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        if end <= start {
            return Vec::new();
        }
        start
            .iter_days()
            .skip(1)
            .take_while(|day| *day <= end)
            .filter(|day| self.is_business_day(*day))
            .collect()
    }

    /// First business day strictly after `from`. `None` only past the end of
    /// the representable date range.
    pub fn next_business_day(&self, from: NaiveDate) -> Option<NaiveDate> {
        from.iter_days()
            .skip(1)
            .find(|day| self.is_business_day(*day))
    }

    /// The `days`-th business day after `from`; `from` itself when `days <= 0`.
    pub fn add_business_days(&self, from: NaiveDate, days: i64) -> Option<NaiveDate> {
        if days <= 0 {
            return Some(from);
        }
        let nth = usize::try_from(days - 1).ok()?;
        from.iter_days()
            .skip(1)
            .filter(|day| self.is_business_day(*day))
            .nth(nth)
    }
}

impl BusinessCalendarConfig {
    pub fn new<I>(working_days: I, holidays: HolidayTable) -> Result<Self, CalendarError>
    where
        I: IntoIterator<Item = Weekday>,
    {
        let mut working: Vec<Weekday> = working_days.into_iter().collect();
        if working.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }
        working.sort_by_key(|wd| wd.num_days_from_monday());
        working.dedup();

        Ok(Self {
            working_days: working,
            holidays,
        })
    }

    pub fn working_days(&self) -> &[Weekday] {
        &self.working_days
    }

    pub fn holidays(&self) -> &HolidayTable {
        &self.holidays
    }
}

impl Default for BusinessCalendarConfig {
    fn default() -> Self {
        BusinessCalendarConfig::from(&BusinessCalendar::default())
    }
}

impl From<&BusinessCalendar> for BusinessCalendarConfig {
    fn from(calendar: &BusinessCalendar) -> Self {
        Self {
            working_days: calendar.working_days(),
            holidays: calendar.holidays.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_accepts_date_and_timestamps() {
        assert_eq!(parse_calendar_date("2025-01-15").unwrap(), d(2025, 1, 15));
        assert_eq!(
            parse_calendar_date("2025-01-15T17:45:00").unwrap(),
            d(2025, 1, 15)
        );
        assert_eq!(
            parse_calendar_date("2025-01-15 08:00:00").unwrap(),
            d(2025, 1, 15)
        );
        assert_eq!(
            parse_calendar_date("2025-01-15T23:30:00-05:00").unwrap(),
            d(2025, 1, 15)
        );
    }

    #[test]
    fn parse_rejects_garbage_and_impossible_dates() {
        for input in ["", "not a date", "2025-02-30", "15/01/2025"] {
            match parse_calendar_date(input) {
                Err(CalendarError::InvalidDate { input: echoed }) => assert_eq!(echoed, input),
                other => panic!("expected InvalidDate for {input:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn empty_working_week_is_rejected() {
        let result = BusinessCalendar::new(HolidayTable::new()).with_working_days(Vec::new());
        assert!(matches!(result, Err(CalendarError::NoWorkingDays)));
    }

    #[test]
    fn config_round_trip_preserves_week_and_holidays() {
        let mut table = HolidayTable::new();
        table.add_holiday(d(2025, 6, 19));
        let calendar = BusinessCalendar::new(table)
            .with_working_days([Weekday::Sat, Weekday::Mon, Weekday::Mon])
            .unwrap();
        let config = calendar.to_config();
        assert_eq!(config.working_days(), &[Weekday::Mon, Weekday::Sat]);
        let rebuilt = BusinessCalendar::from_config(&config).unwrap();
        assert_eq!(rebuilt, calendar);
    }
}
