use super::{CalendarError, builtin, movable, parse_calendar_date};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io;
use std::ops::RangeInclusive;
use std::path::Path;
use tracing::{debug, warn};

/// Non-working dates keyed by calendar year.
///
/// Every date stored under a year belongs to that year. Dates are looked up
/// verbatim; any statutory transfer to a Monday must already be applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HolidayTableConfig", into = "HolidayTableConfig")]
pub struct HolidayTable {
    jurisdiction: Option<String>,
    years: BTreeMap<i32, BTreeSet<NaiveDate>>,
}

/// On-disk shape of a holiday table.
///
/// ```json
/// { "jurisdiction": "CO", "years": { "2025": ["2025-01-01", "2025-01-06"] } }
/// ```
///
/// Year keys are strings so the table also loads when nested in a tagged
/// config enum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayTableConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub years: BTreeMap<String, Vec<NaiveDate>>,
}

// Extra columns such as `name` are ignored.
#[derive(Debug, Deserialize)]
struct HolidayCsvRecord {
    date: String,
}

impl HolidayTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables shipped with the crate for the operative years.
    pub fn builtin() -> Self {
        let mut table = Self {
            jurisdiction: Some(builtin::JURISDICTION.to_string()),
            years: BTreeMap::new(),
        };
        for (year, days) in builtin::OPERATIVE_YEARS {
            let dates = days
                .iter()
                .filter_map(|(month, day)| NaiveDate::from_ymd_opt(*year, *month, *day))
                .collect();
            table.years.insert(*year, dates);
        }
        table
    }

    /// Build a table by evaluating the jurisdiction's holiday rules for each year.
    pub fn generated(years: RangeInclusive<i32>) -> Result<Self, CalendarError> {
        let mut table = Self {
            jurisdiction: Some(builtin::JURISDICTION.to_string()),
            years: BTreeMap::new(),
        };
        table.generate_years(years)?;
        Ok(table)
    }

    /// Fill in years that have no entry yet from the holiday rules.
    /// Years already present are left untouched. On error the table is
    /// unchanged.
    pub fn generate_years(&mut self, years: RangeInclusive<i32>) -> Result<(), CalendarError> {
        let mut generated = BTreeMap::new();
        for year in years {
            if self.years.contains_key(&year) {
                continue;
            }
            let dates = movable::holidays_for_year(year)?;
            debug!(year, count = dates.len(), "generated holiday year from rules");
            generated.insert(year, dates);
        }
        self.years.extend(generated);
        Ok(())
    }

    pub fn with_jurisdiction(mut self, jurisdiction: impl Into<String>) -> Self {
        self.jurisdiction = Some(jurisdiction.into());
        self
    }

    pub fn jurisdiction(&self) -> Option<&str> {
        self.jurisdiction.as_deref()
    }

    /// Replace the holiday set of `year`.
    pub fn insert_year<I>(&mut self, year: i32, dates: I) -> Result<(), CalendarError>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut set = BTreeSet::new();
        for date in dates {
            if date.year() != year {
                return Err(CalendarError::HolidayOutsideYear { year, date });
            }
            set.insert(date);
        }
        self.years.insert(year, set);
        Ok(())
    }

    /// Add a single holiday under its own year.
    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.years.entry(date.year()).or_default().insert(date);
    }

    /// Union another table into this one; existing dates are kept.
    pub fn extend(&mut self, other: HolidayTable) {
        if self.jurisdiction.is_none() {
            self.jurisdiction = other.jurisdiction;
        }
        for (year, dates) in other.years {
            self.years.entry(year).or_default().extend(dates);
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.years
            .get(&date.year())
            .is_some_and(|dates| dates.contains(&date))
    }

    pub fn holidays_for(&self, year: i32) -> Option<&BTreeSet<NaiveDate>> {
        self.years.get(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    /// Total number of holiday dates across all years.
    pub fn len(&self) -> usize {
        self.years.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_config(&self) -> HolidayTableConfig {
        HolidayTableConfig::from(self.clone())
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CalendarError> {
        let file = File::open(path.as_ref())?;
        let config: HolidayTableConfig = serde_json::from_reader(file)?;
        let table = Self::try_from(config)?;
        Self::log_loaded(path.as_ref(), &table);
        Ok(table)
    }

    pub fn save_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CalendarError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, &self.to_config())?;
        Ok(())
    }

    /// Load a headered CSV with a `date` column and an optional `name` column.
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self, CalendarError> {
        let file = File::open(path.as_ref())?;
        let table = Self::from_csv_reader(file)?;
        Self::log_loaded(path.as_ref(), &table);
        Ok(table)
    }

    pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<Self, CalendarError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut table = Self::new();
        for record in csv_reader.deserialize() {
            let record: HolidayCsvRecord = record?;
            table.add_holiday(parse_calendar_date(&record.date)?);
        }
        Ok(table)
    }

    fn log_loaded(path: &Path, table: &HolidayTable) {
        if table.is_empty() {
            warn!(path = %path.display(), "holiday file contained no dates");
        } else {
            debug!(
                path = %path.display(),
                years = table.years.len(),
                holidays = table.len(),
                "loaded holiday table"
            );
        }
    }
}

impl TryFrom<HolidayTableConfig> for HolidayTable {
    type Error = CalendarError;

    fn try_from(config: HolidayTableConfig) -> Result<Self, Self::Error> {
        let mut table = Self {
            jurisdiction: config.jurisdiction,
            years: BTreeMap::new(),
        };
        for (key, dates) in config.years {
            let year = key
                .trim()
                .parse::<i32>()
                .map_err(|_| CalendarError::InvalidYear { key: key.clone() })?;
            table.insert_year(year, dates)?;
        }
        Ok(table)
    }
}

impl From<HolidayTable> for HolidayTableConfig {
    fn from(table: HolidayTable) -> Self {
        Self {
            jurisdiction: table.jurisdiction,
            years: table
                .years
                .into_iter()
                .map(|(year, dates)| (year.to_string(), dates.into_iter().collect()))
                .collect(),
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
    fn insert_year_rejects_dates_from_other_years() {
        let mut table = HolidayTable::new();
        let err = table
            .insert_year(2025, [d(2025, 1, 1), d(2026, 1, 1)])
            .unwrap_err();
        match err {
            CalendarError::HolidayOutsideYear { year, date } => {
                assert_eq!(year, 2025);
                assert_eq!(date, d(2026, 1, 1));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(table.holidays_for(2025).is_none());
    }

    #[test]
    fn unknown_year_has_no_holidays() {
        let table = HolidayTable::builtin();
        assert!(table.holidays_for(1999).is_none());
        assert!(!table.contains(d(1999, 1, 1)));
    }

    #[test]
    fn extend_unions_years() {
        let mut table = HolidayTable::builtin();
        let before = table.len();
        let mut extra = HolidayTable::new();
        extra.add_holiday(d(2025, 12, 24));
        extra.add_holiday(d(2025, 1, 1));
        extra.add_holiday(d(2030, 1, 1));
        table.extend(extra);
        assert_eq!(table.len(), before + 2);
        assert!(table.contains(d(2025, 12, 24)));
        assert!(table.contains(d(2030, 1, 1)));
        assert_eq!(table.jurisdiction(), Some("CO"));
    }

    #[test]
    fn generate_years_keeps_existing_entries() {
        let mut table = HolidayTable::new();
        table.insert_year(2027, [d(2027, 3, 3)]).unwrap();
        table.generate_years(2027..=2028).unwrap();
        assert_eq!(table.holidays_for(2027).map(BTreeSet::len), Some(1));
        assert!(table.contains(d(2028, 1, 1)));
    }

    #[test]
    fn failed_generation_leaves_table_untouched() {
        let mut table = HolidayTable::new();
        table.add_holiday(d(2025, 1, 1));
        let before = table.clone();

        let err = table.generate_years(1581..=1584).unwrap_err();
        assert!(matches!(err, CalendarError::UnsupportedYear { year: 1581 }));
        assert_eq!(table, before);

        // The first year is representable, a later one is past NaiveDate::MAX.
        let err = table.generate_years(262_142..=262_144).unwrap_err();
        assert!(matches!(err, CalendarError::UnsupportedYear { .. }));
        assert_eq!(table, before);
    }

    #[test]
    fn year_keys_must_be_numeric() {
        let bad = serde_json::json!({ "years": { "twenty": ["2025-01-01"] } });
        let config: HolidayTableConfig = serde_json::from_value(bad).unwrap();
        match HolidayTable::try_from(config) {
            Err(CalendarError::InvalidYear { key }) => assert_eq!(key, "twenty"),
            other => panic!("expected invalid year, got {other:?}"),
        }
    }

    #[test]
    fn csv_reader_parses_dates_and_ignores_names() {
        let data = "date,name\n2025-01-01,New Year\n2025-01-06 , Epiphany\n2026-01-01,\n";
        let table = HolidayTable::from_csv_reader(data.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.contains(d(2025, 1, 6)));
        assert_eq!(table.years().collect::<Vec<_>>(), vec![2025, 2026]);
    }

    #[test]
    fn csv_reader_reports_bad_dates() {
        let data = "date\n2025-13-01\n";
        let err = HolidayTable::from_csv_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, CalendarError::InvalidDate { .. }));
    }

    #[test]
    fn json_shape_uses_year_keys() {
        let mut table = HolidayTable::new().with_jurisdiction("XX");
        table.add_holiday(d(2025, 5, 1));
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "jurisdiction": "XX", "years": { "2025": ["2025-05-01"] } })
        );
        let bad = serde_json::json!({ "years": { "2025": ["2024-12-25"] } });
        assert!(serde_json::from_value::<HolidayTable>(bad).is_err());
    }
}
