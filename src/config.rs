use crate::calendar::{BusinessCalendar, BusinessCalendarConfig, CalendarError, HolidayTable};
use crate::schedule::{ActivityScheduler, SchedulerConfig};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

/// Where the holiday table of the business calendar comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarSource {
    /// Tables shipped with the crate.
    #[default]
    Builtin,
    /// A JSON holiday table, or a CSV file when the extension is `.csv`.
    File { path: PathBuf },
    Inline { config: BusinessCalendarConfig },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSettings {
    #[serde(default)]
    pub source: CalendarSource,
    /// Years to fill from the holiday rules when the source has no entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_years: Option<(i32, i32)>,
}

/// Engine configuration, typically read once at startup.
///
/// ```json
/// {
///   "calendar": {
///     "source": { "kind": "file", "path": "holidays.json" },
///     "generate_years": [2027, 2030]
///   },
///   "scheduler": { "fallback_start": { "mode": "reject" }, "dangling": "ignore" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub calendar: CalendarSettings,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl EngineConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path.as_ref())?;
        let config: EngineConfig = serde_json::from_reader(file)?;
        debug!(path = %path.as_ref().display(), "loaded engine config");
        Ok(config)
    }

    pub fn save_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn build_calendar(&self) -> Result<BusinessCalendar, ConfigError> {
        let mut calendar = match &self.calendar.source {
            CalendarSource::Builtin => BusinessCalendar::builtin(),
            CalendarSource::File { path } => BusinessCalendar::new(load_holiday_file(path)?),
            CalendarSource::Inline { config } => BusinessCalendar::from_config(config)?,
        };
        if let Some((first, last)) = self.calendar.generate_years {
            let mut table = calendar.holidays().clone();
            table.generate_years(first.min(last)..=first.max(last))?;
            let working_days = calendar.working_days();
            calendar = BusinessCalendar::new(table).with_working_days(working_days)?;
        }
        debug!(holidays = calendar.holidays().len(), "business calendar ready");
        Ok(calendar)
    }

    pub fn build_scheduler(&self) -> ActivityScheduler {
        ActivityScheduler::new(self.scheduler)
    }
}

fn load_holiday_file(path: &Path) -> Result<HolidayTable, CalendarError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        HolidayTable::from_csv_file(path)
    } else {
        HolidayTable::from_json_file(path)
    }
}
