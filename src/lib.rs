pub mod activity;
pub(crate) mod activity_validation;
pub mod calculations;
pub mod calendar;
pub mod config;
pub mod graph;
pub mod schedule;

pub use activity::{Activity, ActivityState};
pub use calendar::{
    BusinessCalendar, BusinessCalendarConfig, CalendarError, HolidayTable, HolidayTableConfig,
    parse_calendar_date,
};
pub use config::{CalendarSettings, CalendarSource, ConfigError, EngineConfig};
pub use schedule::{
    ActivityScheduler, DanglingPolicy, FallbackStart, ScheduleError, ScheduleSummary,
    ScheduledProject, SchedulerConfig, schedule_project, schedule_projects,
};
