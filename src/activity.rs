use chrono::NaiveDate;
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Workflow state of an activity. Owned by the caller; scheduling never reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityState {
    #[default]
    Pending,
    InProgress,
    Done,
}

impl ActivityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityState::Pending => "PENDING",
            ActivityState::InProgress => "IN_PROGRESS",
            ActivityState::Done => "DONE",
        }
    }
}

/// A schedulable unit of work.
///
/// `scheduled_start`, `scheduled_finish`, `slack_days` and `is_critical` are
/// owned by the scheduler and recomputed on every pass; values supplied by the
/// caller are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Calendar days, at least 1.
    pub duration_days: i64,
    #[serde(default)]
    pub predecessors: Vec<i32>,
    /// Only honoured when the activity has no resolvable predecessors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_finish: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_critical: Option<bool>,
    #[serde(default)]
    pub state: ActivityState,
}

impl Activity {
    pub fn new(id: i32, title: impl Into<String>, duration_days: i64) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            duration_days,
            predecessors: Vec::new(),
            explicit_start_date: None,
            scheduled_start: None,
            scheduled_finish: None,
            slack_days: None,
            is_critical: None,
            state: ActivityState::Pending,
        }
    }

    pub fn with_predecessors<I>(mut self, predecessors: I) -> Self
    where
        I: IntoIterator<Item = i32>,
    {
        self.predecessors = predecessors.into_iter().collect();
        self
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.explicit_start_date = Some(date);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_state(mut self, state: ActivityState) -> Self {
        self.state = state;
        self
    }

    /// Drop every scheduler-owned field.
    pub fn clear_schedule(&mut self) {
        self.scheduled_start = None;
        self.scheduled_finish = None;
        self.slack_days = None;
        self.is_critical = None;
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled_start.is_some() && self.scheduled_finish.is_some()
    }

    /// Column layout of the tabular schedule view.
    pub fn schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("id".into(), DataType::Int32),
            Field::new("title".into(), DataType::String),
            Field::new("duration_days".into(), DataType::Int64),
            Field::new(
                "predecessors".into(),
                DataType::List(Box::new(DataType::Int32)),
            ),
            Field::new("explicit_start_date".into(), DataType::Date),
            Field::new("scheduled_start".into(), DataType::Date),
            Field::new("scheduled_finish".into(), DataType::Date),
            Field::new("slack_days".into(), DataType::Int64),
            Field::new("is_critical".into(), DataType::Boolean),
            Field::new("state".into(), DataType::String),
        ])
    }

    /// One frame row per activity, in slice order, following [`Activity::schema`].
    pub fn to_dataframe(activities: &[Activity]) -> PolarsResult<DataFrame> {
        if activities.is_empty() {
            return Ok(DataFrame::empty_with_schema(&Self::schema()));
        }

        let ids: Vec<i32> = activities.iter().map(|a| a.id).collect();
        let titles: Vec<&str> = activities.iter().map(|a| a.title.as_str()).collect();
        let durations: Vec<i64> = activities.iter().map(|a| a.duration_days).collect();
        let predecessors: Vec<Series> = activities
            .iter()
            .map(|a| Series::new(PlSmallStr::from_static(""), a.predecessors.clone()))
            .collect();
        let slack: Vec<Option<i64>> = activities.iter().map(|a| a.slack_days).collect();
        let critical: Vec<Option<bool>> = activities.iter().map(|a| a.is_critical).collect();
        let states: Vec<&str> = activities.iter().map(|a| a.state.as_str()).collect();

        let columns: Vec<Column> = vec![
            Series::new(PlSmallStr::from_static("id"), ids).into_column(),
            Series::new(PlSmallStr::from_static("title"), titles).into_column(),
            Series::new(PlSmallStr::from_static("duration_days"), durations).into_column(),
            Series::new(PlSmallStr::from_static("predecessors"), predecessors).into_column(),
            Self::date_series("explicit_start_date", activities, |a| a.explicit_start_date)?
                .into_column(),
            Self::date_series("scheduled_start", activities, |a| a.scheduled_start)?.into_column(),
            Self::date_series("scheduled_finish", activities, |a| a.scheduled_finish)?
                .into_column(),
            Series::new(PlSmallStr::from_static("slack_days"), slack).into_column(),
            Series::new(PlSmallStr::from_static("is_critical"), critical).into_column(),
            Series::new(PlSmallStr::from_static("state"), states).into_column(),
        ];

        DataFrame::new(columns)
    }

    fn date_series<F>(name: &str, activities: &[Activity], field: F) -> PolarsResult<Series>
    where
        F: Fn(&Activity) -> Option<NaiveDate>,
    {
        let days: Vec<Option<i32>> = activities
            .iter()
            .map(|a| field(a).map(Self::date_to_i32))
            .collect();
        Series::new(name.into(), days).cast(&DataType::Date)
    }

    fn date_to_i32(date: NaiveDate) -> i32 {
        // NaiveDate::default() is the Unix epoch, the origin of polars dates.
        (date - NaiveDate::default()).num_days() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn state_serializes_in_upper_snake_case() {
        let json = serde_json::to_string(&ActivityState::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
        let parsed: ActivityState = serde_json::from_str("\"DONE\"").unwrap();
        assert_eq!(parsed, ActivityState::Done);
    }

    #[test]
    fn deserializes_minimal_record_with_defaults() {
        let json = r#"{ "id": 7, "duration_days": 3, "explicit_start_date": "2025-02-03" }"#;
        let activity: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(activity.id, 7);
        assert!(activity.predecessors.is_empty());
        assert_eq!(activity.explicit_start_date, Some(d(2025, 2, 3)));
        assert_eq!(activity.state, ActivityState::Pending);
        assert!(!activity.is_scheduled());
    }

    #[test]
    fn dataframe_has_one_row_per_activity() {
        let mut a = Activity::new(1, "Excavation", 4).with_start_date(d(2025, 3, 3));
        a.scheduled_start = Some(d(2025, 3, 3));
        a.scheduled_finish = Some(d(2025, 3, 7));
        a.slack_days = Some(0);
        a.is_critical = Some(true);
        let b = Activity::new(2, "Footings", 2).with_predecessors([1]);

        let df = Activity::to_dataframe(&[a, b]).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), Activity::schema().len());

        let finish = df.column("scheduled_finish").unwrap().date().unwrap();
        assert_eq!(finish.get(0), Some(Activity::date_to_i32(d(2025, 3, 7))));
        assert_eq!(finish.get(1), None);
        let preds = df.column("predecessors").unwrap().list().unwrap();
        let second: Vec<i32> = preds
            .get_as_series(1)
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(second, vec![1]);
    }

    #[test]
    fn empty_dataframe_keeps_schema() {
        let df = Activity::to_dataframe(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert!(df.column("is_critical").is_ok());
    }
}
