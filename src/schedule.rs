use crate::activity::Activity;
use crate::activity_validation;
use crate::calculations::backward_pass::BackwardPass as CalcBackwardPass;
use crate::calculations::forward_pass::ForwardPass as CalcForwardPass;
use crate::graph::activity_dag::ActivityDag;
use chrono::{Local, NaiveDate};
use polars::prelude::{DataFrame, PolarsResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("predecessor cycle through activities {activity_ids:?}")]
    CyclicDependency { activity_ids: Vec<i32> },
    #[error("duplicate activity id {id}")]
    DuplicateActivityId { id: i32 },
    #[error("activity {id} has invalid duration {duration_days} (must be at least 1 day)")]
    InvalidDuration { id: i32, duration_days: i64 },
    #[error("activity {id} references unknown predecessor {predecessor}")]
    DanglingPredecessor { id: i32, predecessor: i32 },
    #[error("activity {id} has no predecessors and no explicit start date")]
    MissingStartDate { id: i32 },
    #[error("activity {id} finishes beyond the supported date range")]
    DateOverflow { id: i32 },
}

/// Start date for activities with no resolvable predecessors and no explicit start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "date", rename_all = "snake_case")]
pub enum FallbackStart {
    /// The scheduler's reference date (today unless pinned).
    #[default]
    ReferenceDate,
    Fixed(NaiveDate),
    /// Fail with [`ScheduleError::MissingStartDate`].
    Reject,
}

/// Treatment of predecessor ids that are not part of the project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DanglingPolicy {
    #[default]
    Ignore,
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default)]
    pub fallback_start: FallbackStart,
    #[serde(default)]
    pub dangling: DanglingPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub activity_count: usize,
    pub critical_count: usize,
    /// Critical activity ids ordered by scheduled start, then id.
    pub critical_path: Vec<i32>,
    pub project_finish: NaiveDate,
}

impl ScheduleSummary {
    pub fn to_summary_line(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("activities={}", self.activity_count));
        parts.push(format!("critical={}", self.critical_count));
        parts.push(format!("finish={}", self.project_finish));
        if !self.critical_path.is_empty() {
            let chain = self
                .critical_path
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("->");
            parts.push(format!("crit_path={}", chain));
        }
        parts.join(", ")
    }
}

/// Output of one scheduling pass: the input activities, in input order, with
/// every scheduler-owned field filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledProject {
    activities: Vec<Activity>,
    project_finish: NaiveDate,
}

impl ScheduledProject {
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn into_activities(self) -> Vec<Activity> {
        self.activities
    }

    pub fn project_finish(&self) -> NaiveDate {
        self.project_finish
    }

    pub fn get(&self, id: i32) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    pub fn critical_activities(&self) -> impl Iterator<Item = &Activity> {
        self.activities
            .iter()
            .filter(|a| a.is_critical == Some(true))
    }

    pub fn summary(&self) -> ScheduleSummary {
        let mut critical: Vec<(NaiveDate, i32)> = self
            .critical_activities()
            .filter_map(|a| a.scheduled_start.map(|start| (start, a.id)))
            .collect();
        critical.sort();

        ScheduleSummary {
            activity_count: self.activities.len(),
            critical_count: critical.len(),
            critical_path: critical.into_iter().map(|(_, id)| id).collect(),
            project_finish: self.project_finish,
        }
    }

    /// Activities whose computed start is copied into `explicit_start_date`
    /// when they have no predecessors, so later passes keep the same anchor
    /// instead of re-reading the reference date.
    pub fn pin_root_starts(&self) -> Vec<Activity> {
        let ids: HashSet<i32> = self.activities.iter().map(|a| a.id).collect();
        self.activities
            .iter()
            .cloned()
            .map(|mut activity| {
                let is_root = !activity.predecessors.iter().any(|p| ids.contains(p));
                if is_root && activity.explicit_start_date.is_none() {
                    activity.explicit_start_date = activity.scheduled_start;
                }
                activity
            })
            .collect()
    }

    /// Tabular view for timeline rendering, one row per activity.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        Activity::to_dataframe(&self.activities)
    }
}

/// Critical-path scheduler over calendar days.
#[derive(Debug, Clone)]
pub struct ActivityScheduler {
    config: SchedulerConfig,
    reference_date: NaiveDate,
}

impl Default for ActivityScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl ActivityScheduler {
    /// Scheduler whose reference date is today's local date.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            reference_date: Local::now().date_naive(),
        }
    }

    /// Pin the reference date used for unanchored roots and empty projects.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = date;
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    fn fallback_start(&self) -> Option<NaiveDate> {
        match self.config.fallback_start {
            FallbackStart::ReferenceDate => Some(self.reference_date),
            FallbackStart::Fixed(date) => Some(date),
            FallbackStart::Reject => None,
        }
    }

    /// Compute scheduled dates, slack and criticality for every activity.
    ///
    /// Fails without partial results on invalid input or a predecessor cycle.
    /// Previously computed fields on the input are ignored, so repeated calls
    /// on the same activities yield the same schedule.
    pub fn schedule(&self, activities: &[Activity]) -> Result<ScheduledProject, ScheduleError> {
        activity_validation::validate_activity_collection(activities, self.config.dangling)?;

        let dag = ActivityDag::build(activities);
        debug!(
            activities = dag.node_count(),
            dependencies = dag.edge_count(),
            "scheduling project"
        );

        let early_dates = CalcForwardPass::new(activities, &dag, self.fallback_start()).execute()?;

        let backward = CalcBackwardPass::new(&early_dates);
        let project_finish = backward.project_finish().unwrap_or(self.reference_date);
        let slack = backward.execute(project_finish);

        let scheduled = activities
            .iter()
            .cloned()
            .map(|mut activity| {
                activity.clear_schedule();
                if let Some(&(start, finish)) = early_dates.get(&activity.id) {
                    let slack_days = slack.get(&activity.id).copied().unwrap_or(0);
                    activity.scheduled_start = Some(start);
                    activity.scheduled_finish = Some(finish);
                    activity.slack_days = Some(slack_days);
                    activity.is_critical = Some(slack_days == 0);
                }
                activity
            })
            .collect::<Vec<_>>();

        debug!(%project_finish, "schedule computed");
        Ok(ScheduledProject {
            activities: scheduled,
            project_finish,
        })
    }

    /// Schedule independent projects in parallel; results keep input order.
    pub fn schedule_many(
        &self,
        projects: &[Vec<Activity>],
    ) -> Vec<Result<ScheduledProject, ScheduleError>> {
        projects
            .par_iter()
            .map(|activities| self.schedule(activities))
            .collect()
    }
}

/// Schedule with the default configuration anchored at today's date.
pub fn schedule_project(activities: &[Activity]) -> Result<ScheduledProject, ScheduleError> {
    ActivityScheduler::default().schedule(activities)
}

/// Parallel counterpart of [`schedule_project`] for independent snapshots.
pub fn schedule_projects(projects: &[Vec<Activity>]) -> Vec<Result<ScheduledProject, ScheduleError>> {
    ActivityScheduler::default().schedule_many(projects)
}
