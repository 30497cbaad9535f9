use crate::activity::Activity;
use crate::graph::activity_dag::ActivityDag;
use crate::schedule::ScheduleError;
use chrono::{Days, NaiveDate};
use std::collections::HashMap;

/// Earliest start/finish by propagating predecessor finishes in topological order.
///
/// Durations are plain calendar days; weekends and holidays are not skipped.
pub struct ForwardPass<'a> {
    activities: &'a [Activity],
    dag: &'a ActivityDag,
    fallback_start: Option<NaiveDate>,
}

impl<'a> ForwardPass<'a> {
    /// `fallback_start` anchors activities that have neither resolvable
    /// predecessors nor an explicit start; `None` makes such activities an error.
    pub fn new(
        activities: &'a [Activity],
        dag: &'a ActivityDag,
        fallback_start: Option<NaiveDate>,
    ) -> Self {
        Self {
            activities,
            dag,
            fallback_start,
        }
    }

    pub fn execute(&self) -> Result<HashMap<i32, (NaiveDate, NaiveDate)>, ScheduleError> {
        let by_id: HashMap<i32, &Activity> = self.activities.iter().map(|a| (a.id, a)).collect();
        let order = self.dag.topological_order()?;

        let mut results: HashMap<i32, (NaiveDate, NaiveDate)> = HashMap::with_capacity(order.len());
        for activity_id in order {
            let Some(activity) = by_id.get(&activity_id) else {
                continue;
            };

            // Topological order guarantees every predecessor is already resolved.
            let latest_pred_finish = self
                .dag
                .predecessors(activity_id)
                .iter()
                .filter_map(|pred_id| results.get(pred_id).map(|(_, finish)| *finish))
                .max();

            let early_start = match latest_pred_finish {
                Some(finish) => finish,
                None => activity
                    .explicit_start_date
                    .or(self.fallback_start)
                    .ok_or(ScheduleError::MissingStartDate { id: activity_id })?,
            };

            let duration = u64::try_from(activity.duration_days).map_err(|_| {
                ScheduleError::InvalidDuration {
                    id: activity_id,
                    duration_days: activity.duration_days,
                }
            })?;
            let early_finish = early_start
                .checked_add_days(Days::new(duration))
                .ok_or(ScheduleError::DateOverflow { id: activity_id })?;

            results.insert(activity_id, (early_start, early_finish));
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn join_takes_latest_predecessor_finish() {
        let activities = vec![
            Activity::new(1, "Slab", 3).with_start_date(d(2025, 5, 5)),
            Activity::new(2, "Steel", 7).with_start_date(d(2025, 5, 1)),
            Activity::new(3, "Erect", 2).with_predecessors([1, 2]),
        ];
        let dag = ActivityDag::build(&activities);
        let results = ForwardPass::new(&activities, &dag, None).execute().unwrap();
        assert_eq!(results[&1], (d(2025, 5, 5), d(2025, 5, 8)));
        assert_eq!(results[&2], (d(2025, 5, 1), d(2025, 5, 8)));
        assert_eq!(results[&3], (d(2025, 5, 8), d(2025, 5, 10)));
    }

    #[test]
    fn explicit_start_is_ignored_when_predecessors_resolve() {
        let activities = vec![
            Activity::new(1, "A", 2).with_start_date(d(2025, 1, 1)),
            Activity::new(2, "B", 1)
                .with_predecessors([1])
                .with_start_date(d(2024, 6, 1)),
        ];
        let dag = ActivityDag::build(&activities);
        let results = ForwardPass::new(&activities, &dag, None).execute().unwrap();
        assert_eq!(results[&2].0, d(2025, 1, 3));
    }

    #[test]
    fn only_dangling_predecessors_fall_back_to_anchor() {
        let activities = vec![Activity::new(9, "Orphan", 4).with_predecessors([404])];
        let dag = ActivityDag::build(&activities);
        let results = ForwardPass::new(&activities, &dag, Some(d(2025, 2, 1)))
            .execute()
            .unwrap();
        assert_eq!(results[&9], (d(2025, 2, 1), d(2025, 2, 5)));
    }

    #[test]
    fn unanchored_root_without_fallback_is_an_error() {
        let activities = vec![Activity::new(1, "A", 1)];
        let dag = ActivityDag::build(&activities);
        let err = ForwardPass::new(&activities, &dag, None).execute().unwrap_err();
        assert!(matches!(err, ScheduleError::MissingStartDate { id: 1 }));
    }
}
