use chrono::NaiveDate;
use std::collections::HashMap;

/// Slack as the distance from each activity's finish to the project finish.
///
/// This is not successor-based total float: an activity whose chain ends
/// early shows the full gap to the latest finish in the project.
pub struct BackwardPass<'a> {
    early_dates: &'a HashMap<i32, (NaiveDate, NaiveDate)>,
}

impl<'a> BackwardPass<'a> {
    pub fn new(early_dates: &'a HashMap<i32, (NaiveDate, NaiveDate)>) -> Self {
        Self { early_dates }
    }

    /// Latest early finish, or `None` for an empty project.
    pub fn project_finish(&self) -> Option<NaiveDate> {
        self.early_dates.values().map(|(_, finish)| *finish).max()
    }

    /// Slack days per activity id, floored at zero.
    pub fn execute(&self, project_finish: NaiveDate) -> HashMap<i32, i64> {
        self.early_dates
            .iter()
            .map(|(&id, &(_, finish))| {
                let slack = (project_finish - finish).num_days().max(0);
                (id, slack)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn slack_measures_gap_to_latest_finish() {
        let early = HashMap::from([
            (1, (d(2025, 1, 15), d(2025, 1, 25))),
            (2, (d(2025, 1, 25), d(2025, 1, 30))),
        ]);
        let pass = BackwardPass::new(&early);
        let finish = pass.project_finish().unwrap();
        assert_eq!(finish, d(2025, 1, 30));
        let slack = pass.execute(finish);
        assert_eq!(slack[&1], 5);
        assert_eq!(slack[&2], 0);
    }

    #[test]
    fn finishes_past_the_horizon_are_floored() {
        let early = HashMap::from([(1, (d(2025, 1, 1), d(2025, 3, 1)))]);
        let slack = BackwardPass::new(&early).execute(d(2025, 2, 1));
        assert_eq!(slack[&1], 0);
    }

    #[test]
    fn empty_project_has_no_finish() {
        let early = HashMap::new();
        assert_eq!(BackwardPass::new(&early).project_finish(), None);
    }
}
