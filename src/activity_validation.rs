use crate::activity::Activity;
use crate::schedule::{DanglingPolicy, ScheduleError};
use std::collections::HashSet;
use tracing::warn;

pub fn validate_activity(activity: &Activity) -> Result<(), ScheduleError> {
    if activity.duration_days < 1 {
        return Err(ScheduleError::InvalidDuration {
            id: activity.id,
            duration_days: activity.duration_days,
        });
    }
    Ok(())
}

/// Checks ids, durations and predecessor references of a whole project.
///
/// Unresolvable predecessors are logged and tolerated under
/// [`DanglingPolicy::Ignore`]; they contribute no constraint downstream.
pub fn validate_activity_collection(
    activities: &[Activity],
    dangling: DanglingPolicy,
) -> Result<(), ScheduleError> {
    let mut seen_ids = HashSet::with_capacity(activities.len());
    for activity in activities {
        if !seen_ids.insert(activity.id) {
            return Err(ScheduleError::DuplicateActivityId { id: activity.id });
        }
        validate_activity(activity)?;
    }

    for activity in activities {
        for &predecessor in &activity.predecessors {
            if seen_ids.contains(&predecessor) {
                continue;
            }
            match dangling {
                DanglingPolicy::Ignore => warn!(
                    activity = activity.id,
                    predecessor, "ignoring predecessor outside the activity set"
                ),
                DanglingPolicy::Reject => {
                    return Err(ScheduleError::DanglingPredecessor {
                        id: activity.id,
                        predecessor,
                    });
                }
            }
        }
    }
    Ok(())
}
