//! Group status derived from the statuses of its tasks.

use crate::model::{Task, TaskStatus};

/// Statuses that win over everything else, highest priority first.
const PRIORITY: [TaskStatus; 4] = [
    TaskStatus::Blocked,
    TaskStatus::ActionNeeded,
    TaskStatus::Delayed,
    TaskStatus::InProgress,
];

/// The status a group should show for the given task statuses.
///
/// `None` when there are no tasks, which means "leave the group as it is".
pub fn derive_status<I>(statuses: I) -> Option<TaskStatus>
where
    I: IntoIterator<Item = TaskStatus>,
{
    let mut seen = [false; TaskStatus::ALL.len()];
    let mut any = false;
    for status in statuses {
        seen[status.index()] = true;
        any = true;
    }
    if !any {
        return None;
    }

    if let Some(status) = PRIORITY.iter().find(|s| seen[s.index()]) {
        return Some(*status);
    }
    let only_completed = TaskStatus::ALL
        .iter()
        .all(|s| *s == TaskStatus::Completed || !seen[s.index()]);
    if only_completed {
        Some(TaskStatus::Completed)
    } else {
        Some(TaskStatus::NotStarted)
    }
}

/// [`derive_status`] over the tasks that belong to `group`.
pub fn derive_group_status(tasks: &[Task], group: &str) -> Option<TaskStatus> {
    derive_status(tasks.iter().filter(|t| t.group == group).map(|t| t.status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus::*;

    #[test]
    fn empty_group_has_no_derived_status() {
        assert_eq!(derive_status(Vec::<TaskStatus>::new()), None);
    }

    #[test]
    fn priority_order() {
        assert_eq!(derive_status([Blocked, Completed]), Some(Blocked));
        assert_eq!(
            derive_status([InProgress, ActionNeeded, Delayed]),
            Some(ActionNeeded)
        );
        assert_eq!(derive_status([NotStarted, Delayed]), Some(Delayed));
        assert_eq!(derive_status([InProgress]), Some(InProgress));
    }

    #[test]
    fn all_completed_is_completed() {
        assert_eq!(derive_status([Completed, Completed]), Some(Completed));
    }

    #[test]
    fn mixed_completed_and_not_started_is_not_started() {
        assert_eq!(derive_status([Completed, NotStarted]), Some(NotStarted));
        assert_eq!(derive_status([NotStarted]), Some(NotStarted));
    }

    #[test]
    fn only_the_named_group_counts() {
        let d = chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut a = Task::new(1, "a", "Build", d, d);
        a.status = Blocked;
        let mut b = Task::new(2, "b", "Design", d, d);
        b.status = Completed;
        let tasks = vec![a, b];
        assert_eq!(derive_group_status(&tasks, "Design"), Some(Completed));
        assert_eq!(derive_group_status(&tasks, "Build"), Some(Blocked));
        assert_eq!(derive_group_status(&tasks, "Missing"), None);
    }
}
