use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::color::Rgb;
use super::status::TaskStatus;

pub type TaskId = i64;

/// One past the largest id in use, or the smallest unused positive id when
/// that would overflow.
pub(crate) fn next_free_id(used: &BTreeSet<i64>) -> i64 {
    let after_max = used.last().map_or(Some(1), |&max| max.max(0).checked_add(1));
    after_max.unwrap_or_else(|| (1..=i64::MAX).find(|id| !used.contains(id)).unwrap_or(0))
}

/// A dated bar on the chart. `start_date <= end_date` always holds for tasks
/// owned by a [`Project`](super::Project).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub group: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub color: Rgb,
    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    /// A `Not Started` task colored by its status.
    pub fn new(
        id: TaskId,
        name: impl Into<String>,
        group: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        let status = TaskStatus::NotStarted;
        Self {
            id,
            name: name.into(),
            group: group.into(),
            start_date,
            end_date,
            color: status.color(),
            status,
        }
    }
}

/// A single-date marker drawn across the chart body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: i64,
    pub name: String,
    pub date: NaiveDate,
}

impl Milestone {
    pub fn new(id: i64, name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id,
            name: name.into(),
            date,
        }
    }
}

/// A named bucket of tasks. Its status is derived from its tasks unless set
/// by hand, and its color follows the status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub color: Rgb,
    #[serde(default)]
    pub status: TaskStatus,
}

impl Group {
    pub fn new(name: impl Into<String>, color: Rgb) -> Self {
        Self {
            name: name.into(),
            color,
            status: TaskStatus::NotStarted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn next_free_id_never_overflows() {
        assert_eq!(next_free_id(&BTreeSet::new()), 1);
        assert_eq!(next_free_id(&BTreeSet::from([3, 7])), 8);
        assert_eq!(next_free_id(&BTreeSet::from([1, 2, i64::MAX])), 3);
        assert_eq!(next_free_id(&BTreeSet::from([i64::MAX])), 1);
    }

    #[test]
    fn task_serializes_with_camel_case_iso_dates() {
        let task = Task::new(42, "Design", "Phase 1", date(2025, 1, 15), date(2025, 2, 10));
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["startDate"], "2025-01-15");
        assert_eq!(json["endDate"], "2025-02-10");
        assert_eq!(json["status"], "Not Started");
        assert_eq!(json["color"], "#808080");
    }

    #[test]
    fn missing_status_defaults_to_not_started() {
        let json = r##"{"id":1,"name":"a","group":"g","startDate":"2025-01-01",
            "endDate":"2025-01-02","color":"#fff"}"##;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status, TaskStatus::NotStarted);
        assert_eq!(task.color, Rgb::new(255, 255, 255));
    }
}
