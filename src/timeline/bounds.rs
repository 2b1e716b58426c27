use chrono::NaiveDate;

use super::month_grid::{month_range, MonthGrid};
use crate::model::{Milestone, Task};

/// The visible date window of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl ChartBounds {
    pub fn month_grid(&self) -> MonthGrid {
        month_range(self.min, self.max)
    }
}

/// Earliest and latest date over every task start/end and milestone date.
/// `None` when there is nothing to show.
pub fn resolve_bounds(tasks: &[Task], milestones: &[Milestone]) -> Option<ChartBounds> {
    let dates = tasks
        .iter()
        .flat_map(|t| [t.start_date, t.end_date])
        .chain(milestones.iter().map(|m| m.date));

    dates.fold(None, |acc: Option<ChartBounds>, d| {
        Some(match acc {
            None => ChartBounds { min: d, max: d },
            Some(b) => ChartBounds {
                min: b.min.min(d),
                max: b.max.max(d),
            },
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn nothing_to_show() {
        assert_eq!(resolve_bounds(&[], &[]), None);
    }

    #[test]
    fn tasks_and_milestones_both_widen_the_window() {
        let tasks = vec![
            Task::new(1, "a", "G", date(2025, 2, 3), date(2025, 2, 20)),
            Task::new(2, "b", "G", date(2025, 1, 10), date(2025, 3, 1)),
        ];
        let milestones = vec![Milestone::new(1, "Launch", date(2025, 5, 2))];
        let bounds = resolve_bounds(&tasks, &milestones).unwrap();
        assert_eq!(bounds.min, date(2025, 1, 10));
        assert_eq!(bounds.max, date(2025, 5, 2));
        assert_eq!(bounds.month_grid().len(), 5);
    }

    #[test]
    fn milestones_alone_are_enough() {
        let milestones = vec![Milestone::new(1, "Kickoff", date(2025, 7, 4))];
        let bounds = resolve_bounds(&[], &milestones).unwrap();
        assert_eq!(bounds.min, bounds.max);
        assert_eq!(bounds.min, date(2025, 7, 4));
        assert_eq!(bounds.month_grid().len(), 1);
    }
}
