//! Fractional-month coordinate system.
//!
//! A position is measured in months since the start of the grid: the integer
//! part is the month index, the fractional part is progress through that
//! month by day. Bars are laid out in percent of the grid width, so the same
//! numbers work for any surface size.

use chrono::{Datelike, NaiveDate};

use super::month_grid::{MonthGrid, YearMonth};
use crate::error::TimelineError;

/// Which edge of a day a date stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The beginning of the day (task starts, milestones).
    Start,
    /// The end of the day (task ends), so a task ending on the last day of a
    /// month reaches the next month boundary exactly.
    InclusiveEnd,
}

/// Horizontal placement of a bar in percent of the timeline width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub left_percent: f64,
    pub width_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineProjector {
    grid: MonthGrid,
}

impl TimelineProjector {
    pub fn new(grid: MonthGrid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &MonthGrid {
        &self.grid
    }

    pub fn total_months(&self) -> usize {
        self.grid.len()
    }

    pub fn position_of(&self, date: NaiveDate, anchor: Anchor) -> Result<f64, TimelineError> {
        let month = YearMonth::of(date);
        let index = self
            .grid
            .index_of(month)
            .ok_or(TimelineError::MonthNotInGrid {
                year: month.year,
                month: month.month,
            })?;
        let days = f64::from(month.days());
        let day = f64::from(date.day());
        let frac = match anchor {
            Anchor::Start => (day - 1.0) / days,
            Anchor::InclusiveEnd => day / days,
        };
        Ok(index as f64 + frac)
    }

    pub fn span_of(&self, start: NaiveDate, end: NaiveDate) -> Result<Span, TimelineError> {
        let total = self.total_months() as f64;
        let start_pos = self.position_of(start, Anchor::Start)?;
        let end_pos = self.position_of(end, Anchor::InclusiveEnd)?;
        Ok(Span {
            left_percent: 100.0 * start_pos / total,
            width_percent: 100.0 * (end_pos - start_pos) / total,
        })
    }

    /// Inverse of [`position_of`](Self::position_of).
    ///
    /// Positions outside `[0, total]` are clamped onto the grid; the upper
    /// boundary `total` is the end of the last month.
    pub fn date_from_position(&self, pos: f64, anchor: Anchor) -> NaiveDate {
        let total = self.total_months();
        let pos = if pos.is_finite() {
            pos.clamp(0.0, total as f64)
        } else if pos == f64::INFINITY {
            total as f64
        } else {
            0.0
        };

        let mut index = pos.floor() as usize;
        let mut frac = pos - index as f64;
        if index >= total {
            index = total - 1;
            frac = 1.0;
        }

        let month = self.grid.months()[index];
        let days = month.days();
        let scaled = (frac * f64::from(days)).round() as u32;
        match anchor {
            Anchor::Start => month.day(scaled + 1),
            Anchor::InclusiveEnd => {
                if scaled == 0 && index > 0 {
                    // Exactly on a boundary: the end of the previous month's last day.
                    self.grid.months()[index - 1].last_day()
                } else {
                    month.day(scaled)
                }
            }
        }
    }

    /// Start-anchored marker offset in percent, clamped to `[0, 100]`.
    /// `None` when the date's month is not on the grid.
    pub fn marker_percent(&self, date: NaiveDate) -> Option<f64> {
        let pos = self.position_of(date, Anchor::Start).ok()?;
        Some((100.0 * pos / self.total_months() as f64).clamp(0.0, 100.0))
    }

    /// Percent offsets of the inner month boundaries, paired with the month
    /// that starts there.
    pub fn grid_lines(&self) -> Vec<(f64, YearMonth)> {
        let total = self.total_months() as f64;
        self.grid
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, m)| (i as f64 * 100.0 / total, m))
            .collect()
    }
}

/// Place a `(start, end)` pair on a grid in one call.
pub fn project_span(
    grid: &MonthGrid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Span, TimelineError> {
    TimelineProjector::new(grid.clone()).span_of(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::date_math::add_days;
    use crate::timeline::month_grid::month_range;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn q1_2025() -> TimelineProjector {
        TimelineProjector::new(month_range(date(2025, 1, 1), date(2025, 3, 31)))
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn start_and_end_anchors() {
        let p = q1_2025();
        assert_close(p.position_of(date(2025, 1, 1), Anchor::Start).unwrap(), 0.0);
        assert_close(
            p.position_of(date(2025, 1, 31), Anchor::InclusiveEnd).unwrap(),
            1.0,
        );
        assert_close(
            p.position_of(date(2025, 2, 15), Anchor::Start).unwrap(),
            1.0 + 14.0 / 28.0,
        );
    }

    #[test]
    fn span_matches_worked_example() {
        let span = q1_2025()
            .span_of(date(2025, 1, 15), date(2025, 2, 10))
            .unwrap();
        assert_close(span.left_percent, (14.0 / 31.0) * 100.0 / 3.0);
        assert!((span.left_percent - 15.05).abs() < 0.01);
        assert_close(
            span.width_percent,
            (1.0 + 10.0 / 28.0 - 14.0 / 31.0) * 100.0 / 3.0,
        );
    }

    #[test]
    fn full_grid_span_is_one_hundred_percent() {
        let span = q1_2025()
            .span_of(date(2025, 1, 1), date(2025, 3, 31))
            .unwrap();
        assert_close(span.left_percent, 0.0);
        assert_close(span.left_percent + span.width_percent, 100.0);
    }

    #[test]
    fn project_span_matches_span_of() {
        let grid = month_range(date(2025, 1, 1), date(2025, 3, 31));
        let (start, end) = (date(2025, 1, 15), date(2025, 2, 10));
        assert_eq!(project_span(&grid, start, end), q1_2025().span_of(start, end));
        assert!(project_span(&grid, start, date(2025, 4, 2)).is_err());
    }

    #[test]
    fn out_of_grid_month_is_an_error() {
        let err = q1_2025()
            .position_of(date(2025, 4, 1), Anchor::Start)
            .unwrap_err();
        assert_eq!(
            err,
            TimelineError::MonthNotInGrid {
                year: 2025,
                month: 4
            }
        );
        assert!(q1_2025().span_of(date(2024, 12, 31), date(2025, 1, 5)).is_err());
    }

    #[test]
    fn round_trip_for_every_day_and_anchor() {
        let grid = month_range(date(2023, 11, 1), date(2025, 3, 1));
        let p = TimelineProjector::new(grid.clone());
        let (first, last) = grid.date_span();
        let mut d = first;
        while d <= last {
            for anchor in [Anchor::Start, Anchor::InclusiveEnd] {
                let pos = p.position_of(d, anchor).unwrap();
                assert_eq!(p.date_from_position(pos, anchor), d, "{d} {anchor:?}");
            }
            d = add_days(d, 1);
        }
    }

    #[test]
    fn positions_are_monotonic() {
        let grid = month_range(date(2024, 1, 1), date(2024, 12, 31));
        let p = TimelineProjector::new(grid.clone());
        let (first, last) = grid.date_span();
        for anchor in [Anchor::Start, Anchor::InclusiveEnd] {
            let mut prev = f64::NEG_INFINITY;
            let mut d = first;
            while d <= last {
                let pos = p.position_of(d, anchor).unwrap();
                assert!(pos >= prev, "{d} went backwards");
                prev = pos;
                d = add_days(d, 1);
            }
        }
    }

    #[test]
    fn positions_outside_the_grid_clamp_to_its_edges() {
        let p = q1_2025();
        assert_eq!(p.date_from_position(-2.5, Anchor::Start), date(2025, 1, 1));
        assert_eq!(p.date_from_position(7.0, Anchor::Start), date(2025, 3, 31));
        assert_eq!(
            p.date_from_position(3.0, Anchor::InclusiveEnd),
            date(2025, 3, 31)
        );
        assert_eq!(
            p.date_from_position(0.0, Anchor::InclusiveEnd),
            date(2025, 1, 1)
        );
        assert_eq!(
            p.date_from_position(f64::NAN, Anchor::Start),
            date(2025, 1, 1)
        );
    }

    #[test]
    fn markers_and_grid_lines() {
        let p = q1_2025();
        assert_eq!(p.marker_percent(date(2025, 1, 1)), Some(0.0));
        assert_eq!(p.marker_percent(date(2025, 6, 1)), None);
        let lines = p.grid_lines();
        assert_eq!(lines.len(), 2);
        assert_close(lines[0].0, 100.0 / 3.0);
        assert_eq!(lines[1].1, YearMonth::new(2025, 3));
    }
}
