//! The ordered list of calendar months under the chart, and its grouping
//! into fiscal quarters (fiscal year starts in April).

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::date_math::{days_in_month, month_abbreviation};
use crate::error::TimelineError;

/// A calendar month; `month` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    pub fn days(self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn first_day(self) -> NaiveDate {
        self.day(1)
    }

    pub fn last_day(self) -> NaiveDate {
        self.day(self.days())
    }

    /// The date for `day`, clamped into the month.
    pub fn day(self, day: u32) -> NaiveDate {
        let day = day.clamp(1, self.days());
        NaiveDate::from_ymd_opt(self.year, self.month, day).unwrap_or(NaiveDate::MIN)
    }

    pub fn next(self) -> Self {
        if self.month >= 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// Header label such as `Jan 25`.
    pub fn short_label(self) -> String {
        format!(
            "{} {:02}",
            month_abbreviation(self.month),
            self.year.rem_euclid(100)
        )
    }

    /// January, April, July and October open a fiscal quarter.
    pub fn is_quarter_start(self) -> bool {
        matches!(self.month, 1 | 4 | 7 | 10)
    }

    /// The fiscal year (by its starting calendar year) and quarter `1..=4`.
    pub fn fiscal_quarter(self) -> (i32, u8) {
        let fy_start_year = if self.month >= 4 {
            self.year
        } else {
            self.year - 1
        };
        let quarter = match self.month {
            4..=6 => 1,
            7..=9 => 2,
            10..=12 => 3,
            _ => 4,
        };
        (fy_start_year, quarter)
    }
}

/// A non-empty, ordered sequence of months.
///
/// The grid owns its months, so it can be iterated any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    months: Vec<YearMonth>,
}

impl MonthGrid {
    pub fn from_months(months: Vec<YearMonth>) -> Result<Self, TimelineError> {
        if months.is_empty() {
            return Err(TimelineError::EmptyGrid);
        }
        Ok(Self { months })
    }

    pub fn months(&self) -> &[YearMonth] {
        &self.months
    }

    pub fn iter(&self) -> impl Iterator<Item = YearMonth> + '_ {
        self.months.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn index_of(&self, month: YearMonth) -> Option<usize> {
        self.months.iter().position(|m| *m == month)
    }

    pub fn first(&self) -> YearMonth {
        self.months[0]
    }

    pub fn last(&self) -> YearMonth {
        self.months[self.months.len() - 1]
    }

    /// First day of the first month through last day of the last month.
    pub fn date_span(&self) -> (NaiveDate, NaiveDate) {
        (self.first().first_day(), self.last().last_day())
    }
}

impl<'a> IntoIterator for &'a MonthGrid {
    type Item = &'a YearMonth;
    type IntoIter = std::slice::Iter<'a, YearMonth>;

    fn into_iter(self) -> Self::IntoIter {
        self.months.iter()
    }
}

/// Every month from `min`'s month through `max`'s month inclusive.
///
/// Day-of-month is ignored. Arguments given in the wrong order are swapped,
/// so the result always holds at least one month.
pub fn month_range(min: NaiveDate, max: NaiveDate) -> MonthGrid {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let last = YearMonth::of(hi);
    let mut months = Vec::new();
    let mut current = YearMonth::of(lo);
    while current <= last {
        months.push(current);
        current = current.next();
    }
    MonthGrid { months }
}

/// A three-month bucket of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiscalQuarter {
    pub fy_start_year: i32,
    pub fy_end_year: i32,
    /// 1 = Apr–Jun, 2 = Jul–Sep, 3 = Oct–Dec, 4 = Jan–Mar.
    pub quarter: u8,
    pub months: Vec<YearMonth>,
}

impl FiscalQuarter {
    /// `FY 25/26` for the fiscal year April 2025 – March 2026.
    pub fn fy_label(&self) -> String {
        format!(
            "FY {:02}/{:02}",
            self.fy_start_year.rem_euclid(100),
            self.fy_end_year.rem_euclid(100)
        )
    }

    pub fn quarter_label(&self) -> String {
        format!("Q{}", self.quarter)
    }
}

/// Bucket months into fiscal quarters, in chronological order.
pub fn group_by_fiscal_quarter<'a, I>(months: I) -> Vec<FiscalQuarter>
where
    I: IntoIterator<Item = &'a YearMonth>,
{
    let mut buckets: BTreeMap<(i32, u8), FiscalQuarter> = BTreeMap::new();
    for month in months {
        let (fy_start_year, quarter) = month.fiscal_quarter();
        buckets
            .entry((fy_start_year, quarter))
            .or_insert_with(|| FiscalQuarter {
                fy_start_year,
                fy_end_year: fy_start_year + 1,
                quarter,
                months: Vec::new(),
            })
            .months
            .push(*month);
    }
    buckets.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_month_yields_one_element() {
        let grid = month_range(date(2025, 5, 3), date(2025, 5, 28));
        assert_eq!(grid.months(), &[YearMonth::new(2025, 5)]);
    }

    #[test]
    fn range_ignores_day_of_month_and_crosses_years() {
        let grid = month_range(date(2024, 11, 30), date(2025, 2, 1));
        assert_eq!(
            grid.months(),
            &[
                YearMonth::new(2024, 11),
                YearMonth::new(2024, 12),
                YearMonth::new(2025, 1),
                YearMonth::new(2025, 2),
            ]
        );
    }

    #[test]
    fn reversed_arguments_still_cover_the_range() {
        let grid = month_range(date(2025, 3, 1), date(2025, 1, 20));
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.first(), YearMonth::new(2025, 1));
    }

    #[test]
    fn grid_is_restartable() {
        let grid = month_range(date(2025, 1, 1), date(2025, 6, 1));
        let first: Vec<_> = grid.iter().collect();
        let second: Vec<_> = grid.iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
    }

    #[test]
    fn empty_grid_is_rejected() {
        assert_eq!(MonthGrid::from_months(vec![]), Err(TimelineError::EmptyGrid));
    }

    #[test]
    fn april_opens_a_new_fiscal_year() {
        let april = group_by_fiscal_quarter(&[YearMonth::new(2025, 4)]);
        assert_eq!(april[0].fy_label(), "FY 25/26");
        assert_eq!(april[0].quarter, 1);

        let march = group_by_fiscal_quarter(&[YearMonth::new(2025, 3)]);
        assert_eq!(march[0].fy_label(), "FY 24/25");
        assert_eq!(march[0].quarter, 4);
    }

    #[test]
    fn quarters_are_chronological_with_partial_edges() {
        let grid = month_range(date(2025, 2, 10), date(2025, 8, 1));
        let quarters = group_by_fiscal_quarter(&grid);
        let summary: Vec<_> = quarters
            .iter()
            .map(|q| (q.fy_label(), q.quarter_label(), q.months.len()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("FY 24/25".to_string(), "Q4".to_string(), 2),
                ("FY 25/26".to_string(), "Q1".to_string(), 3),
                ("FY 25/26".to_string(), "Q2".to_string(), 2),
            ]
        );
    }

    #[test]
    fn century_rollover_label_is_zero_padded() {
        let q = group_by_fiscal_quarter(&[YearMonth::new(2099, 12)]);
        assert_eq!(q[0].fy_label(), "FY 99/00");
    }

    #[test]
    fn month_helpers() {
        let feb = YearMonth::new(2024, 2);
        assert_eq!(feb.days(), 29);
        assert_eq!(feb.last_day(), date(2024, 2, 29));
        assert_eq!(feb.day(31), date(2024, 2, 29));
        assert_eq!(YearMonth::new(2024, 12).next(), YearMonth::new(2025, 1));
        assert_eq!(YearMonth::new(2025, 1).short_label(), "Jan 25");
        assert!(YearMonth::new(2025, 10).is_quarter_start());
        assert!(!YearMonth::new(2025, 11).is_quarter_start());
    }
}
