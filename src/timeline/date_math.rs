//! Calendar-date helpers. Everything here works on `NaiveDate`, so no
//! timezone offset can ever shift a date across midnight.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Fallback formats tried after the strict ISO form, in order.
const FALLBACK_FORMATS: &[&str] = &["%m/%d/%Y", "%Y/%m/%d", "%b %d, %Y", "%B %d, %Y"];

/// Parse a calendar date.
///
/// `YYYY-MM-DD` is parsed field by field into a local calendar date. Other
/// shapes fall back to RFC 3339 timestamps (taking the date as written, in
/// the timestamp's own offset), naive timestamps, US `M/D/YYYY` and the
/// display form produced by [`format_display`].
pub fn parse_local_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if is_iso_shape(s) {
        let year = s[0..4].parse().ok()?;
        let month = s[5..7].parse().ok()?;
        let day = s[8..10].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    FALLBACK_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn is_iso_shape(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit())
}

/// Whole days from `a` to `b` (negative when `b` is earlier).
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// `d` moved by `n` days, saturating at the calendar's limits.
pub fn add_days(d: NaiveDate, n: i64) -> NaiveDate {
    let days = Days::new(n.unsigned_abs());
    if n >= 0 {
        d.checked_add_days(days).unwrap_or(NaiveDate::MAX)
    } else {
        d.checked_sub_days(days).unwrap_or(NaiveDate::MIN)
    }
}

/// `yyyy-mm-dd`, the only date form that is ever persisted.
pub fn to_iso(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// Human form used in tooltips and the status bar, e.g. `Jan 5, 2025`.
pub fn format_display(d: NaiveDate) -> String {
    format!(
        "{} {}, {}",
        month_abbreviation(d.month()),
        d.day(),
        d.year()
    )
}

/// Three-letter English month name for `month` in `1..=12`.
pub fn month_abbreviation(month: u32) -> &'static str {
    MONTH_ABBREVIATIONS[(month.clamp(1, 12) - 1) as usize]
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

/// `d` if it lies inside `[min, max]`, otherwise the nearer bound.
pub fn clamp_date(d: NaiveDate, min: NaiveDate, max: NaiveDate) -> NaiveDate {
    if d < min {
        min
    } else if d > max {
        max
    } else {
        d
    }
}

/// Inclusive length of a task in days, as shown in tooltips.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    days_between(start, end).max(0) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_strict_iso_dates() {
        assert_eq!(parse_local_date("2025-01-15"), Some(date(2025, 1, 15)));
        assert_eq!(parse_local_date(" 2024-02-29 "), Some(date(2024, 2, 29)));
    }

    #[test]
    fn rejects_impossible_iso_dates() {
        assert_eq!(parse_local_date("2025-02-30"), None);
        assert_eq!(parse_local_date("2025-13-01"), None);
        assert_eq!(parse_local_date("2025-00-10"), None);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_local_date(""), None);
        assert_eq!(parse_local_date("not a date"), None);
        assert_eq!(parse_local_date("2025-1-5x"), None);
    }

    #[test]
    fn timestamp_keeps_the_written_calendar_day() {
        // 23:30 at -05:00 is already the next day in UTC; the written day wins.
        assert_eq!(
            parse_local_date("2025-03-09T23:30:00-05:00"),
            Some(date(2025, 3, 9))
        );
        assert_eq!(
            parse_local_date("2025-03-09T00:15:00"),
            Some(date(2025, 3, 9))
        );
    }

    #[test]
    fn falls_back_to_us_and_display_forms() {
        assert_eq!(parse_local_date("3/7/2025"), Some(date(2025, 3, 7)));
        assert_eq!(parse_local_date("2025/03/07"), Some(date(2025, 3, 7)));
        assert_eq!(parse_local_date("Jan 5, 2025"), Some(date(2025, 1, 5)));
    }

    #[test]
    fn days_between_is_signed_and_exact() {
        assert_eq!(days_between(date(2025, 1, 1), date(2025, 1, 1)), 0);
        assert_eq!(days_between(date(2025, 3, 1), date(2025, 3, 31)), 30);
        // Spans the DST change in most northern timezones.
        assert_eq!(days_between(date(2025, 3, 8), date(2025, 3, 10)), 2);
        assert_eq!(days_between(date(2025, 1, 10), date(2025, 1, 1)), -9);
    }

    #[test]
    fn add_days_crosses_month_and_year() {
        assert_eq!(add_days(date(2024, 12, 30), 3), date(2025, 1, 2));
        assert_eq!(add_days(date(2024, 3, 1), -1), date(2024, 2, 29));
        assert_eq!(add_days(date(2025, 1, 1), i64::MAX), NaiveDate::MAX);
        assert_eq!(add_days(date(2025, 1, 1), i64::MIN), NaiveDate::MIN);
    }

    #[test]
    fn formats_iso_and_display() {
        assert_eq!(to_iso(date(2025, 1, 5)), "2025-01-05");
        assert_eq!(format_display(date(2025, 1, 5)), "Jan 5, 2025");
        assert_eq!(format_display(date(2024, 12, 31)), "Dec 31, 2024");
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2025, 1), 31);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 4), 30);
        assert_eq!(days_in_month(2025, 12), 31);
    }

    #[test]
    fn clamp_date_returns_nearer_bound() {
        let min = date(2025, 1, 1);
        let max = date(2025, 3, 31);
        assert_eq!(clamp_date(date(2024, 12, 1), min, max), min);
        assert_eq!(clamp_date(date(2025, 4, 2), min, max), max);
        assert_eq!(clamp_date(date(2025, 2, 14), min, max), date(2025, 2, 14));
        assert_eq!(clamp_date(min, min, max), min);
    }

    #[test]
    fn inclusive_days_counts_both_ends() {
        assert_eq!(inclusive_days(date(2025, 1, 1), date(2025, 1, 1)), 1);
        assert_eq!(inclusive_days(date(2025, 1, 1), date(2025, 1, 31)), 31);
    }
}
