use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use crate::error::StoreError;
use crate::model::Task;
use crate::timeline::date_math::to_iso;

/// Column order shared with the importer.
pub const HEADER: [&str; 5] = ["epic", "activity", "start", "end", "status"];

/// Write tasks as CSV: a bare header line, then one fully quoted row per
/// task with ISO dates. Returns the number of tasks written.
pub fn write_csv<W: Write>(tasks: &[Task], mut out: W) -> Result<usize, StoreError> {
    {
        let mut header = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(&mut out);
        header.write_record(HEADER)?;
        header.flush().map_err(csv::Error::from)?;
    }

    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(&mut out);
    for task in tasks {
        let start = to_iso(task.start_date);
        let end = to_iso(task.end_date);
        wtr.write_record([
            task.group.as_str(),
            task.name.as_str(),
            start.as_str(),
            end.as_str(),
            task.status.label(),
        ])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(tasks.len())
}

/// Export tasks to a CSV file.
pub fn export_csv(tasks: &[Task], path: &Path) -> Result<usize, StoreError> {
    let file = std::fs::File::create(path).map_err(|e| StoreError::io(path, e))?;
    let written = write_csv(tasks, file)?;
    info!(path = %path.display(), tasks = written, "tasks exported to CSV");
    Ok(written)
}

/// `<project>_tasks_<date>.csv`, with anything but word characters and `-`
/// in the project name replaced by `_`.
pub fn suggested_file_name(project_name: &str, today: NaiveDate) -> String {
    let mut safe = String::with_capacity(project_name.len());
    let mut in_run = false;
    for c in project_name.chars() {
        if c.is_alphanumeric() || c == '_' || c == '-' {
            safe.push(c);
            in_run = false;
        } else if !in_run {
            safe.push('_');
            in_run = true;
        }
    }
    if safe.is_empty() {
        safe.push_str("project");
    }
    format!("{safe}_tasks_{}.csv", to_iso(today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rows_are_fully_quoted() {
        let mut task = Task::new(1, "Say \"hi\"", "Phase, 1", date(2025, 1, 15), date(2025, 2, 10));
        task.status = TaskStatus::ActionNeeded;
        let mut out = Vec::new();
        assert_eq!(write_csv(&[task], &mut out).unwrap(), 1);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "epic,activity,start,end,status\n\
             \"Phase, 1\",\"Say \"\"hi\"\"\",\"2025-01-15\",\"2025-02-10\",\"Action Needed\"\n"
        );
    }

    #[test]
    fn export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.csv");
        let tasks = vec![
            Task::new(1, "a", "G", date(2025, 1, 1), date(2025, 1, 2)),
            Task::new(2, "b", "G", date(2025, 1, 3), date(2025, 1, 4)),
        ];
        assert_eq!(export_csv(&tasks, &path).unwrap(), 2);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn file_name_is_sanitized() {
        assert_eq!(
            suggested_file_name("Q3 / Road map", date(2025, 7, 1)),
            "Q3_Road_map_tasks_2025-07-01.csv"
        );
        assert_eq!(suggested_file_name("", date(2025, 7, 1)), "project_tasks_2025-07-01.csv");
    }
}
