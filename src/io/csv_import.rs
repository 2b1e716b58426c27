use std::path::Path;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::model::{NewTask, TaskStatus};
use crate::timeline::date_math::parse_local_date;

/// Parsed rows ready for [`Project::import_tasks`](crate::model::Project::import_tasks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvImport {
    pub tasks: Vec<NewTask>,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Name,
    Group,
    Start,
    End,
    Status,
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons > commas && semicolons >= tabs {
        b';'
    } else if tabs > commas {
        b'\t'
    } else {
        b','
    }
}

/// Lower-case, with whitespace and underscores removed.
fn normalize_header(h: &str) -> String {
    h.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn header_to_column(normalized: &str) -> Option<Column> {
    match normalized {
        "activity" | "task" | "taskname" => Some(Column::Name),
        "epic" | "group" | "groupname" => Some(Column::Group),
        "start" | "startdate" => Some(Column::Start),
        "end" | "enddate" | "finishdate" | "finish" => Some(Column::End),
        "status" => Some(Column::Status),
        _ => None,
    }
}

/// `YYYY-MM-DD` or US `M/D/YYYY`.
fn parse_csv_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.contains('/') {
        NaiveDate::parse_from_str(s, "%m/%d/%Y").ok()
    } else if s.len() == 10 {
        parse_local_date(s)
    } else {
        None
    }
}

/// Import tasks from CSV text.
///
/// The delimiter is detected from the header line. `epic`, `activity`,
/// `start` and `end` columns are required (common aliases accepted),
/// `status` is optional. Rows with a missing name or date, an unparseable
/// date, or a start after the end are skipped and counted.
pub fn parse_csv(content: &str) -> Result<CsvImport, StoreError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let mut columns: [Option<usize>; 5] = [None; 5];
    for (index, header) in headers.iter().enumerate() {
        if let Some(column) = header_to_column(&normalize_header(header)) {
            columns[column as usize].get_or_insert(index);
        }
    }

    let required = [
        (Column::Name, "activity"),
        (Column::Group, "epic"),
        (Column::Start, "start"),
        (Column::End, "end"),
    ];
    let missing: Vec<&'static str> = required
        .iter()
        .filter(|(column, _)| columns[*column as usize].is_none())
        .map(|(_, label)| *label)
        .collect();
    if !missing.is_empty() {
        return Err(StoreError::MissingColumns {
            missing,
            found: headers.iter().map(str::to_string).collect(),
        });
    }

    let mut tasks = Vec::new();
    let mut skipped = 0usize;
    let mut rows = 0usize;

    for (i, result) in reader.records().enumerate() {
        rows += 1;
        let line = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(line, error = %e, "skipping malformed CSV row");
                skipped += 1;
                continue;
            }
        };
        let field = |column: Column| {
            columns[column as usize]
                .and_then(|index| record.get(index))
                .map(str::trim)
                .unwrap_or("")
        };

        let name = field(Column::Name);
        let start_raw = field(Column::Start);
        let end_raw = field(Column::End);
        if name.is_empty() || start_raw.is_empty() || end_raw.is_empty() {
            skipped += 1;
            continue;
        }

        let (Some(start), Some(end)) = (parse_csv_date(start_raw), parse_csv_date(end_raw)) else {
            warn!(line, start = start_raw, end = end_raw, "skipping row with invalid date");
            skipped += 1;
            continue;
        };
        if start > end {
            warn!(line, %start, %end, "skipping row that ends before it starts");
            skipped += 1;
            continue;
        }

        let status = TaskStatus::from_label(field(Column::Status)).unwrap_or_default();
        tasks.push(NewTask {
            name: name.to_string(),
            group: field(Column::Group).to_string(),
            start,
            end,
            status,
        });
    }

    if rows == 0 {
        return Err(StoreError::NoRows);
    }
    if tasks.is_empty() {
        return Err(StoreError::NoValidRows { skipped });
    }
    Ok(CsvImport { tasks, skipped })
}

/// Import tasks from a CSV file.
pub fn import_csv(path: &Path) -> Result<CsvImport, StoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let import = parse_csv(&content)?;
    info!(
        path = %path.display(),
        rows = import.tasks.len(),
        skipped = import.skipped,
        "CSV parsed"
    );
    Ok(import)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::csv_export::write_csv;
    use crate::model::{Project, UNGROUPED};
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn standard_header_with_us_dates() {
        let csv = "epic,activity,start,end,status\n\
                   Phase 1,Design,1/15/2025,02/10/2025,in progress\n\
                   ,Loose end,2025-03-01,2025-03-02,\n";
        let import = parse_csv(csv).unwrap();
        assert_eq!(import.skipped, 0);
        assert_eq!(
            import.tasks[0],
            NewTask {
                name: "Design".into(),
                group: "Phase 1".into(),
                start: date(2025, 1, 15),
                end: date(2025, 2, 10),
                status: TaskStatus::InProgress,
            }
        );
        assert_eq!(import.tasks[1].status, TaskStatus::NotStarted);

        let mut project = Project::default();
        assert_eq!(project.import_tasks(import.tasks), 2);
        assert_eq!(project.group_names(), vec!["Phase 1", UNGROUPED]);
    }

    #[test]
    fn legacy_headers_semicolons_and_bom() {
        let csv = "\u{feff}Task Name;Group_Name;Start Date;Finish\n\
                   Build;Core;2025-04-01;2025-04-30\n";
        let import = parse_csv(csv).unwrap();
        assert_eq!(import.tasks.len(), 1);
        assert_eq!(import.tasks[0].group, "Core");
        assert_eq!(import.tasks[0].end, date(2025, 4, 30));
    }

    #[test]
    fn bad_rows_are_skipped() {
        let csv = "epic,activity,start,end\n\
                   G,ok,2025-01-01,2025-01-02\n\
                   G,,2025-01-01,2025-01-02\n\
                   G,bad date,2025-13-01,2025-01-02\n\
                   G,inverted,2025-02-01,2025-01-02\n\
                   G,no end,2025-01-01,\n";
        let import = parse_csv(csv).unwrap();
        assert_eq!(import.tasks.len(), 1);
        assert_eq!(import.skipped, 4);
    }

    #[test]
    fn missing_headers_are_reported() {
        let err = parse_csv("name,start,end\nx,2025-01-01,2025-01-02\n").unwrap_err();
        match err {
            StoreError::MissingColumns { missing, found } => {
                assert_eq!(missing, vec!["activity", "epic"]);
                assert_eq!(found, vec!["name", "start", "end"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_only_and_all_invalid_files() {
        assert!(matches!(
            parse_csv("epic,activity,start,end\n"),
            Err(StoreError::NoRows)
        ));
        assert!(matches!(
            parse_csv("epic,activity,start,end\nG,a,x,y\n"),
            Err(StoreError::NoValidRows { skipped: 1 })
        ));
    }

    #[test]
    fn reads_back_its_own_export() {
        let tasks = vec![crate::model::Task::new(
            1,
            "Say \"hi\"",
            "Phase, 1",
            date(2025, 1, 15),
            date(2025, 2, 10),
        )];
        let mut out = Vec::new();
        write_csv(&tasks, &mut out).unwrap();
        let import = parse_csv(&String::from_utf8(out).unwrap()).unwrap();
        assert_eq!(import.tasks[0].name, "Say \"hi\"");
        assert_eq!(import.tasks[0].group, "Phase, 1");
    }

    #[test]
    fn delimiter_detection() {
        assert_eq!(detect_delimiter("a,b,c"), b',');
        assert_eq!(detect_delimiter("a;b;c"), b';');
        assert_eq!(detect_delimiter("a\tb\tc"), b'\t');
        assert_eq!(normalize_header(" Start_Date "), "startdate");
    }
}
