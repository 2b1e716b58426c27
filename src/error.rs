use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::TaskId;

/// Failures of the month-grid coordinate system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimelineError {
    #[error("month grid must contain at least one month")]
    EmptyGrid,
    #[error("{year}-{month:02} is not part of the month grid")]
    MonthNotInGrid { year: i32, month: u32 },
}

/// Rejected gesture transitions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GestureError {
    #[error("a drag on task {task_id} is already in progress")]
    AlreadyDragging { task_id: TaskId },
    #[error("no drag gesture is in progress")]
    NotDragging,
    #[error("drag surface width {0} is not a positive length")]
    InvalidSurface(f64),
    #[error(transparent)]
    Timeline(#[from] TimelineError),
}

/// A color string that is not `#RGB` or `#RRGGBB` hex.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color \"{0}\": expected #RGB or #RRGGBB")]
pub struct ColorParseError(pub String);

/// Rejected edits to a project or workspace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectError {
    #[error("task {0} does not exist")]
    TaskNotFound(TaskId),
    #[error("milestone {0} does not exist")]
    MilestoneNotFound(i64),
    #[error("group \"{0}\" does not exist")]
    GroupNotFound(String),
    #[error("a group named \"{0}\" already exists")]
    GroupExists(String),
    #[error("project index {0} is out of range")]
    ProjectNotFound(usize),
    #[error("name must not be empty")]
    EmptyName,
    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Failures while reading or writing files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("unrecognized file format: expected a project or workspace document")]
    UnrecognizedFormat,
    #[error("CSV is missing required columns ({}); found headers: {found:?}", .missing.join(", "))]
    MissingColumns {
        missing: Vec<&'static str>,
        found: Vec<String>,
    },
    #[error("CSV file has no data rows")]
    NoRows,
    #[error("no valid rows to import ({skipped} skipped)")]
    NoValidRows { skipped: usize },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
