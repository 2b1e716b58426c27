//! Workspace documents on disk.
//!
//! Files are written in the multi-project layout
//! `{ projects, activeProjectIndex, exportDate, version: "3.0" }`. Reading is
//! lenient: older single-project files and bare arrays of projects are
//! recognized too, and records whose dates cannot be parsed are kept aside
//! (not charted, but saved back) instead of failing the whole load.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::model::task::next_free_id;
use crate::model::{Group, Milestone, Project, Rgb, Task, TaskStatus, Workspace};
use crate::timeline::date_math::parse_local_date;

pub const FORMAT_VERSION: &str = "3.0";

/// Name given to projects whose file did not name them.
pub const UNTITLED: &str = "Untitled";

/// How a loaded document is merged into the open workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Discard everything open and take the file's projects.
    #[default]
    ReplaceAll,
    /// Add the file's projects after the open ones.
    Append,
    /// Replace the active project with the file's single project. Files with
    /// several projects are appended instead.
    IntoActive,
}

/// Which layout a file was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    Workspace,
    SingleProject,
    ProjectList,
}

/// A parsed file, not yet merged into a workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    pub shape: DocumentShape,
    /// Projects the file did not name have an empty name here.
    pub projects: Vec<Project>,
    pub active: usize,
    /// `autoSaveTimestamp` or `exportDate`, when present.
    pub saved_at: Option<DateTime<Utc>>,
    /// Tasks and milestones set aside because of unusable dates. They stay in
    /// their project's `unparsed_*` lists and are saved back unchanged.
    pub skipped: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkspaceDocument {
    projects: Vec<Value>,
    active_project_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    export_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auto_save_timestamp: Option<String>,
    version: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stamp {
    Export,
    Autosave,
}

pub(crate) fn to_json(
    workspace: &Workspace,
    stamp: Stamp,
    now: DateTime<Utc>,
) -> Result<String, StoreError> {
    let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let (export_date, auto_save_timestamp) = match stamp {
        Stamp::Export => (Some(timestamp), None),
        Stamp::Autosave => (None, Some(timestamp)),
    };
    let projects = workspace
        .projects()
        .iter()
        .map(project_value)
        .collect::<Result<Vec<_>, _>>()?;
    let doc = WorkspaceDocument {
        projects,
        active_project_index: workspace.active_index(),
        export_date,
        auto_save_timestamp,
        version: FORMAT_VERSION,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// A project as written to disk, with its unreadable records appended back
/// into `tasks` and `milestones` as they were loaded.
fn project_value(project: &Project) -> Result<Value, StoreError> {
    let mut value = serde_json::to_value(project)?;
    for (key, raw) in [
        ("tasks", &project.unparsed_tasks),
        ("milestones", &project.unparsed_milestones),
    ] {
        if let Some(Value::Array(records)) = value.get_mut(key) {
            records.extend(raw.iter().cloned());
        }
    }
    Ok(value)
}

/// Write the whole workspace to a JSON file.
pub fn save_workspace(workspace: &Workspace, path: &Path) -> Result<(), StoreError> {
    let json = to_json(workspace, Stamp::Export, Utc::now())?;
    std::fs::write(path, json).map_err(|e| StoreError::io(path, e))?;
    info!(path = %path.display(), projects = workspace.len(), "workspace saved");
    Ok(())
}

/// Default file name for a manual save, e.g. `gantt_data_2025-01-31.json`.
pub fn suggested_file_name(today: chrono::NaiveDate) -> String {
    format!("gantt_data_{}.json", today.format("%Y-%m-%d"))
}

pub fn load_document(path: &Path) -> Result<LoadedDocument, StoreError> {
    let json = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let doc = parse_document(&json)?;
    info!(
        path = %path.display(),
        shape = ?doc.shape,
        projects = doc.projects.len(),
        skipped = doc.skipped,
        "document loaded"
    );
    Ok(doc)
}

pub fn parse_document(json: &str) -> Result<LoadedDocument, StoreError> {
    let value: Value = serde_json::from_str(json)?;
    let shape = detect_shape(&value).ok_or(StoreError::UnrecognizedFormat)?;

    let saved_at = ["autoSaveTimestamp", "exportDate"]
        .iter()
        .filter_map(|key| value.get(key).and_then(Value::as_str))
        .find_map(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    let (records, active): (Vec<ProjectRecord>, usize) = match shape {
        DocumentShape::Workspace => {
            let active = value
                .get("activeProjectIndex")
                .and_then(Value::as_u64)
                .unwrap_or(0) as usize;
            let projects = value.get("projects").cloned().unwrap_or(Value::Null);
            (serde_json::from_value(projects)?, active)
        }
        DocumentShape::SingleProject => (vec![serde_json::from_value(value)?], 0),
        DocumentShape::ProjectList => (serde_json::from_value(value)?, 0),
    };

    let mut skipped = 0;
    let projects: Vec<Project> = records
        .into_iter()
        .map(|record| {
            let (project, dropped) = record.into_project();
            skipped += dropped;
            project
        })
        .collect();
    let active = active.min(projects.len().saturating_sub(1));

    Ok(LoadedDocument {
        shape,
        projects,
        active,
        saved_at,
        skipped,
    })
}

fn detect_shape(value: &Value) -> Option<DocumentShape> {
    match value {
        Value::Object(map) => {
            if map.get("projects").is_some_and(Value::is_array) {
                Some(DocumentShape::Workspace)
            } else if map.get("tasks").is_some_and(Value::is_array)
                || map.get("groups").is_some_and(Value::is_object)
            {
                Some(DocumentShape::SingleProject)
            } else {
                None
            }
        }
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
            Some(DocumentShape::ProjectList)
        }
        _ => None,
    }
}

fn untitled_if_blank(project: &mut Project, fallback: &str) {
    if project.name.trim().is_empty() {
        project.name = fallback.to_string();
    }
}

/// Merge a loaded document into the workspace. Returns how many projects
/// were taken from the document.
pub fn apply_document(workspace: &mut Workspace, doc: LoadedDocument, mode: LoadMode) -> usize {
    let LoadedDocument {
        shape,
        mut projects,
        active,
        ..
    } = doc;
    let count = projects.len();

    match mode {
        LoadMode::IntoActive if count == 1 => {
            let current = workspace.active().name.clone();
            let mut project = projects.remove(0);
            untitled_if_blank(&mut project, &current);
            workspace.replace_active(project);
        }
        LoadMode::ReplaceAll => {
            for p in &mut projects {
                untitled_if_blank(p, UNTITLED);
            }
            let active = if shape == DocumentShape::Workspace { active } else { 0 };
            *workspace = Workspace::from_projects(projects, active);
        }
        LoadMode::Append | LoadMode::IntoActive => {
            for p in &mut projects {
                untitled_if_blank(p, UNTITLED);
            }
            workspace.append_projects(projects);
        }
    }
    count
}

// --- lenient records ---

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectRecord {
    name: Option<String>,
    tasks: Vec<Value>,
    milestones: Vec<Value>,
    groups: BTreeMap<String, GroupRecord>,
    group_states: BTreeMap<String, bool>,
    group_order: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TaskRecord {
    id: Option<i64>,
    name: String,
    group: String,
    start_date: String,
    end_date: String,
    color: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MilestoneRecord {
    id: Option<i64>,
    name: String,
    date: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GroupRecord {
    color: Option<String>,
    status: Option<String>,
}

fn parse_status(raw: Option<&str>) -> TaskStatus {
    raw.and_then(TaskStatus::from_label).unwrap_or_default()
}

fn parse_color(raw: Option<&str>, fallback: Rgb) -> Rgb {
    raw.and_then(|s| s.parse().ok()).unwrap_or(fallback)
}

/// A record that failed to parse keeps its raw form so it can be written back.
fn read_record<T: serde::de::DeserializeOwned>(raw: &Value) -> Option<T> {
    serde_json::from_value(raw.clone()).ok()
}

fn raw_id(raw: &Value) -> Option<i64> {
    raw.get("id").and_then(Value::as_i64)
}

impl ProjectRecord {
    /// Build a healed project. Also returns the number of records set aside.
    fn into_project(self) -> (Project, usize) {
        let name = self.name.unwrap_or_default().trim().to_string();

        let mut tasks = Vec::with_capacity(self.tasks.len());
        let mut unparsed_tasks = Vec::new();
        let mut missing_ids = Vec::new();
        for raw in self.tasks {
            let parsed = read_record::<TaskRecord>(&raw).and_then(|record| {
                let dates = parse_local_date(&record.start_date)
                    .zip(parse_local_date(&record.end_date))
                    .filter(|(s, e)| s <= e);
                if dates.is_none() {
                    warn!(
                        task = %record.name,
                        start = %record.start_date,
                        end = %record.end_date,
                        "task with unusable dates kept out of the chart"
                    );
                }
                dates.map(|dates| (record, dates))
            });
            let Some((record, (start, end))) = parsed else {
                unparsed_tasks.push(raw);
                continue;
            };
            let status = parse_status(record.status.as_deref());
            if record.id.is_none() {
                missing_ids.push(tasks.len());
            }
            tasks.push(Task {
                id: record.id.unwrap_or(0),
                name: record.name,
                group: record.group,
                start_date: start,
                end_date: end,
                color: parse_color(record.color.as_deref(), status.color()),
                status,
            });
        }
        let mut used: BTreeSet<i64> = tasks
            .iter()
            .filter(|t| t.id != 0)
            .map(|t| t.id)
            .chain(unparsed_tasks.iter().filter_map(raw_id))
            .collect();
        for index in missing_ids {
            let id = next_free_id(&used);
            used.insert(id);
            tasks[index].id = id;
        }

        let mut milestones = Vec::with_capacity(self.milestones.len());
        let mut unparsed_milestones = Vec::new();
        for raw in self.milestones {
            let parsed = read_record::<MilestoneRecord>(&raw)
                .and_then(|record| parse_local_date(&record.date).map(|date| (record, date)));
            let Some((record, date)) = parsed else {
                warn!(record = %raw, "milestone with unusable date kept out of the chart");
                unparsed_milestones.push(raw);
                continue;
            };
            milestones.push(Milestone::new(record.id.unwrap_or(0), record.name, date));
        }
        let mut used: BTreeSet<i64> = milestones
            .iter()
            .map(|m| m.id)
            .filter(|&id| id != 0)
            .chain(unparsed_milestones.iter().filter_map(raw_id))
            .collect();
        for milestone in milestones.iter_mut().filter(|m| m.id == 0) {
            milestone.id = next_free_id(&used);
            used.insert(milestone.id);
        }
        let skipped = unparsed_tasks.len() + unparsed_milestones.len();

        let groups: BTreeMap<String, Group> = self
            .groups
            .into_iter()
            .map(|(key, record)| {
                let status = parse_status(record.status.as_deref());
                let group = Group {
                    name: key.clone(),
                    color: parse_color(record.color.as_deref(), status.color()),
                    status,
                };
                (key, group)
            })
            .collect();
        let group_order = self
            .group_order
            .unwrap_or_else(|| groups.keys().cloned().collect());

        let mut project = Project {
            name,
            tasks,
            milestones,
            groups,
            group_states: self.group_states,
            group_order,
            unparsed_tasks,
            unparsed_milestones,
        };
        project.heal();
        (project, skipped)
    }
}
