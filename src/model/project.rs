use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::color::Rgb;
use super::status::TaskStatus;
use super::task::{next_free_id, Group, Milestone, Task, TaskId};
use crate::error::ProjectError;
use crate::timeline::bounds::{resolve_bounds, ChartBounds};
use crate::timeline::status::derive_group_status;

/// Group assigned to tasks created without one.
pub const UNGROUPED: &str = "Ungrouped";

/// Input for [`Project::add_task`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub name: String,
    pub group: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub status: TaskStatus,
}

/// One chart: tasks grouped into collapsible rows, plus milestones.
///
/// Groups are kept consistent with the tasks by every mutation here: a group
/// exists while a task references it (or until it is deleted explicitly),
/// `group_order` and `group_states` always cover exactly the group keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub groups: BTreeMap<String, Group>,
    /// Expanded (`true`) or collapsed, per group.
    #[serde(default)]
    pub group_states: BTreeMap<String, bool>,
    #[serde(default)]
    pub group_order: Vec<String>,
    /// Task records from a loaded file whose dates could not be read. They
    /// are not charted, but saving writes them back untouched.
    #[serde(skip)]
    pub unparsed_tasks: Vec<Value>,
    #[serde(skip)]
    pub unparsed_milestones: Vec<Value>,
}

impl Default for Project {
    fn default() -> Self {
        Self::new("Project 1")
    }
}

fn required_name(raw: &str) -> Result<String, ProjectError> {
    let name = raw.trim();
    if name.is_empty() {
        Err(ProjectError::EmptyName)
    } else {
        Ok(name.to_string())
    }
}

fn group_name(raw: &str) -> String {
    let name = raw.trim();
    if name.is_empty() {
        UNGROUPED.to_string()
    } else {
        name.to_string()
    }
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: Vec::new(),
            milestones: Vec::new(),
            groups: BTreeMap::new(),
            group_states: BTreeMap::new(),
            group_order: Vec::new(),
            unparsed_tasks: Vec::new(),
            unparsed_milestones: Vec::new(),
        }
    }

    // --- queries ---

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn task_mut(&mut self, id: TaskId) -> Result<&mut Task, ProjectError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ProjectError::TaskNotFound(id))
    }

    pub fn tasks_in_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Task> + 'a {
        self.tasks.iter().filter(move |t| t.group == group)
    }

    /// Groups in display order.
    pub fn ordered_groups(&self) -> impl Iterator<Item = &Group> + '_ {
        self.group_order.iter().filter_map(|name| self.groups.get(name))
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.group_order.iter().map(String::as_str).collect()
    }

    pub fn is_expanded(&self, group: &str) -> bool {
        self.group_states.get(group).copied().unwrap_or(true)
    }

    /// Earliest start and latest end of the group's tasks, for its aggregate bar.
    pub fn group_date_range(&self, group: &str) -> Option<(NaiveDate, NaiveDate)> {
        self.tasks_in_group(group)
            .fold(None, |acc, t| match acc {
                None => Some((t.start_date, t.end_date)),
                Some((lo, hi)) => Some((t.start_date.min(lo), t.end_date.max(hi))),
            })
    }

    pub fn bounds(&self) -> Option<ChartBounds> {
        resolve_bounds(&self.tasks, &self.milestones)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
            && self.milestones.is_empty()
            && self.groups.is_empty()
            && self.unparsed_tasks.is_empty()
            && self.unparsed_milestones.is_empty()
    }

    fn next_task_id(&self) -> TaskId {
        let used: BTreeSet<TaskId> = self.tasks.iter().map(|t| t.id).collect();
        let now = Utc::now().timestamp_millis();
        match used.last() {
            Some(&max) if max >= now => next_free_id(&used),
            _ => now,
        }
    }

    // --- group bookkeeping ---

    fn ensure_group(&mut self, name: &str, color: Rgb) {
        if self.groups.contains_key(name) {
            return;
        }
        debug!(group = name, "group created");
        self.groups.insert(name.to_string(), Group::new(name, color));
        self.group_states.insert(name.to_string(), true);
        self.group_order.push(name.to_string());
    }

    fn remove_group_entry(&mut self, name: &str) {
        self.groups.remove(name);
        self.group_states.remove(name);
        self.group_order.retain(|g| g != name);
    }

    /// Re-derive a group's status from its tasks. Empty groups keep theirs.
    fn refresh_group_status(&mut self, name: &str) {
        let Some(derived) = derive_group_status(&self.tasks, name) else {
            return;
        };
        if let Some(group) = self.groups.get_mut(name) {
            if group.status != derived {
                debug!(group = name, status = %derived, "group status derived");
                group.status = derived;
                group.color = derived.color();
            }
        }
    }

    fn drop_or_refresh_group(&mut self, name: &str) {
        if self.tasks.iter().any(|t| t.group == name) {
            self.refresh_group_status(name);
        } else {
            debug!(group = name, "removing emptied group");
            self.remove_group_entry(name);
        }
    }

    // --- tasks ---

    pub fn add_task(&mut self, new: NewTask) -> Result<TaskId, ProjectError> {
        let name = required_name(&new.name)?;
        if new.start > new.end {
            return Err(ProjectError::InvertedRange {
                start: new.start,
                end: new.end,
            });
        }
        let group = group_name(&new.group);
        let id = self.next_task_id();
        let color = new.status.color();
        self.tasks.push(Task {
            id,
            name,
            group: group.clone(),
            start_date: new.start,
            end_date: new.end,
            color,
            status: new.status,
        });
        self.ensure_group(&group, color);
        self.refresh_group_status(&group);
        info!(task_id = id, group = %group, "task added");
        Ok(id)
    }

    /// Add many tasks at once, skipping invalid ones. Returns how many were added.
    pub fn import_tasks(&mut self, rows: impl IntoIterator<Item = NewTask>) -> usize {
        let mut added = 0;
        for row in rows {
            match self.add_task(row) {
                Ok(_) => added += 1,
                Err(err) => warn!(error = %err, "skipping imported task"),
            }
        }
        added
    }

    pub fn update_task_dates(
        &mut self,
        id: TaskId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(), ProjectError> {
        if start > end {
            return Err(ProjectError::InvertedRange { start, end });
        }
        let task = self.task_mut(id)?;
        task.start_date = start;
        task.end_date = end;
        info!(task_id = id, %start, %end, "task dates updated");
        Ok(())
    }

    pub fn set_task_start(&mut self, id: TaskId, start: NaiveDate) -> Result<(), ProjectError> {
        let end = self.task(id).ok_or(ProjectError::TaskNotFound(id))?.end_date;
        self.update_task_dates(id, start, end)
    }

    pub fn set_task_end(&mut self, id: TaskId, end: NaiveDate) -> Result<(), ProjectError> {
        let start = self.task(id).ok_or(ProjectError::TaskNotFound(id))?.start_date;
        self.update_task_dates(id, start, end)
    }

    pub fn rename_task(&mut self, id: TaskId, name: &str) -> Result<(), ProjectError> {
        let name = required_name(name)?;
        self.task_mut(id)?.name = name;
        Ok(())
    }

    /// Set a task's status; its color follows and its group is re-derived.
    pub fn set_task_status(&mut self, id: TaskId, status: TaskStatus) -> Result<(), ProjectError> {
        let task = self.task_mut(id)?;
        task.status = status;
        task.color = status.color();
        let group = task.group.clone();
        self.refresh_group_status(&group);
        info!(task_id = id, %status, "task status changed");
        Ok(())
    }

    pub fn set_task_color(&mut self, id: TaskId, color: Rgb) -> Result<(), ProjectError> {
        self.task_mut(id)?.color = color;
        Ok(())
    }

    pub fn move_task_to_group(&mut self, id: TaskId, group: &str) -> Result<(), ProjectError> {
        let new_group = group_name(group);
        let task = self.task_mut(id)?;
        if task.group == new_group {
            return Ok(());
        }
        let old_group = std::mem::replace(&mut task.group, new_group.clone());
        let color = task.color;

        self.ensure_group(&new_group, color);
        self.drop_or_refresh_group(&old_group);
        self.refresh_group_status(&new_group);
        info!(task_id = id, from = %old_group, to = %new_group, "task moved");
        Ok(())
    }

    pub fn delete_task(&mut self, id: TaskId) -> Result<Task, ProjectError> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(ProjectError::TaskNotFound(id))?;
        let task = self.tasks.remove(index);
        self.drop_or_refresh_group(&task.group);
        info!(task_id = id, "task deleted");
        Ok(task)
    }

    /// Drop `dragged` onto `target`: within a group the task takes the
    /// target's place, across groups it joins the target's group.
    pub fn reorder_task(&mut self, dragged: TaskId, target: TaskId) -> Result<(), ProjectError> {
        if dragged == target {
            return Ok(());
        }
        let target_group = self
            .task(target)
            .ok_or(ProjectError::TaskNotFound(target))?
            .group
            .clone();
        let from = self
            .tasks
            .iter()
            .position(|t| t.id == dragged)
            .ok_or(ProjectError::TaskNotFound(dragged))?;
        if self.tasks[from].group != target_group {
            return self.move_task_to_group(dragged, &target_group);
        }

        let to = self
            .tasks
            .iter()
            .position(|t| t.id == target)
            .unwrap_or(self.tasks.len());
        let moved = self.tasks.remove(from);
        self.tasks.insert(to.min(self.tasks.len()), moved);
        Ok(())
    }

    // --- groups ---

    /// Delete a group together with its tasks. Returns how many tasks went.
    pub fn delete_group(&mut self, name: &str) -> Result<usize, ProjectError> {
        if !self.groups.contains_key(name) {
            return Err(ProjectError::GroupNotFound(name.to_string()));
        }
        let before = self.tasks.len();
        self.tasks.retain(|t| t.group != name);
        self.remove_group_entry(name);
        let removed = before - self.tasks.len();
        info!(group = name, tasks = removed, "group deleted");
        Ok(removed)
    }

    pub fn rename_group(&mut self, old: &str, new: &str) -> Result<(), ProjectError> {
        let new = required_name(new)?;
        if !self.groups.contains_key(old) {
            return Err(ProjectError::GroupNotFound(old.to_string()));
        }
        if new == old {
            return Ok(());
        }
        if self.groups.contains_key(&new) {
            return Err(ProjectError::GroupExists(new));
        }

        if let Some(mut group) = self.groups.remove(old) {
            group.name = new.clone();
            self.groups.insert(new.clone(), group);
        }
        let expanded = self.group_states.remove(old).unwrap_or(true);
        self.group_states.insert(new.clone(), expanded);
        for slot in self.group_order.iter_mut().filter(|g| g.as_str() == old) {
            *slot = new.clone();
        }
        for task in self.tasks.iter_mut().filter(|t| t.group == old) {
            task.group = new.clone();
        }
        info!(from = old, to = %new, "group renamed");
        Ok(())
    }

    fn group_mut(&mut self, name: &str) -> Result<&mut Group, ProjectError> {
        self.groups
            .get_mut(name)
            .ok_or_else(|| ProjectError::GroupNotFound(name.to_string()))
    }

    /// Manual status override; the color follows the status.
    pub fn set_group_status(&mut self, name: &str, status: TaskStatus) -> Result<(), ProjectError> {
        let group = self.group_mut(name)?;
        group.status = status;
        group.color = status.color();
        info!(group = name, %status, "group status set");
        Ok(())
    }

    pub fn set_group_color(&mut self, name: &str, color: Rgb) -> Result<(), ProjectError> {
        self.group_mut(name)?.color = color;
        Ok(())
    }

    /// Paint every task of the group. Returns how many tasks changed.
    pub fn apply_color_to_group_tasks(&mut self, name: &str, color: Rgb) -> Result<usize, ProjectError> {
        if !self.groups.contains_key(name) {
            return Err(ProjectError::GroupNotFound(name.to_string()));
        }
        let mut count = 0;
        for task in self.tasks.iter_mut().filter(|t| t.group == name) {
            task.color = color;
            count += 1;
        }
        Ok(count)
    }

    pub fn toggle_group(&mut self, name: &str) -> Result<bool, ProjectError> {
        if !self.groups.contains_key(name) {
            return Err(ProjectError::GroupNotFound(name.to_string()));
        }
        let state = self.group_states.entry(name.to_string()).or_insert(true);
        *state = !*state;
        Ok(*state)
    }

    /// Collapse everything when all groups are expanded, otherwise expand
    /// everything. Returns the new state.
    pub fn toggle_all_groups(&mut self) -> bool {
        let all_expanded = self.group_states.values().all(|expanded| *expanded);
        let next = !all_expanded;
        for state in self.group_states.values_mut() {
            *state = next;
        }
        next
    }

    /// Move `dragged` to the position `target` held.
    pub fn reorder_group(&mut self, dragged: &str, target: &str) -> Result<(), ProjectError> {
        let from = self
            .group_order
            .iter()
            .position(|g| g == dragged)
            .ok_or_else(|| ProjectError::GroupNotFound(dragged.to_string()))?;
        let to = self
            .group_order
            .iter()
            .position(|g| g == target)
            .ok_or_else(|| ProjectError::GroupNotFound(target.to_string()))?;
        let moved = self.group_order.remove(from);
        self.group_order.insert(to.min(self.group_order.len()), moved);
        Ok(())
    }

    // --- milestones ---

    pub fn add_milestone(&mut self, name: &str, date: NaiveDate) -> Result<i64, ProjectError> {
        let name = required_name(name)?;
        let used: BTreeSet<i64> = self.milestones.iter().map(|m| m.id).collect();
        let id = next_free_id(&used);
        self.milestones.push(Milestone::new(id, name, date));
        info!(milestone_id = id, %date, "milestone added");
        Ok(id)
    }

    pub fn update_milestone(&mut self, id: i64, name: &str, date: NaiveDate) -> Result<(), ProjectError> {
        let name = required_name(name)?;
        let milestone = self
            .milestones
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(ProjectError::MilestoneNotFound(id))?;
        milestone.name = name;
        milestone.date = date;
        Ok(())
    }

    pub fn delete_milestone(&mut self, id: i64) -> Result<Milestone, ProjectError> {
        let index = self
            .milestones
            .iter()
            .position(|m| m.id == id)
            .ok_or(ProjectError::MilestoneNotFound(id))?;
        Ok(self.milestones.remove(index))
    }

    // --- loading ---

    /// Repair a project read from disk so the group invariants hold again.
    pub fn heal(&mut self) {
        for task in &mut self.tasks {
            if task.group.trim().is_empty() {
                task.group = UNGROUPED.to_string();
            }
        }
        let referenced: Vec<(String, Rgb)> = self
            .tasks
            .iter()
            .map(|t| (t.group.clone(), t.color))
            .collect();
        for (name, color) in referenced {
            if !self.groups.contains_key(&name) {
                self.groups.insert(name.clone(), Group::new(name.as_str(), color));
            }
        }
        for (key, group) in self.groups.iter_mut() {
            if group.name != *key {
                group.name = key.clone();
            }
        }

        let mut seen = Vec::with_capacity(self.groups.len());
        for name in std::mem::take(&mut self.group_order) {
            if self.groups.contains_key(&name) && !seen.contains(&name) {
                seen.push(name);
            }
        }
        for name in self.groups.keys() {
            if !seen.contains(name) {
                seen.push(name.clone());
            }
        }
        self.group_order = seen;

        let groups = &self.groups;
        self.group_states.retain(|name, _| groups.contains_key(name));
        for name in self.groups.keys() {
            self.group_states.entry(name.clone()).or_insert(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_task(name: &str, group: &str, status: TaskStatus) -> NewTask {
        NewTask {
            name: name.to_string(),
            group: group.to_string(),
            start: date(2025, 1, 10),
            end: date(2025, 1, 20),
            status,
        }
    }

    #[test]
    fn adding_a_task_creates_its_group() {
        let mut p = Project::new("Demo");
        let id = p
            .add_task(new_task("Design", "Phase 1", TaskStatus::InProgress))
            .unwrap();
        assert_eq!(p.task(id).unwrap().color, TaskStatus::InProgress.color());
        assert_eq!(p.group_order, vec!["Phase 1".to_string()]);
        assert!(p.is_expanded("Phase 1"));
        assert_eq!(p.groups["Phase 1"].status, TaskStatus::InProgress);
    }

    #[test]
    fn blank_group_becomes_ungrouped() {
        let mut p = Project::default();
        p.add_task(new_task("a", "   ", TaskStatus::NotStarted)).unwrap();
        assert_eq!(p.group_names(), vec![UNGROUPED]);
    }

    #[test]
    fn invalid_new_tasks_are_rejected() {
        let mut p = Project::default();
        assert_eq!(
            p.add_task(new_task("  ", "g", TaskStatus::NotStarted)),
            Err(ProjectError::EmptyName)
        );
        let mut inverted = new_task("a", "g", TaskStatus::NotStarted);
        inverted.start = date(2025, 2, 1);
        assert!(matches!(
            p.add_task(inverted),
            Err(ProjectError::InvertedRange { .. })
        ));
        assert!(p.is_empty());
    }

    #[test]
    fn task_ids_are_unique() {
        let mut p = Project::default();
        let ids: Vec<_> = (0..20)
            .map(|i| {
                p.add_task(new_task(&format!("t{i}"), "g", TaskStatus::NotStarted))
                    .unwrap()
            })
            .collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
    }

    #[test]
    fn status_change_rederives_group() {
        let mut p = Project::default();
        let a = p.add_task(new_task("a", "g", TaskStatus::Completed)).unwrap();
        let b = p.add_task(new_task("b", "g", TaskStatus::Completed)).unwrap();
        assert_eq!(p.groups["g"].status, TaskStatus::Completed);

        p.set_task_status(b, TaskStatus::Blocked).unwrap();
        assert_eq!(p.groups["g"].status, TaskStatus::Blocked);
        assert_eq!(p.groups["g"].color, TaskStatus::Blocked.color());
        assert_eq!(p.task(b).unwrap().color, TaskStatus::Blocked.color());

        p.delete_task(b).unwrap();
        assert_eq!(p.groups["g"].status, TaskStatus::Completed);
        assert!(p.task(a).is_some());
    }

    #[test]
    fn moving_the_last_task_out_removes_the_group() {
        let mut p = Project::default();
        let id = p.add_task(new_task("a", "Old", TaskStatus::Delayed)).unwrap();
        p.move_task_to_group(id, "New").unwrap();
        assert!(!p.groups.contains_key("Old"));
        assert!(!p.group_states.contains_key("Old"));
        assert_eq!(p.group_order, vec!["New".to_string()]);
        assert_eq!(p.groups["New"].status, TaskStatus::Delayed);
    }

    #[test]
    fn deleting_the_last_task_removes_the_group() {
        let mut p = Project::default();
        let id = p.add_task(new_task("a", "g", TaskStatus::NotStarted)).unwrap();
        let removed = p.delete_task(id).unwrap();
        assert_eq!(removed.name, "a");
        assert!(p.groups.is_empty());
        assert!(p.group_order.is_empty());
        assert_eq!(p.delete_task(id), Err(ProjectError::TaskNotFound(id)));
    }

    #[test]
    fn single_date_edits_cannot_invert() {
        let mut p = Project::default();
        let id = p.add_task(new_task("a", "g", TaskStatus::NotStarted)).unwrap();
        assert!(p.set_task_start(id, date(2025, 1, 21)).is_err());
        assert!(p.set_task_end(id, date(2025, 1, 9)).is_err());
        p.set_task_end(id, date(2025, 1, 10)).unwrap();
        let task = p.task(id).unwrap();
        assert_eq!((task.start_date, task.end_date), (date(2025, 1, 10), date(2025, 1, 10)));
    }

    #[test]
    fn rename_group_carries_tasks_order_and_state() {
        let mut p = Project::default();
        p.add_task(new_task("a", "A", TaskStatus::NotStarted)).unwrap();
        p.add_task(new_task("b", "B", TaskStatus::NotStarted)).unwrap();
        p.toggle_group("A").unwrap();

        assert_eq!(
            p.rename_group("A", "B"),
            Err(ProjectError::GroupExists("B".to_string()))
        );
        assert_eq!(p.rename_group("A", " "), Err(ProjectError::EmptyName));

        p.rename_group("A", "Alpha").unwrap();
        assert_eq!(p.group_order, vec!["Alpha".to_string(), "B".to_string()]);
        assert!(!p.is_expanded("Alpha"));
        assert_eq!(p.groups["Alpha"].name, "Alpha");
        assert_eq!(p.tasks_in_group("Alpha").count(), 1);
    }

    #[test]
    fn toggle_all_collapses_only_when_everything_is_open() {
        let mut p = Project::default();
        p.add_task(new_task("a", "A", TaskStatus::NotStarted)).unwrap();
        p.add_task(new_task("b", "B", TaskStatus::NotStarted)).unwrap();
        assert!(!p.toggle_all_groups());
        assert!(!p.is_expanded("A") && !p.is_expanded("B"));

        p.toggle_group("A").unwrap();
        assert!(p.toggle_all_groups());
        assert!(p.is_expanded("A") && p.is_expanded("B"));
    }

    #[test]
    fn reorder_groups_and_tasks() {
        let mut p = Project::default();
        let a1 = p.add_task(new_task("a1", "A", TaskStatus::NotStarted)).unwrap();
        let a2 = p.add_task(new_task("a2", "A", TaskStatus::NotStarted)).unwrap();
        let b1 = p.add_task(new_task("b1", "B", TaskStatus::InProgress)).unwrap();
        p.add_task(new_task("c1", "C", TaskStatus::NotStarted)).unwrap();

        p.reorder_group("C", "A").unwrap();
        assert_eq!(p.group_names(), vec!["C", "A", "B"]);

        p.reorder_task(a2, a1).unwrap();
        let in_a: Vec<_> = p.tasks_in_group("A").map(|t| t.id).collect();
        assert_eq!(in_a, vec![a2, a1]);
        p.reorder_task(a2, a1).unwrap();
        let in_a: Vec<_> = p.tasks_in_group("A").map(|t| t.id).collect();
        assert_eq!(in_a, vec![a1, a2]);

        p.reorder_task(a1, b1).unwrap();
        assert_eq!(p.task(a1).unwrap().group, "B");
        assert_eq!(p.groups["B"].status, TaskStatus::InProgress);
    }

    #[test]
    fn delete_group_cascades() {
        let mut p = Project::default();
        p.add_task(new_task("a", "A", TaskStatus::NotStarted)).unwrap();
        p.add_task(new_task("b", "A", TaskStatus::NotStarted)).unwrap();
        p.add_task(new_task("c", "B", TaskStatus::NotStarted)).unwrap();
        assert_eq!(p.delete_group("A"), Ok(2));
        assert_eq!(p.tasks.len(), 1);
        assert_eq!(p.group_names(), vec!["B"]);
        assert!(p.delete_group("A").is_err());
    }

    #[test]
    fn manual_group_status_and_colors() {
        let mut p = Project::default();
        p.add_task(new_task("a", "A", TaskStatus::NotStarted)).unwrap();
        p.set_group_status("A", TaskStatus::ActionNeeded).unwrap();
        assert_eq!(p.groups["A"].color, TaskStatus::ActionNeeded.color());

        let teal = Rgb::new(0, 128, 128);
        assert_eq!(p.apply_color_to_group_tasks("A", teal), Ok(1));
        assert!(p.tasks_in_group("A").all(|t| t.color == teal));
        p.set_group_color("A", teal).unwrap();
        assert_eq!(p.groups["A"].color, teal);
    }

    #[test]
    fn group_range_spans_member_tasks() {
        let mut p = Project::default();
        let a = p.add_task(new_task("a", "A", TaskStatus::NotStarted)).unwrap();
        p.add_task(new_task("b", "A", TaskStatus::NotStarted)).unwrap();
        p.update_task_dates(a, date(2025, 1, 2), date(2025, 3, 4)).unwrap();
        assert_eq!(
            p.group_date_range("A"),
            Some((date(2025, 1, 2), date(2025, 3, 4)))
        );
        assert_eq!(p.group_date_range("missing"), None);
    }

    #[test]
    fn milestone_ids_follow_the_maximum() {
        let mut p = Project::default();
        assert_eq!(p.add_milestone("Kickoff", date(2025, 1, 1)), Ok(1));
        assert_eq!(p.add_milestone("Launch", date(2025, 6, 1)), Ok(2));
        p.delete_milestone(1).unwrap();
        assert_eq!(p.add_milestone("Review", date(2025, 3, 1)), Ok(3));
        p.update_milestone(3, "Design review", date(2025, 3, 2)).unwrap();
        assert_eq!(p.milestones[1].name, "Design review");
        assert_eq!(p.add_milestone("", date(2025, 3, 1)), Err(ProjectError::EmptyName));
        assert_eq!(
            p.delete_milestone(99),
            Err(ProjectError::MilestoneNotFound(99))
        );
    }

    #[test]
    fn import_skips_invalid_rows() {
        let mut p = Project::default();
        let mut bad = new_task("bad", "g", TaskStatus::NotStarted);
        bad.end = date(2024, 1, 1);
        let added = p.import_tasks(vec![
            new_task("a", "g", TaskStatus::Blocked),
            bad,
            new_task("b", "", TaskStatus::NotStarted),
        ]);
        assert_eq!(added, 2);
        assert_eq!(p.groups["g"].status, TaskStatus::Blocked);
        assert!(p.groups.contains_key(UNGROUPED));
    }

    #[test]
    fn heal_restores_group_invariants() {
        let mut p = Project::default();
        p.tasks.push(Task::new(1, "a", "Loose", date(2025, 1, 1), date(2025, 1, 2)));
        p.tasks.push(Task::new(2, "b", "", date(2025, 1, 1), date(2025, 1, 2)));
        p.groups
            .insert("Empty".to_string(), Group::new("stale", Rgb::new(1, 2, 3)));
        p.group_order = vec![
            "Ghost".to_string(),
            "Empty".to_string(),
            "Empty".to_string(),
        ];
        p.group_states.insert("Ghost".to_string(), false);

        p.heal();

        assert_eq!(
            p.group_order,
            vec!["Empty".to_string(), "Loose".to_string(), UNGROUPED.to_string()]
        );
        assert_eq!(p.groups["Empty"].name, "Empty");
        assert_eq!(
            p.group_states.keys().cloned().collect::<Vec<_>>(),
            vec!["Empty".to_string(), "Loose".to_string(), UNGROUPED.to_string()]
        );
        assert!(p.group_states.values().all(|s| *s));
    }
}
