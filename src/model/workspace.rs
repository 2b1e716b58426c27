use tracing::info;

use super::project::Project;
use crate::error::ProjectError;

/// All open projects, one of which is being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    projects: Vec<Project>,
    active: usize,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            projects: vec![Project::default()],
            active: 0,
        }
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from loaded projects. An empty list yields the default
    /// workspace; the active index is clamped into range.
    pub fn from_projects(projects: Vec<Project>, active: usize) -> Self {
        if projects.is_empty() {
            return Self::default();
        }
        let active = active.min(projects.len() - 1);
        Self { projects, active }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &Project {
        &self.projects[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Project {
        &mut self.projects[self.active]
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Always false: a workspace keeps at least one project.
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    fn check_index(&self, index: usize) -> Result<(), ProjectError> {
        if index < self.projects.len() {
            Ok(())
        } else {
            Err(ProjectError::ProjectNotFound(index))
        }
    }

    /// Append an empty `Project N` and make it active.
    pub fn add_project(&mut self) -> usize {
        let name = format!("Project {}", self.projects.len() + 1);
        info!(project = %name, "project added");
        self.projects.push(Project::new(name));
        self.active = self.projects.len() - 1;
        self.active
    }

    pub fn switch_to(&mut self, index: usize) -> Result<(), ProjectError> {
        self.check_index(index)?;
        self.active = index;
        Ok(())
    }

    /// Remove a project. Deleting the only project leaves a fresh empty one.
    pub fn delete_project(&mut self, index: usize) -> Result<Project, ProjectError> {
        self.check_index(index)?;
        if self.projects.len() == 1 {
            let removed = std::mem::take(&mut self.projects[0]);
            self.active = 0;
            info!(project = %removed.name, "last project deleted, starting fresh");
            return Ok(removed);
        }

        let removed = self.projects.remove(index);
        if self.active > index || (self.active == index && self.active > 0) {
            self.active -= 1;
        }
        info!(project = %removed.name, "project deleted");
        Ok(removed)
    }

    pub fn rename_project(&mut self, index: usize, name: &str) -> Result<(), ProjectError> {
        self.check_index(index)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ProjectError::EmptyName);
        }
        self.projects[index].name = name.to_string();
        Ok(())
    }

    /// Copy a project, insert it right after the source and make it active.
    pub fn duplicate_project(&mut self, index: usize) -> Result<usize, ProjectError> {
        self.check_index(index)?;
        let mut copy = self.projects[index].clone();
        let base = format!("{} (copy)", copy.name);
        let mut name = base.clone();
        let mut n = 2;
        while self.projects.iter().any(|p| p.name == name) {
            name = format!("{base} {n}");
            n += 1;
        }
        info!(source = %copy.name, project = %name, "project duplicated");
        copy.name = name;
        self.projects.insert(index + 1, copy);
        self.active = index + 1;
        Ok(self.active)
    }

    /// Add projects at the end, keeping the current one active.
    pub fn append_projects(&mut self, projects: impl IntoIterator<Item = Project>) -> usize {
        let before = self.projects.len();
        self.projects.extend(projects);
        self.projects.len() - before
    }

    pub fn replace_active(&mut self, project: Project) {
        self.projects[self.active] = project;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(ws: &Workspace) -> Vec<&str> {
        ws.projects().iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn starts_with_one_project() {
        let ws = Workspace::new();
        assert_eq!(names(&ws), vec!["Project 1"]);
        assert_eq!(ws.active_index(), 0);
    }

    #[test]
    fn added_projects_become_active() {
        let mut ws = Workspace::new();
        assert_eq!(ws.add_project(), 1);
        assert_eq!(ws.active().name, "Project 2");
        ws.switch_to(0).unwrap();
        assert_eq!(ws.active().name, "Project 1");
        assert_eq!(ws.switch_to(5), Err(ProjectError::ProjectNotFound(5)));
    }

    #[test]
    fn deleting_adjusts_the_active_index() {
        let mut ws = Workspace::new();
        ws.add_project();
        ws.add_project();
        ws.switch_to(2).unwrap();
        ws.delete_project(0).unwrap();
        assert_eq!(ws.active().name, "Project 3");
        assert_eq!(ws.active_index(), 1);

        ws.delete_project(1).unwrap();
        assert_eq!(ws.active_index(), 0);
        assert_eq!(names(&ws), vec!["Project 2"]);
    }

    #[test]
    fn deleting_the_last_project_leaves_an_empty_one() {
        let mut ws = Workspace::new();
        ws.active_mut().add_milestone("m", chrono::NaiveDate::MIN).unwrap();
        ws.rename_project(0, "Roadmap").unwrap();
        let removed = ws.delete_project(0).unwrap();
        assert_eq!(removed.name, "Roadmap");
        assert_eq!(ws.len(), 1);
        assert_eq!(ws.active(), &Project::default());
    }

    #[test]
    fn rename_requires_a_name() {
        let mut ws = Workspace::new();
        assert_eq!(ws.rename_project(0, "  "), Err(ProjectError::EmptyName));
        ws.rename_project(0, "  Roadmap ").unwrap();
        assert_eq!(ws.active().name, "Roadmap");
    }

    #[test]
    fn duplicates_get_unique_names() {
        let mut ws = Workspace::new();
        ws.rename_project(0, "Plan").unwrap();
        assert_eq!(ws.duplicate_project(0), Ok(1));
        ws.duplicate_project(0).unwrap();
        assert_eq!(names(&ws), vec!["Plan", "Plan (copy) 2", "Plan (copy)"]);
        assert_eq!(ws.active_index(), 1);
    }

    #[test]
    fn from_projects_clamps_the_active_index() {
        let ws = Workspace::from_projects(vec![Project::new("a"), Project::new("b")], 9);
        assert_eq!(ws.active().name, "b");
        assert_eq!(Workspace::from_projects(Vec::new(), 0), Workspace::new());
    }
}
