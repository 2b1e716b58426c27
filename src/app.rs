use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{Local, NaiveDate};
use gantt_planner::config::{AppDirs, AppSettings};
use gantt_planner::io::{
    self, apply_document, load_document, save_workspace, Autosave, AutosaveTimer, LoadMode,
    LoadedDocument,
};
use gantt_planner::model::{NewTask, TaskId, Workspace};
use gantt_planner::timeline::{GestureCommit, GestureInterpreter};
use gantt_planner::ProjectError;
use tracing::{error, info, warn};

use crate::ui;
use crate::ui::dialogs::{Confirm, Dialog, GroupForm, MilestoneForm, TaskForm};
use crate::ui::gantt_chart::ChartAction;

/// Main application state.
pub struct GanttApp {
    pub workspace: Workspace,
    pub gesture: GestureInterpreter,
    pub selected_task: Option<TaskId>,
    pub file_path: Option<PathBuf>,
    /// Unsaved changes since the last manual save or load.
    pub dirty: bool,
    pub settings: AppSettings,
    pub dialog: Option<Dialog>,

    // Status message
    pub status_message: String,

    dirs: AppDirs,
    autosave: Autosave,
    autosave_timer: AutosaveTimer,
    /// Changes not yet written to the autosave snapshot.
    autosave_pending: bool,
}

impl GanttApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: AppSettings, dirs: AppDirs) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);
        ui::theme::apply_theme(&cc.egui_ctx);

        let autosave = Autosave::new(dirs.autosave_path());
        let dialog = match autosave.read() {
            Ok(Some(doc)) => Some(Dialog::RestoreAutosave(Box::new(doc))),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable autosave");
                None
            }
        };

        Self {
            workspace: Workspace::new(),
            gesture: GestureInterpreter::new(),
            selected_task: None,
            file_path: None,
            dirty: false,
            autosave_timer: AutosaveTimer::new(settings.autosave_interval(), Instant::now()),
            settings,
            dialog,
            status_message: "Ready".to_string(),
            dirs,
            autosave,
            autosave_pending: false,
        }
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    fn mark_changed(&mut self, message: impl Into<String>) {
        self.dirty = true;
        self.autosave_pending = true;
        self.status_message = message.into();
    }

    fn report_error(&mut self, context: &str, err: &dyn std::error::Error) {
        error!(error = %err, "{context}");
        self.status_message = format!("{context}: {err}");
    }

    /// Forget the selection and any drag in flight; used whenever the
    /// visible project is swapped out.
    fn reset_view(&mut self) {
        self.gesture.cancel();
        self.selected_task = None;
    }

    pub fn save_settings(&mut self) {
        if let Err(e) = self.settings.save(&self.dirs.settings_path()) {
            warn!(error = %e, "could not save settings");
        }
    }

    // --- File operations ---

    pub fn open_file(&mut self, mode: LoadMode) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Gantt Workspace", &["json"])
            .pick_file()
        else {
            return;
        };
        match load_document(&path) {
            Ok(doc) => {
                let skipped = doc.skipped;
                let count = apply_document(&mut self.workspace, doc, mode);
                self.reset_view();
                let mut message = format!("Loaded {count} project(s) from {}", display_name(&path));
                if skipped > 0 {
                    message.push_str(&format!(" ({skipped} record(s) with unreadable dates not shown)"));
                }
                if mode == LoadMode::ReplaceAll {
                    self.file_path = Some(path);
                    self.dirty = false;
                    self.autosave_pending = false;
                    self.status_message = message;
                } else {
                    self.mark_changed(message);
                }
            }
            Err(e) => self.report_error("Could not open file", &e),
        }
    }

    pub fn save(&mut self) {
        match self.file_path.clone() {
            Some(path) => self.write_to(path),
            None => self.save_as(),
        }
    }

    pub fn save_as(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Gantt Workspace", &["json"])
            .set_file_name(io::file::suggested_file_name(Self::today()))
            .save_file()
        {
            self.write_to(path);
        }
    }

    fn write_to(&mut self, path: PathBuf) {
        match save_workspace(&self.workspace, &path) {
            Ok(()) => {
                self.status_message = format!("Saved to {}", display_name(&path));
                self.file_path = Some(path);
                self.dirty = false;
                self.autosave_pending = false;
                if let Err(e) = self.autosave.clear() {
                    warn!(error = %e, "could not clear autosave");
                }
            }
            Err(e) => self.report_error("Could not save", &e),
        }
    }

    pub fn import_csv(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv", "txt"])
            .pick_file()
        else {
            return;
        };
        match io::import_csv(&path) {
            Ok(import) => {
                let added = self.workspace.active_mut().import_tasks(import.tasks);
                if import.skipped > 0 {
                    self.mark_changed(format!(
                        "Imported {added} task(s) ({} row(s) skipped)",
                        import.skipped
                    ));
                } else {
                    self.mark_changed(format!("Imported {added} task(s)"));
                }
            }
            Err(e) => self.report_error("CSV import failed", &e),
        }
    }

    pub fn export_csv(&mut self) {
        let project = self.workspace.active();
        if project.tasks.is_empty() {
            self.status_message = "Nothing to export, the project has no tasks".to_string();
            return;
        }
        let file_name = io::csv_export::suggested_file_name(&project.name, Self::today());
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(file_name)
            .save_file()
        else {
            return;
        };
        match io::export_csv(&self.workspace.active().tasks, &path) {
            Ok(count) => self.status_message = format!("Exported {count} task(s) to CSV"),
            Err(e) => self.report_error("CSV export failed", &e),
        }
    }

    pub fn reveal_data_folder(&mut self) {
        let dir = self.dirs.data_dir().to_path_buf();
        if let Err(e) = std::fs::create_dir_all(&dir) {
            self.report_error("Could not create data folder", &e);
            return;
        }
        if let Err(e) = open::that(&dir) {
            self.report_error("Could not open data folder", &e);
        }
    }

    // --- Autosave ---

    fn tick_autosave(&mut self, ctx: &egui::Context) {
        let closing = ctx.input(|i| i.viewport().close_requested());
        if !self.settings.autosave_enabled || !self.autosave_pending {
            return;
        }
        let now = Instant::now();
        if closing || self.autosave_timer.due(now, self.autosave_pending) {
            self.write_autosave();
        } else {
            ctx.request_repaint_after(self.autosave_timer.remaining(now));
        }
    }

    fn write_autosave(&mut self) {
        match self.autosave.write(&self.workspace) {
            Ok(()) => self.autosave_pending = false,
            Err(e) => self.report_error("Autosave failed", &e),
        }
    }

    pub fn restore_autosave(&mut self, doc: LoadedDocument) {
        let count = apply_document(&mut self.workspace, doc, LoadMode::ReplaceAll);
        self.reset_view();
        self.file_path = None;
        self.dirty = true;
        info!(projects = count, "autosave restored");
        self.status_message = format!("Restored {count} project(s) from autosave");
    }

    pub fn discard_autosave(&mut self) {
        match self.autosave.clear() {
            Ok(()) => self.status_message = "Autosave discarded".to_string(),
            Err(e) => self.report_error("Could not discard autosave", &e),
        }
    }

    // --- Projects ---

    pub fn add_project(&mut self) {
        self.workspace.add_project();
        self.reset_view();
        let name = self.workspace.active().name.clone();
        self.mark_changed(format!("Created '{name}'"));
    }

    pub fn switch_project(&mut self, index: usize) {
        match self.workspace.switch_to(index) {
            Ok(()) => {
                self.reset_view();
                // The active index is part of the saved document.
                self.autosave_pending = true;
                self.status_message = format!("Switched to '{}'", self.workspace.active().name);
            }
            Err(e) => self.report_error("Could not switch project", &e),
        }
    }

    pub fn duplicate_project(&mut self, index: usize) {
        match self.workspace.duplicate_project(index) {
            Ok(_) => {
                self.reset_view();
                let name = self.workspace.active().name.clone();
                self.mark_changed(format!("Created '{name}'"));
            }
            Err(e) => self.report_error("Could not duplicate project", &e),
        }
    }

    pub fn rename_project(&mut self, index: usize, name: &str) -> Result<(), ProjectError> {
        self.workspace.rename_project(index, name)?;
        self.mark_changed(format!("Renamed project to '{}'", name.trim()));
        Ok(())
    }

    pub fn toggle_all_groups(&mut self) {
        let expanded = self.workspace.active_mut().toggle_all_groups();
        self.mark_changed(if expanded {
            "Expanded all groups"
        } else {
            "Collapsed all groups"
        });
    }

    // --- Dialog entry points ---

    pub fn open_add_task(&mut self, group: Option<String>) {
        self.dialog = Some(Dialog::Task(TaskForm::create(
            Self::today(),
            self.settings.default_task_days,
            group,
        )));
    }

    pub fn open_add_milestone(&mut self) {
        self.dialog = Some(Dialog::Milestone(MilestoneForm::create(Self::today())));
    }

    pub fn submit_task(&mut self, form: &TaskForm) -> Result<(), ProjectError> {
        if form.start > form.end {
            return Err(ProjectError::InvertedRange {
                start: form.start,
                end: form.end,
            });
        }
        let project = self.workspace.active_mut();
        let Some(id) = form.editing else {
            let id = project.add_task(NewTask {
                name: form.name.clone(),
                group: form.group.clone(),
                start: form.start,
                end: form.end,
                status: form.status,
            })?;
            self.selected_task = Some(id);
            self.mark_changed(format!("Added '{}'", form.name.trim()));
            return Ok(());
        };

        let old_status = project.task(id).ok_or(ProjectError::TaskNotFound(id))?.status;
        project.rename_task(id, &form.name)?;
        project.update_task_dates(id, form.start, form.end)?;
        project.move_task_to_group(id, &form.group)?;
        if form.status != old_status {
            project.set_task_status(id, form.status)?;
        }
        if form.color != form.initial_color {
            let color = ui::theme::from_srgb(form.color);
            project.set_task_color(id, color)?;
            self.settings.remember_color(color);
            self.save_settings();
        }
        self.mark_changed(format!("Updated '{}'", form.name.trim()));
        Ok(())
    }

    pub fn submit_milestone(&mut self, form: &MilestoneForm) -> Result<(), ProjectError> {
        let project = self.workspace.active_mut();
        match form.editing {
            Some(id) => project.update_milestone(id, &form.name, form.date)?,
            None => {
                project.add_milestone(&form.name, form.date)?;
            }
        }
        self.mark_changed(format!("Saved milestone '{}'", form.name.trim()));
        Ok(())
    }

    pub fn submit_group(&mut self, form: &GroupForm) -> Result<(), ProjectError> {
        let project = self.workspace.active_mut();
        project.rename_group(&form.original, &form.name)?;
        let name = form.name.trim().to_string();
        if form.status != form.initial_status {
            project.set_group_status(&name, form.status)?;
        }
        let recolored = form.color != form.initial_color;
        if recolored {
            project.set_group_color(&name, ui::theme::from_srgb(form.color))?;
        }
        if form.apply_to_tasks {
            let color = project
                .groups
                .get(&name)
                .map(|g| g.color)
                .ok_or_else(|| ProjectError::GroupNotFound(name.clone()))?;
            project.apply_color_to_group_tasks(&name, color)?;
        }
        if recolored {
            self.settings.remember_color(ui::theme::from_srgb(form.color));
            self.save_settings();
        }
        self.mark_changed(format!("Updated group '{name}'"));
        Ok(())
    }

    pub fn apply_confirmed(&mut self, confirm: Confirm) {
        let result = match confirm {
            Confirm::NewWorkspace => {
                self.workspace = Workspace::new();
                self.reset_view();
                self.file_path = None;
                self.dirty = false;
                self.autosave_pending = false;
                self.status_message = "New workspace".to_string();
                Ok(())
            }
            Confirm::DeleteTask { id, name } => self
                .workspace
                .active_mut()
                .delete_task(id)
                .map(|_| {
                    if self.selected_task == Some(id) {
                        self.selected_task = None;
                    }
                    format!("Deleted '{name}'")
                })
                .map(|message| self.mark_changed(message)),
            Confirm::DeleteGroup { name, .. } => self
                .workspace
                .active_mut()
                .delete_group(&name)
                .map(|count| self.mark_changed(format!("Deleted group '{name}' ({count} task(s))"))),
            Confirm::DeleteMilestone { id, name } => self
                .workspace
                .active_mut()
                .delete_milestone(id)
                .map(|_| self.mark_changed(format!("Deleted milestone '{name}'"))),
            Confirm::DeleteProject { index, name } => {
                self.reset_view();
                self.workspace
                    .delete_project(index)
                    .map(|_| self.mark_changed(format!("Deleted project '{name}'")))
            }
        };
        if let Err(e) = result {
            self.report_error("Could not delete", &e);
        }
    }

    // --- Chart actions ---

    fn commit_drag(&mut self, commit: GestureCommit) {
        let result = self
            .workspace
            .active_mut()
            .update_task_dates(commit.task_id, commit.start, commit.end);
        match result {
            Ok(()) => {
                let name = self
                    .workspace
                    .active()
                    .task(commit.task_id)
                    .map(|t| t.name.clone())
                    .unwrap_or_default();
                self.mark_changed(format!(
                    "Updated '{name}' ({} → {})",
                    commit.start.format("%Y-%m-%d"),
                    commit.end.format("%Y-%m-%d")
                ));
            }
            Err(e) => self.report_error("Could not move task", &e),
        }
    }

    fn apply_chart_action(&mut self, action: ChartAction) {
        let project = self.workspace.active_mut();
        let result = match action {
            ChartAction::Select(id) => {
                self.selected_task = id;
                Ok(())
            }
            ChartAction::CommitDates(commit) => {
                self.commit_drag(commit);
                Ok(())
            }
            ChartAction::AddTask => {
                self.open_add_task(None);
                Ok(())
            }
            ChartAction::AddTaskToGroup(group) => {
                self.open_add_task(Some(group));
                Ok(())
            }
            ChartAction::EditTask(id) => {
                if let Some(task) = project.task(id) {
                    self.dialog = Some(Dialog::Task(TaskForm::edit(task)));
                }
                self.selected_task = Some(id);
                Ok(())
            }
            ChartAction::DeleteTask(id) => {
                if let Some(task) = project.task(id) {
                    self.dialog = Some(Dialog::Confirm(Confirm::DeleteTask {
                        id,
                        name: task.name.clone(),
                    }));
                }
                Ok(())
            }
            ChartAction::SetTaskStatus(id, status) => project
                .set_task_status(id, status)
                .map(|()| self.mark_changed(format!("Status set to {status}"))),
            ChartAction::ReorderTask { dragged, target } => project
                .reorder_task(dragged, target)
                .map(|()| self.mark_changed("Task moved")),
            ChartAction::ToggleGroup(name) => project.toggle_group(&name).map(|expanded| {
                self.mark_changed(if expanded {
                    format!("Expanded '{name}'")
                } else {
                    format!("Collapsed '{name}'")
                })
            }),
            ChartAction::EditGroup(name) => {
                if let Some(group) = project.groups.get(&name) {
                    self.dialog = Some(Dialog::Group(GroupForm::edit(group)));
                }
                Ok(())
            }
            ChartAction::DeleteGroup(name) => {
                let tasks = project.tasks_in_group(&name).count();
                self.dialog = Some(Dialog::Confirm(Confirm::DeleteGroup { name, tasks }));
                Ok(())
            }
            ChartAction::SetGroupStatus(name, status) => project
                .set_group_status(&name, status)
                .map(|()| self.mark_changed(format!("'{name}' set to {status}"))),
            ChartAction::ReorderGroup { dragged, target } => project
                .reorder_group(&dragged, &target)
                .map(|()| self.mark_changed("Group moved")),
            ChartAction::EditMilestone(id) => {
                if let Some(milestone) = project.milestones.iter().find(|m| m.id == id) {
                    self.dialog = Some(Dialog::Milestone(MilestoneForm::edit(milestone)));
                }
                Ok(())
            }
        };
        if let Err(e) = result {
            self.report_error("Edit rejected", &e);
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl eframe::App for GanttApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle keyboard shortcuts outside closures to avoid borrow issues
        let should_save = ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::S));
        let escape = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        if should_save {
            self.save();
        }
        if escape {
            if let Some(task_id) = self.gesture.cancel() {
                info!(task_id, "drag cancelled");
                self.status_message = "Drag cancelled".to_string();
            }
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });
        egui::TopBottomPanel::top("project_tabs")
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(8.0, 4.0)),
            )
            .show(ctx, |ui| {
                ui::toolbar::show_project_tabs(self, ui);
            });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_STATUS_BAR)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .size(11.0)
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let dim = |text: String| {
                            egui::RichText::new(text).size(10.5).color(ui::theme::TEXT_DIM)
                        };
                        let saved = if self.dirty { "Unsaved changes" } else { "Saved" };
                        ui.label(dim(saved.to_string()));
                        ui.label(dim(" · ".to_string()));
                        let autosave = if self.settings.autosave_enabled { "on" } else { "off" };
                        ui.label(dim(format!("Autosave: {autosave}")));
                        ui.label(dim(" · ".to_string()));
                        ui.label(dim(format!("Tasks: {}", self.workspace.active().tasks.len())));
                        ui.label(dim(" · ".to_string()));
                        ui.label(dim(format!("Projects: {}", self.workspace.len())));
                    });
                });
            });

        // Central panel: Gantt chart
        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let interaction = egui::CentralPanel::default()
            .frame(chart_frame)
            .show(ctx, |ui| {
                ui::gantt_chart::show_gantt_chart(
                    self.workspace.active(),
                    &mut self.gesture,
                    self.selected_task,
                    Self::today(),
                    ui,
                )
            })
            .inner;
        for action in interaction.actions {
            self.apply_chart_action(action);
        }

        ui::dialogs::show_dialogs(self, ctx);

        self.tick_autosave(ctx);
    }
}
