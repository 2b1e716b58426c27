use chrono::{Local, NaiveDate};
use egui::{Color32, Context, RichText, Sense, Ui, Window};
use gantt_planner::io::LoadedDocument;
use gantt_planner::model::{Group, Milestone, Rgb, Task, TaskId, TaskStatus};
use gantt_planner::timeline::date_math::add_days;

use crate::app::GanttApp;
use crate::ui::theme;

/// The modal window currently on screen. Only one is open at a time.
pub enum Dialog {
    Task(TaskForm),
    Milestone(MilestoneForm),
    Group(GroupForm),
    RenameProject { index: usize, name: String, error: Option<String> },
    Confirm(Confirm),
    RestoreAutosave(Box<LoadedDocument>),
    About,
    CsvHelp,
}

/// Destructive actions that need a second click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirm {
    NewWorkspace,
    DeleteTask { id: TaskId, name: String },
    DeleteGroup { name: String, tasks: usize },
    DeleteMilestone { id: i64, name: String },
    DeleteProject { index: usize, name: String },
}

impl Confirm {
    fn message(&self) -> String {
        match self {
            Confirm::NewWorkspace => {
                "Start a new workspace? Unsaved changes in all projects will be lost.".to_string()
            }
            Confirm::DeleteTask { name, .. } => format!("Delete task \"{name}\"?"),
            Confirm::DeleteGroup { name, tasks } => {
                format!("Delete group \"{name}\" and its {tasks} task(s)?")
            }
            Confirm::DeleteMilestone { name, .. } => format!("Delete milestone \"{name}\"?"),
            Confirm::DeleteProject { name, .. } => {
                format!("Delete project \"{name}\" with all its tasks and milestones?")
            }
        }
    }

    fn action_label(&self) -> &'static str {
        match self {
            Confirm::NewWorkspace => "Continue",
            _ => "Delete",
        }
    }
}

impl Dialog {
    pub fn confirm_new_workspace() -> Self {
        Dialog::Confirm(Confirm::NewWorkspace)
    }

    pub fn confirm_delete_project(index: usize, name: &str) -> Self {
        Dialog::Confirm(Confirm::DeleteProject {
            index,
            name: name.to_string(),
        })
    }

    pub fn rename_project(index: usize, name: &str) -> Self {
        Dialog::RenameProject {
            index,
            name: name.to_string(),
            error: None,
        }
    }
}

/// Add or edit a task.
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub editing: Option<TaskId>,
    pub name: String,
    pub group: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub status: TaskStatus,
    pub color: [u8; 3],
    pub initial_color: [u8; 3],
    pub error: Option<String>,
}

impl TaskForm {
    pub fn create(today: NaiveDate, default_days: i64, group: Option<String>) -> Self {
        let color = theme::to_srgb(TaskStatus::NotStarted.color());
        Self {
            editing: None,
            name: String::new(),
            group: group.unwrap_or_default(),
            start: today,
            end: add_days(today, default_days),
            status: TaskStatus::NotStarted,
            color,
            initial_color: color,
            error: None,
        }
    }

    pub fn edit(task: &Task) -> Self {
        let color = theme::to_srgb(task.color);
        Self {
            editing: Some(task.id),
            name: task.name.clone(),
            group: task.group.clone(),
            start: task.start_date,
            end: task.end_date,
            status: task.status,
            color,
            initial_color: color,
            error: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MilestoneForm {
    pub editing: Option<i64>,
    pub name: String,
    pub date: NaiveDate,
    pub error: Option<String>,
}

impl MilestoneForm {
    pub fn create(today: NaiveDate) -> Self {
        Self {
            editing: None,
            name: String::new(),
            date: today,
            error: None,
        }
    }

    pub fn edit(milestone: &Milestone) -> Self {
        Self {
            editing: Some(milestone.id),
            name: milestone.name.clone(),
            date: milestone.date,
            error: None,
        }
    }
}

/// Rename a group, override its status or recolor it.
#[derive(Debug, Clone)]
pub struct GroupForm {
    pub original: String,
    pub name: String,
    pub status: TaskStatus,
    pub initial_status: TaskStatus,
    pub color: [u8; 3],
    pub initial_color: [u8; 3],
    pub apply_to_tasks: bool,
    pub error: Option<String>,
}

impl GroupForm {
    pub fn edit(group: &Group) -> Self {
        let color = theme::to_srgb(group.color);
        Self {
            original: group.name.clone(),
            name: group.name.clone(),
            status: group.status,
            initial_status: group.status,
            color,
            initial_color: color,
            apply_to_tasks: false,
            error: None,
        }
    }
}

enum Outcome {
    Open,
    Cancel,
    Submit,
    Delete,
}

/// Render whichever dialog is open and apply what the user chose.
pub fn show_dialogs(app: &mut GanttApp, ctx: &Context) {
    let Some(mut dialog) = app.dialog.take() else {
        return;
    };

    let keep_open = match &mut dialog {
        Dialog::Task(form) => {
            let groups: Vec<String> = app
                .workspace
                .active()
                .group_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            let outcome = task_dialog(form, &groups, app.settings.default_task_days, &app.settings.recent_colors, ctx);
            match outcome {
                Outcome::Open => true,
                Outcome::Cancel => false,
                Outcome::Submit => match app.submit_task(form) {
                    Ok(()) => false,
                    Err(e) => {
                        form.error = Some(e.to_string());
                        true
                    }
                },
                Outcome::Delete => {
                    if let Some(id) = form.editing {
                        app.dialog = Some(Dialog::Confirm(Confirm::DeleteTask {
                            id,
                            name: form.name.clone(),
                        }));
                    }
                    false
                }
            }
        }
        Dialog::Milestone(form) => match milestone_dialog(form, ctx) {
            Outcome::Open => true,
            Outcome::Cancel => false,
            Outcome::Submit => match app.submit_milestone(form) {
                Ok(()) => false,
                Err(e) => {
                    form.error = Some(e.to_string());
                    true
                }
            },
            Outcome::Delete => {
                if let Some(id) = form.editing {
                    app.dialog = Some(Dialog::Confirm(Confirm::DeleteMilestone {
                        id,
                        name: form.name.clone(),
                    }));
                }
                false
            }
        },
        Dialog::Group(form) => match group_dialog(form, &app.settings.recent_colors, ctx) {
            Outcome::Open => true,
            Outcome::Cancel => false,
            Outcome::Submit => match app.submit_group(form) {
                Ok(()) => false,
                Err(e) => {
                    form.error = Some(e.to_string());
                    true
                }
            },
            Outcome::Delete => {
                let tasks = app.workspace.active().tasks_in_group(&form.original).count();
                app.dialog = Some(Dialog::Confirm(Confirm::DeleteGroup {
                    name: form.original.clone(),
                    tasks,
                }));
                false
            }
        },
        Dialog::RenameProject { index, name, error } => {
            match rename_dialog(name, error.as_deref(), ctx) {
                Outcome::Submit => match app.rename_project(*index, name) {
                    Ok(()) => false,
                    Err(e) => {
                        *error = Some(e.to_string());
                        true
                    }
                },
                Outcome::Open => true,
                Outcome::Cancel | Outcome::Delete => false,
            }
        }
        Dialog::Confirm(confirm) => match confirm_dialog(confirm, ctx) {
            Outcome::Submit => {
                app.apply_confirmed(confirm.clone());
                false
            }
            Outcome::Open => true,
            Outcome::Cancel | Outcome::Delete => false,
        },
        Dialog::RestoreAutosave(doc) => match restore_dialog(doc, ctx) {
            Outcome::Submit => {
                app.restore_autosave((**doc).clone());
                false
            }
            Outcome::Cancel => {
                app.discard_autosave();
                false
            }
            Outcome::Open | Outcome::Delete => true,
        },
        Dialog::About => about_dialog(ctx),
        Dialog::CsvHelp => csv_help_dialog(ctx),
    };

    if keep_open && app.dialog.is_none() {
        app.dialog = Some(dialog);
    }
}

fn escape_pressed(ctx: &Context) -> bool {
    ctx.input(|i| i.key_pressed(egui::Key::Escape))
}

fn modal(title: &str) -> Window<'static> {
    Window::new(RichText::new(title).strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([theme::DIALOG_WIDTH, 0.0])
}

fn accent_button(ui: &mut Ui, label: &str) -> bool {
    let button = egui::Button::new(RichText::new(label).color(Color32::WHITE))
        .fill(theme::ACCENT)
        .rounding(egui::Rounding::same(4.0));
    ui.add_sized([80.0, 28.0], button).clicked()
}

fn danger_button(ui: &mut Ui, label: &str) -> bool {
    let button = egui::Button::new(RichText::new(label).color(Color32::WHITE))
        .fill(theme::DANGER)
        .rounding(egui::Rounding::same(4.0));
    ui.add_sized([80.0, 28.0], button).clicked()
}

fn error_line(ui: &mut Ui, error: Option<&str>) {
    if let Some(error) = error {
        ui.add_space(4.0);
        ui.label(RichText::new(error).color(theme::DANGER).size(11.0));
    }
}

fn status_combo(ui: &mut Ui, id: &str, status: &mut TaskStatus) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(RichText::new(status.label()).color(theme::status_color(*status)))
        .show_ui(ui, |ui| {
            for option in TaskStatus::ALL {
                let text = RichText::new(option.label()).color(theme::status_color(option));
                ui.selectable_value(status, option, text);
            }
        });
}

/// Color picker plus the recently used swatches.
fn color_row(ui: &mut Ui, color: &mut [u8; 3], recent: &[Rgb]) {
    ui.horizontal_wrapped(|ui| {
        ui.color_edit_button_srgb(color);
        for swatch in recent {
            let (rect, response) = ui.allocate_exact_size(egui::vec2(16.0, 16.0), Sense::click());
            ui.painter()
                .rect_filled(rect, egui::Rounding::same(3.0), theme::color32(*swatch));
            if response.on_hover_text(swatch.to_hex()).clicked() {
                *color = theme::to_srgb(*swatch);
            }
        }
    });
}

fn form_buttons(ui: &mut Ui, submit: &str, deletable: bool) -> Outcome {
    let mut outcome = Outcome::Open;
    ui.add_space(6.0);
    ui.separator();
    ui.add_space(4.0);
    ui.horizontal(|ui| {
        if accent_button(ui, submit) {
            outcome = Outcome::Submit;
        }
        if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
            outcome = Outcome::Cancel;
        }
        if deletable {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if danger_button(ui, "Delete") {
                    outcome = Outcome::Delete;
                }
            });
        }
    });
    ui.add_space(2.0);
    outcome
}

fn task_dialog(
    form: &mut TaskForm,
    groups: &[String],
    default_days: i64,
    recent: &[Rgb],
    ctx: &Context,
) -> Outcome {
    let mut outcome = Outcome::Open;
    let title = if form.editing.is_some() {
        "Edit Task"
    } else {
        "Add Task"
    };
    modal(title).show(ctx, |ui| {
        ui.add_space(4.0);
        egui::Grid::new("task_form_grid")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label(RichText::new("Name").color(theme::TEXT_SECONDARY));
                ui.add_sized(
                    [220.0, 24.0],
                    egui::TextEdit::singleline(&mut form.name).hint_text("Task name..."),
                );
                ui.end_row();

                ui.label(RichText::new("Group").color(theme::TEXT_SECONDARY));
                ui.horizontal(|ui| {
                    ui.add_sized(
                        [170.0, 24.0],
                        egui::TextEdit::singleline(&mut form.group).hint_text("Ungrouped"),
                    );
                    egui::ComboBox::from_id_salt("task_form_group")
                        .selected_text("")
                        .width(24.0)
                        .show_ui(ui, |ui| {
                            for group in groups {
                                if ui.selectable_label(form.group == *group, group.as_str()).clicked() {
                                    form.group = group.clone();
                                }
                            }
                        });
                });
                ui.end_row();

                ui.label(RichText::new("Start").color(theme::TEXT_SECONDARY));
                let before = form.start;
                ui.add(egui_extras::DatePickerButton::new(&mut form.start).id_salt("task_form_start"));
                if form.editing.is_none() && form.start != before {
                    form.end = add_days(form.start, default_days);
                }
                ui.end_row();

                ui.label(RichText::new("End").color(theme::TEXT_SECONDARY));
                ui.add(egui_extras::DatePickerButton::new(&mut form.end).id_salt("task_form_end"));
                ui.end_row();

                ui.label(RichText::new("Status").color(theme::TEXT_SECONDARY));
                let before = form.status;
                status_combo(ui, "task_form_status", &mut form.status);
                if form.status != before && form.color == form.initial_color {
                    form.color = theme::to_srgb(form.status.color());
                    form.initial_color = form.color;
                }
                ui.end_row();

                if form.editing.is_some() {
                    ui.label(RichText::new("Color").color(theme::TEXT_SECONDARY));
                    color_row(ui, &mut form.color, recent);
                    ui.end_row();
                }
            });
        error_line(ui, form.error.as_deref());
        outcome = form_buttons(
            ui,
            if form.editing.is_some() { "Save" } else { "Create" },
            form.editing.is_some(),
        );
    });
    if escape_pressed(ctx) {
        outcome = Outcome::Cancel;
    }
    outcome
}

fn milestone_dialog(form: &mut MilestoneForm, ctx: &Context) -> Outcome {
    let mut outcome = Outcome::Open;
    let title = if form.editing.is_some() {
        "Edit Milestone"
    } else {
        "Add Milestone"
    };
    modal(title).show(ctx, |ui| {
        ui.add_space(4.0);
        egui::Grid::new("milestone_form_grid")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label(RichText::new("Name").color(theme::TEXT_SECONDARY));
                ui.add_sized(
                    [220.0, 24.0],
                    egui::TextEdit::singleline(&mut form.name).hint_text("Milestone name..."),
                );
                ui.end_row();

                ui.label(RichText::new("Date").color(theme::TEXT_SECONDARY));
                ui.add(egui_extras::DatePickerButton::new(&mut form.date).id_salt("milestone_form_date"));
                ui.end_row();
            });
        error_line(ui, form.error.as_deref());
        outcome = form_buttons(ui, "Save", form.editing.is_some());
    });
    if escape_pressed(ctx) {
        outcome = Outcome::Cancel;
    }
    outcome
}

fn group_dialog(form: &mut GroupForm, recent: &[Rgb], ctx: &Context) -> Outcome {
    let mut outcome = Outcome::Open;
    modal("Edit Group").show(ctx, |ui| {
        ui.add_space(4.0);
        egui::Grid::new("group_form_grid")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label(RichText::new("Name").color(theme::TEXT_SECONDARY));
                ui.add_sized([220.0, 24.0], egui::TextEdit::singleline(&mut form.name));
                ui.end_row();

                ui.label(RichText::new("Status").color(theme::TEXT_SECONDARY));
                status_combo(ui, "group_form_status", &mut form.status);
                ui.end_row();

                ui.label(RichText::new("Color").color(theme::TEXT_SECONDARY));
                color_row(ui, &mut form.color, recent);
                ui.end_row();

                ui.label("");
                ui.checkbox(&mut form.apply_to_tasks, "Apply color to all tasks in group");
                ui.end_row();
            });
        ui.label(
            RichText::new("Changing a task's status re-derives the group status.")
                .size(10.5)
                .color(theme::TEXT_DIM),
        );
        error_line(ui, form.error.as_deref());
        outcome = form_buttons(ui, "Save", true);
    });
    if escape_pressed(ctx) {
        outcome = Outcome::Cancel;
    }
    outcome
}

fn rename_dialog(name: &mut String, error: Option<&str>, ctx: &Context) -> Outcome {
    let mut outcome = Outcome::Open;
    modal("Rename Project").show(ctx, |ui| {
        ui.add_space(4.0);
        let response = ui.add_sized([ui.available_width(), 24.0], egui::TextEdit::singleline(name));
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            outcome = Outcome::Submit;
        }
        error_line(ui, error);
        let buttons = form_buttons(ui, "Rename", false);
        if !matches!(buttons, Outcome::Open) {
            outcome = buttons;
        }
    });
    if escape_pressed(ctx) {
        outcome = Outcome::Cancel;
    }
    outcome
}

fn confirm_dialog(confirm: &Confirm, ctx: &Context) -> Outcome {
    let mut outcome = Outcome::Open;
    modal("Confirm").show(ctx, |ui| {
        ui.add_space(6.0);
        ui.label(confirm.message());
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if danger_button(ui, confirm.action_label()) {
                outcome = Outcome::Submit;
            }
            if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                outcome = Outcome::Cancel;
            }
        });
        ui.add_space(2.0);
    });
    if escape_pressed(ctx) {
        outcome = Outcome::Cancel;
    }
    outcome
}

/// Submit restores, Cancel discards the snapshot.
fn restore_dialog(doc: &LoadedDocument, ctx: &Context) -> Outcome {
    let mut outcome = Outcome::Open;
    modal("Restore Autosave").show(ctx, |ui| {
        ui.add_space(6.0);
        let when = doc
            .saved_at
            .map(|t| t.with_timezone(&Local).format("%d %b %Y %H:%M").to_string())
            .unwrap_or_else(|| "an unknown time".to_string());
        ui.label(format!(
            "Unsaved work from {when} was found ({} project(s)). Restore it?",
            doc.projects.len()
        ));
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if accent_button(ui, "Restore") {
                outcome = Outcome::Submit;
            }
            if ui.add_sized([80.0, 28.0], egui::Button::new("Discard")).clicked() {
                outcome = Outcome::Cancel;
            }
        });
        ui.add_space(2.0);
    });
    outcome
}

fn about_dialog(ctx: &Context) -> bool {
    let mut open = true;
    modal("About").show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(12.0);
            ui.heading(RichText::new("Gantt Planner").strong());
            ui.add_space(2.0);
            ui.label(
                RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                    .color(theme::TEXT_SECONDARY),
            );
            ui.add_space(10.0);
            ui.label("Month-based project timelines");
            ui.label("with fiscal quarters, built with Rust and egui.");
            ui.add_space(14.0);
            if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                open = false;
            }
        });
    });
    open && !escape_pressed(ctx)
}

fn csv_help_dialog(ctx: &Context) -> bool {
    let mut open = true;
    Window::new(RichText::new("CSV Import Format").strong().size(14.0))
        .resizable(true)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .default_size([480.0, 380.0])
        .show(ctx, |ui| {
            ui.add_space(4.0);
            ui.label(RichText::new("Delimiters").strong());
            ui.label("Detected from the header line: comma, semicolon or tab.");
            ui.add_space(8.0);

            ui.label(RichText::new("Columns").strong());
            ui.add_space(2.0);
            egui::Grid::new("csv_columns")
                .num_columns(2)
                .striped(true)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Column").underline());
                    ui.label(RichText::new("Accepted headers (case-insensitive)").underline());
                    ui.end_row();

                    ui.label(RichText::new("Task").strong());
                    ui.label("activity, task, task name");
                    ui.end_row();

                    ui.label(RichText::new("Group").strong());
                    ui.label("epic, group, group name");
                    ui.end_row();

                    ui.label(RichText::new("Start").strong());
                    ui.label("start, start date");
                    ui.end_row();

                    ui.label(RichText::new("End").strong());
                    ui.label("end, end date, finish, finish date");
                    ui.end_row();

                    ui.label(RichText::new("Status").strong());
                    ui.label("status (optional)");
                    ui.end_row();
                });
            ui.add_space(8.0);

            ui.label(RichText::new("Dates").strong());
            for fmt in ["YYYY-MM-DD   (e.g. 2025-06-15)", "M/D/YYYY     (e.g. 6/15/2025)"] {
                ui.label(RichText::new(fmt).monospace().size(11.0));
            }
            ui.add_space(8.0);

            ui.label(RichText::new("Notes").strong());
            for note in [
                "• Spaces and underscores in headers are ignored.",
                "• Rows with a missing name or date, an invalid date, or a start after the end are skipped.",
                "• An empty group puts the task in \"Ungrouped\"; an unknown status becomes Not Started.",
                "• Imported tasks are added to the current project.",
            ] {
                ui.label(RichText::new(note).small());
            }
            ui.add_space(10.0);

            ui.separator();
            if ui.add_sized([80.0, 28.0], egui::Button::new("Close")).clicked() {
                open = false;
            }
        });
    open && !escape_pressed(ctx)
}
