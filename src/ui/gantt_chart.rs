use chrono::NaiveDate;
use egui::{Align2, Color32, Pos2, Rect, Response, Rounding, Sense, Shape, Stroke, Ui, Vec2};
use egui_phosphor::regular as icons;
use gantt_planner::model::{Group, Milestone, Project, Task, TaskId, TaskStatus};
use gantt_planner::timeline::date_math::{format_display, inclusive_days};
use gantt_planner::timeline::{
    group_by_fiscal_quarter, GestureCommit, GestureInterpreter, GestureKind, GestureStart,
    MonthGrid, Span, TimelineProjector,
};
use gantt_planner::TimelineError;
use tracing::{error, warn};

use crate::ui::theme;

const ROW_HEIGHT: f32 = theme::ROW_HEIGHT;
const ROW_PADDING: f32 = theme::ROW_GAP;
const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;
const HANDLE_WIDTH: f32 = theme::HANDLE_WIDTH;
const LABEL_WIDTH: f32 = theme::LABEL_WIDTH;

/// Requests raised while drawing the chart. The app applies them once the
/// frame's UI pass is done.
#[derive(Debug, Clone)]
pub enum ChartAction {
    Select(Option<TaskId>),
    CommitDates(GestureCommit),
    AddTask,
    AddTaskToGroup(String),
    EditTask(TaskId),
    DeleteTask(TaskId),
    SetTaskStatus(TaskId, TaskStatus),
    ReorderTask { dragged: TaskId, target: TaskId },
    ToggleGroup(String),
    EditGroup(String),
    DeleteGroup(String),
    SetGroupStatus(String, TaskStatus),
    ReorderGroup { dragged: String, target: String },
    EditMilestone(i64),
}

/// Result details from interactions in the Gantt chart.
#[derive(Debug, Clone, Default)]
pub struct ChartInteraction {
    pub actions: Vec<ChartAction>,
}

impl ChartInteraction {
    fn push(&mut self, action: ChartAction) {
        self.actions.push(action);
    }
}

enum Row<'a> {
    Group {
        group: &'a Group,
        count: usize,
        expanded: bool,
        range: Option<(NaiveDate, NaiveDate)>,
        prev: Option<&'a str>,
        next: Option<&'a str>,
    },
    Task {
        task: &'a Task,
        prev: Option<TaskId>,
        next: Option<TaskId>,
    },
}

fn build_rows(project: &Project) -> Vec<Row<'_>> {
    let groups: Vec<&Group> = project.ordered_groups().collect();
    let mut rows = Vec::new();
    for (gi, &group) in groups.iter().enumerate() {
        let tasks: Vec<&Task> = project.tasks_in_group(&group.name).collect();
        let expanded = project.is_expanded(&group.name);
        rows.push(Row::Group {
            group,
            count: tasks.len(),
            expanded,
            range: project.group_date_range(&group.name),
            prev: gi.checked_sub(1).map(|i| groups[i].name.as_str()),
            next: groups.get(gi + 1).map(|g| g.name.as_str()),
        });
        if expanded {
            for (ti, &task) in tasks.iter().enumerate() {
                rows.push(Row::Task {
                    task,
                    prev: ti.checked_sub(1).map(|i| tasks[i].id),
                    next: tasks.get(ti + 1).map(|t| t.id),
                });
            }
        }
    }
    rows
}

/// Render the Gantt chart area: a label column on the left and the month
/// timeline filling the remaining width.
pub fn show_gantt_chart(
    project: &Project,
    gesture: &mut GestureInterpreter,
    selected_task: Option<TaskId>,
    today: NaiveDate,
    ui: &mut Ui,
) -> ChartInteraction {
    let mut interaction = ChartInteraction::default();

    let Some(bounds) = project.bounds() else {
        show_empty_state(ui, &mut interaction);
        return interaction;
    };
    let grid = bounds.month_grid();
    let projector = TimelineProjector::new(grid.clone());
    let rows = build_rows(project);

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let available = ui.available_size();
            let timeline_width = (available.x - LABEL_WIDTH).max(theme::MIN_TIMELINE_WIDTH);
            let body_top = HEADER_HEIGHT + theme::MILESTONE_LANE;
            let chart_height = body_top + rows.len() as f32 * (ROW_HEIGHT + ROW_PADDING) + 40.0;

            let (response, painter) = ui.allocate_painter(
                Vec2::new(LABEL_WIDTH + timeline_width, chart_height.max(available.y)),
                Sense::click(),
            );
            let canvas = response.rect;
            let origin = canvas.min;
            let timeline = Rect::from_min_max(
                Pos2::new(origin.x + LABEL_WIDTH, origin.y),
                canvas.max,
            );
            let x_of = |percent: f64| timeline.left() + (percent as f32 / 100.0) * timeline.width();
            let mut consumed_click = false;

            painter.rect_filled(canvas, 0.0, theme::BG_DARK);

            draw_timeline_header(&painter, timeline, &grid);
            draw_label_header(&painter, origin, canvas.bottom());

            // Month and quarter boundaries
            for (percent, month) in projector.grid_lines() {
                let x = x_of(percent);
                let (color, width) = if month.is_quarter_start() {
                    (theme::QUARTER_LINE, 1.0_f32)
                } else {
                    (theme::GRID_LINE, 0.5)
                };
                painter.line_segment(
                    [
                        Pos2::new(x, origin.y + theme::HEADER_BAND * 2.0),
                        Pos2::new(x, canvas.bottom()),
                    ],
                    Stroke::new(width, color),
                );
            }

            // Rows
            for (i, row) in rows.iter().enumerate() {
                let y = origin.y + body_top + i as f32 * (ROW_HEIGHT + ROW_PADDING);
                let row_rect = Rect::from_min_size(
                    Pos2::new(origin.x, y),
                    Vec2::new(canvas.width(), ROW_HEIGHT + ROW_PADDING),
                );
                let label_rect = Rect::from_min_size(
                    row_rect.min,
                    Vec2::new(LABEL_WIDTH, ROW_HEIGHT + ROW_PADDING),
                );

                match row {
                    Row::Group {
                        group,
                        count,
                        expanded,
                        range,
                        prev,
                        next,
                    } => {
                        painter.rect_filled(row_rect, 0.0, theme::BG_GROUP_ROW);
                        draw_group_label(&painter, label_rect, group, *count, *expanded);

                        let label_response = ui.interact(
                            label_rect,
                            ui.make_persistent_id(("group-row", group.name.as_str())),
                            Sense::click(),
                        );
                        if label_response.clicked() {
                            interaction.push(ChartAction::ToggleGroup(group.name.clone()));
                            consumed_click = true;
                        }
                        if label_response.hovered() {
                            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                        }
                        label_response.context_menu(|ui| {
                            group_menu(ui, group, *prev, *next, &mut interaction);
                        });

                        if let Some((start, end)) = range {
                            match projector.span_of(*start, *end) {
                                Ok(span) => {
                                    let bar = bar_rect(&span, timeline, y, 0.32);
                                    let color = theme::color32(group.color);
                                    painter.rect_filled(bar, Rounding::same(3.0), color);
                                    let bar_response = ui.interact(
                                        bar,
                                        ui.make_persistent_id(("group-bar", group.name.as_str())),
                                        Sense::hover(),
                                    );
                                    if bar_response.hovered() {
                                        egui::show_tooltip_at_pointer(
                                            ui.ctx(),
                                            ui.layer_id(),
                                            egui::Id::new(("group-tip", group.name.as_str())),
                                            |ui| {
                                                ui.strong(&group.name);
                                                ui.label(format!(
                                                    "{} – {}",
                                                    format_display(*start),
                                                    format_display(*end)
                                                ));
                                                ui.label(format!("Status: {}", group.status));
                                            },
                                        );
                                    }
                                }
                                Err(e) => off_grid(&format!("group {:?}", group.name), &e),
                            }
                        }
                    }
                    Row::Task { task, prev, next } => {
                        let is_selected = selected_task == Some(task.id);
                        if is_selected {
                            painter.rect_filled(row_rect, 0.0, theme::BG_SELECTED);
                        }
                        painter.line_segment(
                            [
                                Pos2::new(origin.x, row_rect.bottom()),
                                Pos2::new(canvas.right(), row_rect.bottom()),
                            ],
                            Stroke::new(0.5, theme::BORDER_SUBTLE),
                        );
                        draw_task_label(&painter, label_rect, task);

                        let label_response = ui.interact(
                            label_rect,
                            ui.make_persistent_id(("task-row", task.id)),
                            Sense::click(),
                        );
                        if label_response.double_clicked() {
                            interaction.push(ChartAction::EditTask(task.id));
                            consumed_click = true;
                        } else if label_response.clicked() {
                            interaction.push(ChartAction::Select(Some(task.id)));
                            consumed_click = true;
                        }
                        if label_response.hovered() && !is_selected {
                            painter.rect_filled(label_rect, 0.0, theme::BG_ROW_HOVER);
                        }
                        label_response.context_menu(|ui| {
                            task_menu(ui, task, *prev, *next, &mut interaction);
                        });

                        let clicked = show_task_bar(
                            ui,
                            &painter,
                            &projector,
                            gesture,
                            task,
                            timeline,
                            y,
                            is_selected,
                            (*prev, *next),
                            &mut interaction,
                        );
                        consumed_click |= clicked;
                    }
                }
            }

            draw_milestones(
                ui,
                &painter,
                &projector,
                &project.milestones,
                timeline,
                canvas.bottom(),
                &mut interaction,
            );

            if let Some(percent) = projector.marker_percent(today) {
                draw_today_line(&painter, x_of(percent), origin.y + body_top, canvas.bottom());
            }

            // Empty click on background clears selection
            if response.clicked() && !consumed_click {
                interaction.push(ChartAction::Select(None));
            }
        });

    interaction
}

fn show_empty_state(ui: &mut Ui, interaction: &mut ChartInteraction) {
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.35);
        ui.label(
            egui::RichText::new(icons::CHART_BAR_HORIZONTAL)
                .size(42.0)
                .color(theme::TEXT_DIM),
        );
        ui.add_space(6.0);
        ui.label(
            egui::RichText::new("No tasks yet")
                .size(16.0)
                .color(theme::TEXT_SECONDARY),
        );
        ui.add_space(8.0);
        let button = egui::Button::new(
            egui::RichText::new(format!("{}  Add Task", icons::PLUS)).color(Color32::WHITE),
        )
        .fill(theme::ACCENT)
        .rounding(Rounding::same(5.0));
        if ui.add_sized([140.0, 30.0], button).clicked() {
            interaction.push(ChartAction::AddTask);
        }
    });
}

/// Draws one task bar, wires its move and resize handles to the gesture
/// interpreter and returns whether the bar consumed a click.
#[allow(clippy::too_many_arguments)]
fn show_task_bar(
    ui: &Ui,
    painter: &egui::Painter,
    projector: &TimelineProjector,
    gesture: &mut GestureInterpreter,
    task: &Task,
    timeline: Rect,
    y: f32,
    is_selected: bool,
    neighbours: (Option<TaskId>, Option<TaskId>),
    interaction: &mut ChartInteraction,
) -> bool {
    let Some(span) = current_span(projector, gesture, task) else {
        return false;
    };
    let bar = bar_rect(&span, timeline, y, 1.0);

    let bar_response = ui.interact(
        bar,
        ui.make_persistent_id(("task-bar", task.id)),
        Sense::click_and_drag(),
    );
    let left_handle_rect = Rect::from_min_max(
        Pos2::new(bar.left() - HANDLE_WIDTH * 0.5, bar.top()),
        Pos2::new(bar.left() + HANDLE_WIDTH * 0.5, bar.bottom()),
    );
    let right_handle_rect = Rect::from_min_max(
        Pos2::new(bar.right() - HANDLE_WIDTH * 0.5, bar.top()),
        Pos2::new(bar.right() + HANDLE_WIDTH * 0.5, bar.bottom()),
    );
    let left_response = ui.interact(
        left_handle_rect.expand(3.0),
        ui.make_persistent_id(("task-resize-left", task.id)),
        Sense::drag(),
    );
    let right_response = ui.interact(
        right_handle_rect.expand(3.0),
        ui.make_persistent_id(("task-resize-right", task.id)),
        Sense::drag(),
    );

    let grid = projector.grid();
    let width = timeline.width();
    drive_gesture(ui, &bar_response, GestureKind::Move, task, gesture, grid, width, interaction);
    drive_gesture(ui, &left_response, GestureKind::ResizeLeft, task, gesture, grid, width, interaction);
    drive_gesture(ui, &right_response, GestureKind::ResizeRight, task, gesture, grid, width, interaction);

    // Redraw with this frame's preview so the bar follows the pointer.
    let dragging = gesture.active_task() == Some(task.id);
    let (span, dates) = match gesture.preview().filter(|p| p.task_id == task.id) {
        Some(preview) => (preview.span, (preview.start, preview.end)),
        None => (span, (task.start_date, task.end_date)),
    };
    let bar = bar_rect(&span, timeline, y, 1.0);
    draw_task_bar(painter, bar, task, is_selected || dragging);

    let mut consumed_click = false;
    if bar_response.double_clicked() {
        interaction.push(ChartAction::EditTask(task.id));
        consumed_click = true;
    } else if bar_response.clicked() {
        interaction.push(ChartAction::Select(Some(task.id)));
        consumed_click = true;
    }
    bar_response.context_menu(|ui| {
        task_menu(ui, task, neighbours.0, neighbours.1, interaction);
    });

    // Handle affordances
    let on_handle = left_response.hovered() || right_response.hovered();
    if on_handle {
        ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
    } else if bar_response.hovered() && !dragging {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
    }
    if is_selected || on_handle || dragging {
        let handle_h = bar.height() * 0.55;
        let handle_y = bar.center().y - handle_h / 2.0;
        let lh = Rect::from_min_size(Pos2::new(bar.left() - 1.5, handle_y), Vec2::new(4.0, handle_h));
        let rh = Rect::from_min_size(Pos2::new(bar.right() - 2.5, handle_y), Vec2::new(4.0, handle_h));
        painter.rect_filled(lh, Rounding::same(2.0), theme::HANDLE_COLOR);
        painter.rect_filled(rh, Rounding::same(2.0), theme::HANDLE_COLOR);
    }

    if bar_response.hovered() || on_handle || dragging {
        egui::show_tooltip_at_pointer(
            ui.ctx(),
            ui.layer_id(),
            egui::Id::new(("task-tip", task.id)),
            |ui| {
                ui.strong(&task.name);
                ui.label(format!("{} – {}", format_display(dates.0), format_display(dates.1)));
                let days = inclusive_days(dates.0, dates.1);
                ui.label(format!("{days} day{}", if days == 1 { "" } else { "s" }));
                ui.label(format!("Status: {}", task.status));
            },
        );
    }

    consumed_click
}

/// The grid is built from the project's own bounds, so a bar that misses it
/// is a bug: panic in debug builds, skip the bar in release.
fn off_grid(bar: &str, err: &TimelineError) {
    if cfg!(debug_assertions) {
        panic!("{bar} off the grid: {err}");
    }
    error!(bar, error = %err, "bar off the grid, not drawn");
}

fn current_span(
    projector: &TimelineProjector,
    gesture: &GestureInterpreter,
    task: &Task,
) -> Option<Span> {
    if let Some(preview) = gesture.preview().filter(|p| p.task_id == task.id) {
        return Some(preview.span);
    }
    match projector.span_of(task.start_date, task.end_date) {
        Ok(span) => Some(span),
        Err(e) => {
            off_grid(&format!("task {}", task.id), &e);
            None
        }
    }
}

/// Feed one handle's pointer events into the interpreter. Only the handle
/// that started the drag may update or finish it.
#[allow(clippy::too_many_arguments)]
fn drive_gesture(
    ui: &Ui,
    response: &Response,
    kind: GestureKind,
    task: &Task,
    gesture: &mut GestureInterpreter,
    grid: &MonthGrid,
    surface_width: f32,
    interaction: &mut ChartInteraction,
) {
    if response.drag_started() {
        if let Some(pointer) = response.interact_pointer_pos() {
            let request = GestureStart {
                kind,
                task_id: task.id,
                start: task.start_date,
                end: task.end_date,
                pointer: f64::from(pointer.x),
                surface_width: f64::from(surface_width),
                grid,
            };
            match gesture.start(request) {
                Ok(_) => interaction.push(ChartAction::Select(Some(task.id))),
                Err(e) => warn!(task_id = task.id, error = %e, "drag not started"),
            }
        }
    }

    let owns_drag = gesture.active_task() == Some(task.id) && gesture.active_kind() == Some(kind);
    if !owns_drag {
        return;
    }

    if response.dragged() {
        let cursor = match kind {
            GestureKind::Move => egui::CursorIcon::Grabbing,
            GestureKind::ResizeLeft | GestureKind::ResizeRight => egui::CursorIcon::ResizeHorizontal,
        };
        ui.ctx().set_cursor_icon(cursor);
        if let Some(pointer) = response.interact_pointer_pos() {
            if let Err(e) = gesture.update(f64::from(pointer.x)) {
                warn!(task_id = task.id, error = %e, "drag update rejected");
            }
        }
    }
    if response.drag_stopped() {
        if let Some(commit) = gesture.end() {
            interaction.push(ChartAction::CommitDates(commit));
        }
    }
}

/// Screen rect of a span in row `y`. `height_factor` shrinks the bar
/// vertically around the row centre.
fn bar_rect(span: &Span, timeline: Rect, y: f32, height_factor: f32) -> Rect {
    let inset = theme::BAR_INSET;
    let left = timeline.left() + span.left_percent as f32 / 100.0 * timeline.width();
    let width = (span.width_percent as f32 / 100.0 * timeline.width()).max(6.0);
    let full = ROW_HEIGHT - inset * 2.0;
    let height = full * height_factor;
    Rect::from_min_size(
        Pos2::new(left, y + ROW_PADDING + inset + (full - height) / 2.0),
        Vec2::new(width, height),
    )
}

// ── Menus ────────────────────────────────────────────────────────────────────

fn status_menu(ui: &mut Ui, current: TaskStatus, mut pick: impl FnMut(TaskStatus)) {
    for status in TaskStatus::ALL {
        let text = egui::RichText::new(format!("{}  {}", icons::CIRCLE, status.label()))
            .color(theme::status_color(status));
        if ui.selectable_label(status == current, text).clicked() {
            pick(status);
            ui.close_menu();
        }
    }
}

fn task_menu(
    ui: &mut Ui,
    task: &Task,
    prev: Option<TaskId>,
    next: Option<TaskId>,
    interaction: &mut ChartInteraction,
) {
    if ui.button(format!("{}  Edit Task...", icons::PENCIL_SIMPLE)).clicked() {
        interaction.push(ChartAction::EditTask(task.id));
        ui.close_menu();
    }
    ui.menu_button(format!("{}  Status", icons::CIRCLE_HALF), |ui| {
        status_menu(ui, task.status, |status| {
            interaction.push(ChartAction::SetTaskStatus(task.id, status));
        });
    });
    ui.separator();
    if ui
        .add_enabled(prev.is_some(), egui::Button::new(format!("{}  Move Up", icons::ARROW_UP)))
        .clicked()
    {
        if let Some(target) = prev {
            interaction.push(ChartAction::ReorderTask { dragged: task.id, target });
        }
        ui.close_menu();
    }
    if ui
        .add_enabled(next.is_some(), egui::Button::new(format!("{}  Move Down", icons::ARROW_DOWN)))
        .clicked()
    {
        if let Some(target) = next {
            interaction.push(ChartAction::ReorderTask { dragged: task.id, target });
        }
        ui.close_menu();
    }
    ui.separator();
    if ui.button(format!("{}  Delete Task", icons::TRASH)).clicked() {
        interaction.push(ChartAction::DeleteTask(task.id));
        ui.close_menu();
    }
}

fn group_menu(
    ui: &mut Ui,
    group: &Group,
    prev: Option<&str>,
    next: Option<&str>,
    interaction: &mut ChartInteraction,
) {
    if ui.button(format!("{}  Add Task Here...", icons::PLUS)).clicked() {
        interaction.push(ChartAction::AddTaskToGroup(group.name.clone()));
        ui.close_menu();
    }
    if ui.button(format!("{}  Edit Group...", icons::PENCIL_SIMPLE)).clicked() {
        interaction.push(ChartAction::EditGroup(group.name.clone()));
        ui.close_menu();
    }
    ui.menu_button(format!("{}  Status", icons::CIRCLE_HALF), |ui| {
        status_menu(ui, group.status, |status| {
            interaction.push(ChartAction::SetGroupStatus(group.name.clone(), status));
        });
    });
    ui.separator();
    if ui
        .add_enabled(prev.is_some(), egui::Button::new(format!("{}  Move Up", icons::ARROW_UP)))
        .clicked()
    {
        if let Some(target) = prev {
            interaction.push(ChartAction::ReorderGroup {
                dragged: group.name.clone(),
                target: target.to_string(),
            });
        }
        ui.close_menu();
    }
    if ui
        .add_enabled(next.is_some(), egui::Button::new(format!("{}  Move Down", icons::ARROW_DOWN)))
        .clicked()
    {
        if let Some(target) = next {
            interaction.push(ChartAction::ReorderGroup {
                dragged: group.name.clone(),
                target: target.to_string(),
            });
        }
        ui.close_menu();
    }
    ui.separator();
    if ui.button(format!("{}  Delete Group", icons::TRASH)).clicked() {
        interaction.push(ChartAction::DeleteGroup(group.name.clone()));
        ui.close_menu();
    }
}

// ── Painting ─────────────────────────────────────────────────────────────────

fn draw_label_header(painter: &egui::Painter, origin: Pos2, bottom: f32) {
    let rect = Rect::from_min_size(origin, Vec2::new(LABEL_WIDTH, HEADER_HEIGHT));
    painter.rect_filled(rect, 0.0, theme::BG_HEADER);
    painter.text(
        Pos2::new(origin.x + 12.0, origin.y + HEADER_HEIGHT - theme::HEADER_BAND / 2.0),
        Align2::LEFT_CENTER,
        "TASK",
        theme::font_small(),
        theme::TEXT_DIM,
    );
    painter.line_segment(
        [
            Pos2::new(origin.x + LABEL_WIDTH, origin.y),
            Pos2::new(origin.x + LABEL_WIDTH, bottom),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );
}

/// Fiscal year, quarter and month bands.
fn draw_timeline_header(painter: &egui::Painter, timeline: Rect, grid: &MonthGrid) {
    let band = theme::HEADER_BAND;
    let top = timeline.top();
    painter.rect_filled(
        Rect::from_min_size(timeline.min, Vec2::new(timeline.width(), HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );

    let month_width = timeline.width() / grid.len() as f32;
    let cell = |first: usize, count: usize, row: f32| {
        Rect::from_min_size(
            Pos2::new(timeline.left() + first as f32 * month_width, top + row * band),
            Vec2::new(count as f32 * month_width, band),
        )
    };

    // Quarters, and fiscal years as runs of quarters sharing a start year.
    let quarters = group_by_fiscal_quarter(grid.months());
    let mut first = 0usize;
    let mut years: Vec<(String, usize, usize)> = Vec::new();
    for quarter in &quarters {
        let count = quarter.months.len();
        draw_header_cell(painter, cell(first, count, 1.0), &quarter.quarter_label(), theme::TEXT_SECONDARY);
        match years.last_mut() {
            Some((label, _, len)) if *label == quarter.fy_label() => *len += count,
            _ => years.push((quarter.fy_label(), first, count)),
        }
        first += count;
    }
    for (label, first, count) in &years {
        draw_header_cell(painter, cell(*first, *count, 0.0), label, theme::TEXT_PRIMARY);
    }
    for (i, month) in grid.iter().enumerate() {
        draw_header_cell(painter, cell(i, 1, 2.0), &month.short_label(), theme::TEXT_SECONDARY);
    }

    // Bottom border of header
    painter.line_segment(
        [
            Pos2::new(timeline.left(), top + HEADER_HEIGHT),
            Pos2::new(timeline.right(), top + HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );
}

fn draw_header_cell(painter: &egui::Painter, rect: Rect, text: &str, color: Color32) {
    painter.rect_stroke(rect, 0.0, Stroke::new(0.5, theme::BORDER_SUBTLE));
    let font = if color == theme::TEXT_PRIMARY {
        theme::font_header()
    } else {
        theme::font_sub()
    };
    painter
        .with_clip_rect(rect)
        .text(rect.center(), Align2::CENTER_CENTER, text, font, color);
}

fn draw_group_label(painter: &egui::Painter, rect: Rect, group: &Group, count: usize, expanded: bool) {
    let clipped = painter.with_clip_rect(rect.shrink(2.0));
    let cy = rect.center().y;
    let caret = if expanded {
        icons::CARET_DOWN
    } else {
        icons::CARET_RIGHT
    };
    clipped.text(
        Pos2::new(rect.left() + 8.0, cy),
        Align2::LEFT_CENTER,
        caret,
        theme::font_header(),
        theme::TEXT_SECONDARY,
    );
    clipped.circle_filled(Pos2::new(rect.left() + 28.0, cy), 4.0, theme::color32(group.color));
    clipped.text(
        Pos2::new(rect.left() + 38.0, cy),
        Align2::LEFT_CENTER,
        format!("{} ({count})", group.name),
        theme::font_header(),
        theme::TEXT_PRIMARY,
    );
    clipped.text(
        Pos2::new(rect.right() - 8.0, cy),
        Align2::RIGHT_CENTER,
        group.status.label(),
        theme::font_small(),
        theme::status_color(group.status),
    );
}

fn draw_task_label(painter: &egui::Painter, rect: Rect, task: &Task) {
    let clipped = painter.with_clip_rect(rect.shrink(2.0));
    let cy = rect.center().y;
    clipped.circle_filled(
        Pos2::new(rect.left() + 28.0, cy),
        3.0,
        theme::status_color(task.status),
    );
    clipped.text(
        Pos2::new(rect.left() + 38.0, cy),
        Align2::LEFT_CENTER,
        &task.name,
        theme::font_bar(),
        theme::TEXT_PRIMARY,
    );
}

fn draw_task_bar(painter: &egui::Painter, bar: Rect, task: &Task, highlighted: bool) {
    let rounding = Rounding::same(theme::BAR_ROUNDING);

    // Soft shadow
    painter.rect_filled(bar.translate(Vec2::new(1.0, 2.0)), rounding, Color32::from_black_alpha(35));

    painter.rect_filled(bar, rounding, theme::color32(task.color));
    // Lighter top highlight
    let highlight = Rect::from_min_size(bar.min, Vec2::new(bar.width(), (bar.height() * 0.45).max(4.0)));
    painter.rect_filled(
        highlight,
        Rounding {
            nw: theme::BAR_ROUNDING,
            ne: theme::BAR_ROUNDING,
            sw: 0.0,
            se: 0.0,
        },
        Color32::from_white_alpha(25),
    );

    if highlighted {
        painter.rect_stroke(
            bar.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    // Task name on bar (single line, clipped to bar bounds)
    if bar.width() > 30.0 {
        let galley = painter.layout_no_wrap(task.name.clone(), theme::font_bar(), theme::TEXT_ON_BAR);
        let text_y = bar.top() + (bar.height() - galley.size().y) / 2.0;
        painter
            .with_clip_rect(bar)
            .galley(Pos2::new(bar.left() + 6.0, text_y), galley, Color32::TRANSPARENT);
    }
}

fn draw_milestones(
    ui: &Ui,
    painter: &egui::Painter,
    projector: &TimelineProjector,
    milestones: &[Milestone],
    timeline: Rect,
    bottom: f32,
    interaction: &mut ChartInteraction,
) {
    let lane_center = timeline.top() + HEADER_HEIGHT + theme::MILESTONE_LANE / 2.0;
    let size = theme::MILESTONE_LANE / 2.0 - 5.0;

    for milestone in milestones {
        let Some(percent) = projector.marker_percent(milestone.date) else {
            continue;
        };
        let x = timeline.left() + percent as f32 / 100.0 * timeline.width();
        let center = Pos2::new(x, lane_center);

        painter.add(Shape::dashed_line(
            &[Pos2::new(x, lane_center + size), Pos2::new(x, bottom)],
            Stroke::new(1.0, theme::MILESTONE.gamma_multiply(0.6)),
            4.0,
            4.0,
        ));
        let points = vec![
            Pos2::new(center.x, center.y - size),
            Pos2::new(center.x + size, center.y),
            Pos2::new(center.x, center.y + size),
            Pos2::new(center.x - size, center.y),
        ];
        painter.add(Shape::convex_polygon(points, theme::MILESTONE, Stroke::NONE));
        painter.text(
            Pos2::new(x + size + 4.0, lane_center),
            Align2::LEFT_CENTER,
            &milestone.name,
            theme::font_small(),
            theme::TEXT_SECONDARY,
        );

        let response = ui.interact(
            Rect::from_center_size(center, Vec2::splat(size * 2.0 + 6.0)),
            ui.make_persistent_id(("milestone", milestone.id)),
            Sense::click(),
        );
        if response.clicked() {
            interaction.push(ChartAction::EditMilestone(milestone.id));
        }
        if response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            egui::show_tooltip_at_pointer(
                ui.ctx(),
                ui.layer_id(),
                egui::Id::new(("milestone-tip", milestone.id)),
                |ui| {
                    ui.strong(&milestone.name);
                    ui.label(format_display(milestone.date));
                },
            );
        }
    }
}

fn draw_today_line(painter: &egui::Painter, x: f32, top: f32, bottom: f32) {
    painter.line_segment(
        [Pos2::new(x, top), Pos2::new(x, bottom)],
        Stroke::new(1.5, theme::TODAY_LINE),
    );

    // Top badge
    let badge_w = 42.0;
    let badge_rect = Rect::from_min_size(Pos2::new(x - badge_w / 2.0, top - 14.0), Vec2::new(badge_w, 14.0));
    painter.rect_filled(badge_rect, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(
        badge_rect.center(),
        Align2::CENTER_CENTER,
        "Today",
        theme::font_small(),
        Color32::WHITE,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantt_planner::timeline::month_grid::month_range;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    #[should_panic(expected = "task 7 off the grid")]
    fn bar_outside_the_grid_fails_loudly() {
        let projector = TimelineProjector::new(month_range(date(2025, 1, 1), date(2025, 1, 31)));
        let task = Task::new(7, "late", "G", date(2025, 3, 1), date(2025, 3, 2));
        current_span(&projector, &GestureInterpreter::new(), &task);
    }
}
