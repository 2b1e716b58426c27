//! Pointer-drag interpretation for task bars.
//!
//! The interpreter is a two-state machine (idle or dragging). Everything it
//! needs from the chart is captured when the drag starts: the month grid is
//! frozen into a private projector and the surface width into a
//! pixels-per-month scale, so later re-layouts cannot skew an active drag.

use chrono::NaiveDate;
use tracing::{debug, trace};

use super::date_math::{add_days, days_between, to_iso};
use super::month_grid::MonthGrid;
use super::projector::{Anchor, Span, TimelineProjector};
use crate::error::GestureError;
use crate::model::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    /// Drag the whole bar; the duration never changes.
    Move,
    /// Drag the left handle; only the start date changes.
    ResizeLeft,
    /// Drag the right handle; only the end date changes.
    ResizeRight,
}

/// Everything needed to begin a drag.
#[derive(Debug, Clone, Copy)]
pub struct GestureStart<'a> {
    pub kind: GestureKind,
    pub task_id: TaskId,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Pointer coordinate along the time axis, in pixels.
    pub pointer: f64,
    /// Measured width of the drag surface (the whole timeline track).
    pub surface_width: f64,
    pub grid: &'a MonthGrid,
}

/// Live feedback for the bar being dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preview {
    pub task_id: TaskId,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub span: Span,
}

/// Dates to store when a drag ends with a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureCommit {
    pub task_id: TaskId,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone)]
struct DragSession {
    kind: GestureKind,
    task_id: TaskId,
    original_start: NaiveDate,
    original_end: NaiveDate,
    start_pointer: f64,
    pixels_per_month: f64,
    start_position: f64,
    end_position: f64,
    projector: TimelineProjector,
    preview: Preview,
}

#[derive(Debug, Clone, Default)]
enum GestureState {
    #[default]
    Idle,
    Dragging(Box<DragSession>),
}

#[derive(Debug, Clone, Default)]
pub struct GestureInterpreter {
    state: GestureState,
}

impl GestureInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging(_))
    }

    pub fn active_task(&self) -> Option<TaskId> {
        self.session().map(|s| s.task_id)
    }

    pub fn active_kind(&self) -> Option<GestureKind> {
        self.session().map(|s| s.kind)
    }

    /// The most recent preview of the active drag.
    pub fn preview(&self) -> Option<Preview> {
        self.session().map(|s| s.preview)
    }

    fn session(&self) -> Option<&DragSession> {
        match &self.state {
            GestureState::Idle => None,
            GestureState::Dragging(session) => Some(session),
        }
    }

    /// Idle → Dragging. A second start while a drag is active is rejected,
    /// whichever task it targets.
    pub fn start(&mut self, request: GestureStart<'_>) -> Result<Preview, GestureError> {
        if let Some(task_id) = self.active_task() {
            return Err(GestureError::AlreadyDragging { task_id });
        }
        if !request.surface_width.is_finite() || request.surface_width <= 0.0 {
            return Err(GestureError::InvalidSurface(request.surface_width));
        }

        let projector = TimelineProjector::new(request.grid.clone());
        let start_position = projector.position_of(request.start, Anchor::Start)?;
        let end_position = projector.position_of(request.end, Anchor::InclusiveEnd)?;
        let span = projector.span_of(request.start, request.end)?;
        let preview = Preview {
            task_id: request.task_id,
            start: request.start,
            end: request.end,
            span,
        };

        debug!(
            task_id = request.task_id,
            kind = ?request.kind,
            start = %request.start,
            end = %request.end,
            "drag started"
        );
        self.state = GestureState::Dragging(Box::new(DragSession {
            kind: request.kind,
            task_id: request.task_id,
            original_start: request.start,
            original_end: request.end,
            start_pointer: request.pointer,
            pixels_per_month: request.surface_width / projector.total_months() as f64,
            start_position,
            end_position,
            projector,
            preview,
        }));
        Ok(preview)
    }

    /// Re-derive the candidate dates for the pointer's current coordinate.
    pub fn update(&mut self, pointer: f64) -> Result<Preview, GestureError> {
        let GestureState::Dragging(session) = &mut self.state else {
            return Err(GestureError::NotDragging);
        };

        let delta = (pointer - session.start_pointer) / session.pixels_per_month;
        let (start, end) = session.candidate(delta);
        let span = session.projector.span_of(start, end)?;
        session.preview = Preview {
            task_id: session.task_id,
            start,
            end,
            span,
        };
        trace!(task_id = session.task_id, %start, %end, delta, "drag preview");
        Ok(session.preview)
    }

    /// Dragging → Idle. Returns the dates to store, or `None` when the drag
    /// ended where it began (or no drag was active).
    pub fn end(&mut self) -> Option<GestureCommit> {
        let GestureState::Dragging(session) = std::mem::take(&mut self.state) else {
            return None;
        };
        let preview = session.preview;
        let unchanged = to_iso(preview.start) == to_iso(session.original_start)
            && to_iso(preview.end) == to_iso(session.original_end);
        if unchanged {
            debug!(task_id = session.task_id, "drag ended without change");
            return None;
        }
        debug!(
            task_id = session.task_id,
            start = %preview.start,
            end = %preview.end,
            "drag committed"
        );
        Some(GestureCommit {
            task_id: session.task_id,
            start: preview.start,
            end: preview.end,
        })
    }

    /// Abandon the active drag; the task keeps its original dates.
    pub fn cancel(&mut self) -> Option<TaskId> {
        let GestureState::Dragging(session) = std::mem::take(&mut self.state) else {
            return None;
        };
        debug!(task_id = session.task_id, "drag cancelled");
        Some(session.task_id)
    }
}

impl DragSession {
    /// Candidate `(start, end)` for a shift of `delta` months, never inverted
    /// and never outside the grid.
    fn candidate(&self, delta: f64) -> (NaiveDate, NaiveDate) {
        let total = self.projector.total_months() as f64;
        let clamp = |pos: f64| pos.clamp(0.0, total);

        match self.kind {
            GestureKind::Move => {
                let duration = days_between(self.original_start, self.original_end).max(0);
                let (grid_first, grid_last) = self.projector.grid().date_span();
                let start = self
                    .projector
                    .date_from_position(clamp(self.start_position + delta), Anchor::Start);
                let end = add_days(start, duration);
                if end > grid_last {
                    (add_days(grid_last, -duration).max(grid_first), grid_last)
                } else {
                    (start, end)
                }
            }
            GestureKind::ResizeLeft => {
                let start = self
                    .projector
                    .date_from_position(clamp(self.start_position + delta), Anchor::Start);
                let end = self.original_end;
                (start.min(end), end)
            }
            GestureKind::ResizeRight => {
                let start = self.original_start;
                let end = self
                    .projector
                    .date_from_position(clamp(self.end_position + delta), Anchor::InclusiveEnd);
                (start, end.max(start))
            }
        }
    }
}
