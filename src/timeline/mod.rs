//! Layout and interaction core of the chart. Nothing in here knows about
//! egui; the UI feeds it dates and pointer coordinates and draws what comes
//! back.

pub mod bounds;
pub mod date_math;
pub mod gesture;
pub mod month_grid;
pub mod projector;
pub mod status;

pub use bounds::{resolve_bounds, ChartBounds};
pub use gesture::{GestureCommit, GestureInterpreter, GestureKind, GestureStart, Preview};
pub use month_grid::{group_by_fiscal_quarter, month_range, FiscalQuarter, MonthGrid, YearMonth};
pub use projector::{project_span, Anchor, Span, TimelineProjector};
pub use status::{derive_group_status, derive_status};
