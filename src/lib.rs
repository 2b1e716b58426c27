//! Timeline layout and gesture engine for a month/quarter Gantt planner,
//! plus the project model and file interchange built on top of it.
//!
//! The `timeline` module is UI-independent: everything in it is a pure function
//! over explicit inputs or a small state machine, so the desktop front-end
//! only has to call it and repaint.

pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod timeline;

pub use error::{ColorParseError, GestureError, ProjectError, StoreError, TimelineError};
