pub mod color;
pub mod project;
pub mod status;
pub mod task;
pub mod workspace;

pub use color::Rgb;
pub use project::{NewTask, Project, UNGROUPED};
pub use status::TaskStatus;
pub use task::{Group, Milestone, Task, TaskId};
pub use workspace::Workspace;
