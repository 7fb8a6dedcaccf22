//! Tracker use-case services.
//!
//! # Responsibility
//! - Compose resolver, store, relations and scoring into validated
//!   use-case APIs.
//! - Keep the CLI decoupled from storage and scoring details.

pub mod clock;
pub mod editor;
pub mod error;
pub mod query;
pub mod tracker_service;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use editor::{DescriptionEditor, EditorError, NoEditor};
pub use error::{TrackerError, TrackerResult};
pub use query::{
    AddProjectRequest, AddTaskRequest, EditProjectRequest, EditTaskRequest, Outcome,
    ProjectListQuery, ProjectPriority, ProjectView, Report, SortKey, Stats, Tally,
    TaskListQuery, TaskView,
};
pub use tracker_service::TrackerService;
