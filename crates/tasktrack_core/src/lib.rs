//! Core engine of the tasktrack personal tracker.
//! Owns every business invariant; front-ends only parse input and render.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod relations;
pub mod repo;
pub mod resolver;
pub mod scoring;
pub mod service;
pub mod store;
pub mod vcs;

pub use config::{ConfigError, TrackerConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::dates::Due;
pub use model::project::{Project, ProjectId, ProjectStatus};
pub use model::task::{Task, TaskId, TaskStatus};
pub use repo::{RepoError, RepoResult};
pub use scoring::{CycleDetected, ScoreReport, Scores};
pub use service::{
    AddProjectRequest, AddTaskRequest, Clock, DescriptionEditor, EditProjectRequest,
    EditTaskRequest, EditorError, FixedClock, Outcome, ProjectListQuery, ProjectPriority,
    ProjectView, Report, SortKey, Stats, SystemClock, TaskListQuery, TaskView, TrackerError,
    TrackerResult, TrackerService,
};
pub use store::{ChangeSet, EntityStore};
pub use vcs::{GitCommitter, NoopCommitter, VcsError, VersionedPersistence};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
