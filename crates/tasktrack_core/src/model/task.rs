//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record and its lifecycle transitions.
//! - Synthesize the newborn record used when no persisted record exists.
//!
//! # Invariants
//! - `id` is immutable once assigned.
//! - `completed` is set iff `status == Done`; `deleted` is set iff
//!   `status == Deleted`.
//! - `priority` never exceeds `MAX_PRIORITY`.
//! - `following`/`followers` symmetry across tasks is owned by
//!   `crate::relations`, not by this type.

use crate::model::dates::Due;
use crate::model::project::ProjectId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Highest accepted priority; larger inputs clamp to this value.
pub const MAX_PRIORITY: u8 = 3;
/// Estimated hours assigned to a newborn task.
pub const DEFAULT_TIME_HOURS: f64 = 1.0;

/// Numeric task identifier, rendered zero-padded to four digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u32);

impl TaskId {
    pub const FIRST: TaskId = TaskId(0);

    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Created, not started.
    Todo,
    /// Work has started.
    InProgress,
    /// Completed; `completed` timestamp is set.
    Done,
    /// Tombstoned; `deleted` timestamp is set.
    Deleted,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
            Self::Deleted => "deleted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "todo" => Some(Self::Todo),
            "in-progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }

    /// Active tasks take part in propagation and scoring.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Todo | Self::InProgress)
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("task {id} cannot move from {from} to {to}")]
pub struct TransitionError {
    pub id: TaskId,
    pub from: TaskStatus,
    pub to: TaskStatus,
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Non-empty, newline-terminated once validated by the service.
    pub description: String,
    pub status: TaskStatus,
    /// Tasks this task depends on.
    pub following: BTreeSet<TaskId>,
    /// Tasks that depend on this task.
    pub followers: BTreeSet<TaskId>,
    pub projects: BTreeSet<ProjectId>,
    /// Estimated hours to complete.
    pub time: f64,
    pub priority: u8,
    /// The task's own deadline; the effective deadline also considers projects.
    pub due: Due,
    /// A value in the future marks the task as scheduled.
    pub created: NaiveDateTime,
    pub completed: Option<NaiveDateTime>,
    pub deleted: Option<NaiveDateTime>,
}

impl Task {
    /// Default record for an id with no persisted state.
    pub fn newborn(id: TaskId, created: NaiveDateTime) -> Self {
        Self {
            id,
            description: String::new(),
            status: TaskStatus::Todo,
            following: BTreeSet::new(),
            followers: BTreeSet::new(),
            projects: BTreeSet::new(),
            time: DEFAULT_TIME_HOURS,
            priority: 0,
            due: Due::Never,
            created,
            completed: None,
            deleted: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == TaskStatus::InProgress
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Done
    }

    pub fn is_deleted(&self) -> bool {
        self.status == TaskStatus::Deleted
    }

    /// Scheduled tasks were created with a start date still in the future.
    pub fn is_scheduled(&self, now: NaiveDateTime) -> bool {
        self.created > now
    }

    /// First description line, used for one-line summaries.
    pub fn title(&self) -> &str {
        self.description.lines().next().unwrap_or_default()
    }

    /// `Todo -> InProgress`.
    pub fn start(&mut self) -> Result<(), TransitionError> {
        self.transition(TaskStatus::InProgress, &[TaskStatus::Todo])?;
        Ok(())
    }

    /// `Todo | InProgress -> Done`, stamping `completed`.
    pub fn complete(&mut self, now: NaiveDateTime) -> Result<(), TransitionError> {
        self.transition(TaskStatus::Done, &[TaskStatus::Todo, TaskStatus::InProgress])?;
        self.completed = Some(now);
        Ok(())
    }

    /// Any non-deleted state `-> Deleted`, stamping `deleted`.
    ///
    /// `completed` is kept so a deleted-after-done task still reports when it
    /// was finished; `restore` clears both.
    pub fn delete(&mut self, now: NaiveDateTime) -> Result<(), TransitionError> {
        self.transition(
            TaskStatus::Deleted,
            &[TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done],
        )?;
        self.deleted = Some(now);
        Ok(())
    }

    /// `Done | Deleted -> Todo`, clearing `completed` and `deleted`.
    pub fn restore(&mut self) -> Result<(), TransitionError> {
        self.transition(TaskStatus::Todo, &[TaskStatus::Done, TaskStatus::Deleted])?;
        self.completed = None;
        self.deleted = None;
        Ok(())
    }

    fn transition(
        &mut self,
        to: TaskStatus,
        allowed_from: &[TaskStatus],
    ) -> Result<(), TransitionError> {
        if !allowed_from.contains(&self.status) {
            return Err(TransitionError {
                id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

/// Clamps user priority input into `0..=MAX_PRIORITY`.
pub fn clamp_priority(value: u8) -> u8 {
    value.min(MAX_PRIORITY)
}
