//! Request, query and view types of the tracker service.

use crate::model::dates::Due;
use crate::model::project::{Project, ProjectId, ProjectStatus};
use crate::model::task::{Task, TaskId};
use crate::store::ChangeSet;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Urgency, then importance, then newest id.
    #[default]
    Urgency,
    /// Importance, then urgency, then newest id.
    Importance,
    /// Newest id first.
    Creation,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Urgency => "urgency",
            Self::Importance => "importance",
            Self::Creation => "creation",
        }
    }

    /// Orders `(urgency, importance, id)` triples, most relevant first.
    pub(crate) fn compare(self, left: (u32, u32, u32), right: (u32, u32, u32)) -> Ordering {
        let (lu, li, lid) = left;
        let (ru, ri, rid) = right;
        match self {
            Self::Urgency => ru.cmp(&lu).then(ri.cmp(&li)).then(rid.cmp(&lid)),
            Self::Importance => ri.cmp(&li).then(ru.cmp(&lu)).then(rid.cmp(&lid)),
            Self::Creation => rid.cmp(&lid),
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    /// Accepts full names and the one-letter forms `U`, `I`, `C`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "urgency" | "U" | "u" => Ok(Self::Urgency),
            "importance" | "I" | "i" => Ok(Self::Importance),
            "creation" | "C" | "c" => Ok(Self::Creation),
            other => Err(format!(
                "unknown sort key `{other}`; expected urgency|importance|creation"
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddTaskRequest {
    /// Prompted through the editor when absent.
    pub description: Option<String>,
    /// Tokens of existing projects.
    pub projects: Vec<String>,
    /// Names of projects to create along with the task.
    pub new_projects: Vec<String>,
    /// Tokens of tasks this task depends on.
    pub after: Vec<String>,
    /// Tokens of tasks that depend on this task.
    pub before: Vec<String>,
    pub time: Option<f64>,
    pub priority: Option<u8>,
    pub due: Option<String>,
    /// Start date; the task stays scheduled until then.
    pub wait: Option<String>,
    /// Accept past dates and move conflicting project due dates.
    pub force: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditTaskRequest {
    pub description: Option<String>,
    pub projects: Vec<String>,
    pub new_projects: Vec<String>,
    pub after: Vec<String>,
    pub before: Vec<String>,
    /// Replace projects/edges instead of adding to them.
    pub replace: bool,
    pub time: Option<f64>,
    pub priority: Option<u8>,
    pub due: Option<String>,
    pub clear_due: bool,
    pub wait: Option<String>,
    pub force: bool,
    pub message: Option<String>,
}

impl EditTaskRequest {
    pub(crate) fn changes_membership(&self) -> bool {
        !self.projects.is_empty() || !self.new_projects.is_empty()
    }

    pub(crate) fn changes_edges(&self) -> bool {
        !self.after.is_empty() || !self.before.is_empty()
    }

    /// True when nothing but the description could change.
    pub(crate) fn is_description_only(&self) -> bool {
        !self.changes_membership()
            && !self.changes_edges()
            && self.time.is_none()
            && self.priority.is_none()
            && self.due.is_none()
            && !self.clear_due
            && self.wait.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddProjectRequest {
    pub name: String,
    pub description: Option<String>,
    pub due: Option<String>,
    pub priority: Option<u8>,
    pub importance: Option<u32>,
    pub force: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditProjectRequest {
    /// New name.
    pub rename: Option<String>,
    pub description: Option<String>,
    pub due: Option<String>,
    pub clear_due: bool,
    pub priority: Option<u8>,
    pub importance: Option<u32>,
    pub force: bool,
    pub message: Option<String>,
}

impl EditProjectRequest {
    pub(crate) fn is_description_only(&self) -> bool {
        self.rename.is_none()
            && self.due.is_none()
            && !self.clear_due
            && self.priority.is_none()
            && self.importance.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskListQuery {
    pub sort: SortKey,
    /// Keep tasks belonging to any of these project tokens.
    pub projects: Vec<String>,
    pub include_active: bool,
    pub include_completed: bool,
    pub include_deleted: bool,
    /// List only scheduled tasks instead of hiding them.
    pub waiting: bool,
    /// Substring of the task description.
    pub text: Option<String>,
    /// Substring of any member project's description.
    pub project_text: Option<String>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl Default for TaskListQuery {
    fn default() -> Self {
        Self {
            sort: SortKey::Urgency,
            projects: Vec::new(),
            include_active: true,
            include_completed: false,
            include_deleted: false,
            waiting: false,
            text: None,
            project_text: None,
            limit: None,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectListQuery {
    pub sort: SortKey,
    pub include_active: bool,
    /// Forced on when `text` is set.
    pub include_completed: bool,
    /// Substring of the project name or description.
    pub text: Option<String>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl Default for ProjectListQuery {
    fn default() -> Self {
        Self {
            sort: SortKey::Urgency,
            include_active: true,
            include_completed: false,
            text: None,
            limit: None,
            offset: 0,
        }
    }
}

/// Result of a mutating call.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    /// Records written by the flush; empty means nothing was committed.
    pub changes: ChangeSet,
    /// Non-fatal notices such as moved due dates or dependency cycles.
    pub warnings: Vec<String>,
}

/// Task with its derived scores.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskView {
    pub task: Task,
    pub urgency: u32,
    pub importance: u32,
    pub effective_due: Due,
    pub project_names: Vec<String>,
    pub scheduled: bool,
}

/// Project with its derived scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectView {
    pub project: Project,
    pub urgency: u32,
    pub status: ProjectStatus,
    pub active_members: usize,
    pub hours_left: f64,
    pub members: Vec<TaskId>,
}

/// Tasks completed within an inclusive date range.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub tasks: Vec<TaskView>,
    pub total_hours: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    pub count: usize,
    pub hours: f64,
}

impl Tally {
    pub(crate) fn add(&mut self, hours: f64) {
        self.count += 1;
        self.hours += hours;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stats {
    pub active_projects: usize,
    pub total_projects: usize,
    pub in_progress: Tally,
    pub active: Tally,
    pub completed: Tally,
}

/// Share of attention one of the most urgent projects should get.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectPriority {
    pub project: ProjectId,
    pub name: String,
    pub title: String,
    pub share: f64,
}
