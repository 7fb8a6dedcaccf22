//! Project domain model.
//!
//! # Invariants
//! - `name` is unique across projects and passes `validate_project_name`
//!   (enforced by the service layer before any write).
//! - Status is derived from member tasks and never persisted.

use crate::model::dates::Due;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Base importance weight assigned when the user gives none.
pub const DEFAULT_PROJECT_IMPORTANCE: u32 = 100;

/// Numeric project identifier, rendered zero-padded to four digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(u32);

impl ProjectId {
    pub const FIRST: ProjectId = ProjectId(0);

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

impl Display for ProjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// Derived project state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// No member tasks, or at least one active member.
    Active,
    /// Every member task is done or deleted.
    Completed,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl Display for ProjectStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub due: Due,
    pub priority: u8,
    /// User-assigned base weight distributed over member tasks.
    pub importance: u32,
    pub created: NaiveDateTime,
}

impl Project {
    /// Default record for an id with no persisted state.
    pub fn newborn(id: ProjectId, name: impl Into<String>, created: NaiveDateTime) -> Self {
        let name = name.into();
        Self {
            id,
            description: format!("{name}\n"),
            name,
            due: Due::Never,
            priority: 0,
            importance: DEFAULT_PROJECT_IMPORTANCE,
            created,
        }
    }

    pub fn title(&self) -> &str {
        self.description.lines().next().unwrap_or_default()
    }
}
