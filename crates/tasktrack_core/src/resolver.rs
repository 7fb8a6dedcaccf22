//! Identity resolution for user-supplied tokens.
//!
//! # Responsibility
//! - Map a task token (numeric id) or a project token (id or name fragment)
//!   to exactly one record id.
//!
//! # Invariants
//! - Resolution is read-only and idempotent: resolving the rendered id of a
//!   resolved record yields the same id.
//! - Project name matching is case-sensitive.

use crate::model::project::ProjectId;
use crate::model::task::TaskId;
use crate::store::EntityStore;
use thiserror::Error;

/// Token that does not map to exactly one record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no task numbered \"{0}\"")]
    TaskNotFound(String),
    #[error("no project matching \"{0}\"")]
    ProjectNotFound(String),
    #[error("ambiguous name \"{token}\" for project: matches {}", .candidates.join(", "))]
    AmbiguousProject {
        token: String,
        candidates: Vec<String>,
    },
}

/// Resolves a task token by exact numeric id (`7`, `0007`).
pub fn resolve_task(store: &EntityStore, token: &str) -> Result<TaskId, ResolveError> {
    let trimmed = token.trim();
    let Ok(value) = trimmed.parse::<u32>() else {
        return Err(ResolveError::TaskNotFound(trimmed.to_string()));
    };

    let id = TaskId::new(value);
    match store.task(id) {
        Some(task) => Ok(task.id),
        None => Err(ResolveError::TaskNotFound(trimmed.to_string())),
    }
}

/// Resolves a project token.
///
/// Order of precedence:
/// 1. an all-digit token equal to an existing project id;
/// 2. a project whose name equals the token;
/// 3. the single project whose name contains the token.
pub fn resolve_project(store: &EntityStore, token: &str) -> Result<ProjectId, ResolveError> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(ResolveError::ProjectNotFound(trimmed.to_string()));
    }

    if trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
        if let Some(project) = trimmed
            .parse::<u32>()
            .ok()
            .and_then(|value| store.project(ProjectId::new(value)))
        {
            return Ok(project.id);
        }
    }

    if let Some(project) = store.project_by_name(trimmed) {
        return Ok(project.id);
    }

    let matches: Vec<_> = store
        .projects()
        .filter(|project| project.name.contains(trimmed))
        .collect();

    match matches.as_slice() {
        [] => Err(ResolveError::ProjectNotFound(trimmed.to_string())),
        [project] => Ok(project.id),
        many => Err(ResolveError::AmbiguousProject {
            token: trimmed.to_string(),
            candidates: many.iter().map(|project| project.name.clone()).collect(),
        }),
    }
}
