use crate::db::DbError;
use crate::model::dates::DateParseError;
use crate::model::task::TransitionError;
use crate::relations::LinkError;
use crate::repo::RepoError;
use crate::resolver::ResolveError;
use crate::service::editor::EditorError;
use thiserror::Error;

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Error for tracker use-cases. Every variant is terminal for the command.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Input rejected before any mutation.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Ambiguous(String),
    /// Input conflicts with existing records, e.g. a due date past a project's.
    #[error("{0}")]
    Constraint(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("editor failed: {0}")]
    Editor(String),
}

impl From<DbError> for TrackerError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

impl From<ResolveError> for TrackerError {
    fn from(value: ResolveError) -> Self {
        match value {
            ResolveError::AmbiguousProject { .. } => Self::Ambiguous(value.to_string()),
            ResolveError::TaskNotFound(_) | ResolveError::ProjectNotFound(_) => {
                Self::NotFound(value.to_string())
            }
        }
    }
}

impl From<LinkError> for TrackerError {
    fn from(value: LinkError) -> Self {
        match value {
            LinkError::SelfLink(_) => Self::Validation(value.to_string()),
            LinkError::MissingTask(_) => Self::NotFound(value.to_string()),
        }
    }
}

impl From<TransitionError> for TrackerError {
    fn from(value: TransitionError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<DateParseError> for TrackerError {
    fn from(value: DateParseError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<EditorError> for TrackerError {
    fn from(value: EditorError) -> Self {
        Self::Editor(value.0)
    }
}
