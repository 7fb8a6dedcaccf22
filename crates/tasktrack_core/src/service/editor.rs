//! Long-form description input.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EditorError(pub String);

/// Interactive source of descriptions, typically an external text editor.
pub trait DescriptionEditor {
    /// Returns the edited text, starting from `initial`.
    fn prompt(&self, initial: &str) -> Result<String, EditorError>;
}

/// Editor for non-interactive use: always refuses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEditor;

impl DescriptionEditor for NoEditor {
    fn prompt(&self, _initial: &str) -> Result<String, EditorError> {
        Err(EditorError(
            "a description is required and no editor is available".to_string(),
        ))
    }
}
