//! `$VISUAL`/`$EDITOR` backed description prompt.

use std::fs;
use std::io::Write;
use std::process::Command;
use tasktrack_core::{DescriptionEditor, EditorError};

const FALLBACK_EDITOR: &str = "vi";

/// Opens the user's editor on a temporary file seeded with the initial text.
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    pub fn from_env() -> Self {
        let command = ["VISUAL", "EDITOR"]
            .iter()
            .filter_map(|key| std::env::var(key).ok())
            .find(|value| !value.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_EDITOR.to_string());
        Self { command }
    }

    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl DescriptionEditor for ExternalEditor {
    fn prompt(&self, initial: &str) -> Result<String, EditorError> {
        let mut parts = self.command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| EditorError("editor command is empty".to_string()))?;

        let mut file = tempfile::Builder::new()
            .prefix("tasktrack-")
            .suffix(".txt")
            .tempfile()
            .map_err(|err| EditorError(format!("failed to create temporary file: {err}")))?;
        file.write_all(initial.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|err| EditorError(format!("failed to seed temporary file: {err}")))?;

        let status = Command::new(program)
            .args(parts)
            .arg(file.path())
            .status()
            .map_err(|err| EditorError(format!("failed to launch `{program}`: {err}")))?;
        if !status.success() {
            return Err(EditorError(format!("`{program}` exited with {status}")));
        }

        fs::read_to_string(file.path())
            .map_err(|err| EditorError(format!("failed to read edited text: {err}")))
    }
}
