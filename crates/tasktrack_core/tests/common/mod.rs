#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use tasktrack_core::service::{DescriptionEditor, EditorError, FixedClock};
use tasktrack_core::{
    AddProjectRequest, AddTaskRequest, TaskId, TrackerConfig, TrackerService, VcsError,
    VersionedPersistence,
};

/// Captures commit messages instead of touching git.
#[derive(Debug, Clone, Default)]
pub struct RecordingCommitter {
    messages: Rc<RefCell<Vec<String>>>,
}

impl RecordingCommitter {
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl VersionedPersistence for RecordingCommitter {
    fn commit(&self, _path: &Path, message: &str) -> Result<(), VcsError> {
        self.messages.borrow_mut().push(message.to_string());
        Ok(())
    }
}

/// Editor that answers every prompt with a fixed text and keeps the prompts.
#[derive(Debug, Clone)]
pub struct ScriptedEditor {
    reply: String,
    prompts: Rc<RefCell<Vec<String>>>,
}

impl ScriptedEditor {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Rc::default(),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl DescriptionEditor for ScriptedEditor {
    fn prompt(&self, initial: &str) -> Result<String, EditorError> {
        self.prompts.borrow_mut().push(initial.to_string());
        Ok(self.reply.clone())
    }
}

pub struct Harness {
    pub tracker: TrackerService,
    pub commits: RecordingCommitter,
    pub clock: FixedClock,
    pub editor: ScriptedEditor,
}

pub fn start() -> NaiveDateTime {
    today().and_hms_opt(9, 0, 0).unwrap()
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

/// `today + days` rendered as `YYYY-MM-DD`.
pub fn in_days(days: i64) -> String {
    (today() + Duration::days(days)).format("%Y-%m-%d").to_string()
}

pub fn harness() -> Harness {
    let commits = RecordingCommitter::default();
    let clock = FixedClock::new(start());
    let editor = ScriptedEditor::replying("typed in the editor");
    let tracker = TrackerService::in_memory(TrackerConfig::default())
        .unwrap()
        .with_clock(clock.clone())
        .with_committer(commits.clone())
        .with_editor(editor.clone());
    Harness {
        tracker,
        commits,
        clock,
        editor,
    }
}

pub fn add_task(tracker: &mut TrackerService, description: &str) -> TaskId {
    tracker
        .add_task(AddTaskRequest {
            description: Some(description.to_string()),
            ..AddTaskRequest::default()
        })
        .unwrap()
        .value
}

pub fn add_project(tracker: &mut TrackerService, name: &str, due: Option<String>) {
    tracker
        .add_project(AddProjectRequest {
            name: name.to_string(),
            description: Some(format!("{name} project")),
            due,
            ..AddProjectRequest::default()
        })
        .unwrap();
}
