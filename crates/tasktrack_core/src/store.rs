//! In-memory entity store with change-aware flushing.
//!
//! # Responsibility
//! - Hold every task and project record for one tracker invocation.
//! - Synthesize newborn records for ids with no persisted state.
//! - Write back only records that differ from what was loaded, in a single
//!   transaction.
//!
//! # Invariants
//! - Mutations never touch disk until `flush`.
//! - After `flush`, the persisted snapshot equals the in-memory state.
//! - The store performs no business validation.

use crate::model::project::{Project, ProjectId};
use crate::model::task::{Task, TaskId};
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::repo::RepoResult;
use chrono::NaiveDateTime;
use log::{error, info};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::collections::BTreeMap;
use std::time::Instant;

/// Record ids written (or pending) in one flush.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub tasks: Vec<TaskId>,
    pub projects: Vec<ProjectId>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.projects.is_empty()
    }
}

/// Canonical owner of task and project records.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    tasks: BTreeMap<TaskId, Task>,
    projects: BTreeMap<ProjectId, Project>,
    persisted_tasks: BTreeMap<TaskId, Task>,
    persisted_projects: BTreeMap<ProjectId, Project>,
}

impl EntityStore {
    /// Loads every record from a migrated connection.
    pub fn load(conn: &Connection) -> RepoResult<Self> {
        let tasks: BTreeMap<TaskId, Task> = SqliteTaskRepository::try_new(conn)?
            .list_tasks()?
            .into_iter()
            .map(|task| (task.id, task))
            .collect();
        let projects: BTreeMap<ProjectId, Project> = SqliteProjectRepository::try_new(conn)?
            .list_projects()?
            .into_iter()
            .map(|project| (project.id, project))
            .collect();

        info!(
            "event=store_load module=store status=ok tasks={} projects={}",
            tasks.len(),
            projects.len()
        );

        Ok(Self {
            persisted_tasks: tasks.clone(),
            persisted_projects: projects.clone(),
            tasks,
            projects,
        })
    }

    /// Next free task id: max existing + 1, or `0000`.
    pub fn next_task_id(&self) -> TaskId {
        self.tasks
            .keys()
            .next_back()
            .map_or(TaskId::FIRST, |id| id.next())
    }

    /// Next free project id: max existing + 1, or `0000`.
    pub fn next_project_id(&self) -> ProjectId {
        self.projects
            .keys()
            .next_back()
            .map_or(ProjectId::FIRST, |id| id.next())
    }

    /// Returns the record for `id`, inserting a newborn one if none exists.
    pub fn create_task(&mut self, id: TaskId, now: NaiveDateTime) -> &mut Task {
        self.tasks
            .entry(id)
            .or_insert_with(|| Task::newborn(id, now))
    }

    /// Returns the record for `id`, inserting a newborn one if none exists.
    pub fn create_project(
        &mut self,
        id: ProjectId,
        name: &str,
        now: NaiveDateTime,
    ) -> &mut Project {
        self.projects
            .entry(id)
            .or_insert_with(|| Project::newborn(id, name, now))
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(&id)
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.get(&id)
    }

    pub fn project_mut(&mut self, id: ProjectId) -> Option<&mut Project> {
        self.projects.get_mut(&id)
    }

    pub fn project_by_name(&self, name: &str) -> Option<&Project> {
        self.projects.values().find(|project| project.name == name)
    }

    /// Tasks in ascending id order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Projects in ascending id order.
    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.keys().copied().collect()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Records that differ from the persisted snapshot.
    pub fn pending_changes(&self) -> ChangeSet {
        ChangeSet {
            tasks: self
                .tasks
                .iter()
                .filter(|(id, task)| self.persisted_tasks.get(*id) != Some(*task))
                .map(|(id, _)| *id)
                .collect(),
            projects: self
                .projects
                .iter()
                .filter(|(id, project)| self.persisted_projects.get(*id) != Some(*project))
                .map(|(id, _)| *id)
                .collect(),
        }
    }

    /// Writes every changed record in one transaction.
    ///
    /// Returns the ids actually written; an empty set means no I/O happened.
    pub fn flush(&mut self, conn: &Connection) -> RepoResult<ChangeSet> {
        let changes = self.pending_changes();
        if changes.is_empty() {
            return Ok(changes);
        }

        let started_at = Instant::now();
        let result = self.write_changes(conn, &changes);
        match &result {
            Ok(()) => info!(
                "event=store_flush module=store status=ok tasks={} projects={} duration_ms={}",
                changes.tasks.len(),
                changes.projects.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=store_flush module=store status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result?;

        for id in &changes.tasks {
            if let Some(task) = self.tasks.get(id) {
                self.persisted_tasks.insert(*id, task.clone());
            }
        }
        for id in &changes.projects {
            if let Some(project) = self.projects.get(id) {
                self.persisted_projects.insert(*id, project.clone());
            }
        }

        Ok(changes)
    }

    fn write_changes(&self, conn: &Connection, changes: &ChangeSet) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        {
            let project_repo = SqliteProjectRepository::try_new(&tx)?;
            for id in &changes.projects {
                if let Some(project) = self.projects.get(id) {
                    project_repo.upsert_project(project)?;
                }
            }

            let task_repo = SqliteTaskRepository::try_new(&tx)?;
            for id in &changes.tasks {
                if let Some(task) = self.tasks.get(id) {
                    task_repo.upsert_task(task)?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}
