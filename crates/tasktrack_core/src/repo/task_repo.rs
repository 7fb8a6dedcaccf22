//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Read and write whole task records in the `tasks` table.
//! - Encode id sets as JSON arrays and dates as stable text.
//!
//! # Invariants
//! - `upsert_task` replaces the full row; partial column updates do not exist.
//! - Rows that fail to decode surface as `RepoError::InvalidData`.

use crate::model::dates::{format_timestamp, parse_timestamp, Due};
use crate::model::task::{Task, TaskId, TaskStatus};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use serde::de::DeserializeOwned;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    description,
    status,
    following,
    followers,
    projects,
    time,
    priority,
    due,
    created,
    completed,
    deleted
FROM tasks";

/// Repository interface for task records.
pub trait TaskRepository {
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    fn upsert_task(&self, task: &Task) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn upsert_task(&self, task: &Task) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO tasks (
                id,
                description,
                status,
                following,
                followers,
                projects,
                time,
                priority,
                due,
                created,
                completed,
                deleted
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(id) DO UPDATE SET
                description = excluded.description,
                status = excluded.status,
                following = excluded.following,
                followers = excluded.followers,
                projects = excluded.projects,
                time = excluded.time,
                priority = excluded.priority,
                due = excluded.due,
                created = excluded.created,
                completed = excluded.completed,
                deleted = excluded.deleted;",
            params![
                task.id.value(),
                task.description.as_str(),
                task.status.as_str(),
                encode_ids(&task.following)?,
                encode_ids(&task.followers)?,
                encode_ids(&task.projects)?,
                task.time,
                task.priority,
                task.due.to_stored(),
                format_timestamp(task.created),
                task.completed.map(format_timestamp),
                task.deleted.map(format_timestamp),
            ],
        )?;
        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id = TaskId::new(row.get("id")?);

    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in tasks.status of {id}"))
    })?;

    let due_text: String = row.get("due")?;
    let due = Due::from_stored(&due_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid due date `{due_text}` in tasks.due of {id}"))
    })?;

    let created_text: String = row.get("created")?;
    let created = parse_timestamp(&created_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid timestamp `{created_text}` in tasks.created of {id}"
        ))
    })?;

    Ok(Task {
        id,
        description: row.get("description")?,
        status,
        following: decode_json(row, "following", id)?,
        followers: decode_json(row, "followers", id)?,
        projects: decode_json(row, "projects", id)?,
        time: row.get("time")?,
        priority: row.get("priority")?,
        due,
        created,
        completed: optional_timestamp(row, "completed", id)?,
        deleted: optional_timestamp(row, "deleted", id)?,
    })
}

fn encode_ids<T: serde::Serialize>(ids: &T) -> RepoResult<String> {
    serde_json::to_string(ids)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode id set: {err}")))
}

fn decode_json<T: DeserializeOwned>(row: &Row<'_>, column: &str, id: TaskId) -> RepoResult<T> {
    let text: String = row.get(column)?;
    serde_json::from_str(&text).map_err(|err| {
        RepoError::InvalidData(format!("invalid JSON in tasks.{column} of {id}: {err}"))
    })
}

fn optional_timestamp(
    row: &Row<'_>,
    column: &str,
    id: TaskId,
) -> RepoResult<Option<chrono::NaiveDateTime>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => parse_timestamp(&text).map(Some).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid timestamp `{text}` in tasks.{column} of {id}"))
        }),
        None => Ok(None),
    }
}
