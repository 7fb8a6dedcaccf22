//! Project repository contract and SQLite implementation.
//!
//! One row per project, keyed by numeric id. Tasks reference projects by id,
//! so renaming a project touches exactly one row.

use crate::model::dates::{format_timestamp, parse_timestamp, Due};
use crate::model::project::{Project, ProjectId};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    due,
    priority,
    importance,
    created
FROM projects";

/// Repository interface for project records.
pub trait ProjectRepository {
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
    fn upsert_project(&self, project: &Project) -> RepoResult<()>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();

        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }

        Ok(projects)
    }

    fn upsert_project(&self, project: &Project) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO projects (
                id,
                name,
                description,
                due,
                priority,
                importance,
                created
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                due = excluded.due,
                priority = excluded.priority,
                importance = excluded.importance,
                created = excluded.created;",
            params![
                project.id.value(),
                project.name.as_str(),
                project.description.as_str(),
                project.due.to_stored(),
                project.priority,
                project.importance,
                format_timestamp(project.created),
            ],
        )?;
        Ok(())
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let id = ProjectId::new(row.get("id")?);

    let due_text: String = row.get("due")?;
    let due = Due::from_stored(&due_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid due date `{due_text}` in projects.due of {id}"))
    })?;

    let created_text: String = row.get("created")?;
    let created = parse_timestamp(&created_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid timestamp `{created_text}` in projects.created of {id}"
        ))
    })?;

    Ok(Project {
        id,
        name: row.get("name")?,
        description: row.get("description")?,
        due,
        priority: row.get("priority")?,
        importance: row.get("importance")?,
        created,
    })
}
