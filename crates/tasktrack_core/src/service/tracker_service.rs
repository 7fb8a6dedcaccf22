//! Tracker use-case orchestration.
//!
//! # Responsibility
//! - Sequence every mutation as resolve, validate, mutate, synchronize,
//!   rescore, flush, commit.
//! - Answer listing, detail and report queries with fresh scores.
//!
//! # Invariants
//! - Mutations run against a draft copy of the store. A failed call leaves
//!   both the in-memory store and the record file untouched.
//! - At most one flush and one history commit per call; no commit when the
//!   flush wrote nothing.

use crate::config::TrackerConfig;
use crate::db::{open_db, open_db_in_memory, DB_FILE_NAME};
use crate::model::dates::Due;
use crate::model::project::{Project, ProjectId, ProjectStatus, DEFAULT_PROJECT_IMPORTANCE};
use crate::model::task::{Task, TaskId, TransitionError, DEFAULT_TIME_HOURS};
use crate::relations::{
    link_precedence, propagate_memberships, set_followers, set_following, SyncReport,
};
use crate::resolver::{resolve_project, resolve_task};
use crate::scoring::{score_all, CycleDetected, ScoreReport};
use crate::service::clock::{Clock, SystemClock};
use crate::service::editor::{DescriptionEditor, NoEditor};
use crate::service::error::{TrackerError, TrackerResult};
use crate::service::query::{
    AddProjectRequest, AddTaskRequest, EditProjectRequest, EditTaskRequest, Outcome,
    ProjectListQuery, ProjectPriority, ProjectView, Report, SortKey, Stats, TaskListQuery,
    TaskView,
};
use crate::service::validation::{
    normalize_description, normalize_priority, parse_due, parse_future_date,
    validate_project_name, validate_time,
};
use crate::store::EntityStore;
use crate::vcs::{GitCommitter, NoopCommitter, VersionedPersistence};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::{info, warn};
use rusqlite::Connection;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

const MIN_PRIORITY_URGENCY: f64 = 0.0001;

/// Task and project tracker over one record file.
pub struct TrackerService {
    conn: Connection,
    record_path: PathBuf,
    store: EntityStore,
    config: TrackerConfig,
    clock: Box<dyn Clock>,
    committer: Box<dyn VersionedPersistence>,
    editor: Box<dyn DescriptionEditor>,
}

impl TrackerService {
    /// Opens (creating if needed) the record file at `record_path`.
    ///
    /// History mirroring goes to a git repository in the record file's
    /// directory when `config.git_commit` is set.
    pub fn open(record_path: &Path, config: TrackerConfig) -> TrackerResult<Self> {
        let conn = open_db(record_path)?;
        let committer: Box<dyn VersionedPersistence> = match record_path.parent() {
            Some(dir) if config.git_commit => Box::new(GitCommitter::new(dir)),
            _ => Box::new(NoopCommitter),
        };
        Self::from_connection(conn, record_path.to_path_buf(), config, committer)
    }

    /// Tracker over a private in-memory database; history is disabled.
    pub fn in_memory(config: TrackerConfig) -> TrackerResult<Self> {
        let conn = open_db_in_memory()?;
        Self::from_connection(
            conn,
            PathBuf::from(DB_FILE_NAME),
            config,
            Box::new(NoopCommitter),
        )
    }

    fn from_connection(
        conn: Connection,
        record_path: PathBuf,
        config: TrackerConfig,
        committer: Box<dyn VersionedPersistence>,
    ) -> TrackerResult<Self> {
        config
            .validate()
            .map_err(|err| TrackerError::Validation(err.to_string()))?;

        let mut store = EntityStore::load(&conn)?;
        let sync = propagate_memberships(&mut store);
        if !sync.dangling_edges.is_empty() || sync.backfilled_edges > 0 {
            warn!(
                "event=tracker_open module=service status=warn reason=inconsistent_records backfilled={} dangling={}",
                sync.backfilled_edges,
                sync.dangling_edges.len()
            );
        }

        Ok(Self {
            conn,
            record_path,
            store,
            config,
            clock: Box::new(SystemClock),
            committer,
            editor: Box::new(NoEditor),
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_committer(mut self, committer: impl VersionedPersistence + 'static) -> Self {
        self.committer = Box::new(committer);
        self
    }

    pub fn with_editor(mut self, editor: impl DescriptionEditor + 'static) -> Self {
        self.editor = Box::new(editor);
        self
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Scores and cycle diagnostics as of the clock's current day.
    pub fn scores(&self) -> ScoreReport {
        score_all(
            &self.store,
            self.clock.today(),
            self.config.working_hours_per_day,
        )
    }

    /// Dependency cycles among active project members.
    pub fn cycles(&self) -> Vec<CycleDetected> {
        self.scores().cycles
    }

    // ---- mutations -------------------------------------------------------

    pub fn add_task(&mut self, request: AddTaskRequest) -> TrackerResult<Outcome<TaskId>> {
        let now = self.clock.now();
        let today = now.date();

        let existing_projects = self.resolve_projects(&request.projects)?;
        self.validate_new_project_names(&request.new_projects)?;
        let after = self.resolve_tasks(&request.after)?;
        let before = self.resolve_tasks(&request.before)?;

        let time = validate_time(request.time.unwrap_or(DEFAULT_TIME_HOURS))?;
        let priority = normalize_priority(request.priority.unwrap_or(0));
        let due = match &request.due {
            Some(input) => parse_due(input, today, request.force)?,
            None => Due::Never,
        };
        let created = match &request.wait {
            Some(input) => parse_future_date(input, today, request.force)?.and_time(NaiveTime::MIN),
            None => now,
        };
        let description = self.description_or_prompt(request.description.as_deref(), "")?;

        let mut draft = self.store.clone();
        let mut warnings = Vec::new();

        let mut projects = existing_projects;
        for name in &request.new_projects {
            let id = draft.next_project_id();
            draft.create_project(id, name, now);
            projects.insert(id);
        }
        enforce_project_dues(&mut draft, due, &projects, request.force, &mut warnings)?;

        let id = draft.next_task_id();
        let task = draft.create_task(id, created);
        task.description = description;
        task.projects = projects;
        task.time = time;
        task.priority = priority;
        task.due = due;

        for dependency in &after {
            link_precedence(&mut draft, *dependency, id)?;
        }
        for dependent in &before {
            link_precedence(&mut draft, id, *dependent)?;
        }

        let default_message = format!("Add task \"{id}\"");
        self.persist("add_task", draft, id, warnings, request.force, request.message, default_message)
    }

    pub fn edit_task(
        &mut self,
        token: &str,
        request: EditTaskRequest,
    ) -> TrackerResult<Outcome<TaskId>> {
        let now = self.clock.now();
        let today = now.date();
        let id = resolve_task(&self.store, token)?;

        if request.changes_membership() && request.changes_edges() {
            return Err(TrackerError::Validation(
                "cannot modify projects and dependencies at the same time".to_string(),
            ));
        }
        if request.due.is_some() && request.clear_due {
            return Err(TrackerError::Validation(
                "cannot set and clear the due date at the same time".to_string(),
            ));
        }

        let existing_projects = self.resolve_projects(&request.projects)?;
        self.validate_new_project_names(&request.new_projects)?;
        if request.replace && request.changes_membership() {
            self.ensure_droppable(id, &existing_projects)?;
        }
        let after = self.resolve_tasks(&request.after)?;
        let before = self.resolve_tasks(&request.before)?;
        let time = request.time.map(validate_time).transpose()?;
        let due = match (&request.due, request.clear_due) {
            (Some(input), _) => Some(parse_due(input, today, request.force)?),
            (None, true) => Some(Due::Never),
            (None, false) => None,
        };
        let created = request
            .wait
            .as_deref()
            .map(|input| parse_future_date(input, today, request.force))
            .transpose()?
            .map(|date| date.and_time(NaiveTime::MIN));

        let description = match (&request.description, request.is_description_only()) {
            (Some(text), _) => Some(normalize_description(text)?),
            (None, true) => {
                let current = self.task_or_not_found(id)?.description.clone();
                Some(self.description_or_prompt(None, &current)?)
            }
            (None, false) => None,
        };

        let mut draft = self.store.clone();
        let mut warnings = Vec::new();

        let mut added_projects = existing_projects;
        for name in &request.new_projects {
            let project_id = draft.next_project_id();
            draft.create_project(project_id, name, now);
            added_projects.insert(project_id);
        }

        let (final_due, final_projects) = {
            let task = draft
                .task_mut(id)
                .ok_or_else(|| TrackerError::NotFound(format!("no task numbered \"{id}\"")))?;
            if let Some(description) = description {
                task.description = description;
            }
            if let Some(time) = time {
                task.time = time;
            }
            if let Some(priority) = request.priority {
                task.priority = normalize_priority(priority);
            }
            if let Some(due) = due {
                task.due = due;
            }
            if let Some(created) = created {
                task.created = created;
            }
            if request.changes_membership() {
                if request.replace {
                    task.projects = added_projects;
                } else {
                    task.projects.extend(added_projects);
                }
            }
            (task.due, task.projects.clone())
        };

        if due.is_some() || request.changes_membership() {
            enforce_project_dues(&mut draft, final_due, &final_projects, request.force, &mut warnings)?;
        }

        if request.replace {
            if !request.after.is_empty() {
                set_following(&mut draft, id, &after)?;
            }
            if !request.before.is_empty() {
                set_followers(&mut draft, id, &before)?;
            }
        } else {
            for dependency in &after {
                link_precedence(&mut draft, *dependency, id)?;
            }
            for dependent in &before {
                link_precedence(&mut draft, id, *dependent)?;
            }
        }

        let default_message = format!("Edit task \"{id}\"");
        self.persist("edit_task", draft, id, warnings, request.force, request.message, default_message)
    }

    /// `Todo -> InProgress`.
    pub fn mark_in_progress(
        &mut self,
        token: &str,
        message: Option<String>,
    ) -> TrackerResult<Outcome<TaskId>> {
        self.transition(token, message, "mark_in_progress", |task, _| task.start(), |id| {
            format!("Mark task \"{id}\" as in-progress")
        })
    }

    pub fn mark_done(&mut self, token: &str, message: Option<String>) -> TrackerResult<Outcome<TaskId>> {
        self.transition(token, message, "mark_done", |task, now| task.complete(now), |id| {
            format!("Mark task \"{id}\" as done")
        })
    }

    pub fn restore(&mut self, token: &str, message: Option<String>) -> TrackerResult<Outcome<TaskId>> {
        self.transition(token, message, "restore", |task, _| task.restore(), |id| {
            format!("Restore task \"{id}\"")
        })
    }

    pub fn delete(&mut self, token: &str, message: Option<String>) -> TrackerResult<Outcome<TaskId>> {
        self.transition(token, message, "delete", |task, now| task.delete(now), |id| {
            format!("Delete task \"{id}\"")
        })
    }

    pub fn add_project(&mut self, request: AddProjectRequest) -> TrackerResult<Outcome<ProjectId>> {
        let now = self.clock.now();
        let today = now.date();

        let name = request.name.trim().to_string();
        validate_project_name(&name, self.store.project_by_name(&name).is_some())?;
        let due = match &request.due {
            Some(input) => parse_due(input, today, request.force)?,
            None => Due::Never,
        };
        let description =
            self.description_or_prompt(request.description.as_deref(), &format!("{name}\n"))?;

        let mut draft = self.store.clone();
        let id = draft.next_project_id();
        let project = draft.create_project(id, &name, now);
        project.description = description;
        project.due = due;
        project.priority = normalize_priority(request.priority.unwrap_or(0));
        project.importance = request.importance.unwrap_or(DEFAULT_PROJECT_IMPORTANCE);

        let default_message = format!("Add project \"{name}\"");
        self.persist("add_project", draft, id, Vec::new(), false, request.message, default_message)
    }

    pub fn edit_project(
        &mut self,
        token: &str,
        request: EditProjectRequest,
    ) -> TrackerResult<Outcome<ProjectId>> {
        let today = self.clock.today();
        let id = resolve_project(&self.store, token)?;

        if request.due.is_some() && request.clear_due {
            return Err(TrackerError::Validation(
                "cannot set and clear the due date at the same time".to_string(),
            ));
        }

        let current = self
            .store
            .project(id)
            .ok_or_else(|| TrackerError::NotFound(format!("no project numbered \"{id}\"")))?
            .clone();

        let rename = match &request.rename {
            Some(name) if name.trim() != current.name => {
                let name = name.trim().to_string();
                validate_project_name(&name, self.store.project_by_name(&name).is_some())?;
                Some(name)
            }
            _ => None,
        };
        let due = match (&request.due, request.clear_due) {
            (Some(input), _) => Some(parse_due(input, today, request.force)?),
            (None, true) => Some(Due::Never),
            (None, false) => None,
        };
        let description = match (&request.description, request.is_description_only()) {
            (Some(text), _) => Some(normalize_description(text)?),
            (None, true) => Some(self.description_or_prompt(None, &current.description)?),
            (None, false) => None,
        };

        let mut draft = self.store.clone();
        let mut warnings = Vec::new();
        if let Some(due) = due {
            enforce_member_dues(&mut draft, &current, due, request.force, &mut warnings)?;
        }

        let name = {
            let project = draft
                .project_mut(id)
                .ok_or_else(|| TrackerError::NotFound(format!("no project numbered \"{id}\"")))?;
            if let Some(name) = rename {
                project.name = name;
            }
            if let Some(description) = description {
                project.description = description;
            }
            if let Some(due) = due {
                project.due = due;
            }
            if let Some(priority) = request.priority {
                project.priority = normalize_priority(priority);
            }
            if let Some(importance) = request.importance {
                project.importance = importance;
            }
            project.name.clone()
        };

        let default_message = format!("Edit project \"{name}\"");
        self.persist("edit_project", draft, id, warnings, request.force, request.message, default_message)
    }

    /// Repairs edges, propagates memberships and persists whatever changed.
    pub fn refresh(&mut self, message: Option<String>) -> TrackerResult<Outcome<SyncReport>> {
        let mut draft = self.store.clone();
        let report = propagate_memberships(&mut draft);
        let mut outcome = self.persist(
            "refresh",
            draft,
            report,
            Vec::new(),
            true,
            message,
            "Refresh tracker".to_string(),
        )?;
        let dangling: Vec<String> = outcome.value.dangling_edges.iter().map(dangling_warning).collect();
        outcome.warnings.extend(dangling);
        Ok(outcome)
    }

    // ---- queries ---------------------------------------------------------

    pub fn show_task(&self, token: &str) -> TrackerResult<TaskView> {
        let id = resolve_task(&self.store, token)?;
        let scores = self.scores();
        let task = self.task_or_not_found(id)?;
        Ok(self.task_view(task, &scores))
    }

    pub fn show_project(&self, token: &str) -> TrackerResult<ProjectView> {
        let id = resolve_project(&self.store, token)?;
        let scores = self.scores();
        let project = self
            .store
            .project(id)
            .ok_or_else(|| TrackerError::NotFound(format!("no project numbered \"{id}\"")))?;
        Ok(self.project_view(project, &scores))
    }

    /// Filtered, sorted and paginated tasks; in-progress tasks come first.
    pub fn list_tasks(&self, query: &TaskListQuery) -> TrackerResult<Vec<TaskView>> {
        let now = self.clock.now();
        let wanted_projects = self.resolve_projects(&query.projects)?;
        let scores = self.scores();

        let mut views: Vec<TaskView> = self
            .store
            .tasks()
            .filter(|task| task.is_scheduled(now) == query.waiting)
            .filter(|task| {
                (task.is_active() && query.include_active)
                    || (task.is_completed() && query.include_completed)
                    || (task.is_deleted() && query.include_deleted)
            })
            .filter(|task| {
                query
                    .text
                    .as_deref()
                    .map_or(true, |text| task.description.contains(text))
            })
            .filter(|task| {
                query.project_text.as_deref().map_or(true, |text| {
                    task.projects
                        .iter()
                        .filter_map(|id| self.store.project(*id))
                        .any(|project| project.description.contains(text))
                })
            })
            .filter(|task| {
                wanted_projects.is_empty() || !task.projects.is_disjoint(&wanted_projects)
            })
            .map(|task| self.task_view(task, &scores))
            .collect();

        views.sort_by(|left, right| {
            right
                .task
                .is_in_progress()
                .cmp(&left.task.is_in_progress())
                .then_with(|| query.sort.compare(task_key(left), task_key(right)))
        });

        Ok(paginate(views, query.offset, query.limit))
    }

    pub fn list_projects(&self, query: &ProjectListQuery) -> TrackerResult<Vec<ProjectView>> {
        let scores = self.scores();
        let include_completed = query.include_completed || query.text.is_some();

        let mut views: Vec<ProjectView> = self
            .store
            .projects()
            .map(|project| self.project_view(project, &scores))
            .filter(|view| match view.status {
                ProjectStatus::Active => query.include_active,
                ProjectStatus::Completed => include_completed,
            })
            .filter(|view| {
                query.text.as_deref().map_or(true, |text| {
                    view.project.name.contains(text) || view.project.description.contains(text)
                })
            })
            .collect();

        views.sort_by(|left, right| query.sort.compare(project_key(left), project_key(right)));
        Ok(paginate(views, query.offset, query.limit))
    }

    /// Tasks completed between `start` and `end`, both inclusive.
    pub fn report(&self, start: NaiveDate, end: NaiveDate) -> TrackerResult<Report> {
        if start > end {
            return Err(TrackerError::Validation(format!(
                "report range starts after it ends: {start} > {end}"
            )));
        }
        let scores = self.scores();

        let mut tasks: Vec<&Task> = self
            .store
            .tasks()
            .filter(|task| task.time > 0.0)
            .filter(|task| {
                task.completed
                    .map(|at| (start..=end).contains(&at.date()))
                    .unwrap_or(false)
            })
            .collect();
        tasks.sort_by_key(|task| (task.completed, task.id));

        let total_hours = tasks.iter().map(|task| task.time).sum();
        Ok(Report {
            start,
            end,
            tasks: tasks
                .into_iter()
                .map(|task| self.task_view(task, &scores))
                .collect(),
            total_hours,
        })
    }

    pub fn stats(&self) -> Stats {
        let scores = self.scores();
        let mut stats = Stats {
            total_projects: self.store.projects().count(),
            active_projects: self
                .store
                .projects()
                .filter(|project| scores.scores.project(project.id).status == ProjectStatus::Active)
                .count(),
            ..Stats::default()
        };

        for task in self.store.tasks() {
            if task.is_in_progress() {
                stats.in_progress.add(task.time);
            }
            if task.is_active() {
                stats.active.add(task.time);
            }
            if task.is_completed() {
                stats.completed.add(task.time);
            }
        }
        stats
    }

    /// Splits attention between the two most urgent active projects.
    pub fn project_priorities(&self) -> Vec<ProjectPriority> {
        let scores = self.scores();
        let mut active: Vec<ProjectView> = self
            .store
            .projects()
            .map(|project| self.project_view(project, &scores))
            .filter(|view| view.status == ProjectStatus::Active)
            .collect();
        active.sort_by(|left, right| SortKey::Urgency.compare(project_key(left), project_key(right)));

        let priority = |view: &ProjectView, share: f64| ProjectPriority {
            project: view.project.id,
            name: view.project.name.clone(),
            title: view.project.title().to_string(),
            share,
        };

        match active.as_slice() {
            [] => Vec::new(),
            [only] => vec![priority(only, 1.0)],
            [first, second, ..] => {
                let u0 = f64::from(first.urgency).max(MIN_PRIORITY_URGENCY);
                let u1 = f64::from(second.urgency).max(MIN_PRIORITY_URGENCY);
                let mut shares = vec![
                    priority(first, u0 / (u0 + u1)),
                    priority(second, u1 / (u0 + u1)),
                ];
                shares.sort_by(|left, right| right.share.total_cmp(&left.share));
                shares
            }
        }
    }

    // ---- helpers ---------------------------------------------------------

    fn transition<F, M>(
        &mut self,
        token: &str,
        message: Option<String>,
        op: &'static str,
        apply: F,
        default_message: M,
    ) -> TrackerResult<Outcome<TaskId>>
    where
        F: FnOnce(&mut Task, NaiveDateTime) -> Result<(), TransitionError>,
        M: FnOnce(TaskId) -> String,
    {
        let now = self.clock.now();
        let id = resolve_task(&self.store, token)?;

        let mut draft = self.store.clone();
        let task = draft
            .task_mut(id)
            .ok_or_else(|| TrackerError::NotFound(format!("no task numbered \"{id}\"")))?;
        apply(task, now)?;

        let default_message = default_message(id);
        self.persist(op, draft, id, Vec::new(), true, message, default_message)
    }

    /// Synchronizes, rescores, flushes and commits a finished draft.
    ///
    /// Memberships gained through links obey the same due-date rule as
    /// explicit ones; `force` moves the project's due date instead of failing.
    #[allow(clippy::too_many_arguments)]
    fn persist<T>(
        &mut self,
        op: &'static str,
        mut draft: EntityStore,
        value: T,
        mut warnings: Vec<String>,
        force: bool,
        message: Option<String>,
        default_message: String,
    ) -> TrackerResult<Outcome<T>> {
        let explicit: HashMap<TaskId, BTreeSet<ProjectId>> = draft
            .tasks()
            .map(|task| (task.id, task.projects.clone()))
            .collect();
        let sync = propagate_memberships(&mut draft);
        warnings.extend(sync.dangling_edges.iter().map(dangling_warning));
        enforce_inherited_dues(&mut draft, &explicit, force, &mut warnings)?;

        let report = score_all(&draft, self.clock.today(), self.config.working_hours_per_day);
        warnings.extend(report.cycles.iter().map(ToString::to_string));

        let changes = match draft.flush(&self.conn) {
            Ok(changes) => changes,
            Err(err) => {
                warn!(
                    "event=tracker_mutation module=service status=error op={} error={}",
                    op, err
                );
                return Err(err.into());
            }
        };
        self.store = draft;

        info!(
            "event=tracker_mutation module=service status=ok op={} tasks_written={} projects_written={} warnings={}",
            op,
            changes.tasks.len(),
            changes.projects.len(),
            warnings.len()
        );

        if !changes.is_empty() {
            let message = message
                .filter(|text| !text.trim().is_empty())
                .unwrap_or(default_message);
            self.commit_history(op, &message);
        }

        Ok(Outcome {
            value,
            changes,
            warnings,
        })
    }

    fn commit_history(&self, op: &'static str, message: &str) {
        match self.committer.commit(&self.record_path, message) {
            Ok(()) => info!("event=vcs_commit module=service status=ok op={}", op),
            Err(err) => warn!(
                "event=vcs_commit module=service status=error op={} error={}",
                op, err
            ),
        }
    }

    fn description_or_prompt(&self, given: Option<&str>, initial: &str) -> TrackerResult<String> {
        match given {
            Some(text) => normalize_description(text),
            None => {
                let text = self.editor.prompt(initial)?;
                normalize_description(&text)
            }
        }
    }

    fn resolve_tasks(&self, tokens: &[String]) -> TrackerResult<BTreeSet<TaskId>> {
        tokens
            .iter()
            .map(|token| resolve_task(&self.store, token).map_err(TrackerError::from))
            .collect()
    }

    fn resolve_projects(&self, tokens: &[String]) -> TrackerResult<BTreeSet<ProjectId>> {
        tokens
            .iter()
            .map(|token| resolve_project(&self.store, token).map_err(TrackerError::from))
            .collect()
    }

    fn validate_new_project_names(&self, names: &[String]) -> TrackerResult<()> {
        let mut seen = BTreeSet::new();
        for name in names {
            let exists = self.store.project_by_name(name).is_some() || !seen.insert(name.as_str());
            validate_project_name(name, exists)?;
        }
        Ok(())
    }

    /// A replace may not drop a project that an active linked task still holds.
    fn ensure_droppable(&self, id: TaskId, kept: &BTreeSet<ProjectId>) -> TrackerResult<()> {
        let task = self.task_or_not_found(id)?;
        if !task.is_active() {
            return Ok(());
        }
        for project in task.projects.difference(kept) {
            let holder = task
                .following
                .iter()
                .chain(task.followers.iter())
                .filter_map(|other| self.store.task(*other))
                .find(|other| other.is_active() && other.projects.contains(project));
            if let Some(holder) = holder {
                let name = self
                    .store
                    .project(*project)
                    .map_or_else(|| project.to_string(), |found| found.name.clone());
                return Err(TrackerError::Validation(format!(
                    "cannot drop project \"{name}\" from task {id}, linked task {} is still a member",
                    holder.id
                )));
            }
        }
        Ok(())
    }

    fn task_or_not_found(&self, id: TaskId) -> TrackerResult<&Task> {
        self.store
            .task(id)
            .ok_or_else(|| TrackerError::NotFound(format!("no task numbered \"{id}\"")))
    }

    fn task_view(&self, task: &Task, scores: &ScoreReport) -> TaskView {
        let score = scores.scores.task(task.id);
        TaskView {
            task: task.clone(),
            urgency: score.urgency,
            importance: score.importance,
            effective_due: score.effective_due,
            project_names: task
                .projects
                .iter()
                .filter_map(|id| self.store.project(*id))
                .map(|project| project.name.clone())
                .collect(),
            scheduled: task.is_scheduled(self.clock.now()),
        }
    }

    fn project_view(&self, project: &Project, scores: &ScoreReport) -> ProjectView {
        let score = scores.scores.project(project.id);
        ProjectView {
            project: project.clone(),
            urgency: score.urgency,
            status: score.status,
            active_members: score.active_members,
            hours_left: score.hours_left,
            members: self
                .store
                .tasks()
                .filter(|task| task.projects.contains(&project.id))
                .map(|task| task.id)
                .collect(),
        }
    }
}

/// Keeps a task's own due date within its projects' due dates.
///
/// With `force`, projects due earlier move to the task's date.
fn enforce_project_dues(
    draft: &mut EntityStore,
    task_due: Due,
    projects: &BTreeSet<ProjectId>,
    force: bool,
    warnings: &mut Vec<String>,
) -> TrackerResult<()> {
    let Due::On(date) = task_due else {
        return Ok(());
    };

    for id in projects {
        let Some(project) = draft.project_mut(*id) else {
            continue;
        };
        if project.due >= task_due {
            continue;
        }
        if !force {
            return Err(TrackerError::Constraint(format!(
                "cannot set due date to {date}, project \"{}\" expires on {}",
                project.name, project.due
            )));
        }
        warnings.push(format!(
            "moved project \"{}\" due date from {} to {date}",
            project.name, project.due
        ));
        project.due = task_due;
    }
    Ok(())
}

/// Checks memberships added by propagation against the joining task's due.
fn enforce_inherited_dues(
    draft: &mut EntityStore,
    explicit: &HashMap<TaskId, BTreeSet<ProjectId>>,
    force: bool,
    warnings: &mut Vec<String>,
) -> TrackerResult<()> {
    let joined: Vec<(TaskId, Due, ProjectId)> = draft
        .tasks()
        .flat_map(|task| {
            let before = explicit.get(&task.id);
            task.projects
                .iter()
                .filter(move |project| before.map_or(true, |known| !known.contains(*project)))
                .map(move |project| (task.id, task.due, *project))
        })
        .collect();

    for (id, task_due, project_id) in joined {
        let Due::On(date) = task_due else {
            continue;
        };
        let Some(project) = draft.project_mut(project_id) else {
            continue;
        };
        if project.due >= task_due {
            continue;
        }
        if !force {
            return Err(TrackerError::Constraint(format!(
                "task {id} due on {date} would join project \"{}\" through its links, which expires on {}",
                project.name, project.due
            )));
        }
        warnings.push(format!(
            "moved project \"{}\" due date from {} to {date} for linked task {id}",
            project.name, project.due
        ));
        project.due = task_due;
    }
    Ok(())
}

/// Keeps member tasks' own due dates within a project's new due date.
///
/// With `force`, member tasks due later move to the project's date.
fn enforce_member_dues(
    draft: &mut EntityStore,
    project: &Project,
    project_due: Due,
    force: bool,
    warnings: &mut Vec<String>,
) -> TrackerResult<()> {
    let late: Vec<TaskId> = draft
        .tasks()
        .filter(|task| task.is_active() && task.projects.contains(&project.id))
        .filter(|task| !task.due.is_never() && task.due > project_due)
        .map(|task| task.id)
        .collect();

    for id in late {
        let Some(task) = draft.task_mut(id) else {
            continue;
        };
        if !force {
            return Err(TrackerError::Constraint(format!(
                "cannot set due date to {project_due}, task {id} of project \"{}\" is due on {}",
                project.name, task.due
            )));
        }
        warnings.push(format!(
            "moved task {id} due date from {} to {project_due}",
            task.due
        ));
        task.due = project_due;
    }
    Ok(())
}

fn dangling_warning(edge: &(TaskId, TaskId)) -> String {
    let (owner, missing) = edge;
    format!("dropped edge from task {owner} to missing task {missing}")
}

fn task_key(view: &TaskView) -> (u32, u32, u32) {
    (view.urgency, view.importance, view.task.id.value())
}

fn project_key(view: &ProjectView) -> (u32, u32, u32) {
    (view.urgency, view.project.importance, view.project.id.value())
}

fn paginate<T>(items: Vec<T>, offset: usize, limit: Option<usize>) -> Vec<T> {
    let items = items.into_iter().skip(offset);
    match limit {
        Some(limit) => items.take(limit).collect(),
        None => items.collect(),
    }
}
