//! Urgency and importance scoring.
//!
//! # Responsibility
//! - Derive per-task urgency/importance and per-project urgency/status from
//!   the current store contents.
//!
//! # Invariants
//! - Scores are pure functions of the store, `today` and the working-hours
//!   setting. Nothing here mutates records.
//! - Done/deleted tasks score zero and do not count as project members.
//! - Dependency cycles never abort scoring; they surface as diagnostics.

use crate::model::dates::Due;
use crate::model::project::{Project, ProjectId, ProjectStatus};
use crate::model::task::{Task, TaskId};
use crate::store::EntityStore;
use chrono::NaiveDate;
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use thiserror::Error;

/// Default hours of work assumed available per calendar day.
pub const DEFAULT_WORKING_HOURS_PER_DAY: f64 = 4.0;

const MIN_PROJECT_HOURS: f64 = 0.001;

/// Derived scores of one task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskScore {
    pub urgency: u32,
    pub importance: u32,
    pub effective_due: Due,
}

impl Default for TaskScore {
    fn default() -> Self {
        Self {
            urgency: 0,
            importance: 0,
            effective_due: Due::Never,
        }
    }
}

/// Derived scores of one project.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectScore {
    pub urgency: u32,
    pub status: ProjectStatus,
    pub active_members: usize,
    /// Estimated hours of the active members.
    pub hours_left: f64,
}

impl Default for ProjectScore {
    fn default() -> Self {
        Self {
            urgency: 0,
            status: ProjectStatus::Active,
            active_members: 0,
            hours_left: 0.0,
        }
    }
}

/// Scores of every record in a store at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scores {
    tasks: BTreeMap<TaskId, TaskScore>,
    projects: BTreeMap<ProjectId, ProjectScore>,
}

impl Scores {
    /// Scores for `id`; unknown ids score zero.
    pub fn task(&self, id: TaskId) -> TaskScore {
        self.tasks.get(&id).copied().unwrap_or_default()
    }

    pub fn project(&self, id: ProjectId) -> ProjectScore {
        self.projects.get(&id).copied().unwrap_or_default()
    }
}

/// Active project members that can reach themselves along `followers` edges.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dependency cycle in project {project} through tasks {}", format_ids(.tasks))]
pub struct CycleDetected {
    pub project: ProjectId,
    pub tasks: Vec<TaskId>,
}

/// Scores plus diagnostics gathered while computing them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreReport {
    pub scores: Scores,
    pub cycles: Vec<CycleDetected>,
}

/// Closest of the task's own due date and its projects' due dates.
pub fn effective_due(store: &EntityStore, task: &Task) -> Due {
    task.projects
        .iter()
        .filter_map(|id| store.project(*id))
        .map(|project| project.due)
        .fold(task.due, Due::min)
}

/// Time pressure of a task, `0..=100`.
///
/// Compares the days left until `effective_due` with the days the task needs
/// at `priority * 2 + 0.5` hours of work per day.
pub fn task_urgency(task: &Task, effective_due: Due, today: NaiveDate) -> u32 {
    if !task.is_active() {
        return 0;
    }
    let days_left = effective_due.days_from(today);
    if days_left.is_infinite() {
        return 0;
    }

    let hours_per_day = f64::from(task.priority) * 2.0 + 0.5;
    let days_to_complete = task.time / hours_per_day;
    urgency_from_ratio(days_left - days_to_complete)
}

/// Time pressure of a project, `0..=100`.
///
/// `confidence` is how many times the remaining work fits in the hours left
/// before the due date.
pub fn project_urgency(
    project: &Project,
    members: &[&Task],
    today: NaiveDate,
    working_hours_per_day: f64,
) -> u32 {
    let active: Vec<&&Task> = members.iter().filter(|task| task.is_active()).collect();
    if active.is_empty() {
        return 0;
    }
    let days_left = project.due.days_from(today);
    if days_left.is_infinite() {
        return 0;
    }

    let hours: f64 = active.iter().map(|task| task.time).sum();
    let confidence = days_left * working_hours_per_day / hours.max(MIN_PROJECT_HOURS);
    urgency_from_ratio(confidence)
}

/// `Active` when the project has no members or at least one active member.
pub fn project_status(members: &[&Task]) -> ProjectStatus {
    if members.is_empty() || members.iter().any(|task| task.is_active()) {
        ProjectStatus::Active
    } else {
        ProjectStatus::Completed
    }
}

/// Scores every task and project in `store`.
pub fn score_all(store: &EntityStore, today: NaiveDate, working_hours_per_day: f64) -> ScoreReport {
    let mut members: HashMap<ProjectId, Vec<&Task>> = HashMap::new();
    for task in store.tasks() {
        for project in &task.projects {
            members.entry(*project).or_default().push(task);
        }
    }

    let mut scores = Scores::default();
    for project in store.projects() {
        let project_members = members.get(&project.id).map(Vec::as_slice).unwrap_or(&[]);
        let active_members: Vec<&Task> = project_members
            .iter()
            .copied()
            .filter(|task| task.is_active())
            .collect();
        scores.projects.insert(
            project.id,
            ProjectScore {
                urgency: project_urgency(project, project_members, today, working_hours_per_day),
                status: project_status(project_members),
                active_members: active_members.len(),
                hours_left: active_members.iter().map(|task| task.time).sum(),
            },
        );
    }

    let (importance, cycles) = distribute_importance(store, &members);
    for task in store.tasks() {
        let due = effective_due(store, task);
        let importance = if task.is_active() {
            importance.get(&task.id).copied().unwrap_or(0.0).floor() as u32
        } else {
            0
        };
        scores.tasks.insert(
            task.id,
            TaskScore {
                urgency: task_urgency(task, due, today),
                importance,
                effective_due: due,
            },
        );
    }

    for cycle in &cycles {
        warn!(
            "event=cycle_detected module=scoring status=warn project={} tasks={}",
            cycle.project,
            cycle.tasks.len()
        );
    }
    debug!(
        "event=score_all module=scoring status=ok tasks={} projects={} cycles={}",
        scores.tasks.len(),
        scores.projects.len(),
        cycles.len()
    );

    ScoreReport { scores, cycles }
}

/// Splits each project's base importance over its active members in
/// proportion to their downstream weight. Shares accumulate across projects
/// and are left unfloored.
fn distribute_importance(
    store: &EntityStore,
    members: &HashMap<ProjectId, Vec<&Task>>,
) -> (HashMap<TaskId, f64>, Vec<CycleDetected>) {
    let mut importance: HashMap<TaskId, f64> = HashMap::new();
    let mut cycles = Vec::new();

    for project in store.projects() {
        let active: BTreeSet<TaskId> = members
            .get(&project.id)
            .into_iter()
            .flatten()
            .filter(|task| task.is_active())
            .map(|task| task.id)
            .collect();
        if active.is_empty() {
            continue;
        }

        let mut on_cycle = Vec::new();
        let weights: Vec<(TaskId, usize)> = active
            .iter()
            .map(|id| {
                let reach = downstream_reach(store, *id, &active);
                if reach.reaches_self {
                    on_cycle.push(*id);
                }
                (*id, reach.weight)
            })
            .collect();

        let total: usize = weights.iter().map(|(_, weight)| weight).sum();
        for (id, weight) in weights {
            *importance.entry(id).or_default() +=
                weight as f64 / total as f64 * f64::from(project.importance);
        }

        if !on_cycle.is_empty() {
            cycles.push(CycleDetected {
                project: project.id,
                tasks: on_cycle,
            });
        }
    }

    (importance, cycles)
}

struct Reach {
    /// Distinct members reachable from the start, the start included.
    weight: usize,
    reaches_self: bool,
}

fn downstream_reach(store: &EntityStore, start: TaskId, members: &BTreeSet<TaskId>) -> Reach {
    let mut visited = HashSet::from([start]);
    let mut stack = vec![start];
    let mut reaches_self = false;

    while let Some(current) = stack.pop() {
        let Some(task) = store.task(current) else {
            continue;
        };
        for next in task.followers.iter().filter(|id| members.contains(id)) {
            if *next == start {
                reaches_self = true;
            }
            if visited.insert(*next) {
                stack.push(*next);
            }
        }
    }

    Reach {
        weight: visited.len(),
        reaches_self,
    }
}

fn urgency_from_ratio(ratio: f64) -> u32 {
    (100.0 / ratio.max(1.0)).floor() as u32
}

fn format_ids(ids: &[TaskId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
