//! Plain-text rendering of tracker views.
//!
//! Every function returns the full text to print; none of them consult the
//! tracker, so output depends only on the views passed in.

use tasktrack_core::service::Tally;
use tasktrack_core::{ProjectPriority, ProjectView, Report, Stats, TaskView};

const INDENT: &str = "   ";

/// Task listing; `info` adds scores, status and due date in that order.
pub fn task_list(views: &[TaskView], info: u8, one_line: bool) -> String {
    if views.is_empty() {
        return "No tasks to show".to_string();
    }

    let (in_progress, rest): (Vec<&TaskView>, Vec<&TaskView>) =
        views.iter().partition(|view| view.task.is_in_progress());

    let render = |view: &TaskView| {
        if one_line {
            format!("{} - {}", view.task.id, view.task.title())
        } else {
            task_block(view, info)
        }
    };

    let mut lines = Vec::new();
    if one_line {
        lines.push("  ID - description".to_string());
    }
    lines.extend(in_progress.iter().map(|view| render(*view)));
    if !in_progress.is_empty() && !rest.is_empty() {
        lines.push(String::new());
    }
    lines.extend(rest.iter().map(|view| render(*view)));
    lines.join("\n")
}

fn task_block(view: &TaskView, info: u8) -> String {
    let mut header = vec![format!("ID: {}", view.task.id)];
    if info >= 1 {
        header.push(format!("I/U: {:>3}/{:<3}", view.importance, view.urgency));
    }
    if info >= 2 {
        header.push(format!("status: {}", view.task.status));
    }
    if info >= 3 {
        header.push(format!("due-date: {}", view.effective_due));
    }
    format!("{}\n{}", header.join("\n"), indented(&view.task.description))
}

pub fn task_detail(view: &TaskView) -> String {
    let task = &view.task;
    let stamp = |value: Option<chrono::NaiveDateTime>| {
        value.map_or_else(|| "-".to_string(), |at| at.to_string())
    };
    let ids = |ids: Vec<String>| if ids.is_empty() { "-".to_string() } else { ids.join(" ") };

    [
        format!("ID: {}", task.id),
        format!("I/U {}/{}", view.importance, view.urgency),
        format!("status: {}", task.status),
        format!("projects: {}", ids(view.project_names.clone())),
        format!("due: {} (own: {})", view.effective_due, task.due),
        format!("time: {} [h]", task.time),
        format!("priority: {}", task.priority),
        format!("following: {}", ids(task.following.iter().map(ToString::to_string).collect())),
        format!("followers: {}", ids(task.followers.iter().map(ToString::to_string).collect())),
        format!(
            "created: {}{}",
            task.created,
            if view.scheduled { " (scheduled)" } else { "" }
        ),
        format!("completed: {}", stamp(task.completed)),
        format!("deleted: {}", stamp(task.deleted)),
        indented(&task.description),
    ]
    .join("\n")
}

pub fn project_detail(view: &ProjectView) -> String {
    let project = &view.project;
    let members = view
        .members
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");

    [
        format!("ID: {} ({})", project.id, project.name),
        format!("I/U {}/{}", project.importance, view.urgency),
        format!("status: {}", view.status),
        format!("due date: {}", project.due),
        format!("priority: {}", project.priority),
        format!(
            "active tasks: {}, {:.1} [h] left",
            view.active_members, view.hours_left
        ),
        format!("members: {}", if members.is_empty() { "-" } else { members.as_str() }),
        indented(&project.description),
    ]
    .join("\n")
}

/// Project listing; `info` adds due date, scores and status.
pub fn project_list(views: &[ProjectView], info: u8) -> String {
    if views.is_empty() {
        return "No projects to show".to_string();
    }

    let header = match info {
        0 => format!("{:<25} - description", "name"),
        1 => format!("{:<25} {:^10} - description", "name", "due-date"),
        2 => format!("{:<25} {:^10} {:^7} - description", "name", "due-date", "I/U"),
        _ => format!(
            "{:<25} {:9} {:^10} {:^7} - description",
            "name", "status", "due-date", "I/U"
        ),
    };

    let mut lines = vec![header];
    for view in views {
        let project = &view.project;
        let scores = format!("{:>3}/{:<3}", project.importance, view.urgency);
        let due = project.due.to_string();
        lines.push(match info {
            0 => format!("{:<25} - {}", project.name, project.title()),
            1 => format!("{:<25} {:10} - {}", project.name, due, project.title()),
            2 => format!("{:<25} {:10} {} - {}", project.name, due, scores, project.title()),
            _ => format!(
                "{:<25} {:9} {:10} {} - {}",
                project.name,
                view.status.as_str(),
                due,
                scores,
                project.title()
            ),
        });
    }
    lines.join("\n")
}

pub fn report(report: &Report, info: u8) -> String {
    let mut lines = vec![
        if report.start == report.end {
            format!("Completed tasks on {}", report.start)
        } else {
            format!("Completed tasks between {} and {}", report.start, report.end)
        },
        format!(
            "Total: {} tasks, {:.1} [h]",
            report.tasks.len(),
            report.total_hours
        ),
    ];

    for view in &report.tasks {
        let projects = view.project_names.join(",");
        lines.push(match info {
            0 => format!("{} {} - {}", view.task.id, projects, view.task.title()),
            _ => format!(
                "{} {} {} [h] - {}",
                view.task.id,
                projects,
                view.task.time,
                view.task.title()
            ),
        });
    }
    lines.join("\n")
}

pub fn stats(stats: &Stats) -> String {
    let tally = |label: &str, tally: &Tally| {
        format!("\t{label}: {}, {:.1} [h]", tally.count, tally.hours)
    };
    [
        "Projects".to_string(),
        format!("\tactive: {}", stats.active_projects),
        format!("\ttotal: {}", stats.total_projects),
        "Tasks".to_string(),
        tally("in progress", &stats.in_progress),
        tally("active", &stats.active),
        tally("completed", &stats.completed),
    ]
    .join("\n")
}

pub fn priorities(priorities: &[ProjectPriority]) -> String {
    if priorities.is_empty() {
        return "No active projects in the tracker".to_string();
    }
    let mut lines = vec![format!("{:<25} priority - description", "name")];
    for priority in priorities {
        lines.push(format!(
            "{:<25} {:>8.2} - {}",
            priority.name, priority.share, priority.title
        ));
    }
    lines.join("\n")
}

fn indented(description: &str) -> String {
    let body = description.trim_end_matches('\n').replace('\n', &format!("\n{INDENT}"));
    format!("{INDENT}{body}")
}
