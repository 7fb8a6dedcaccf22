//! `tt`: command-line front-end of the tracker.
//!
//! # Responsibility
//! - Load configuration, start logging and open the record file.
//! - Map subcommands onto `TrackerService` calls and print the results.
//!
//! # Invariants
//! - Business rules live in `tasktrack_core`; this crate only parses input
//!   and renders output.
//! - Warnings go to stderr, results to stdout.

mod cli;
mod editor;
mod render;

use anyhow::{bail, Context};
use chrono::{Datelike, Duration, Local, NaiveDate};
use clap::Parser;
use cli::{Cli, Command, ReportArgs};
use editor::ExternalEditor;
use log::info;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tasktrack_core::config::{database_path, log_dir};
use tasktrack_core::model::dates::{parse_date_input, DATE_FORMAT};
use tasktrack_core::{default_log_level, init_logging, Outcome, TrackerConfig, TrackerService};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = TrackerConfig::load().context("failed to load configuration")?;
    let data_dir = absolute(config.resolve_data_dir()?)?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data directory `{}`", data_dir.display()))?;

    let level = config
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    init_logging(&level, &log_dir(&data_dir))?;

    let command = cli.command.unwrap_or(Command::List(cli.list));
    info!("event=cli_command module=cli status=start command={}", command_name(&command));

    let mut tracker = TrackerService::open(&database_path(&data_dir), config)?
        .with_editor(ExternalEditor::from_env());
    run(&mut tracker, command)
}

fn run(tracker: &mut TrackerService, command: Command) -> anyhow::Result<()> {
    let default_sort = tracker.config().default_sort;
    let default_limit = tracker.config().default_limit;

    match command {
        Command::List(args) => {
            let views = tracker.list_tasks(&args.to_query(default_sort, default_limit))?;
            println!("{}", render::task_list(&views, args.info, args.one_line));
        }
        Command::Add(args) => {
            let outcome = tracker.add_task(args.into())?;
            report_outcome(&outcome);
            println!("Created task {}", outcome.value);
        }
        Command::Edit(args) => {
            let token = args.task.clone();
            let outcome = tracker.edit_task(&token, args.into())?;
            report_outcome(&outcome);
            let view = tracker.show_task(&outcome.value.to_string())?;
            println!("Edited task {}: {}", view.task.id, view.task.title());
        }
        Command::Doing(args) => {
            let outcome = tracker.mark_in_progress(&args.task, args.git)?;
            print_transition(tracker, &outcome, "Working on task")?;
        }
        Command::Done(args) => {
            let outcome = tracker.mark_done(&args.task, args.git)?;
            print_transition(tracker, &outcome, "Completed task")?;
        }
        Command::Restore(args) => {
            let outcome = tracker.restore(&args.task, args.git)?;
            print_transition(tracker, &outcome, "Restored task")?;
        }
        Command::Delete { target, yes } => {
            if !yes && !confirm(&format!("Delete task {}?", target.task))? {
                println!("Aborted");
                return Ok(());
            }
            let outcome = tracker.delete(&target.task, target.git)?;
            print_transition(tracker, &outcome, "Deleted task")?;
        }
        Command::Show { task } => {
            println!("{}", render::task_detail(&tracker.show_task(&task)?));
        }
        Command::Addp(args) => {
            let outcome = tracker.add_project(args.into())?;
            report_outcome(&outcome);
            let view = tracker.show_project(&outcome.value.to_string())?;
            println!("Created project {}", view.project.name);
        }
        Command::Editp(args) => {
            let token = args.project.clone();
            let outcome = tracker.edit_project(&token, args.into())?;
            report_outcome(&outcome);
            let view = tracker.show_project(&outcome.value.to_string())?;
            println!("Edited project {}", view.project.name);
        }
        Command::Showp { project } => {
            println!("{}", render::project_detail(&tracker.show_project(&project)?));
        }
        Command::Prog(args) => {
            let views = tracker.list_projects(&args.to_query(default_sort, default_limit))?;
            println!("{}", render::project_list(&views, args.info));
        }
        Command::Report(args) => {
            let (start, end) = report_range(&args, Local::now().date_naive())?;
            println!("{}", render::report(&tracker.report(start, end)?, 1));
        }
        Command::Stats => println!("{}", render::stats(&tracker.stats())),
        Command::Priority => println!("{}", render::priorities(&tracker.project_priorities())),
        Command::Refresh { git } => {
            let outcome = tracker.refresh(git)?;
            report_outcome(&outcome);
            if outcome.changes.is_empty() {
                println!("Tracker already consistent");
            } else {
                println!(
                    "Refreshed {} tasks and {} projects",
                    outcome.changes.tasks.len(),
                    outcome.changes.projects.len()
                );
            }
        }
    }
    Ok(())
}

fn report_outcome<T>(outcome: &Outcome<T>) {
    for warning in &outcome.warnings {
        eprintln!("warning: {warning}");
    }
}

fn print_transition(
    tracker: &TrackerService,
    outcome: &Outcome<tasktrack_core::TaskId>,
    verb: &str,
) -> anyhow::Result<()> {
    report_outcome(outcome);
    let view = tracker.show_task(&outcome.value.to_string())?;
    println!("{verb} {}: {}", view.task.id, view.task.title());
    Ok(())
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

/// Inclusive date range selected by the report flags.
fn report_range(args: &ReportArgs, today: NaiveDate) -> anyhow::Result<(NaiveDate, NaiveDate)> {
    if args.today {
        return Ok((today, today));
    }
    if args.yesterday {
        let yesterday = today - Duration::days(1);
        return Ok((yesterday, yesterday));
    }
    if let Some(date) = &args.date {
        let date = past_date(date, today)?;
        return Ok((date, date));
    }
    match args.range.as_deref() {
        Some([start, end]) => Ok((past_date(start, today)?, past_date(end, today)?)),
        _ => bail!("select one of --date, --today, --yesterday or --date-range"),
    }
}

/// Reads a report date; `MM-DD` means the most recent such day.
fn past_date(input: &str, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    let date = parse_date_input(input, today)?;
    let is_full_date = NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).is_ok();
    if is_full_date || date <= today {
        return Ok(date);
    }
    date.with_year(date.year() - 1)
        .with_context(|| format!("date `{input}` does not exist last year"))
}

fn absolute(path: PathBuf) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("failed to read the working directory")?;
    Ok(cwd.join(path))
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::List(_) => "list",
        Command::Add(_) => "add",
        Command::Edit(_) => "edit",
        Command::Doing(_) => "doing",
        Command::Done(_) => "done",
        Command::Restore(_) => "restore",
        Command::Delete { .. } => "delete",
        Command::Show { .. } => "show",
        Command::Addp(_) => "addp",
        Command::Editp(_) => "editp",
        Command::Showp { .. } => "showp",
        Command::Prog(_) => "prog",
        Command::Report(_) => "report",
        Command::Stats => "stats",
        Command::Priority => "priority",
        Command::Refresh { .. } => "refresh",
    }
}
