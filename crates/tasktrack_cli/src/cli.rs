//! Command-line surface of `tt`.
//!
//! Argument structs convert into core requests; nothing here touches the
//! record store.

use clap::{Args, Parser, Subcommand};
use tasktrack_core::{
    AddProjectRequest, AddTaskRequest, EditProjectRequest, EditTaskRequest, ProjectListQuery,
    SortKey, TaskListQuery,
};

#[derive(Debug, Parser)]
#[command(name = "tt")]
#[command(about = "Personal task and project tracker", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Listing options used when no subcommand is given
    #[command(flatten)]
    pub list: ListArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List tasks (default)
    List(ListArgs),
    /// Add a new task
    Add(AddArgs),
    /// Edit a task
    Edit(EditArgs),
    /// Mark a task as in-progress
    Doing(TransitionArgs),
    /// Mark a task as completed
    Done(TransitionArgs),
    /// Restore a completed or deleted task
    Restore(TransitionArgs),
    /// Delete a task
    Delete {
        #[command(flatten)]
        target: TransitionArgs,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show all info about a task
    Show {
        /// Task id
        task: String,
    },
    /// Create a new project
    Addp(AddProjectArgs),
    /// Edit a project
    Editp(EditProjectArgs),
    /// Show all info about a project
    Showp {
        /// Project id or name
        project: String,
    },
    /// List projects
    Prog(ProjectListArgs),
    /// Report tasks completed on a date or within a date range
    Report(ReportArgs),
    /// Task and project counts
    Stats,
    /// How to split attention between the most urgent projects
    Priority,
    /// Repair dependency edges and project memberships
    Refresh {
        /// Commit message for the history entry
        #[arg(short, long = "git")]
        git: Option<String>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Order by urgency (U), importance (I) or creation (C)
    #[arg(short, long)]
    pub sort: Option<SortKey>,
    /// Projects to filter by
    #[arg(short, long = "project")]
    pub projects: Vec<String>,
    /// Exclude active tasks
    #[arg(short = 'A', long)]
    pub no_active: bool,
    /// Include completed tasks
    #[arg(short, long)]
    pub completed: bool,
    /// Include deleted tasks
    #[arg(short, long)]
    pub deleted: bool,
    /// Show scheduled tasks instead of startable ones
    #[arg(short, long)]
    pub waiting: bool,
    /// Filter by match in the description
    #[arg(short, long)]
    pub filter: Option<String>,
    /// Filter by match in a project description
    #[arg(short = 'F', long)]
    pub filter_project: Option<String>,
    /// Limit the number of results
    #[arg(short, long)]
    pub limit: Option<usize>,
    /// Show all the results
    #[arg(short = 'L', long, conflicts_with = "limit")]
    pub no_limit: bool,
    /// Skip the first results
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
    /// More details; repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub info: u8,
    /// One line per task
    #[arg(short, long)]
    pub one_line: bool,
}

impl ListArgs {
    pub fn to_query(&self, default_sort: SortKey, default_limit: usize) -> TaskListQuery {
        TaskListQuery {
            sort: self.sort.unwrap_or(default_sort),
            projects: self.projects.clone(),
            include_active: !self.no_active,
            include_completed: self.completed,
            include_deleted: self.deleted,
            waiting: self.waiting,
            text: self.filter.clone(),
            project_text: self.filter_project.clone(),
            limit: limit(self.no_limit, self.limit, default_limit),
            offset: self.offset,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    /// Task description; opens the editor when omitted
    #[arg(short, long)]
    pub description: Option<String>,
    /// Existing projects the task belongs to
    #[arg(short, long = "project")]
    pub projects: Vec<String>,
    /// Projects to create for the task
    #[arg(short, long = "new-project")]
    pub new_projects: Vec<String>,
    /// Tasks it depends on
    #[arg(short, long)]
    pub after: Vec<String>,
    /// Tasks depending on this task
    #[arg(short, long)]
    pub before: Vec<String>,
    /// Estimated hours to complete the task
    #[arg(short, long)]
    pub time: Option<f64>,
    /// Priority from 0 to 3
    #[arg(short = 'P', long)]
    pub priority: Option<u8>,
    /// Due date (YYYY-MM-DD, MM-DD or never)
    #[arg(long)]
    pub due: Option<String>,
    /// Keep the task scheduled until this date
    #[arg(short, long)]
    pub wait: Option<String>,
    /// Accept past dates and move conflicting project due dates
    #[arg(long)]
    pub force: bool,
    /// Commit message for the history entry
    #[arg(short, long = "git")]
    pub git: Option<String>,
}

impl From<AddArgs> for AddTaskRequest {
    fn from(args: AddArgs) -> Self {
        Self {
            description: args.description,
            projects: args.projects,
            new_projects: args.new_projects,
            after: args.after,
            before: args.before,
            time: args.time,
            priority: args.priority,
            due: args.due,
            wait: args.wait,
            force: args.force,
            message: args.git,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct EditArgs {
    /// Task id
    pub task: String,
    /// New description
    #[arg(short, long)]
    pub description: Option<String>,
    /// Projects to add
    #[arg(short, long = "project")]
    pub projects: Vec<String>,
    /// Projects to create and add
    #[arg(short, long = "new-project")]
    pub new_projects: Vec<String>,
    /// Tasks it depends on
    #[arg(short, long, conflicts_with_all = ["projects", "new_projects"])]
    pub after: Vec<String>,
    /// Tasks depending on this task
    #[arg(short, long, conflicts_with_all = ["projects", "new_projects"])]
    pub before: Vec<String>,
    /// Replace projects or dependencies instead of adding to them
    #[arg(short = 'O', long = "override")]
    pub replace: bool,
    /// Estimated hours to complete the task
    #[arg(short, long)]
    pub time: Option<f64>,
    /// Priority from 0 to 3
    #[arg(short = 'P', long)]
    pub priority: Option<u8>,
    /// Due date (YYYY-MM-DD, MM-DD or never)
    #[arg(long)]
    pub due: Option<String>,
    /// Remove the due date
    #[arg(short = 'D', long, conflicts_with = "due")]
    pub no_due: bool,
    /// Keep the task scheduled until this date
    #[arg(short, long)]
    pub wait: Option<String>,
    /// Accept past dates and move conflicting due dates
    #[arg(long)]
    pub force: bool,
    /// Commit message for the history entry
    #[arg(short, long = "git")]
    pub git: Option<String>,
}

impl From<EditArgs> for EditTaskRequest {
    fn from(args: EditArgs) -> Self {
        Self {
            description: args.description,
            projects: args.projects,
            new_projects: args.new_projects,
            after: args.after,
            before: args.before,
            replace: args.replace,
            time: args.time,
            priority: args.priority,
            due: args.due,
            clear_due: args.no_due,
            wait: args.wait,
            force: args.force,
            message: args.git,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct TransitionArgs {
    /// Task id
    pub task: String,
    /// Commit message for the history entry
    #[arg(short, long = "git")]
    pub git: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct AddProjectArgs {
    /// Project name: 3 to 25 lowercase letters, digits or underscores
    pub name: String,
    /// Project description; opens the editor when omitted
    #[arg(short, long)]
    pub description: Option<String>,
    /// Due date (YYYY-MM-DD, MM-DD or never)
    #[arg(long)]
    pub due: Option<String>,
    /// Priority from 0 to 3
    #[arg(short = 'P', long)]
    pub priority: Option<u8>,
    /// Relative importance, 100 by default
    #[arg(short = 'I', long)]
    pub importance: Option<u32>,
    /// Accept a past due date
    #[arg(long)]
    pub force: bool,
    /// Commit message for the history entry
    #[arg(short, long = "git")]
    pub git: Option<String>,
}

impl From<AddProjectArgs> for AddProjectRequest {
    fn from(args: AddProjectArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            due: args.due,
            priority: args.priority,
            importance: args.importance,
            force: args.force,
            message: args.git,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct EditProjectArgs {
    /// Project id or name
    pub project: String,
    /// New name
    #[arg(short, long)]
    pub rename: Option<String>,
    /// New description
    #[arg(short, long)]
    pub description: Option<String>,
    /// Due date (YYYY-MM-DD, MM-DD or never)
    #[arg(long)]
    pub due: Option<String>,
    /// Remove the due date
    #[arg(short = 'D', long, conflicts_with = "due")]
    pub no_due: bool,
    /// Priority from 0 to 3
    #[arg(short = 'P', long)]
    pub priority: Option<u8>,
    /// Relative importance
    #[arg(short = 'I', long)]
    pub importance: Option<u32>,
    /// Accept a past due date and move later member due dates
    #[arg(long)]
    pub force: bool,
    /// Commit message for the history entry
    #[arg(short, long = "git")]
    pub git: Option<String>,
}

impl From<EditProjectArgs> for EditProjectRequest {
    fn from(args: EditProjectArgs) -> Self {
        Self {
            rename: args.rename,
            description: args.description,
            due: args.due,
            clear_due: args.no_due,
            priority: args.priority,
            importance: args.importance,
            force: args.force,
            message: args.git,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ProjectListArgs {
    /// Order by urgency (U), importance (I) or creation (C)
    #[arg(short, long)]
    pub sort: Option<SortKey>,
    /// Exclude active projects
    #[arg(short = 'A', long)]
    pub no_active: bool,
    /// Include completed projects
    #[arg(short, long)]
    pub completed: bool,
    /// Filter by match in the name or description
    #[arg(short, long)]
    pub filter: Option<String>,
    /// Limit the number of results
    #[arg(short, long)]
    pub limit: Option<usize>,
    /// Show all the results
    #[arg(short = 'L', long, conflicts_with = "limit")]
    pub no_limit: bool,
    /// More details; repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub info: u8,
}

impl ProjectListArgs {
    pub fn to_query(&self, default_sort: SortKey, default_limit: usize) -> ProjectListQuery {
        ProjectListQuery {
            sort: self.sort.unwrap_or(default_sort),
            include_active: !self.no_active,
            include_completed: self.completed,
            text: self.filter.clone(),
            limit: limit(self.no_limit, self.limit, default_limit),
            offset: 0,
        }
    }
}

#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct ReportArgs {
    /// Report date (YYYY-MM-DD or MM-DD)
    #[arg(short, long)]
    pub date: Option<String>,
    /// Report today
    #[arg(short, long)]
    pub today: bool,
    /// Report yesterday
    #[arg(short, long)]
    pub yesterday: bool,
    /// Inclusive date range
    #[arg(short = 'r', long = "date-range", num_args = 2, value_names = ["START", "END"])]
    pub range: Option<Vec<String>>,
}

fn limit(no_limit: bool, limit: Option<usize>, default_limit: usize) -> Option<usize> {
    if no_limit {
        None
    } else {
        Some(limit.unwrap_or(default_limit))
    }
}
