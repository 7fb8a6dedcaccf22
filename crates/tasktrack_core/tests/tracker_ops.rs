mod common;

use common::{add_project, add_task, harness, in_days, start, today};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeSet;
use tasktrack_core::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use tasktrack_core::{
    AddProjectRequest, AddTaskRequest, Due, EditProjectRequest, EditTaskRequest, ProjectId,
    ProjectListQuery, SortKey, TaskId, TaskListQuery, TaskStatus, TrackerConfig, TrackerError,
    TrackerService,
};

fn ids(views: &[tasktrack_core::TaskView]) -> Vec<u32> {
    views.iter().map(|view| view.task.id.value()).collect()
}

#[test]
fn add_task_assigns_sequential_ids_and_commits_once_each() {
    let mut h = harness();
    let first = add_task(&mut h.tracker, "write outline");
    let second = add_task(&mut h.tracker, "collect sources");

    assert_eq!(first.to_string(), "0000");
    assert_eq!(second.to_string(), "0001");
    assert_eq!(
        h.commits.messages(),
        vec!["Add task \"0000\"", "Add task \"0001\""]
    );

    let task = h.tracker.store().task(first).unwrap();
    assert_eq!(task.description, "write outline\n");
    assert_eq!(task.status, TaskStatus::Todo);
    assert_eq!(task.time, 1.0);
    assert_eq!(task.created, start());
}

#[test]
fn add_task_links_dependencies_and_inherits_projects() {
    let mut h = harness();
    let base = h
        .tracker
        .add_task(AddTaskRequest {
            description: Some("draft chapter".to_string()),
            new_projects: vec!["thesis".to_string()],
            time: Some(3.0),
            priority: Some(7),
            ..AddTaskRequest::default()
        })
        .unwrap();
    assert!(base.changes.projects.contains(&ProjectId::new(0)));

    let review = h
        .tracker
        .add_task(AddTaskRequest {
            description: Some("review chapter".to_string()),
            after: vec!["0".to_string()],
            message: Some("plan review".to_string()),
            ..AddTaskRequest::default()
        })
        .unwrap()
        .value;

    let store = h.tracker.store();
    let draft = store.task(TaskId::new(0)).unwrap();
    let review = store.task(review).unwrap();
    assert_eq!(draft.priority, 3);
    assert_eq!(draft.followers, BTreeSet::from([TaskId::new(1)]));
    assert_eq!(review.following, BTreeSet::from([TaskId::new(0)]));
    assert_eq!(review.projects, BTreeSet::from([ProjectId::new(0)]));
    assert_eq!(h.commits.messages()[1], "plan review");
}

#[test]
fn failed_validation_writes_and_commits_nothing() {
    let mut h = harness();
    let err = h
        .tracker
        .add_task(AddTaskRequest {
            description: Some("task".to_string()),
            new_projects: vec!["ab".to_string()],
            ..AddTaskRequest::default()
        })
        .unwrap_err();

    assert!(matches!(err, TrackerError::Validation(message) if message.contains("too short")));
    assert_eq!(h.tracker.store().task_count(), 0);
    assert!(h.tracker.store().pending_changes().is_empty());
    assert!(h.commits.messages().is_empty());
}

#[test]
fn unknown_and_ambiguous_tokens_are_rejected() {
    let mut h = harness();
    add_project(&mut h.tracker, "house_move", None);
    add_project(&mut h.tracker, "house_paint", None);

    let err = h
        .tracker
        .add_task(AddTaskRequest {
            description: Some("pack boxes".to_string()),
            projects: vec!["house".to_string()],
            ..AddTaskRequest::default()
        })
        .unwrap_err();
    assert!(matches!(err, TrackerError::Ambiguous(_)));

    let err = h.tracker.mark_done("42", None).unwrap_err();
    assert!(matches!(err, TrackerError::NotFound(message) if message == "no task numbered \"42\""));
}

#[test]
fn task_due_after_project_due_needs_force() {
    let mut h = harness();
    add_project(&mut h.tracker, "garden", Some(in_days(4)));

    let request = AddTaskRequest {
        description: Some("plant bulbs".to_string()),
        projects: vec!["garden".to_string()],
        due: Some(in_days(9)),
        ..AddTaskRequest::default()
    };
    let err = h.tracker.add_task(request.clone()).unwrap_err();
    assert!(matches!(err, TrackerError::Constraint(message) if message.contains("garden")));
    assert_eq!(h.tracker.store().task_count(), 0);

    let outcome = h
        .tracker
        .add_task(AddTaskRequest {
            force: true,
            ..request
        })
        .unwrap();
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].contains("moved project \"garden\""));
    let project = h.tracker.store().project(ProjectId::new(0)).unwrap();
    assert_eq!(project.due.to_string(), in_days(9));
}

#[test]
fn past_dates_need_force() {
    let mut h = harness();
    let request = AddTaskRequest {
        description: Some("file taxes".to_string()),
        due: Some(in_days(-2)),
        ..AddTaskRequest::default()
    };
    assert!(matches!(
        h.tracker.add_task(request.clone()),
        Err(TrackerError::Validation(_))
    ));

    let id = h
        .tracker
        .add_task(AddTaskRequest {
            force: true,
            ..request
        })
        .unwrap()
        .value;
    assert_eq!(h.tracker.show_task(&id.to_string()).unwrap().urgency, 100);
}

#[test]
fn edit_rejects_conflicting_field_combinations() {
    let mut h = harness();
    add_project(&mut h.tracker, "garden", None);
    add_task(&mut h.tracker, "one");
    add_task(&mut h.tracker, "two");

    let err = h
        .tracker
        .edit_task(
            "1",
            EditTaskRequest {
                projects: vec!["garden".to_string()],
                after: vec!["0".to_string()],
                ..EditTaskRequest::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, TrackerError::Validation(_)));

    let err = h
        .tracker
        .edit_task(
            "1",
            EditTaskRequest {
                due: Some(in_days(3)),
                clear_due: true,
                ..EditTaskRequest::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, TrackerError::Validation(_)));

    let err = h
        .tracker
        .edit_task(
            "1",
            EditTaskRequest {
                after: vec!["1".to_string()],
                ..EditTaskRequest::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, TrackerError::Validation(_)));
    assert!(h.tracker.store().task(TaskId::new(1)).unwrap().following.is_empty());
}

#[test]
fn edit_without_changes_opens_the_editor() {
    let mut h = harness();
    let id = add_task(&mut h.tracker, "original text");

    let outcome = h
        .tracker
        .edit_task(&id.to_string(), EditTaskRequest::default())
        .unwrap();

    assert_eq!(h.editor.prompts(), vec!["original text\n"]);
    assert_eq!(
        h.tracker.store().task(id).unwrap().description,
        "typed in the editor\n"
    );
    assert_eq!(outcome.changes.tasks, vec![id]);
    assert_eq!(h.commits.messages().last().unwrap(), "Edit task \"0000\"");
}

#[test]
fn add_without_description_and_no_editor_fails() {
    let mut tracker = TrackerService::in_memory(TrackerConfig::default()).unwrap();
    let err = tracker.add_task(AddTaskRequest::default()).unwrap_err();
    assert!(matches!(err, TrackerError::Editor(_)));
}

#[test]
fn edit_replace_swaps_dependencies_symmetrically() {
    let mut h = harness();
    for name in ["a", "b", "c"] {
        add_task(&mut h.tracker, name);
    }
    h.tracker
        .edit_task(
            "2",
            EditTaskRequest {
                after: vec!["0".to_string()],
                ..EditTaskRequest::default()
            },
        )
        .unwrap();
    h.tracker
        .edit_task(
            "2",
            EditTaskRequest {
                after: vec!["1".to_string()],
                replace: true,
                ..EditTaskRequest::default()
            },
        )
        .unwrap();

    let store = h.tracker.store();
    assert_eq!(
        store.task(TaskId::new(2)).unwrap().following,
        BTreeSet::from([TaskId::new(1)])
    );
    assert!(store.task(TaskId::new(0)).unwrap().followers.is_empty());
    assert_eq!(
        store.task(TaskId::new(1)).unwrap().followers,
        BTreeSet::from([TaskId::new(2)])
    );
}

#[test]
fn linked_task_joining_a_project_respects_its_due_date() {
    let mut h = harness();
    add_project(&mut h.tracker, "garden", Some(in_days(5)));
    h.tracker
        .add_task(AddTaskRequest {
            description: Some("dig beds".to_string()),
            projects: vec!["garden".to_string()],
            ..AddTaskRequest::default()
        })
        .unwrap();

    let request = AddTaskRequest {
        description: Some("order seeds".to_string()),
        due: Some(in_days(20)),
        before: vec!["0".to_string()],
        ..AddTaskRequest::default()
    };
    let err = h.tracker.add_task(request.clone()).unwrap_err();
    assert!(matches!(err, TrackerError::Constraint(message) if message.contains("garden")));
    assert_eq!(h.tracker.store().task_count(), 1);
    assert!(h.tracker.store().task(TaskId::new(0)).unwrap().following.is_empty());

    let outcome = h
        .tracker
        .add_task(AddTaskRequest {
            force: true,
            ..request
        })
        .unwrap();
    assert!(outcome
        .warnings
        .iter()
        .any(|warning| warning.contains("moved project \"garden\"")));
    let store = h.tracker.store();
    assert_eq!(
        store.task(outcome.value).unwrap().projects,
        BTreeSet::from([ProjectId::new(0)])
    );
    assert_eq!(
        store.project(ProjectId::new(0)).unwrap().due.to_string(),
        in_days(20)
    );
}

#[test]
fn linking_edit_respects_the_inherited_project_due_date() {
    let mut h = harness();
    add_project(&mut h.tracker, "garden", Some(in_days(5)));
    h.tracker
        .add_task(AddTaskRequest {
            description: Some("dig beds".to_string()),
            projects: vec!["garden".to_string()],
            ..AddTaskRequest::default()
        })
        .unwrap();
    h.tracker
        .add_task(AddTaskRequest {
            description: Some("build fence".to_string()),
            due: Some(in_days(30)),
            ..AddTaskRequest::default()
        })
        .unwrap();

    let request = EditTaskRequest {
        after: vec!["0".to_string()],
        ..EditTaskRequest::default()
    };
    let err = h.tracker.edit_task("1", request.clone()).unwrap_err();
    assert!(matches!(err, TrackerError::Constraint(_)));
    let store = h.tracker.store();
    assert!(store.task(TaskId::new(1)).unwrap().projects.is_empty());
    assert!(store.task(TaskId::new(0)).unwrap().followers.is_empty());

    h.tracker
        .edit_task(
            "1",
            EditTaskRequest {
                force: true,
                ..request
            },
        )
        .unwrap();
    let store = h.tracker.store();
    assert_eq!(
        store.task(TaskId::new(1)).unwrap().projects,
        BTreeSet::from([ProjectId::new(0)])
    );
    assert_eq!(
        store.project(ProjectId::new(0)).unwrap().due.to_string(),
        in_days(30)
    );
}

#[test]
fn replace_cannot_drop_a_project_held_by_a_linked_task() {
    let mut h = harness();
    add_project(&mut h.tracker, "alpha", None);
    add_project(&mut h.tracker, "beta", None);
    for after in [vec![], vec!["0".to_string()]] {
        h.tracker
            .add_task(AddTaskRequest {
                description: Some("alpha work".to_string()),
                projects: vec!["alpha".to_string()],
                after,
                ..AddTaskRequest::default()
            })
            .unwrap();
    }

    let request = EditTaskRequest {
        projects: vec!["beta".to_string()],
        replace: true,
        ..EditTaskRequest::default()
    };
    let err = h.tracker.edit_task("1", request.clone()).unwrap_err();
    assert!(matches!(
        err,
        TrackerError::Validation(message) if message.contains("alpha") && message.contains("0000")
    ));
    assert_eq!(
        h.tracker.store().task(TaskId::new(1)).unwrap().projects,
        BTreeSet::from([ProjectId::new(0)])
    );

    h.tracker.mark_done("0", None).unwrap();
    h.tracker.edit_task("1", request).unwrap();
    let store = h.tracker.store();
    assert_eq!(
        store.task(TaskId::new(1)).unwrap().projects,
        BTreeSet::from([ProjectId::new(1)])
    );
    assert_eq!(
        store.task(TaskId::new(0)).unwrap().projects,
        BTreeSet::from([ProjectId::new(0)])
    );
}

#[test]
fn lifecycle_transitions_commit_default_messages() {
    let mut h = harness();
    let id = add_task(&mut h.tracker, "ship release");
    let token = id.to_string();

    h.tracker.mark_in_progress(&token, None).unwrap();
    h.clock.advance(Duration::hours(2));
    h.tracker.mark_done(&token, None).unwrap();
    assert_eq!(
        h.tracker.store().task(id).unwrap().completed,
        Some(start() + Duration::hours(2))
    );
    h.tracker.delete(&token, None).unwrap();
    h.tracker.restore(&token, None).unwrap();

    assert_eq!(
        h.commits.messages(),
        vec![
            "Add task \"0000\"",
            "Mark task \"0000\" as in-progress",
            "Mark task \"0000\" as done",
            "Delete task \"0000\"",
            "Restore task \"0000\"",
        ]
    );

    assert!(matches!(
        h.tracker.restore(&token, None),
        Err(TrackerError::Validation(_))
    ));
    h.tracker.delete(&token, None).unwrap();
    assert!(matches!(
        h.tracker.mark_done(&token, None),
        Err(TrackerError::Validation(_))
    ));
    assert!(matches!(
        h.tracker.delete(&token, None),
        Err(TrackerError::Validation(_))
    ));
}

#[test]
fn restore_after_delete_returns_the_original_task() {
    let mut h = harness();
    add_project(&mut h.tracker, "garden", Some(in_days(30)));
    let id = h
        .tracker
        .add_task(AddTaskRequest {
            description: Some("mulch beds".to_string()),
            projects: vec!["garden".to_string()],
            time: Some(2.5),
            priority: Some(2),
            ..AddTaskRequest::default()
        })
        .unwrap()
        .value;
    let before = h.tracker.store().task(id).unwrap().clone();

    h.clock.advance(Duration::days(1));
    h.tracker.delete(&id.to_string(), None).unwrap();
    h.tracker.restore(&id.to_string(), None).unwrap();

    let after = h.tracker.store().task(id).unwrap();
    assert_eq!(after, &before);
    assert_eq!(after.status, TaskStatus::Todo);
    assert!(after.completed.is_none() && after.deleted.is_none());
}

#[test]
fn project_rename_is_visible_through_every_member() {
    let mut h = harness();
    add_project(&mut h.tracker, "garden", None);
    let id = h
        .tracker
        .add_task(AddTaskRequest {
            description: Some("rake leaves".to_string()),
            projects: vec!["garden".to_string()],
            ..AddTaskRequest::default()
        })
        .unwrap()
        .value;

    let outcome = h
        .tracker
        .edit_project(
            "garden",
            EditProjectRequest {
                rename: Some("backyard".to_string()),
                importance: Some(250),
                ..EditProjectRequest::default()
            },
        )
        .unwrap();

    assert_eq!(outcome.changes.projects, vec![ProjectId::new(0)]);
    assert!(outcome.changes.tasks.is_empty());
    assert_eq!(
        h.tracker.show_task(&id.to_string()).unwrap().project_names,
        vec!["backyard"]
    );
    assert_eq!(h.commits.messages().last().unwrap(), "Edit project \"backyard\"");

    let err = h
        .tracker
        .edit_project(
            "backyard",
            EditProjectRequest {
                due: Some(in_days(2)),
                clear_due: true,
                ..EditProjectRequest::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, TrackerError::Validation(_)));
}

#[test]
fn project_due_before_member_due_needs_force() {
    let mut h = harness();
    add_project(&mut h.tracker, "garden", None);
    h.tracker
        .add_task(AddTaskRequest {
            description: Some("build shed".to_string()),
            projects: vec!["garden".to_string()],
            due: Some(in_days(10)),
            ..AddTaskRequest::default()
        })
        .unwrap();

    let request = EditProjectRequest {
        due: Some(in_days(5)),
        ..EditProjectRequest::default()
    };
    assert!(matches!(
        h.tracker.edit_project("garden", request.clone()),
        Err(TrackerError::Constraint(_))
    ));

    let outcome = h
        .tracker
        .edit_project(
            "garden",
            EditProjectRequest {
                force: true,
                ..request
            },
        )
        .unwrap();
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(
        h.tracker.store().task(TaskId::new(0)).unwrap().due.to_string(),
        in_days(5)
    );
}

#[test]
fn add_project_validates_names() {
    let mut h = harness();
    for (name, reason) in [
        ("ab", "is too short"),
        ("Abc", "must be lowercase"),
        ("has space", "contains invalid characters"),
    ] {
        let err = h
            .tracker
            .add_project(AddProjectRequest {
                name: name.to_string(),
                description: Some("x".to_string()),
                ..AddProjectRequest::default()
            })
            .unwrap_err();
        assert!(
            matches!(&err, TrackerError::Validation(message) if message.ends_with(reason)),
            "{name}: {err}"
        );
    }

    add_project(&mut h.tracker, "abc_1", None);
    let err = h
        .tracker
        .add_project(AddProjectRequest {
            name: "abc_1".to_string(),
            description: Some("again".to_string()),
            ..AddProjectRequest::default()
        })
        .unwrap_err();
    assert!(matches!(err, TrackerError::Validation(message) if message.ends_with("already exists")));
    assert_eq!(h.commits.messages(), vec!["Add project \"abc_1\""]);
}

#[test]
fn refresh_without_changes_does_not_commit() {
    let mut h = harness();
    add_task(&mut h.tracker, "one");
    let outcome = h.tracker.refresh(None).unwrap();
    assert!(outcome.changes.is_empty());
    assert!(outcome.value.converged);
    assert_eq!(h.commits.messages().len(), 1);
}

#[test]
fn reopening_repairs_and_refresh_persists_one_sided_edges() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasktrack.sqlite3");
    let config = TrackerConfig {
        git_commit: false,
        ..TrackerConfig::default()
    };

    {
        let mut tracker = TrackerService::open(&path, config.clone()).unwrap();
        add_task(&mut tracker, "first");
        add_task(&mut tracker, "second");
    }

    {
        let conn = tasktrack_core::db::open_db(&path).unwrap();
        let repo = SqliteTaskRepository::try_new(&conn).unwrap();
        let mut second = repo.list_tasks().unwrap().remove(1);
        second.following.insert(TaskId::new(0));
        second.followers.insert(TaskId::new(77));
        repo.upsert_task(&second).unwrap();
    }

    let commits = common::RecordingCommitter::default();
    let mut tracker = TrackerService::open(&path, config)
        .unwrap()
        .with_committer(commits.clone());
    let outcome = tracker.refresh(None).unwrap();

    assert_eq!(
        outcome.changes.tasks,
        vec![TaskId::new(0), TaskId::new(1)]
    );
    assert_eq!(commits.messages(), vec!["Refresh tracker"]);

    let conn = tasktrack_core::db::open_db(&path).unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let tasks = repo.list_tasks().unwrap();
    let (first, second) = (&tasks[0], &tasks[1]);
    assert_eq!(first.followers, BTreeSet::from([TaskId::new(1)]));
    assert!(second.followers.is_empty());
}

#[test]
fn listing_orders_filters_and_paginates() {
    let mut h = harness();
    add_project(&mut h.tracker, "garden", None);
    h.tracker
        .edit_project(
            "garden",
            EditProjectRequest {
                description: Some("backyard work".to_string()),
                ..EditProjectRequest::default()
            },
        )
        .unwrap();

    let urgent = AddTaskRequest {
        description: Some("urgent".to_string()),
        due: Some(in_days(1)),
        ..AddTaskRequest::default()
    };
    h.tracker.add_task(urgent).unwrap();
    h.tracker
        .add_task(AddTaskRequest {
            description: Some("relaxed".to_string()),
            due: Some(in_days(10)),
            projects: vec!["garden".to_string()],
            ..AddTaskRequest::default()
        })
        .unwrap();
    add_task(&mut h.tracker, "started");
    add_task(&mut h.tracker, "finished");
    h.tracker
        .add_task(AddTaskRequest {
            description: Some("later".to_string()),
            wait: Some(in_days(4)),
            ..AddTaskRequest::default()
        })
        .unwrap();
    h.tracker.mark_in_progress("2", None).unwrap();
    h.tracker.mark_done("3", None).unwrap();

    let default = h.tracker.list_tasks(&TaskListQuery::default()).unwrap();
    assert_eq!(ids(&default), vec![2, 0, 1]);
    assert_eq!(default[1].urgency, 100);
    assert_eq!(default[2].urgency, 12);

    let by_creation = TaskListQuery {
        sort: SortKey::Creation,
        ..TaskListQuery::default()
    };
    assert_eq!(ids(&h.tracker.list_tasks(&by_creation).unwrap()), vec![2, 1, 0]);

    let waiting = TaskListQuery {
        waiting: true,
        ..TaskListQuery::default()
    };
    let waiting = h.tracker.list_tasks(&waiting).unwrap();
    assert_eq!(ids(&waiting), vec![4]);
    assert!(waiting[0].scheduled);

    let with_done = TaskListQuery {
        include_completed: true,
        ..TaskListQuery::default()
    };
    assert_eq!(ids(&h.tracker.list_tasks(&with_done).unwrap()), vec![2, 0, 1, 3]);

    let only_done = TaskListQuery {
        include_active: false,
        include_completed: true,
        ..TaskListQuery::default()
    };
    assert_eq!(ids(&h.tracker.list_tasks(&only_done).unwrap()), vec![3]);

    let text = TaskListQuery {
        text: Some("relax".to_string()),
        ..TaskListQuery::default()
    };
    assert_eq!(ids(&h.tracker.list_tasks(&text).unwrap()), vec![1]);

    let project_text = TaskListQuery {
        project_text: Some("backyard".to_string()),
        ..TaskListQuery::default()
    };
    assert_eq!(ids(&h.tracker.list_tasks(&project_text).unwrap()), vec![1]);

    let by_project = TaskListQuery {
        projects: vec!["garden".to_string()],
        ..TaskListQuery::default()
    };
    assert_eq!(ids(&h.tracker.list_tasks(&by_project).unwrap()), vec![1]);

    let page = TaskListQuery {
        offset: 1,
        limit: Some(1),
        ..TaskListQuery::default()
    };
    assert_eq!(ids(&h.tracker.list_tasks(&page).unwrap()), vec![0]);

    // The scheduled task shows up once its start date arrives.
    h.clock.advance(Duration::days(4));
    assert!(ids(&h.tracker.list_tasks(&TaskListQuery::default()).unwrap()).contains(&4));
}

#[test]
fn project_listing_hides_completed_unless_asked() {
    let mut h = harness();
    add_project(&mut h.tracker, "empty_one", None);
    add_project(&mut h.tracker, "finished", None);
    h.tracker
        .add_task(AddTaskRequest {
            description: Some("only task".to_string()),
            projects: vec!["finished".to_string()],
            ..AddTaskRequest::default()
        })
        .unwrap();
    h.tracker.mark_done("0", None).unwrap();

    let names = |query: &ProjectListQuery| -> Vec<String> {
        h.tracker
            .list_projects(query)
            .unwrap()
            .into_iter()
            .map(|view| view.project.name)
            .collect()
    };

    assert_eq!(names(&ProjectListQuery::default()), vec!["empty_one"]);
    assert_eq!(
        names(&ProjectListQuery {
            include_completed: true,
            sort: SortKey::Creation,
            ..ProjectListQuery::default()
        }),
        vec!["finished", "empty_one"]
    );
    assert_eq!(
        names(&ProjectListQuery {
            text: Some("fini".to_string()),
            ..ProjectListQuery::default()
        }),
        vec!["finished"]
    );
}

#[test]
fn report_sums_hours_of_tasks_completed_in_range() {
    let mut h = harness();
    for (name, hours) in [("a", 1.5), ("b", 2.0), ("c", 4.0)] {
        h.tracker
            .add_task(AddTaskRequest {
                description: Some(name.to_string()),
                time: Some(hours),
                ..AddTaskRequest::default()
            })
            .unwrap();
    }
    h.tracker.mark_done("0", None).unwrap();
    h.clock.advance(Duration::days(1));
    h.tracker.mark_done("1", None).unwrap();

    let day_one = h.tracker.report(today(), today()).unwrap();
    assert_eq!(day_one.tasks.len(), 1);
    assert_eq!(day_one.total_hours, 1.5);

    let both = h
        .tracker
        .report(today(), today() + Duration::days(1))
        .unwrap();
    assert_eq!(
        both.tasks.iter().map(|view| view.task.id.value()).collect::<Vec<_>>(),
        vec![0, 1]
    );
    assert_eq!(both.total_hours, 3.5);

    let backwards = h
        .tracker
        .report(today(), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    assert!(matches!(backwards, Err(TrackerError::Validation(_))));
}

#[test]
fn stats_count_projects_and_tasks_by_state() {
    let mut h = harness();
    add_project(&mut h.tracker, "garden", None);
    h.tracker
        .add_task(AddTaskRequest {
            description: Some("dig".to_string()),
            projects: vec!["garden".to_string()],
            time: Some(2.0),
            ..AddTaskRequest::default()
        })
        .unwrap();
    add_task(&mut h.tracker, "read");
    add_task(&mut h.tracker, "write");
    h.tracker.mark_in_progress("1", None).unwrap();
    h.tracker.mark_done("2", None).unwrap();

    let stats = h.tracker.stats();
    assert_eq!(stats.total_projects, 1);
    assert_eq!(stats.active_projects, 1);
    assert_eq!(stats.in_progress.count, 1);
    assert_eq!(stats.active.count, 2);
    assert_eq!(stats.active.hours, 3.0);
    assert_eq!(stats.completed.count, 1);
}

#[test]
fn priorities_split_between_the_two_most_urgent_projects() {
    let mut h = harness();
    assert!(h.tracker.project_priorities().is_empty());

    add_project(&mut h.tracker, "exam", Some(in_days(1)));
    add_project(&mut h.tracker, "garden", Some(in_days(10)));
    for project in ["exam", "garden"] {
        h.tracker
            .add_task(AddTaskRequest {
                description: Some(format!("{project} work")),
                projects: vec![project.to_string()],
                time: Some(4.0),
                ..AddTaskRequest::default()
            })
            .unwrap();
    }

    let priorities = h.tracker.project_priorities();
    assert_eq!(priorities.len(), 2);
    assert_eq!(priorities[0].name, "exam");
    assert!((priorities[0].share - 100.0 / 110.0).abs() < 1e-9);
    assert!((priorities[1].share - 10.0 / 110.0).abs() < 1e-9);

    h.tracker.mark_done("1", None).unwrap();
    let priorities = h.tracker.project_priorities();
    assert_eq!(priorities.len(), 1);
    assert_eq!(priorities[0].share, 1.0);
}

#[test]
fn records_survive_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasktrack.sqlite3");
    let config = TrackerConfig {
        git_commit: false,
        ..TrackerConfig::default()
    };

    let expected = {
        let mut tracker = TrackerService::open(&path, config.clone()).unwrap();
        tracker
            .add_task(AddTaskRequest {
                description: Some("persist me\nwith details".to_string()),
                new_projects: vec!["archive".to_string()],
                due: Some("never".to_string()),
                ..AddTaskRequest::default()
            })
            .unwrap();
        tracker.store().task(TaskId::new(0)).unwrap().clone()
    };

    let tracker = TrackerService::open(&path, config).unwrap();
    assert_eq!(tracker.store().task(TaskId::new(0)).unwrap(), &expected);
    assert_eq!(expected.due, Due::Never);
    assert_eq!(
        tracker.store().project(ProjectId::new(0)).unwrap().name,
        "archive"
    );
}
