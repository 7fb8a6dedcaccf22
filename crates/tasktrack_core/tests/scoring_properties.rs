mod common;

use common::{add_project, harness, in_days};
use tasktrack_core::{AddTaskRequest, EditTaskRequest, TaskId, TrackerService};

fn add_member(tracker: &mut TrackerService, project: &str, after: &[&str]) -> TaskId {
    tracker
        .add_task(AddTaskRequest {
            description: Some(format!("work for {project}")),
            projects: vec![project.to_string()],
            after: after.iter().map(|token| token.to_string()).collect(),
            ..AddTaskRequest::default()
        })
        .unwrap()
        .value
}

fn importance(tracker: &TrackerService, id: TaskId) -> u32 {
    tracker.show_task(&id.to_string()).unwrap().importance
}

#[test]
fn upstream_tasks_carry_more_importance() {
    let mut h = harness();
    add_project(&mut h.tracker, "thesis", None);
    let first = add_member(&mut h.tracker, "thesis", &[]);
    let second = add_member(&mut h.tracker, "thesis", &["0"]);

    assert_eq!(importance(&h.tracker, first), 66);
    assert_eq!(importance(&h.tracker, second), 33);
}

#[test]
fn floored_importance_stays_within_the_project_budget() {
    let mut h = harness();
    add_project(&mut h.tracker, "thesis", None);
    let mut members = vec![add_member(&mut h.tracker, "thesis", &[])];
    for _ in 0..5 {
        let previous = members[members.len() - 1].to_string();
        members.push(add_member(&mut h.tracker, "thesis", &[previous.as_str()]));
    }
    members.push(add_member(&mut h.tracker, "thesis", &[]));

    let total: u32 = members.iter().map(|id| importance(&h.tracker, *id)).sum();
    assert!(total <= 100, "total {total}");
    assert!(total >= 100 - members.len() as u32, "total {total}");
}

#[test]
fn urgency_does_not_grow_as_the_deadline_moves_out() {
    let mut h = harness();
    let id = h
        .tracker
        .add_task(AddTaskRequest {
            description: Some("essay".to_string()),
            time: Some(6.0),
            priority: Some(1),
            ..AddTaskRequest::default()
        })
        .unwrap()
        .value;

    let mut previous = u32::MAX;
    for days in [0, 1, 3, 7, 14, 30, 90] {
        h.tracker
            .edit_task(
                &id.to_string(),
                EditTaskRequest {
                    due: Some(in_days(days)),
                    ..EditTaskRequest::default()
                },
            )
            .unwrap();
        let urgency = h.tracker.show_task(&id.to_string()).unwrap().urgency;
        assert!(urgency <= previous, "urgency grew at {days} days");
        previous = urgency;
    }
    assert!(previous < 100);
}

#[test]
fn tight_project_deadline_saturates_member_urgency() {
    let mut h = harness();
    add_project(&mut h.tracker, "exam", Some(in_days(1)));
    let id = h
        .tracker
        .add_task(AddTaskRequest {
            description: Some("revise".to_string()),
            projects: vec!["exam".to_string()],
            time: Some(5.0),
            ..AddTaskRequest::default()
        })
        .unwrap()
        .value;

    let view = h.tracker.show_task(&id.to_string()).unwrap();
    assert_eq!(view.urgency, 100);
    assert_eq!(view.effective_due.to_string(), in_days(1));
    assert_eq!(h.tracker.show_project("exam").unwrap().urgency, 100);
}

#[test]
fn dependency_edges_stay_symmetric_after_edits() {
    let mut h = harness();
    add_project(&mut h.tracker, "thesis", None);
    add_member(&mut h.tracker, "thesis", &[]);
    add_member(&mut h.tracker, "thesis", &["0"]);
    add_member(&mut h.tracker, "thesis", &["0", "1"]);
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
    h.tracker.refresh(None).unwrap();

    let store = h.tracker.store();
    for task in store.tasks() {
        for follower in &task.followers {
            assert!(store.task(*follower).unwrap().following.contains(&task.id));
        }
        for dependency in &task.following {
            assert!(store.task(*dependency).unwrap().followers.contains(&task.id));
        }
    }
    assert!(store.task(TaskId::new(0)).unwrap().followers.len() == 1);
}

#[test]
fn cycles_are_reported_as_warnings() {
    let mut h = harness();
    add_project(&mut h.tracker, "loop_project", None);
    let first = add_member(&mut h.tracker, "loop_project", &[]);
    let second = add_member(&mut h.tracker, "loop_project", &["0"]);

    let outcome = h
        .tracker
        .edit_task(
            "0",
            EditTaskRequest {
                after: vec!["1".to_string()],
                ..EditTaskRequest::default()
            },
        )
        .unwrap();

    assert!(outcome
        .warnings
        .iter()
        .any(|warning| warning.contains("dependency cycle")));
    assert_eq!(h.tracker.cycles().len(), 1);
    assert_eq!(importance(&h.tracker, first), 50);
    assert_eq!(importance(&h.tracker, second), 50);
}
