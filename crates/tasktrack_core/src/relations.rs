//! Precedence edges and project-membership propagation.
//!
//! # Responsibility
//! - Create and replace precedence edges with both sides updated together.
//! - Repair one-sided edges and spread project membership along the
//!   dependency graph until nothing changes.
//!
//! # Invariants
//! - After `propagate_memberships`, `b ∈ a.following ⇔ a ∈ b.followers` for
//!   every pair of stored tasks.
//! - Done/deleted tasks neither gain nor spread project membership.
//! - Edges never point at tasks missing from the store once propagation ran.

use crate::model::project::ProjectId;
use crate::model::task::TaskId;
use crate::store::EntityStore;
use log::{debug, warn};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

/// Rejected edge mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("task {0} cannot depend on itself")]
    SelfLink(TaskId),
    #[error("no task numbered \"{0}\"")]
    MissingTask(TaskId),
}

/// Outcome of one propagation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Passes executed, including the final pass that changed nothing.
    pub passes: usize,
    pub backfilled_edges: usize,
    pub memberships_added: usize,
    /// `(owner, missing)` edges removed because `missing` does not exist.
    pub dangling_edges: Vec<(TaskId, TaskId)>,
    pub converged: bool,
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Following,
    Followers,
}

/// Records that `before` must complete before `after`.
pub fn link_precedence(
    store: &mut EntityStore,
    before: TaskId,
    after: TaskId,
) -> Result<(), LinkError> {
    if before == after {
        return Err(LinkError::SelfLink(before));
    }
    ensure_exists(store, before)?;
    ensure_exists(store, after)?;

    if let Some(task) = store.task_mut(before) {
        task.followers.insert(after);
    }
    if let Some(task) = store.task_mut(after) {
        task.following.insert(before);
    }
    Ok(())
}

/// Removes the `before -> after` edge from both sides.
pub fn unlink_precedence(store: &mut EntityStore, before: TaskId, after: TaskId) {
    if let Some(task) = store.task_mut(before) {
        task.followers.remove(&after);
    }
    if let Some(task) = store.task_mut(after) {
        task.following.remove(&before);
    }
}

/// Replaces the full follower set of `task`, unlinking dropped followers.
pub fn set_followers(
    store: &mut EntityStore,
    task: TaskId,
    followers: &BTreeSet<TaskId>,
) -> Result<(), LinkError> {
    let current = neighbors(store, task, Side::Followers)?;
    for follower in followers {
        if *follower == task {
            return Err(LinkError::SelfLink(task));
        }
        ensure_exists(store, *follower)?;
    }

    for dropped in current.difference(followers) {
        unlink_precedence(store, task, *dropped);
    }
    for follower in followers {
        link_precedence(store, task, *follower)?;
    }
    Ok(())
}

/// Replaces the full dependency set of `task`, unlinking dropped ones.
pub fn set_following(
    store: &mut EntityStore,
    task: TaskId,
    following: &BTreeSet<TaskId>,
) -> Result<(), LinkError> {
    let current = neighbors(store, task, Side::Following)?;
    for before in following {
        if *before == task {
            return Err(LinkError::SelfLink(task));
        }
        ensure_exists(store, *before)?;
    }

    for dropped in current.difference(following) {
        unlink_precedence(store, *dropped, task);
    }
    for before in following {
        link_precedence(store, *before, task)?;
    }
    Ok(())
}

/// Repairs edge symmetry and spreads project membership to a fixed point.
///
/// Each pass backfills missing reverse edges, then unions into every active
/// task the projects of its active neighbors in both directions. Passes stop
/// at the first one that changes nothing. The pass budget is derived from
/// the graph size, which is enough for any chain the store can hold.
pub fn propagate_memberships(store: &mut EntityStore) -> SyncReport {
    let ids = store.task_ids();
    let mut report = SyncReport {
        dangling_edges: drop_dangling_edges(store, &ids),
        ..SyncReport::default()
    };
    let max_passes = ids.len() + 2;

    while report.passes < max_passes {
        report.passes += 1;
        let backfilled = backfill_reverse_edges(store, &ids);
        let added = spread_projects(store, &ids);
        report.backfilled_edges += backfilled;
        report.memberships_added += added;

        if backfilled == 0 && added == 0 {
            report.converged = true;
            break;
        }
    }

    if !report.dangling_edges.is_empty() {
        warn!(
            "event=relations_sync module=relations status=warn dangling_edges={}",
            report.dangling_edges.len()
        );
    }
    if !report.converged {
        warn!(
            "event=relations_sync module=relations status=warn reason=pass_budget_exhausted passes={}",
            report.passes
        );
    }
    debug!(
        "event=relations_sync module=relations status=ok passes={} backfilled={} memberships_added={}",
        report.passes, report.backfilled_edges, report.memberships_added
    );
    report
}

fn ensure_exists(store: &EntityStore, id: TaskId) -> Result<(), LinkError> {
    match store.task(id) {
        Some(_) => Ok(()),
        None => Err(LinkError::MissingTask(id)),
    }
}

fn neighbors(store: &EntityStore, id: TaskId, side: Side) -> Result<BTreeSet<TaskId>, LinkError> {
    let task = store.task(id).ok_or(LinkError::MissingTask(id))?;
    Ok(match side {
        Side::Following => task.following.clone(),
        Side::Followers => task.followers.clone(),
    })
}

fn drop_dangling_edges(store: &mut EntityStore, ids: &[TaskId]) -> Vec<(TaskId, TaskId)> {
    let known: HashSet<TaskId> = ids.iter().copied().collect();
    let mut dropped = Vec::new();

    for id in ids {
        let Some(task) = store.task_mut(*id) else {
            continue;
        };
        for edge in task
            .following
            .iter()
            .chain(task.followers.iter())
            .filter(|other| !known.contains(other))
        {
            dropped.push((*id, *edge));
        }
        task.following.retain(|other| known.contains(other));
        task.followers.retain(|other| known.contains(other));
    }

    dropped
}

fn backfill_reverse_edges(store: &mut EntityStore, ids: &[TaskId]) -> usize {
    let mut missing: Vec<(TaskId, Side, TaskId)> = Vec::new();

    for id in ids {
        let Some(task) = store.task(*id) else {
            continue;
        };
        for before in &task.following {
            if store
                .task(*before)
                .is_some_and(|other| !other.followers.contains(id))
            {
                missing.push((*before, Side::Followers, *id));
            }
        }
        for after in &task.followers {
            if store
                .task(*after)
                .is_some_and(|other| !other.following.contains(id))
            {
                missing.push((*after, Side::Following, *id));
            }
        }
    }

    for (target, side, edge) in &missing {
        if let Some(task) = store.task_mut(*target) {
            match side {
                Side::Following => task.following.insert(*edge),
                Side::Followers => task.followers.insert(*edge),
            };
        }
    }

    missing.len()
}

fn spread_projects(store: &mut EntityStore, ids: &[TaskId]) -> usize {
    let mut added = 0;

    for id in ids {
        let inherited: BTreeSet<ProjectId> = {
            let Some(task) = store.task(*id) else {
                continue;
            };
            if !task.is_active() {
                continue;
            }
            task.following
                .iter()
                .chain(task.followers.iter())
                .filter_map(|other| store.task(*other))
                .filter(|other| other.is_active())
                .flat_map(|other| other.projects.iter().copied())
                .filter(|project| !task.projects.contains(project))
                .collect()
        };

        if inherited.is_empty() {
            continue;
        }
        added += inherited.len();
        if let Some(task) = store.task_mut(*id) {
            task.projects.extend(inherited);
        }
    }

    added
}

#[cfg(test)]
mod tests {
    use super::{link_precedence, propagate_memberships, set_followers, LinkError};
    use crate::model::project::ProjectId;
    use crate::model::task::TaskId;
    use crate::store::EntityStore;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn now() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn store_with(count: u32) -> EntityStore {
        let mut store = EntityStore::default();
        for id in 0..count {
            store.create_task(TaskId::new(id), now());
        }
        store
    }

    fn t(id: u32) -> TaskId {
        TaskId::new(id)
    }

    fn assert_symmetric(store: &EntityStore) {
        for a in store.tasks() {
            for b in store.tasks() {
                assert_eq!(
                    a.following.contains(&b.id),
                    b.followers.contains(&a.id),
                    "asymmetric edge between {} and {}",
                    a.id,
                    b.id
                );
            }
        }
    }

    #[test]
    fn link_updates_both_sides() {
        let mut store = store_with(2);
        link_precedence(&mut store, t(0), t(1)).unwrap();
        assert!(store.task(t(0)).unwrap().followers.contains(&t(1)));
        assert!(store.task(t(1)).unwrap().following.contains(&t(0)));
        assert_symmetric(&store);
    }

    #[test]
    fn self_and_missing_links_are_rejected() {
        let mut store = store_with(1);
        assert_eq!(
            link_precedence(&mut store, t(0), t(0)),
            Err(LinkError::SelfLink(t(0)))
        );
        assert_eq!(
            link_precedence(&mut store, t(0), t(9)),
            Err(LinkError::MissingTask(t(9)))
        );
        assert!(store.task(t(0)).unwrap().followers.is_empty());
    }

    #[test]
    fn replacing_followers_unlinks_the_dropped_ones() {
        let mut store = store_with(3);
        link_precedence(&mut store, t(0), t(1)).unwrap();
        set_followers(&mut store, t(0), &BTreeSet::from([t(2)])).unwrap();

        assert_eq!(store.task(t(0)).unwrap().followers, BTreeSet::from([t(2)]));
        assert!(store.task(t(1)).unwrap().following.is_empty());
        assert!(store.task(t(2)).unwrap().following.contains(&t(0)));
        assert_symmetric(&store);
    }

    #[test]
    fn one_sided_edges_are_backfilled() {
        let mut store = store_with(3);
        store.task_mut(t(0)).unwrap().following.insert(t(1));
        store.task_mut(t(2)).unwrap().followers.insert(t(1));

        let report = propagate_memberships(&mut store);
        assert!(report.converged);
        assert_eq!(report.backfilled_edges, 2);
        assert_symmetric(&store);
    }

    #[test]
    fn membership_reaches_the_end_of_long_chains() {
        // 12 hops: far beyond any fixed small pass count.
        let mut store = store_with(13);
        for id in (1..13).rev() {
            link_precedence(&mut store, t(id), t(id - 1)).unwrap();
        }
        store.task_mut(t(12)).unwrap().projects.insert(ProjectId::new(5));

        let report = propagate_memberships(&mut store);
        assert!(report.converged);
        for task in store.tasks() {
            assert!(
                task.projects.contains(&ProjectId::new(5)),
                "task {} missed the project",
                task.id
            );
        }
    }

    #[test]
    fn inactive_tasks_neither_gain_nor_spread_projects() {
        let mut store = store_with(3);
        link_precedence(&mut store, t(0), t(1)).unwrap();
        link_precedence(&mut store, t(1), t(2)).unwrap();
        store.task_mut(t(0)).unwrap().projects.insert(ProjectId::new(1));
        store.task_mut(t(1)).unwrap().complete(now()).unwrap();

        propagate_memberships(&mut store);

        assert!(store.task(t(1)).unwrap().projects.is_empty());
        assert!(store.task(t(2)).unwrap().projects.is_empty());
    }

    #[test]
    fn dangling_edges_are_dropped_and_reported() {
        let mut store = store_with(1);
        store.task_mut(t(0)).unwrap().followers.insert(t(42));

        let report = propagate_memberships(&mut store);
        assert_eq!(report.dangling_edges, vec![(t(0), t(42))]);
        assert!(store.task(t(0)).unwrap().followers.is_empty());
    }

    #[test]
    fn propagation_is_a_no_op_on_a_consistent_graph() {
        let mut store = store_with(2);
        link_precedence(&mut store, t(0), t(1)).unwrap();
        propagate_memberships(&mut store);

        let again = propagate_memberships(&mut store);
        assert_eq!(again.passes, 1);
        assert_eq!(again.backfilled_edges, 0);
        assert_eq!(again.memberships_added, 0);
    }
}
