//! Submission store edit races

use std::sync::Arc;

use crate::references::DefaultReferences;
use crate::repl::engine::{LineId, SubmissionStore};
use crate::workspace::Workspace;

fn store() -> SubmissionStore {
    SubmissionStore::new(Arc::new(Workspace::new(DefaultReferences::builtin())))
}

/// Apply a no-op change so any fork taken earlier is stale
fn land_other_change(store: &SubmissionStore) {
    let workspace = store.workspace();
    let current = workspace.current_solution();
    assert!(workspace.try_apply_changes((*current).clone()));
}

#[test]
fn test_lost_edit_requeries_current_snapshot() {
    let store = store();
    let unit = store.create_or_update(LineId(1), "int x = 1;", &[]);

    let mut attempts = 0;
    let updated = store.update_with(&unit, "int x = 2;", &[], |fork| {
        attempts += 1;
        land_other_change(&store);
        store.workspace().try_apply_changes(fork)
    });

    assert_eq!(attempts, 3);
    let current = store.workspace().current_solution();
    assert_eq!(updated.handle().solution().version(), current.version());
    assert_eq!(updated.project_id(), unit.project_id());
    assert_eq!(updated.code(), "int x = 1;");
    assert!(updated.compilation().is_some());
}

#[test]
fn test_edit_wins_after_one_lost_race() {
    let store = store();
    let unit = store.create_or_update(LineId(1), "int x = 1;", &[]);

    let mut attempts = 0;
    let updated = store.update_with(&unit, "int x = 2;", &[], |fork| {
        attempts += 1;
        if attempts == 1 {
            land_other_change(&store);
        }
        store.workspace().try_apply_changes(fork)
    });

    assert_eq!(attempts, 2);
    assert_eq!(updated.code(), "int x = 2;");
    let current = store.workspace().current_solution();
    assert_eq!(updated.handle().solution().version(), current.version());
}

#[test]
fn test_lost_edit_keeps_store_usable() {
    let store = store();
    let unit = store.create_or_update(LineId(1), "int x = 1;", &[]);
    store.update_with(&unit, "int x = 2;", &[], |_| false);

    let retried = store.create_or_update(LineId(1), "int x = 3;", &[]);
    assert_eq!(retried.code(), "int x = 3;");
    assert_eq!(store.len(), 1);
}

#[test]
fn test_contended_edits_never_fail() {
    let store = store();
    for line in 1..=8u64 {
        store.create_or_update(LineId(line), "int v = 0;", &[]);
    }

    std::thread::scope(|scope| {
        for line in 1..=8u64 {
            let store = &store;
            scope.spawn(move || {
                for round in 1..=25 {
                    let code = format!("int v = {};", round);
                    let unit = store.create_or_update(LineId(line), &code, &[]);
                    assert_eq!(unit.line_id(), LineId(line));
                    let version = unit.handle().solution().version();
                    assert!(version <= store.workspace().current_solution().version());
                    assert!(unit.code().starts_with("int v = "));
                }
            });
        }
    });

    assert_eq!(store.len(), 8);
    assert_eq!(store.lines().len(), 8);
}
