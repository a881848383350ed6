//! Sessions restored from SQLite behave exactly like sessions that never left memory.

use std::sync::Arc;

use countdown_engine::SessionRegistry;
use countdown_store::SqliteStore;
use countdown_types::{SegmentMask, SessionId};
use proptest::prelude::*;

use crate::common::{Cycle, countdown, mask, run_cycle};

/// Replay a countdown with a fresh registry for every reading, so each
/// observation starts from what the store holds.
fn run_with_restarts(
    store: &Arc<SqliteStore>,
    start: u8,
    left_fault: SegmentMask,
    right_fault: SegmentMask,
) -> Cycle {
    let id = SessionRegistry::new(store.clone()).create().unwrap();
    let mut cycle = Cycle {
        steps: 0,
        deductions: Vec::new(),
        error: None,
    };
    for observation in countdown(start, left_fault, right_fault) {
        cycle.steps += 1;
        let registry = SessionRegistry::new(store.clone());
        match registry.apply(&id, observation) {
            Ok(deduction) => {
                let solved = deduction.solved() == Some(start);
                cycle.deductions.push(deduction);
                if solved {
                    break;
                }
            }
            Err(err) => {
                cycle.error = Some(err);
                break;
            }
        }
    }
    cycle
}

#[test]
fn worked_example_survives_restarts() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let cycle = run_with_restarts(&store, 2, SegmentMask::EMPTY, mask("1000010"));

    assert!(cycle.error.is_none());
    assert_eq!(cycle.last().start, vec![2]);
    assert_eq!(cycle.last().right_missing(), mask("1000010"));
}

#[test]
fn reopened_database_continues_the_countdown() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.db");
    let readings = countdown(32, SegmentMask::EMPTY, SegmentMask::EMPTY);

    let id = {
        let registry = SessionRegistry::new(Arc::new(SqliteStore::open(&path).unwrap()));
        let id = registry.create().unwrap();
        for observation in &readings[..2] {
            registry.apply(&id, *observation).unwrap();
        }
        id
    };

    let registry = SessionRegistry::new(Arc::new(SqliteStore::open(&path).unwrap()));
    assert_eq!(registry.count().unwrap(), 1);
    assert_eq!(registry.snapshot(&id).unwrap().step, 3);

    let third = registry.apply(&id, readings[2]).unwrap();
    assert_eq!(third.start, vec![32, 82, 92]);
    let fourth = registry.apply(&id, readings[3]).unwrap();
    assert_eq!(fourth.solved(), Some(32));
}

#[test]
fn unknown_session_in_fresh_database() {
    let dir = tempfile::tempdir().unwrap();
    let registry = SessionRegistry::new(Arc::new(
        SqliteStore::open(dir.path().join("sessions.db")).unwrap(),
    ));
    assert!(
        registry
            .apply(&SessionId::new("missing"), countdown(1, SegmentMask::EMPTY, SegmentMask::EMPTY)[0])
            .is_err()
    );
}

fn fault() -> impl Strategy<Value = SegmentMask> {
    (0u8..0x80).prop_map(|bits| SegmentMask::new(bits).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn restarts_do_not_change_deductions(
        start in 1u8..=99,
        left_fault in fault(),
        right_fault in fault(),
    ) {
        let memory = SessionRegistry::in_memory();
        let id = memory.create().unwrap();
        let uninterrupted = run_cycle(&memory, &id, start, left_fault, right_fault);

        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let restarted = run_with_restarts(&store, start, left_fault, right_fault);

        prop_assert_eq!(uninterrupted.steps, restarted.steps);
        prop_assert_eq!(&uninterrupted.deductions, &restarted.deductions);
        prop_assert_eq!(
            uninterrupted.error.map(|err| err.to_string()),
            restarted.error.map(|err| err.to_string())
        );
    }
}
