//! Whole countdowns replayed against an in-memory registry.

use countdown_engine::{DeductionError, SessionError, SessionRegistry};
use countdown_types::{Observation, SegmentMask};

use crate::common::{mask, run_cycle};

fn starts(cycle: &crate::common::Cycle) -> Vec<Vec<u8>> {
    cycle.deductions.iter().map(|d| d.start.clone()).collect()
}

#[test]
fn healthy_display_from_32_solves_before_red() {
    let registry = SessionRegistry::in_memory();
    let id = registry.create().unwrap();
    let cycle = run_cycle(&registry, &id, 32, SegmentMask::EMPTY, SegmentMask::EMPTY);

    assert!(cycle.error.is_none());
    assert_eq!(cycle.steps, 4);
    assert_eq!(
        starts(&cycle),
        vec![
            vec![32, 38, 82, 88, 92, 98],
            vec![32, 82, 92],
            vec![32, 82, 92],
            vec![32],
        ]
    );
    assert_eq!(cycle.last().missing, (SegmentMask::EMPTY, SegmentMask::EMPTY));
}

#[test]
fn broken_right_segments_need_the_red_light() {
    let registry = SessionRegistry::in_memory();
    let id = registry.create().unwrap();
    let cycle = run_cycle(&registry, &id, 2, SegmentMask::EMPTY, mask("1000010"));

    assert!(cycle.error.is_none());
    assert_eq!(cycle.steps, 3);
    assert_eq!(starts(&cycle), vec![vec![2, 8, 82, 88], vec![2, 8, 82, 88], vec![2]]);
    assert_eq!(cycle.last().left_missing(), SegmentMask::EMPTY);
    assert_eq!(cycle.last().right_missing(), mask("1000010"));

    // Red closed the session.
    let err = registry.apply(&id, Observation::Red).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Deduction(DeductionError::SessionTerminal)
    ));
}

#[test]
fn eight_eight_with_dead_bottom_segment_solves_at_once() {
    let registry = SessionRegistry::in_memory();
    let id = registry.create().unwrap();
    let cycle = run_cycle(&registry, &id, 88, SegmentMask::EMPTY, mask("0000001"));

    assert_eq!(cycle.steps, 1);
    assert_eq!(cycle.last().start, vec![88]);
    assert_eq!(cycle.last().right_missing(), mask("0000001"));
}

#[test]
fn faults_on_both_digits_are_reported() {
    let registry = SessionRegistry::in_memory();
    let id = registry.create().unwrap();
    let cycle = run_cycle(&registry, &id, 40, mask("0000001"), mask("0100000"));

    assert_eq!(
        starts(&cycle),
        vec![vec![40, 48, 80, 88, 90, 98], vec![40]]
    );
    assert_eq!(cycle.last().missing, (mask("0000001"), mask("0100000")));
}

#[test]
fn fault_never_lit_by_the_digits_stays_hidden() {
    let registry = SessionRegistry::in_memory();
    let id = registry.create().unwrap();
    let cycle = run_cycle(&registry, &id, 17, mask("0001000"), SegmentMask::EMPTY);

    assert_eq!(cycle.steps, 9);
    assert_eq!(cycle.last().start, vec![17]);
    assert_eq!(cycle.last().missing, (SegmentMask::EMPTY, SegmentMask::EMPTY));
    assert_eq!(cycle.deductions[1].start, vec![7, 17, 37, 47, 77, 87, 97]);
    assert_eq!(cycle.deductions[7].start, vec![17, 37, 47, 77, 87, 97]);
}

#[test]
fn single_digit_start_resolved_by_red() {
    let registry = SessionRegistry::in_memory();
    let id = registry.create().unwrap();
    let cycle = run_cycle(&registry, &id, 5, SegmentMask::EMPTY, SegmentMask::EMPTY);

    assert_eq!(cycle.steps, 6);
    assert_eq!(cycle.deductions[0].start, vec![5, 6, 8, 9, 85, 86, 88, 89]);
    assert_eq!(cycle.deductions[4].start, vec![5, 85]);
    assert_eq!(cycle.last().start, vec![5]);
}

#[test]
fn sessions_do_not_share_state() {
    let registry = SessionRegistry::in_memory();
    let a = registry.create().unwrap();
    let b = registry.create().unwrap();

    let first = run_cycle(&registry, &a, 32, SegmentMask::EMPTY, SegmentMask::EMPTY);
    let second = run_cycle(&registry, &b, 88, SegmentMask::EMPTY, mask("0000001"));

    assert_eq!(first.last().start, vec![32]);
    assert_eq!(second.last().start, vec![88]);
    assert_eq!(registry.count().unwrap(), 2);
}
