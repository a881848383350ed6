//! Property tests for the deduction engine.

use countdown_engine::{Candidate, DeductionEngine, DeductionError};
use countdown_types::{Digit, Observation, SegmentMask};
use proptest::prelude::*;

fn mask(bits: u8) -> SegmentMask {
    SegmentMask::new(bits & 0b111_1111).unwrap()
}

/// Readings a display with stuck-off segments shows while counting down from
/// `start`. `flicker` dims extra segments on individual readings, which
/// breaks the fault model and makes hypotheses drop out.
fn readings(start: u8, left_fault: u8, right_fault: u8, flicker: &[(u8, u8)]) -> Vec<Observation> {
    (1..=start)
        .rev()
        .zip(flicker.iter().copied().chain(std::iter::repeat((0, 0))))
        .map(|(shown, (left_dim, right_dim))| {
            let left = Digit::tens_of(shown).code().bits() & !left_fault & !left_dim;
            let right = Digit::units_of(shown).code().bits() & !right_fault & !right_dim;
            Observation::green(mask(left), mask(right))
        })
        .collect()
}

fn observation_strategy() -> impl Strategy<Value = Vec<Observation>> {
    (
        1u8..=99,
        0u8..128,
        0u8..128,
        prop::collection::vec((0u8..128, 0u8..128), 0..6),
        prop::bool::ANY,
    )
        .prop_map(|(start, left_fault, right_fault, mut flicker, clean)| {
            if clean {
                flicker.clear();
            }
            readings(start, left_fault, right_fault, &flicker)
        })
}

fn find(candidates: &[Candidate], value: u8) -> Option<Candidate> {
    candidates.iter().copied().find(|c| c.value() == value)
}

proptest! {
    #[test]
    fn surviving_set_only_shrinks(observations in observation_strategy()) {
        let mut engine = DeductionEngine::new();
        for observation in observations {
            let before = engine.surviving_values();
            if engine.apply(observation).is_err() {
                break;
            }
            for value in engine.surviving_values() {
                prop_assert!(before.contains(&value));
            }
        }
    }

    #[test]
    fn replay_is_deterministic(observations in observation_strategy()) {
        let mut first = DeductionEngine::new();
        let mut second = DeductionEngine::new();
        for observation in observations {
            prop_assert_eq!(first.apply(observation), second.apply(observation));
        }
        prop_assert_eq!(first, second);
    }

    #[test]
    fn fault_masks_never_shrink(observations in observation_strategy()) {
        let mut engine = DeductionEngine::new();
        for observation in observations {
            let before = engine.candidates().to_vec();
            if engine.apply(observation).is_err() {
                break;
            }
            for after in engine.candidates() {
                let prior = find(&before, after.value()).unwrap();
                prop_assert!(prior.left_missing().is_subset_of(after.left_missing()));
                prop_assert!(prior.right_missing().is_subset_of(after.right_missing()));
            }
        }
    }

    #[test]
    fn units_failure_takes_whole_residue_class(observations in observation_strategy()) {
        let mut engine = DeductionEngine::new();
        for observation in observations {
            let Observation::Green { right, .. } = observation else { unreachable!() };
            let before = engine.candidates().to_vec();
            let step = engine.step();
            let outcome = engine.apply(observation);
            let after = engine.surviving_values();

            for prior in &before {
                let current = i64::from(prior.value()) - i64::from(step) + 1;
                if current <= 0 || after.contains(&prior.value()) {
                    continue;
                }
                let mut probe = *prior;
                let units_ok = probe.try_match_right(right, current as u8)
                    && !engine.right_working().intersects(probe.right_missing());
                if !units_ok {
                    prop_assert!(
                        after.iter().all(|v| v % 10 != prior.value() % 10),
                        "residue of {} survived a units mismatch",
                        prior.value()
                    );
                }
            }
            if outcome.is_err() {
                break;
            }
        }
    }

    #[test]
    fn true_start_survives_stuck_off_faults(
        start in 1u8..=99,
        left_fault in 0u8..128,
        right_fault in 0u8..128,
    ) {
        let mut engine = DeductionEngine::new();
        for observation in readings(start, left_fault, right_fault, &[]) {
            let deduction = engine.apply(observation).unwrap();
            prop_assert!(deduction.start.contains(&start));
        }
        let solved = engine.apply(Observation::Red).unwrap();
        prop_assert_eq!(solved.start.clone(), vec![start]);
        // Every reported fault is a real fault.
        prop_assert!(solved.left_missing().is_subset_of(mask(left_fault)));
        prop_assert!(solved.right_missing().is_subset_of(mask(right_fault)));
    }

    #[test]
    fn terminal_sessions_stay_frozen(
        observations in observation_strategy(),
        extra_left in 0u8..128,
        extra_right in 0u8..128,
    ) {
        let mut engine = DeductionEngine::new();
        for observation in observations {
            if engine.apply(observation).is_err() {
                break;
            }
        }
        if !engine.is_terminal() {
            let _ = engine.apply(Observation::Red);
        }
        prop_assert!(engine.is_terminal());

        let frozen = engine.clone();
        let extra = Observation::green(mask(extra_left), mask(extra_right));
        prop_assert_eq!(engine.apply(extra), Err(DeductionError::SessionTerminal));
        prop_assert_eq!(engine.apply(Observation::Red), Err(DeductionError::SessionTerminal));
        prop_assert_eq!(engine, frozen);
    }
}
