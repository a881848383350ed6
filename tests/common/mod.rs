//! Shared test utilities and fixtures
//!
//! A simulated display: counts down from a start value with some segments
//! permanently dark, and feeds each reading to a session.

#![allow(dead_code)]

use countdown_engine::{SessionError, SessionRegistry};
use countdown_types::{Deduction, Digit, Observation, SegmentMask, SessionId};

/// What the display shows for `value` with `fault` segments stuck off.
pub fn shown(digit: Digit, fault: SegmentMask) -> SegmentMask {
    (digit.code() | fault) ^ fault
}

pub fn mask(raw: &str) -> SegmentMask {
    raw.parse().unwrap()
}

/// Green readings from `start` down to 1, then red.
pub fn countdown(start: u8, left_fault: SegmentMask, right_fault: SegmentMask) -> Vec<Observation> {
    (1..=start)
        .rev()
        .map(|value| {
            Observation::green(
                shown(Digit::tens_of(value), left_fault),
                shown(Digit::units_of(value), right_fault),
            )
        })
        .chain(std::iter::once(Observation::Red))
        .collect()
}

/// Result of feeding a countdown to one session.
#[derive(Debug)]
pub struct Cycle {
    /// Observations sent, including the last one.
    pub steps: usize,
    /// Every successful deduction in order.
    pub deductions: Vec<Deduction>,
    /// The error that ended the cycle, if any.
    pub error: Option<SessionError>,
}

impl Cycle {
    pub fn last(&self) -> &Deduction {
        self.deductions.last().expect("cycle produced no deduction")
    }
}

/// Feed readings until the start value is pinned down or a reading is rejected.
pub fn run_cycle(
    registry: &SessionRegistry,
    id: &SessionId,
    start: u8,
    left_fault: SegmentMask,
    right_fault: SegmentMask,
) -> Cycle {
    let mut cycle = Cycle {
        steps: 0,
        deductions: Vec::new(),
        error: None,
    };
    for observation in countdown(start, left_fault, right_fault) {
        cycle.steps += 1;
        match registry.apply(id, observation) {
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
