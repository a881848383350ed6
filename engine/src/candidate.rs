use countdown_types::{Digit, SegmentMask};

use crate::matcher;

/// One hypothesis for the counter's start value.
///
/// The missing masks only ever grow. A hypothesis that stops fitting is
/// dropped by the engine, never repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    value: u8,
    left_missing: SegmentMask,
    right_missing: SegmentMask,
}

impl Candidate {
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self {
            value,
            left_missing: SegmentMask::EMPTY,
            right_missing: SegmentMask::EMPTY,
        }
    }

    /// Rebuild a hypothesis from persisted state.
    #[must_use]
    pub fn restore(value: u8, left: SegmentMask, right: SegmentMask) -> Self {
        Self {
            value,
            left_missing: left,
            right_missing: right,
        }
    }

    #[must_use]
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Tens-display segments deduced stuck off under this hypothesis.
    #[must_use]
    pub fn left_missing(&self) -> SegmentMask {
        self.left_missing
    }

    /// Units-display segments deduced stuck off under this hypothesis.
    #[must_use]
    pub fn right_missing(&self) -> SegmentMask {
        self.right_missing
    }

    /// Match `code` against the tens digit of `displayed`.
    pub fn try_match_left(&mut self, code: SegmentMask, displayed: u8) -> bool {
        match matcher::check(code, Digit::tens_of(displayed)).missing_if_consistent() {
            Some(missing) => {
                self.left_missing |= missing;
                true
            }
            None => false,
        }
    }

    /// Match `code` against the units digit of `displayed`.
    pub fn try_match_right(&mut self, code: SegmentMask, displayed: u8) -> bool {
        match matcher::check(code, Digit::units_of(displayed)).missing_if_consistent() {
            Some(missing) => {
                self.right_missing |= missing;
                true
            }
            None => false,
        }
    }
}
