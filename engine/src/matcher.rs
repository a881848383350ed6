//! Segment matching under the stuck-off fault model.
//!
//! A faulty segment can only go dark. An observed pattern is therefore
//! consistent with a digit exactly when it lights no segment the digit
//! leaves off.

use countdown_types::{Digit, SegmentMask};

/// Verdict of comparing one observed pattern with one digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentMatch {
    pub consistent: bool,
    /// Segments the digit lights but the observation did not.
    /// Only meaningful when `consistent` holds.
    pub missing: SegmentMask,
}

impl SegmentMatch {
    #[must_use]
    pub fn missing_if_consistent(self) -> Option<SegmentMask> {
        self.consistent.then_some(self.missing)
    }
}

#[must_use]
pub fn check(observed: SegmentMask, digit: Digit) -> SegmentMatch {
    let real = digit.code();
    SegmentMatch {
        consistent: observed.is_subset_of(real),
        missing: real ^ observed,
    }
}
