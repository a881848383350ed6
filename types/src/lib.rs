//! Core domain types for the countdown deducer.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

mod digit;
mod ids;
mod observation;
mod segment;

pub use digit::Digit;
pub use ids::SessionId;
pub use observation::{Color, Observation, ObservationError, RawObservation};
pub use segment::{SEGMENT_COUNT, SegmentMask, SegmentParseError};

use serde::{Deserialize, Serialize};

/// Highest start value a two-digit counter can have.
pub const MAX_START: u8 = 99;

// ============================================================================
// Deduction result
// ============================================================================

/// What is known after an observation has been applied.
///
/// `missing` holds the segments (tens, units) that every surviving hypothesis
/// agrees are stuck off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deduction {
    /// Surviving start values, ascending.
    pub start: Vec<u8>,
    pub missing: (SegmentMask, SegmentMask),
}

impl Deduction {
    #[must_use]
    pub fn new(start: Vec<u8>, left_missing: SegmentMask, right_missing: SegmentMask) -> Self {
        Self {
            start,
            missing: (left_missing, right_missing),
        }
    }

    #[must_use]
    pub fn left_missing(&self) -> SegmentMask {
        self.missing.0
    }

    #[must_use]
    pub fn right_missing(&self) -> SegmentMask {
        self.missing.1
    }

    /// The start value, once exactly one hypothesis is left.
    #[must_use]
    pub fn solved(&self) -> Option<u8> {
        match self.start.as_slice() {
            [value] => Some(*value),
            _ => None,
        }
    }
}
