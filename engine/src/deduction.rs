//! The deduction engine for one session.
//!
//! # Step arithmetic
//!
//! `step` counts accepted green observations plus one. A hypothesis with start
//! value `v` predicts that the counter currently shows `v - step + 1`; once that
//! reaches zero the hypothesis can no longer be green.
//!
//! # Pruning
//!
//! Every hypothesis shares the same `step`, so two start values with the same
//! units digit always predict the same units digit. A units mismatch therefore
//! eliminates the whole residue class at once. Tens mismatches depend on the
//! full value and only eliminate the one hypothesis.

use countdown_types::{Deduction, MAX_START, Observation, SegmentMask};
use thiserror::Error;

use crate::Candidate;

/// `step` value of a session that has seen its red observation.
pub const TERMINAL_STEP: u32 = 0;

const HYPOTHESIS_COUNT: usize = MAX_START as usize + 1;

/// Largest `step` a session can reach: the green that retires the last
/// hypothesis leaves the counter one past `MAX_START + 1`.
const MAX_STEP: u32 = MAX_START as u32 + 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeductionError {
    #[error("session is terminal and accepts no more observations")]
    SessionTerminal,
    #[error("a red observation needs at least one green observation first")]
    InsufficientData,
    #[error("no start value is consistent with the observations")]
    NoSolutions,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("candidate value {0} is out of range")]
    ValueOutOfRange(u8),
    #[error("candidate value {0} appears more than once")]
    DuplicateValue(u8),
    #[error("step {0} is past the end of any countdown")]
    StepOutOfRange(u32),
}

/// Persisted form of a [`DeductionEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSnapshot {
    pub step: u32,
    pub left_working: SegmentMask,
    pub right_working: SegmentMask,
    pub candidates: Vec<Candidate>,
}

/// Candidate set, step counter and observed-lit masks of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeductionEngine {
    step: u32,
    /// Every segment ever observed lit on the tens display.
    left_working: SegmentMask,
    /// Every segment ever observed lit on the units display.
    right_working: SegmentMask,
    /// Live hypotheses, ascending by value.
    candidates: Vec<Candidate>,
}

impl Default for DeductionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DeductionEngine {
    /// A fresh session: all 100 start values live, step 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            step: 1,
            left_working: SegmentMask::EMPTY,
            right_working: SegmentMask::EMPTY,
            candidates: (0..=MAX_START).map(Candidate::new).collect(),
        }
    }

    pub fn restore(snapshot: EngineSnapshot) -> Result<Self, SnapshotError> {
        if snapshot.step > MAX_STEP {
            return Err(SnapshotError::StepOutOfRange(snapshot.step));
        }
        let mut candidates = snapshot.candidates;
        candidates.sort_by_key(Candidate::value);
        for pair in candidates.windows(2) {
            if pair[0].value() == pair[1].value() {
                return Err(SnapshotError::DuplicateValue(pair[0].value()));
            }
        }
        if let Some(last) = candidates.last()
            && last.value() > MAX_START
        {
            return Err(SnapshotError::ValueOutOfRange(last.value()));
        }
        Ok(Self {
            step: snapshot.step,
            left_working: snapshot.left_working,
            right_working: snapshot.right_working,
            candidates,
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            step: self.step,
            left_working: self.left_working,
            right_working: self.right_working,
            candidates: self.candidates.clone(),
        }
    }

    #[must_use]
    pub fn step(&self) -> u32 {
        self.step
    }

    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    #[must_use]
    pub fn surviving_values(&self) -> Vec<u8> {
        self.candidates.iter().map(Candidate::value).collect()
    }

    #[must_use]
    pub fn left_working(&self) -> SegmentMask {
        self.left_working
    }

    #[must_use]
    pub fn right_working(&self) -> SegmentMask {
        self.right_working
    }

    /// True after a red observation or once no hypothesis is left.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.step == TERMINAL_STEP || self.candidates.is_empty()
    }

    /// Validate and apply one observation.
    ///
    /// Rejections (`SessionTerminal`, `InsufficientData`) leave the engine
    /// untouched. `NoSolutions` is reported after the observation has been
    /// applied; the engine is terminal from then on.
    pub fn apply(&mut self, observation: Observation) -> Result<Deduction, DeductionError> {
        if self.is_terminal() {
            return Err(DeductionError::SessionTerminal);
        }
        match observation {
            Observation::Green { left, right } => {
                let deduction = self.observe_green(left, right);
                if deduction.start.is_empty() {
                    Err(DeductionError::NoSolutions)
                } else {
                    Ok(deduction)
                }
            }
            Observation::Red if self.step == 1 => Err(DeductionError::InsufficientData),
            Observation::Red => self.observe_red(),
        }
    }

    fn observe_green(&mut self, left: SegmentMask, right: SegmentMask) -> Deduction {
        self.left_working |= left;
        self.right_working |= right;

        let step = i64::from(self.step);
        let left_working = self.left_working;
        let right_working = self.right_working;
        let mut eliminated = [false; HYPOTHESIS_COUNT];

        for candidate in &mut self.candidates {
            let value = candidate.value();
            if eliminated[usize::from(value)] {
                continue;
            }

            let current = i64::from(value) - step + 1;
            if current <= 0 {
                eliminated[usize::from(value)] = true;
                continue;
            }
            let displayed = current as u8;

            if !candidate.try_match_right(right, displayed)
                || right_working.intersects(candidate.right_missing())
            {
                let residue = value % 10;
                tracing::trace!(residue, step, "units mismatch, pruning residue class");
                for same_units in (usize::from(residue)..HYPOTHESIS_COUNT).step_by(10) {
                    eliminated[same_units] = true;
                }
                continue;
            }

            if !candidate.try_match_left(left, displayed)
                || left_working.intersects(candidate.left_missing())
            {
                eliminated[usize::from(value)] = true;
            }
        }

        self.step += 1;
        self.candidates
            .retain(|candidate| !eliminated[usize::from(candidate.value())]);

        let (left_missing, right_missing) = self.aggregate_missing();
        Deduction::new(self.surviving_values(), left_missing, right_missing)
    }

    fn observe_red(&mut self) -> Result<Deduction, DeductionError> {
        let revealed = self.step - 1;
        self.candidates
            .retain(|candidate| u32::from(candidate.value()) == revealed);
        self.step = TERMINAL_STEP;

        if self.candidates.is_empty() {
            tracing::debug!(revealed, "revealed start value was already eliminated");
            return Err(DeductionError::NoSolutions);
        }

        let (left_missing, right_missing) = self.aggregate_missing();
        let start = self.surviving_values();
        Ok(Deduction::new(start, left_missing, right_missing))
    }

    /// Segments every live hypothesis agrees are stuck off.
    ///
    /// All-ones when nothing is live.
    fn aggregate_missing(&self) -> (SegmentMask, SegmentMask) {
        self.candidates.iter().fold(
            (SegmentMask::FULL, SegmentMask::FULL),
            |(left, right), candidate| {
                (left & candidate.left_missing(), right & candidate.right_missing())
            },
        )
    }
}
