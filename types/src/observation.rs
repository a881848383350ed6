//! Observation payloads and their validation.
//!
//! The wire shape ([`RawObservation`]) is loose so that every malformed
//! payload reaches [`Observation::try_from`] and is reported the same way.

use serde::Deserialize;
use thiserror::Error;

use crate::{SegmentMask, SegmentParseError};

/// Light colour of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// The counter is still running and shows a number.
    Green,
    /// The counter reached zero.
    Red,
}

impl Color {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Color::Green => "green",
            Color::Red => "red",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "green" => Some(Color::Green),
            "red" => Some(Color::Red),
            _ => None,
        }
    }
}

/// A validated observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    Green {
        /// Pattern seen on the tens display.
        left: SegmentMask,
        /// Pattern seen on the units display.
        right: SegmentMask,
    },
    Red,
}

impl Observation {
    #[must_use]
    pub fn green(left: SegmentMask, right: SegmentMask) -> Self {
        Observation::Green { left, right }
    }

    #[must_use]
    pub fn color(&self) -> Color {
        match self {
            Observation::Green { .. } => Color::Green,
            Observation::Red => Color::Red,
        }
    }
}

/// Observation as it arrives over the wire, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawObservation {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub numbers: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObservationError {
    #[error("observation has no color")]
    MissingColor,
    #[error("unknown observation color {0:?}")]
    UnknownColor(String),
    #[error("green observation has no segment patterns")]
    MissingNumbers,
    #[error("green observation needs exactly 2 segment patterns, got {0}")]
    WrongNumberCount(usize),
    #[error(transparent)]
    Pattern(#[from] SegmentParseError),
}

impl TryFrom<RawObservation> for Observation {
    type Error = ObservationError;

    fn try_from(raw: RawObservation) -> Result<Self, Self::Error> {
        let color = raw.color.ok_or(ObservationError::MissingColor)?;
        match Color::parse(&color) {
            None => Err(ObservationError::UnknownColor(color)),
            // Red carries no segment data; anything sent along is ignored.
            Some(Color::Red) => Ok(Observation::Red),
            Some(Color::Green) => {
                let numbers = raw.numbers.ok_or(ObservationError::MissingNumbers)?;
                let [left, right] = numbers.as_slice() else {
                    return Err(ObservationError::WrongNumberCount(numbers.len()));
                };
                Ok(Observation::green(left.parse()?, right.parse()?))
            }
        }
    }
}
