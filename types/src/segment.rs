//! Seven-segment bit patterns.
//!
//! Bit 6 is the first character of the wire form, bit 0 the last. A pattern
//! is always confined to the low seven bits.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of segments in one digit display.
pub const SEGMENT_COUNT: usize = 7;

const MASK_BITS: u8 = 0b111_1111;

/// A set of segments, one bit per segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SegmentMask(u8);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentParseError {
    #[error("segment pattern must be {SEGMENT_COUNT} characters, got {0}")]
    Length(usize),
    #[error("segment pattern may only contain '0' and '1', found {0:?}")]
    InvalidChar(char),
    #[error("segment bits {0:#b} exceed {SEGMENT_COUNT} segments")]
    OutOfRange(u8),
}

impl SegmentMask {
    /// No segment set.
    pub const EMPTY: Self = Self(0);
    /// Every segment set.
    pub const FULL: Self = Self(MASK_BITS);

    /// Build a mask from raw bits, rejecting anything above bit 6.
    pub fn new(bits: u8) -> Result<Self, SegmentParseError> {
        if bits & !MASK_BITS == 0 {
            Ok(Self(bits))
        } else {
            Err(SegmentParseError::OutOfRange(bits))
        }
    }

    pub(crate) const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & MASK_BITS)
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every segment set in `self` is also set in `other`.
    #[must_use]
    pub const fn is_subset_of(self, other: Self) -> bool {
        self.0 | other.0 == other.0
    }

    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl fmt::Display for SegmentMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:07b}", self.0)
    }
}

impl FromStr for SegmentMask {
    type Err = SegmentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let len = s.chars().count();
        if len != SEGMENT_COUNT {
            return Err(SegmentParseError::Length(len));
        }
        let mut bits = 0u8;
        for ch in s.chars() {
            bits <<= 1;
            match ch {
                '0' => {}
                '1' => bits |= 1,
                other => return Err(SegmentParseError::InvalidChar(other)),
            }
        }
        Ok(Self(bits))
    }
}

impl TryFrom<String> for SegmentMask {
    type Error = SegmentParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SegmentMask> for String {
    fn from(value: SegmentMask) -> Self {
        value.to_string()
    }
}

impl BitOr for SegmentMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SegmentMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for SegmentMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for SegmentMask {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl BitXor for SegmentMask {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}
