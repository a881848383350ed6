use std::fmt;

use crate::SegmentMask;

/// Canonical lit segments for each decimal digit.
const DIGIT_CODES: [SegmentMask; 10] = [
    SegmentMask::from_bits_truncate(0b111_0111),
    SegmentMask::from_bits_truncate(0b001_0010),
    SegmentMask::from_bits_truncate(0b101_1101),
    SegmentMask::from_bits_truncate(0b101_1011),
    SegmentMask::from_bits_truncate(0b011_1010),
    SegmentMask::from_bits_truncate(0b110_1011),
    SegmentMask::from_bits_truncate(0b110_1111),
    SegmentMask::from_bits_truncate(0b101_0010),
    SegmentMask::from_bits_truncate(0b111_1111),
    SegmentMask::from_bits_truncate(0b111_1011),
];

/// A decimal digit, 0 through 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digit(u8);

impl Digit {
    #[must_use]
    pub fn new(value: u8) -> Option<Self> {
        (value < 10).then_some(Self(value))
    }

    /// Tens digit of a two-digit display.
    #[must_use]
    pub fn tens_of(number: u8) -> Self {
        Self((number / 10) % 10)
    }

    /// Units digit of a display.
    #[must_use]
    pub fn units_of(number: u8) -> Self {
        Self(number % 10)
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Segments that are lit when this digit is shown on a healthy display.
    #[must_use]
    pub fn code(self) -> SegmentMask {
        DIGIT_CODES[usize::from(self.0)]
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
