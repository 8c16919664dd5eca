//! Core interval types for range representation.

use crate::error::{RangesError, Result};
use std::cmp::Ordering;
use std::fmt;

/// A closed integer interval `[start, end]`.
///
/// An empty interval is encoded as `end == start - 1`, so its width is zero
/// while it still carries a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub start: i64,
    pub end: i64,
}

impl Interval {
    /// Create a new interval without validating it.
    #[inline]
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Create an interval, rejecting `end < start - 1`.
    pub fn try_new(start: i64, end: i64) -> Result<Self> {
        if end < start - 1 {
            return Err(RangesError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Create an interval from its start and width.
    pub fn from_width(start: i64, width: i64) -> Result<Self> {
        Self::try_new(start, start + width - 1)
    }

    /// Number of positions covered.
    #[inline]
    pub fn width(&self) -> i64 {
        self.end - self.start + 1
    }

    /// Returns true if the interval covers no position.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() <= 0
    }

    /// Midpoint, rounded towards negative infinity.
    #[inline]
    pub fn midpoint(&self) -> i64 {
        (self.start + self.end).div_euclid(2)
    }

    /// Signed overlap width: positive when the intervals share positions,
    /// zero when adjacent, negative by the size of the gap otherwise.
    #[inline]
    pub fn overlap_width(&self, other: &Interval) -> i64 {
        self.end.min(other.end) - self.start.max(other.start) + 1
    }

    /// Check if this interval shares at least one position with another.
    #[inline]
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end && !self.is_empty() && !other.is_empty()
    }

    /// Check if this interval lies entirely inside another.
    #[inline]
    pub fn within(&self, other: &Interval) -> bool {
        other.start <= self.start && self.end <= other.end
    }

    /// Distance to another interval: 0 when overlapping, otherwise the
    /// difference between the facing coordinates (adjacent intervals are 1 apart).
    #[inline]
    pub fn distance_to(&self, other: &Interval) -> i64 {
        if self.overlaps(other) {
            0
        } else if self.end < other.start {
            other.start - self.end
        } else {
            self.start - other.end
        }
    }

    /// Positions shared by both intervals, if the result is a valid interval.
    ///
    /// Adjacent intervals yield an empty interval; intervals further apart
    /// yield `None`.
    #[inline]
    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if end < start - 1 {
            None
        } else {
            Some(Interval { start, end })
        }
    }

    /// Move both coordinates by `delta`.
    #[inline]
    pub fn translate(&self, delta: i64) -> Interval {
        Interval {
            start: self.start + delta,
            end: self.end + delta,
        }
    }

    /// Reflect the interval through the origin.
    ///
    /// Directional queries on the minus strand are answered by mirroring
    /// coordinates so left and right swap.
    #[inline]
    pub fn mirror(&self) -> Interval {
        Interval {
            start: -self.end,
            end: -self.start,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

impl Ord for Interval {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then(self.end.cmp(&other.end))
    }
}

impl PartialOrd for Interval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Strand orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Strand {
    Plus,
    Minus,
    #[default]
    Unstranded,
}

impl Strand {
    pub fn from_char(c: char) -> Self {
        match c {
            '+' => Strand::Plus,
            '-' => Strand::Minus,
            _ => Strand::Unstranded,
        }
    }

    /// Two strands are compatible unless one is `+` and the other `-`.
    #[inline]
    pub fn is_compatible(self, other: Strand) -> bool {
        self == Strand::Unstranded || other == Strand::Unstranded || self == other
    }

    #[inline]
    pub fn is_minus(self) -> bool {
        self == Strand::Minus
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
            Strand::Unstranded => write!(f, "*"),
        }
    }
}
