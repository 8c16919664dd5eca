//! Directional shift and flank.
//!
//! `Left`/`Right` move along the coordinate axis regardless of strand.
//! `Upstream`/`Downstream` are strand-relative: upstream is leftward on `+`
//! and unstranded rows, rightward on `-`.

use crate::commands::anchor::check_values;
use crate::error::{GeometryError, RangesError, Result};
use crate::interval::{Interval, Strand};
use crate::parallel::try_map_rows;
use crate::ranges::Ranges;
use log::debug;

/// Direction of a shift or flank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Upstream,
    Downstream,
}

impl Direction {
    /// True for directions that need strand information.
    #[inline]
    pub fn is_strand_relative(self) -> bool {
        matches!(self, Direction::Upstream | Direction::Downstream)
    }

    fn name(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Upstream => "upstream",
            Direction::Downstream => "downstream",
        }
    }

    /// Geometric direction: -1 for leftward, +1 for rightward.
    fn sign(self, strand: Option<Strand>) -> std::result::Result<i64, GeometryError> {
        let rightward = match self {
            Direction::Left => false,
            Direction::Right => true,
            Direction::Upstream | Direction::Downstream => {
                let strand = strand.ok_or(GeometryError::MissingStrand {
                    direction: self.name(),
                })?;
                strand.is_minus() == (self == Direction::Upstream)
            }
        };
        Ok(if rightward { 1 } else { -1 })
    }
}

/// Move both coordinates of `interval` by `delta` in `direction`.
///
/// `strand` is only consulted for upstream/downstream; `None` there is a
/// `MissingStrand` error.
pub fn shift(
    interval: Interval,
    strand: Option<Strand>,
    delta: i64,
    direction: Direction,
) -> std::result::Result<Interval, GeometryError> {
    Ok(interval.translate(direction.sign(strand)? * delta))
}

/// The `width` positions immediately beside `interval` in `direction`.
pub fn flank(
    interval: Interval,
    strand: Option<Strand>,
    width: i64,
    direction: Direction,
) -> std::result::Result<Interval, GeometryError> {
    if width < 0 {
        return Err(GeometryError::NegativeWidth { width });
    }
    let out = if direction.sign(strand)? < 0 {
        Interval::new(interval.start - width, interval.start - 1)
    } else {
        Interval::new(interval.end + 1, interval.end + width)
    };
    Ok(out)
}

/// Rowwise shift/flank over a collection.
#[derive(Debug, Clone, Copy)]
pub struct ShiftCommand {
    pub direction: Direction,
}

impl ShiftCommand {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }

    /// Shift every row by `delta`.
    pub fn shift(&self, ranges: &Ranges, delta: i64) -> Result<Ranges> {
        self.apply(ranges, "shift", |row| {
            shift(ranges.interval(row), ranges.strand_opt(row), delta, self.direction)
        })
    }

    /// Shift row `i` by `deltas[i]`.
    pub fn shift_each(&self, ranges: &Ranges, deltas: &[i64]) -> Result<Ranges> {
        check_values(ranges, deltas)?;
        self.apply(ranges, "shift", |row| {
            shift(ranges.interval(row), ranges.strand_opt(row), deltas[row], self.direction)
        })
    }

    /// Replace every row by its flank of `width` positions.
    pub fn flank(&self, ranges: &Ranges, width: i64) -> Result<Ranges> {
        self.apply(ranges, "flank", |row| {
            flank(ranges.interval(row), ranges.strand_opt(row), width, self.direction)
        })
    }

    fn apply<F>(&self, ranges: &Ranges, operation: &'static str, f: F) -> Result<Ranges>
    where
        F: Fn(usize) -> std::result::Result<Interval, GeometryError> + Sync + Send,
    {
        if self.direction.is_strand_relative() && !ranges.has_strand() {
            return Err(RangesError::MissingStrand { operation });
        }
        debug!("{} {} rows {}", operation, ranges.len(), self.direction.name());
        let intervals = try_map_rows(ranges.len(), f)?;
        ranges.with_intervals(intervals)
    }
}
