//! Anchored resize and stretch.
//!
//! An anchor names the coordinate held fixed while the width changes. The
//! strand-relative anchors (`FivePrime`, `ThreePrime`) resolve to `Start` or
//! `End` per row; unstranded rows behave like `+`.

use crate::error::{GeometryError, Result};
use crate::interval::{Interval, Strand};
use crate::parallel::try_map_rows;
use crate::ranges::Ranges;
use log::debug;

/// Fixed point of a width change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    Start,
    End,
    /// `floor((start + end) / 2)`
    Center,
    /// Start on `+`/unstranded, end on `-`
    FivePrime,
    /// End on `+`/unstranded, start on `-`
    ThreePrime,
}

impl Anchor {
    /// Resolve strand-relative anchors to a geometric one.
    #[inline]
    pub fn resolve(self, strand: Strand) -> Anchor {
        match (self, strand.is_minus()) {
            (Anchor::FivePrime, false) | (Anchor::ThreePrime, true) => Anchor::Start,
            (Anchor::FivePrime, true) | (Anchor::ThreePrime, false) => Anchor::End,
            (other, _) => other,
        }
    }
}

/// Set the width of `interval` to `width`, keeping the anchor fixed.
///
/// With `Center` the midpoint is preserved for every width; when the new width
/// is even the extra position goes to the end side.
pub fn resize(
    interval: Interval,
    strand: Strand,
    width: i64,
    anchor: Anchor,
) -> std::result::Result<Interval, GeometryError> {
    if width < 0 {
        return Err(GeometryError::NegativeWidth { width });
    }
    let Interval { start, end } = interval;
    let out = match anchor.resolve(strand) {
        Anchor::Start => Interval::new(start, start + width - 1),
        Anchor::End => Interval::new(end - width + 1, end),
        _ => {
            let start = interval.midpoint() - (width - 1).div_euclid(2);
            Interval::new(start, start + width - 1)
        }
    };
    Ok(out)
}

/// Add `delta` to the width of `interval`, keeping the anchor fixed.
///
/// With `Center`, `floor(delta / 2)` goes to the start side and
/// `ceil(delta / 2)` to the end side.
pub fn stretch(
    interval: Interval,
    strand: Strand,
    delta: i64,
    anchor: Anchor,
) -> std::result::Result<Interval, GeometryError> {
    let width = interval.width() + delta;
    if width < 0 {
        return Err(GeometryError::NegativeWidth { width });
    }
    let Interval { start, end } = interval;
    let out = match anchor.resolve(strand) {
        Anchor::Start => Interval::new(start, end + delta),
        Anchor::End => Interval::new(start - delta, end),
        _ => {
            let left = delta.div_euclid(2);
            Interval::new(start - left, end + (delta - left))
        }
    };
    Ok(out)
}

/// Rowwise anchored arithmetic over a collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchorCommand {
    pub anchor: Anchor,
}

impl AnchorCommand {
    pub fn new(anchor: Anchor) -> Self {
        Self { anchor }
    }

    /// Resize every row to `width`.
    pub fn resize(&self, ranges: &Ranges, width: i64) -> Result<Ranges> {
        self.apply(ranges, |row| {
            resize(ranges.interval(row), ranges.strand(row), width, self.anchor)
        })
    }

    /// Resize row `i` to `widths[i]`.
    pub fn resize_each(&self, ranges: &Ranges, widths: &[i64]) -> Result<Ranges> {
        check_values(ranges, widths)?;
        self.apply(ranges, |row| {
            resize(ranges.interval(row), ranges.strand(row), widths[row], self.anchor)
        })
    }

    /// Stretch every row by `delta`.
    pub fn stretch(&self, ranges: &Ranges, delta: i64) -> Result<Ranges> {
        self.apply(ranges, |row| {
            stretch(ranges.interval(row), ranges.strand(row), delta, self.anchor)
        })
    }

    /// Stretch row `i` by `deltas[i]`.
    pub fn stretch_each(&self, ranges: &Ranges, deltas: &[i64]) -> Result<Ranges> {
        check_values(ranges, deltas)?;
        self.apply(ranges, |row| {
            stretch(ranges.interval(row), ranges.strand(row), deltas[row], self.anchor)
        })
    }

    fn apply<F>(&self, ranges: &Ranges, f: F) -> Result<Ranges>
    where
        F: Fn(usize) -> std::result::Result<Interval, GeometryError> + Sync + Send,
    {
        debug!("anchored transform of {} rows ({:?})", ranges.len(), self.anchor);
        let intervals = try_map_rows(ranges.len(), f)?;
        ranges.with_intervals(intervals)
    }
}

pub(crate) fn check_values(ranges: &Ranges, values: &[i64]) -> Result<()> {
    if values.len() != ranges.len() {
        return Err(crate::error::RangesError::LengthMismatch {
            what: "per-row values".to_string(),
            expected: ranges.len(),
            found: values.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RangesError;

    const PLUS: Strand = Strand::Plus;
    const MINUS: Strand = Strand::Minus;

    #[test]
    fn test_resize_start_end() {
        let iv = Interval::new(10, 19);
        assert_eq!(resize(iv, PLUS, 5, Anchor::Start).unwrap(), Interval::new(10, 14));
        assert_eq!(resize(iv, PLUS, 5, Anchor::End).unwrap(), Interval::new(15, 19));
        assert_eq!(resize(iv, PLUS, 0, Anchor::Start).unwrap(), Interval::new(10, 9));
    }

    #[test]
    fn test_resize_center_rounds_towards_end() {
        let iv = Interval::new(10, 20); // midpoint 15
        assert_eq!(resize(iv, PLUS, 3, Anchor::Center).unwrap(), Interval::new(14, 16));
        assert_eq!(resize(iv, PLUS, 4, Anchor::Center).unwrap(), Interval::new(14, 17));
        assert_eq!(resize(iv, PLUS, 1, Anchor::Center).unwrap(), Interval::new(15, 15));
        assert_eq!(resize(iv, PLUS, 0, Anchor::Center).unwrap(), Interval::new(16, 15));
    }

    #[test]
    fn test_resize_strand_relative() {
        let iv = Interval::new(10, 19);
        assert_eq!(resize(iv, MINUS, 5, Anchor::FivePrime).unwrap(), Interval::new(15, 19));
        assert_eq!(resize(iv, MINUS, 5, Anchor::ThreePrime).unwrap(), Interval::new(10, 14));
        assert_eq!(
            resize(iv, Strand::Unstranded, 5, Anchor::FivePrime).unwrap(),
            Interval::new(10, 14)
        );
        assert_eq!(resize(iv, PLUS, 5, Anchor::ThreePrime).unwrap(), Interval::new(15, 19));
    }

    #[test]
    fn test_resize_negative_width() {
        let err = resize(Interval::new(1, 5), PLUS, -1, Anchor::Start).unwrap_err();
        assert_eq!(err, GeometryError::NegativeWidth { width: -1 });
    }

    #[test]
    fn test_stretch_anchors() {
        let iv = Interval::new(10, 19);
        assert_eq!(stretch(iv, PLUS, 4, Anchor::Start).unwrap(), Interval::new(10, 23));
        assert_eq!(stretch(iv, PLUS, 4, Anchor::End).unwrap(), Interval::new(6, 19));
        assert_eq!(stretch(iv, PLUS, 4, Anchor::Center).unwrap(), Interval::new(8, 21));
        assert_eq!(stretch(iv, MINUS, 4, Anchor::FivePrime).unwrap(), Interval::new(6, 19));
    }

    #[test]
    fn test_stretch_center_odd_delta() {
        let iv = Interval::new(10, 19);
        assert_eq!(stretch(iv, PLUS, 3, Anchor::Center).unwrap(), Interval::new(9, 21));
        assert_eq!(stretch(iv, PLUS, -3, Anchor::Center).unwrap(), Interval::new(12, 18));
    }

    #[test]
    fn test_stretch_too_negative() {
        let err = stretch(Interval::new(1, 5), PLUS, -6, Anchor::Center).unwrap_err();
        assert_eq!(err, GeometryError::NegativeWidth { width: -1 });
        assert!(stretch(Interval::new(1, 5), PLUS, -5, Anchor::Center).is_ok());
    }

    #[test]
    fn test_command_reports_offending_rows() {
        let ranges = Ranges::from_pairs(&[(1, 10), (1, 2), (5, 5)]).unwrap();
        let cmd = AnchorCommand::new(Anchor::End);

        let err = cmd.stretch(&ranges, -3).unwrap_err();
        match err {
            RangesError::InvalidGeometry { failures } => {
                let rows: Vec<usize> = failures.iter().map(|f| f.row).collect();
                assert_eq!(rows, vec![1, 2]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_command_resize_each() {
        let ranges = Ranges::from_pairs(&[(1, 10), (20, 30)])
            .unwrap()
            .with_strands(vec![PLUS, MINUS])
            .unwrap();
        let cmd = AnchorCommand::new(Anchor::FivePrime);

        let out = cmd.resize_each(&ranges, &[2, 3]).unwrap();
        assert_eq!(out.interval(0), Interval::new(1, 2));
        assert_eq!(out.interval(1), Interval::new(28, 30));
        assert_eq!(ranges.interval(1), Interval::new(20, 30));

        assert!(cmd.resize_each(&ranges, &[1]).is_err());
    }
}
