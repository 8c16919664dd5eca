//! Range collections: intervals with optional seqname, strand and metadata.

use crate::error::{RangesError, Result};
use crate::interval::{Interval, Strand};
use crate::metadata::Metadata;
use polars::prelude::Series;

/// An ordered collection of intervals.
///
/// Row position is identity. Seqnames and strands are optional capabilities:
/// a collection without seqnames behaves as a single sequence, one without
/// strands as entirely unstranded. Every verb returns a new collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ranges {
    intervals: Vec<Interval>,
    seqnames: Option<Vec<String>>,
    strands: Option<Vec<Strand>>,
    metadata: Metadata,
}

fn check_len(what: &str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(RangesError::LengthMismatch {
            what: what.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

impl Ranges {
    /// Plain integer ranges without seqnames or strands.
    pub fn new(intervals: Vec<Interval>) -> Self {
        let n = intervals.len();
        Self {
            intervals,
            seqnames: None,
            strands: None,
            metadata: Metadata::new(n),
        }
    }

    /// Genomic ranges with a seqname and strand per row.
    pub fn genomic(
        seqnames: Vec<String>,
        intervals: Vec<Interval>,
        strands: Vec<Strand>,
    ) -> Result<Self> {
        Self::new(intervals)
            .with_seqnames(seqnames)?
            .with_strands(strands)
    }

    /// Build from `(start, end)` pairs, validating each interval.
    pub fn from_pairs(pairs: &[(i64, i64)]) -> Result<Self> {
        let intervals = pairs
            .iter()
            .map(|&(start, end)| Interval::try_new(start, end))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(intervals))
    }

    pub fn with_seqnames(mut self, seqnames: Vec<String>) -> Result<Self> {
        check_len("seqnames", self.len(), seqnames.len())?;
        self.seqnames = Some(seqnames);
        Ok(self)
    }

    pub fn with_strands(mut self, strands: Vec<Strand>) -> Result<Self> {
        check_len("strands", self.len(), strands.len())?;
        self.strands = Some(strands);
        Ok(self)
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Result<Self> {
        check_len("metadata", self.len(), metadata.nrows())?;
        self.metadata = metadata;
        Ok(self)
    }

    /// Return a copy with one metadata column added or replaced.
    pub fn with_column(&self, column: Series) -> Result<Self> {
        let mut out = self.clone();
        out.metadata = self.metadata.with_column(column)?;
        Ok(out)
    }

    /// Return a copy with new coordinates, keeping everything else.
    pub fn with_intervals(&self, intervals: Vec<Interval>) -> Result<Self> {
        check_len("intervals", self.len(), intervals.len())?;
        let mut out = self.clone();
        out.intervals = intervals;
        Ok(out)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    #[inline]
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    #[inline]
    pub fn interval(&self, row: usize) -> Interval {
        self.intervals[row]
    }

    #[inline]
    pub fn has_seqnames(&self) -> bool {
        self.seqnames.is_some()
    }

    #[inline]
    pub fn has_strand(&self) -> bool {
        self.strands.is_some()
    }

    pub fn seqname(&self, row: usize) -> Option<&str> {
        self.seqnames.as_ref().map(|s| s[row].as_str())
    }

    /// Strand of a row; unstranded when the collection carries no strands.
    #[inline]
    pub fn strand(&self, row: usize) -> Strand {
        self.strands
            .as_ref()
            .map_or(Strand::Unstranded, |s| s[row])
    }

    /// Strand of a row, or `None` when the collection carries no strands.
    #[inline]
    pub fn strand_opt(&self, row: usize) -> Option<Strand> {
        self.strands.as_ref().map(|s| s[row])
    }

    pub fn seqnames(&self) -> Option<&[String]> {
        self.seqnames.as_deref()
    }

    pub fn strands(&self) -> Option<&[Strand]> {
        self.strands.as_deref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Gather rows by index, in the given order.
    pub fn take(&self, rows: &[usize]) -> Result<Ranges> {
        Ok(Ranges {
            intervals: rows.iter().map(|&r| self.intervals[r]).collect(),
            seqnames: self
                .seqnames
                .as_ref()
                .map(|s| rows.iter().map(|&r| s[r].clone()).collect()),
            strands: self
                .strands
                .as_ref()
                .map(|s| rows.iter().map(|&r| s[r]).collect()),
            metadata: self.metadata.take(rows)?,
        })
    }

    /// Keep the rows where `mask` is true.
    pub fn filter_mask(&self, mask: &[bool]) -> Result<Ranges> {
        check_len("mask", self.len(), mask.len())?;
        let rows: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();
        self.take(&rows)
    }

    /// Sorted copy, ordered by seqname, start and end. Ties keep input order.
    pub fn sort(&self) -> Result<Ranges> {
        let mut rows: Vec<usize> = (0..self.len()).collect();
        rows.sort_by(|&a, &b| {
            self.seqname(a)
                .cmp(&self.seqname(b))
                .then(self.intervals[a].cmp(&self.intervals[b]))
        });
        self.take(&rows)
    }
}

/// Concatenate collections row-wise.
///
/// Seqnames and strands survive only when every input has them. Metadata
/// columns are unioned with missing fill; a column used with two types is a
/// `SchemaMismatch`.
pub fn bind_ranges(parts: &[&Ranges]) -> Result<Ranges> {
    let intervals: Vec<Interval> = parts
        .iter()
        .flat_map(|p| p.intervals.iter().copied())
        .collect();

    let seqnames = if parts.iter().all(|p| p.has_seqnames()) {
        Some(
            parts
                .iter()
                .flat_map(|p| p.seqnames.iter().flatten().cloned())
                .collect(),
        )
    } else {
        None
    };

    let strands = if parts.iter().all(|p| p.has_strand()) {
        Some(
            parts
                .iter()
                .flat_map(|p| p.strands.iter().flatten().copied())
                .collect(),
        )
    } else {
        None
    };

    let tables: Vec<&Metadata> = parts.iter().map(|p| &p.metadata).collect();
    let metadata = Metadata::concat(&tables)?;

    Ok(Ranges {
        intervals,
        seqnames,
        strands,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{AnyValue, NamedFrom};

    fn sample() -> Ranges {
        Ranges::genomic(
            vec!["chr2".into(), "chr1".into(), "chr1".into()],
            vec![
                Interval::new(5, 9),
                Interval::new(20, 30),
                Interval::new(1, 3),
            ],
            vec![Strand::Plus, Strand::Minus, Strand::Unstranded],
        )
        .unwrap()
        .with_column(Series::new("id".into(), ["a", "b", "c"]))
        .unwrap()
    }

    #[test]
    fn test_genomic_length_check() {
        let err = Ranges::genomic(
            vec!["chr1".into()],
            vec![Interval::new(1, 2), Interval::new(3, 4)],
            vec![Strand::Plus, Strand::Plus],
        )
        .unwrap_err();

        assert!(matches!(err, RangesError::LengthMismatch { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_strand_defaults_to_unstranded() {
        let r = Ranges::from_pairs(&[(1, 5)]).unwrap();
        assert!(!r.has_strand());
        assert_eq!(r.strand(0), Strand::Unstranded);
        assert_eq!(r.strand_opt(0), None);
    }

    #[test]
    fn test_from_pairs_rejects_invalid() {
        assert!(Ranges::from_pairs(&[(5, 2)]).is_err());
        assert!(Ranges::from_pairs(&[(5, 4)]).is_ok());
    }

    #[test]
    fn test_sort_does_not_touch_input() {
        let r = sample();
        let sorted = r.sort().unwrap();

        assert_eq!(sorted.interval(0), Interval::new(1, 3));
        assert_eq!(sorted.interval(1), Interval::new(20, 30));
        assert_eq!(sorted.seqname(2), Some("chr2"));
        assert_eq!(sorted.metadata().get(0, "id"), Some(AnyValue::String("c")));
        assert_eq!(r.interval(0), Interval::new(5, 9));
    }

    #[test]
    fn test_filter_mask() {
        let r = sample().filter_mask(&[true, false, true]).unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r.strand(1), Strand::Unstranded);
    }

    #[test]
    fn test_bind_ranges_drops_partial_strand() {
        let a = sample();
        let b = Ranges::from_pairs(&[(100, 200)]).unwrap();

        let bound = bind_ranges(&[&a, &b]).unwrap();

        assert_eq!(bound.len(), 4);
        assert!(!bound.has_strand());
        assert!(!bound.has_seqnames());
        assert_eq!(bound.metadata().get(3, "id"), Some(AnyValue::Null));
    }
}
