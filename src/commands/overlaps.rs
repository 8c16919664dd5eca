//! Overlap-based filters and counts.

use crate::commands::matches::{find_matches, OverlapOptions, Predicate, Selection, StrandMode};
use crate::error::Result;
use crate::ranges::Ranges;
use polars::prelude::{NamedFrom, Series};

/// Number of overlapping subject rows for every query row.
pub fn count_overlaps(
    query: &Ranges,
    subject: &Ranges,
    options: OverlapOptions,
    strand_mode: StrandMode,
) -> Vec<usize> {
    find_matches(
        query,
        subject,
        Predicate::Overlaps(options),
        strand_mode,
        Selection::All,
    )
    .counts_per_query()
}

/// Copy of `query` with an Int64 column `name` holding its overlap counts.
pub fn add_overlap_counts(
    query: &Ranges,
    subject: &Ranges,
    name: &str,
    options: OverlapOptions,
) -> Result<Ranges> {
    let counts = count_overlaps(query, subject, options, StrandMode::Ignore);
    let counts: Vec<i64> = counts.into_iter().map(|n| n as i64).collect();
    query.with_column(Series::new(name.into(), counts))
}

/// Query rows overlapping at least one subject row, in query order.
pub fn filter_by_overlaps(query: &Ranges, subject: &Ranges, options: OverlapOptions) -> Result<Ranges> {
    let counts = count_overlaps(query, subject, options, StrandMode::Ignore);
    let mask: Vec<bool> = counts.iter().map(|&n| n > 0).collect();
    query.filter_mask(&mask)
}

/// Query rows overlapping no subject row, in query order.
pub fn filter_by_non_overlaps(
    query: &Ranges,
    subject: &Ranges,
    options: OverlapOptions,
) -> Result<Ranges> {
    let counts = count_overlaps(query, subject, options, StrandMode::Ignore);
    let mask: Vec<bool> = counts.iter().map(|&n| n == 0).collect();
    query.filter_mask(&mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Interval;
    use polars::prelude::AnyValue;

    fn query() -> Ranges {
        Ranges::from_pairs(&[(1, 5), (10, 20), (30, 40)]).unwrap()
    }

    fn subject() -> Ranges {
        Ranges::from_pairs(&[(4, 12), (15, 16), (50, 60)]).unwrap()
    }

    #[test]
    fn test_count_overlaps() {
        let counts = count_overlaps(&query(), &subject(), OverlapOptions::default(), StrandMode::Ignore);
        assert_eq!(counts, vec![1, 2, 0]);
    }

    #[test]
    fn test_add_overlap_counts() {
        let out = add_overlap_counts(&query(), &subject(), "n_olaps", OverlapOptions::default()).unwrap();
        assert_eq!(out.metadata().get(1, "n_olaps"), Some(AnyValue::Int64(2)));
    }

    #[test]
    fn test_filters_partition_query() {
        let hit = filter_by_overlaps(&query(), &subject(), OverlapOptions::default()).unwrap();
        let miss = filter_by_non_overlaps(&query(), &subject(), OverlapOptions::default()).unwrap();

        assert_eq!(hit.intervals(), &[Interval::new(1, 5), Interval::new(10, 20)]);
        assert_eq!(miss.intervals(), &[Interval::new(30, 40)]);
    }
}
