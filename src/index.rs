//! Interval indexing for fast overlap and neighbor queries.

use crate::interval::{Interval, Strand};
use crate::ranges::Ranges;
use log::trace;
use rustc_hash::FxHashMap;

/// Partition key: seqname (when in use) and strand (when strand-aware).
pub type PartitionKey = (Option<String>, Strand);

/// An indexed subject row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub interval: Interval,
    pub row: usize,
}

/// One sorted partition of subject rows.
#[derive(Debug, Default)]
struct Partition {
    /// Sorted by (start, end, row).
    by_start: Vec<Entry>,
    /// Running maximum of `end` over `by_start`.
    max_end: Vec<i64>,
    /// Sorted by (end, start, row).
    by_end: Vec<Entry>,
}

impl Partition {
    fn build(mut entries: Vec<Entry>) -> Self {
        entries.sort_by(|a, b| a.interval.cmp(&b.interval).then(a.row.cmp(&b.row)));

        let mut max_end = Vec::with_capacity(entries.len());
        let mut running = i64::MIN;
        for e in &entries {
            running = running.max(e.interval.end);
            max_end.push(running);
        }

        let mut by_end = entries.clone();
        by_end.sort_by(|a, b| {
            a.interval
                .end
                .cmp(&b.interval.end)
                .then(a.interval.start.cmp(&b.interval.start))
                .then(a.row.cmp(&b.row))
        });

        Self {
            by_start: entries,
            max_end,
            by_end,
        }
    }

    fn overlapping<'a>(&'a self, query: Interval, slack: i64) -> impl Iterator<Item = &'a Entry> + 'a {
        let lo_bound = query.start - slack;
        let hi_bound = query.end + slack;
        // max_end is non-decreasing, so everything before `lo` ends too early
        let lo = self.max_end.partition_point(|&m| m < lo_bound);
        let hi = self.by_start.partition_point(|e| e.interval.start <= hi_bound);
        self.by_start[lo..hi.max(lo)]
            .iter()
            .filter(move |e| e.interval.end >= lo_bound)
    }

    fn starting_after(&self, query: Interval) -> &[Entry] {
        let first = self.by_start.partition_point(|e| e.interval.start <= query.end);
        let Some(nearest) = self.by_start.get(first) else {
            return &[];
        };
        let target = nearest.interval.start;
        let last = first + self.by_start[first..].partition_point(|e| e.interval.start == target);
        &self.by_start[first..last]
    }

    fn ending_before(&self, query: Interval) -> &[Entry] {
        let past = self.by_end.partition_point(|e| e.interval.end < query.start);
        if past == 0 {
            return &[];
        }
        let target = self.by_end[past - 1].interval.end;
        let first = self.by_end[..past].partition_point(|e| e.interval.end < target);
        &self.by_end[first..past]
    }
}

/// An indexed collection of subject intervals organized by seqname and strand.
///
/// Built once per match call; queries are answered with binary search on
/// sorted partitions plus a bounded scan.
#[derive(Debug, Default)]
pub struct IntervalIndex {
    partitions: FxHashMap<PartitionKey, Partition>,
    by_seqname: bool,
    by_strand: bool,
    len: usize,
}

impl IntervalIndex {
    /// Build an index over `subject`.
    ///
    /// `by_seqname` partitions on seqname (ignored when the subject has none);
    /// `by_strand` partitions on strand so callers can restrict to compatible strands.
    pub fn build(subject: &Ranges, by_seqname: bool, by_strand: bool) -> Self {
        let by_seqname = by_seqname && subject.has_seqnames();
        let mut groups: FxHashMap<PartitionKey, Vec<Entry>> = FxHashMap::default();

        for row in 0..subject.len() {
            let key = Self::key_for(subject, row, by_seqname, by_strand);
            groups.entry(key).or_default().push(Entry {
                interval: subject.interval(row),
                row,
            });
        }

        let partitions: FxHashMap<PartitionKey, Partition> = groups
            .into_iter()
            .map(|(key, entries)| (key, Partition::build(entries)))
            .collect();

        trace!(
            "built interval index: {} rows in {} partitions",
            subject.len(),
            partitions.len()
        );

        Self {
            partitions,
            by_seqname,
            by_strand,
            len: subject.len(),
        }
    }

    fn key_for(ranges: &Ranges, row: usize, by_seqname: bool, by_strand: bool) -> PartitionKey {
        let seqname = if by_seqname {
            ranges.seqname(row).map(str::to_string)
        } else {
            None
        };
        let strand = if by_strand {
            ranges.strand(row)
        } else {
            Strand::Unstranded
        };
        (seqname, strand)
    }

    /// Partitions a query row may match.
    ///
    /// In strand-aware indexes an unstranded query sees every strand, while a
    /// stranded query sees its own strand and the unstranded partition.
    fn partitions_for<'a>(&'a self, seqname: Option<&str>, strand: Strand) -> Vec<&'a Partition> {
        let seqname = if self.by_seqname {
            match seqname {
                Some(name) => Some(name.to_string()),
                None => return Vec::new(),
            }
        } else {
            None
        };

        let strands: &[Strand] = if !self.by_strand {
            &[Strand::Unstranded]
        } else {
            match strand {
                Strand::Plus => &[Strand::Plus, Strand::Unstranded],
                Strand::Minus => &[Strand::Minus, Strand::Unstranded],
                Strand::Unstranded => &[Strand::Plus, Strand::Minus, Strand::Unstranded],
            }
        };

        strands
            .iter()
            .filter_map(|&s| self.partitions.get(&(seqname.clone(), s)))
            .collect()
    }

    /// Rows whose interval comes within `slack` positions of `query`
    /// (`slack == 0` means sharing at least one position).
    pub fn overlapping(
        &self,
        seqname: Option<&str>,
        strand: Strand,
        query: Interval,
        slack: i64,
    ) -> Vec<Entry> {
        self.partitions_for(seqname, strand)
            .into_iter()
            .flat_map(|p| p.overlapping(query, slack).copied())
            .collect()
    }

    /// Rows with the smallest start strictly greater than `query.end`.
    pub fn starting_after(&self, seqname: Option<&str>, strand: Strand, query: Interval) -> Vec<Entry> {
        Self::closest_group(
            self.partitions_for(seqname, strand)
                .into_iter()
                .map(|p| p.starting_after(query)),
            |e| -e.interval.start,
        )
    }

    /// Rows with the largest end strictly smaller than `query.start`.
    pub fn ending_before(&self, seqname: Option<&str>, strand: Strand, query: Interval) -> Vec<Entry> {
        Self::closest_group(
            self.partitions_for(seqname, strand)
                .into_iter()
                .map(|p| p.ending_before(query)),
            |e| e.interval.end,
        )
    }

    /// Merge per-partition tie groups, keeping the groups with the highest score.
    fn closest_group<'a, I, F>(groups: I, score: F) -> Vec<Entry>
    where
        I: Iterator<Item = &'a [Entry]>,
        F: Fn(&Entry) -> i64,
    {
        let mut best: Option<i64> = None;
        let mut out = Vec::new();
        for group in groups {
            let Some(first) = group.first() else {
                continue;
            };
            let s = score(first);
            match best {
                Some(b) if s < b => continue,
                Some(b) if s == b => {}
                _ => {
                    best = Some(s);
                    out.clear();
                }
            }
            out.extend_from_slice(group);
        }
        out
    }

    /// Get the total number of indexed rows.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of partitions.
    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }
}
