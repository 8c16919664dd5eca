//! Match engine - compute hit sets between two range collections.
//!
//! Builds an `IntervalIndex` over the subject once, then answers every query
//! row independently (in parallel for large inputs) with binary searches on
//! the sorted partitions.

use crate::error::{RangesError, Result};
use crate::index::{Entry, IntervalIndex};
use crate::interval::{Interval, Strand};
use crate::parallel::map_rows;
use crate::ranges::Ranges;
use log::debug;

/// Spatial relationship required by an overlap match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapKind {
    /// Any shared position (or within `maxgap`)
    #[default]
    Any,
    /// Subject fully contains the query
    Within,
}

/// Overlap predicate parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapOptions {
    pub kind: OverlapKind,
    /// Largest tolerated gap; negative requires a true overlap
    pub maxgap: i64,
    /// Minimum number of shared positions
    pub minoverlap: i64,
}

impl Default for OverlapOptions {
    fn default() -> Self {
        Self {
            kind: OverlapKind::Any,
            maxgap: -1,
            minoverlap: 0,
        }
    }
}

impl OverlapOptions {
    pub fn within() -> Self {
        Self {
            kind: OverlapKind::Within,
            ..Self::default()
        }
    }

    /// Index slack guaranteeing every qualifying subject is scanned.
    #[inline]
    fn slack(&self) -> i64 {
        if self.maxgap < 0 {
            0
        } else {
            self.maxgap + 1
        }
    }

    /// Check a single query/subject pair.
    #[inline]
    pub fn matches(&self, query: Interval, subject: Interval) -> bool {
        let ov = query.overlap_width(&subject);
        match self.kind {
            OverlapKind::Within => query.within(&subject) && ov >= self.minoverlap,
            OverlapKind::Any if self.maxgap < 0 => ov >= self.minoverlap.max(1),
            // A positive minoverlap rules out gaps; otherwise only the gap is bounded
            OverlapKind::Any => {
                -ov <= self.maxgap && (self.minoverlap <= 0 || ov >= self.minoverlap)
            }
        }
    }
}

/// Match predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    Overlaps(OverlapOptions),
    /// Subject entirely after the query (downstream when strand-aware)
    Precedes,
    /// Subject entirely before the query (upstream when strand-aware)
    Follows,
    /// Smallest distance in either direction; overlaps have distance 0
    Nearest,
}

impl Default for Predicate {
    fn default() -> Self {
        Predicate::Overlaps(OverlapOptions::default())
    }
}

/// How strand and seqname restrict matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrandMode {
    /// Treat every row as unstranded
    #[default]
    Ignore,
    /// Require compatible strands; directional predicates flip on `-`
    Aware,
}

/// How many hits to keep per query row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// Every qualifying pair
    #[default]
    All,
    /// At most one pair, chosen by the tie-break rule
    Best,
}

/// A matched (query row, subject row) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hit {
    pub query: usize,
    pub subject: usize,
}

/// Hits ordered by query row, then subject row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hits {
    pairs: Vec<Hit>,
    query_len: usize,
    subject_len: usize,
}

impl Hits {
    /// Create a hit set, rejecting pairs outside `query_len` x `subject_len`.
    ///
    /// Pairs are sorted by (query, subject).
    pub fn new(pairs: Vec<Hit>, query_len: usize, subject_len: usize) -> Result<Self> {
        if let Some(bad) = pairs
            .iter()
            .find(|h| h.query >= query_len || h.subject >= subject_len)
        {
            return Err(RangesError::HitOutOfBounds {
                query: bad.query,
                subject: bad.subject,
                query_len,
                subject_len,
            });
        }
        Ok(Self::sorted(pairs, query_len, subject_len))
    }

    fn sorted(mut pairs: Vec<Hit>, query_len: usize, subject_len: usize) -> Self {
        pairs.sort_unstable();
        Self {
            pairs,
            query_len,
            subject_len,
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hit> {
        self.pairs.iter()
    }

    pub fn as_slice(&self) -> &[Hit] {
        &self.pairs
    }

    pub fn query_len(&self) -> usize {
        self.query_len
    }

    pub fn subject_len(&self) -> usize {
        self.subject_len
    }

    /// Number of hits for every query row.
    pub fn counts_per_query(&self) -> Vec<usize> {
        let mut counts = vec![0; self.query_len];
        for hit in &self.pairs {
            counts[hit.query] += 1;
        }
        counts
    }

    /// Query rows without any hit, ascending.
    pub fn unmatched_queries(&self) -> Vec<usize> {
        self.counts_per_query()
            .iter()
            .enumerate()
            .filter_map(|(row, &n)| (n == 0).then_some(row))
            .collect()
    }

    /// Keep the hits satisfying `keep`.
    pub fn filter<F>(&self, keep: F) -> Hits
    where
        F: Fn(&Hit) -> bool,
    {
        Hits {
            pairs: self.pairs.iter().copied().filter(|h| keep(h)).collect(),
            query_len: self.query_len,
            subject_len: self.subject_len,
        }
    }
}

/// Drop hits between rows on opposite strands.
pub fn filter_directed(hits: &Hits, query: &Ranges, subject: &Ranges) -> Hits {
    hits.filter(|h| query.strand(h.query).is_compatible(subject.strand(h.subject)))
}

/// A qualifying subject for one query row.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    subject: usize,
    distance: i64,
    /// Strand-relative leftmost coordinate, for tie-breaking
    lead: i64,
}

/// Match command configuration.
#[derive(Debug, Clone, Default)]
pub struct MatchCommand {
    /// Spatial predicate
    pub predicate: Predicate,
    /// Strand handling
    pub strand_mode: StrandMode,
    /// Hit selection policy
    pub selection: Selection,
}

impl MatchCommand {
    pub fn new(predicate: Predicate) -> Self {
        Self {
            predicate,
            ..Self::default()
        }
    }

    /// Find all hits of `query` against `subject`.
    pub fn find_matches(&self, query: &Ranges, subject: &Ranges) -> Hits {
        debug!(
            "matching {} query rows against {} subject rows ({:?}, {:?}, {:?})",
            query.len(),
            subject.len(),
            self.predicate,
            self.strand_mode,
            self.selection
        );

        if query.is_empty() || subject.is_empty() {
            return Hits::sorted(Vec::new(), query.len(), subject.len());
        }

        let aware = self.strand_mode == StrandMode::Aware;
        let use_seqnames = query.has_seqnames() && subject.has_seqnames();
        let index = IntervalIndex::build(subject, use_seqnames, aware);

        let per_row: Vec<Vec<Hit>> = map_rows(query.len(), |row| {
            let seqname = if use_seqnames { query.seqname(row) } else { None };
            let strand = if aware {
                query.strand(row)
            } else {
                Strand::Unstranded
            };
            let mut candidates = self.candidates(&index, seqname, strand, query.interval(row));
            self.select(&mut candidates);
            candidates
                .into_iter()
                .map(|c| Hit {
                    query: row,
                    subject: c.subject,
                })
                .collect()
        });

        let pairs: Vec<Hit> = per_row.into_iter().flatten().collect();
        debug!("found {} hits", pairs.len());
        Hits::sorted(pairs, query.len(), subject.len())
    }

    fn candidates(
        &self,
        index: &IntervalIndex,
        seqname: Option<&str>,
        strand: Strand,
        q: Interval,
    ) -> Vec<Candidate> {
        let minus = strand.is_minus();
        let lead = |e: &Entry| {
            if minus {
                -e.interval.end
            } else {
                e.interval.start
            }
        };
        let to_candidates = |entries: Vec<Entry>| -> Vec<Candidate> {
            entries
                .into_iter()
                .map(|e| Candidate {
                    subject: e.row,
                    distance: q.distance_to(&e.interval),
                    lead: lead(&e),
                })
                .collect()
        };

        // On the minus strand "after" means lower coordinates
        let downstream = || {
            if minus {
                index.ending_before(seqname, strand, q)
            } else {
                index.starting_after(seqname, strand, q)
            }
        };
        let upstream = || {
            if minus {
                index.starting_after(seqname, strand, q)
            } else {
                index.ending_before(seqname, strand, q)
            }
        };

        match self.predicate {
            Predicate::Overlaps(opts) => {
                let entries: Vec<Entry> = index
                    .overlapping(seqname, strand, q, opts.slack())
                    .into_iter()
                    .filter(|e| opts.matches(q, e.interval))
                    .collect();
                to_candidates(entries)
            }
            Predicate::Precedes => to_candidates(downstream()),
            Predicate::Follows => to_candidates(upstream()),
            Predicate::Nearest => {
                let overlapping = index.overlapping(seqname, strand, q, 0);
                if !overlapping.is_empty() {
                    return overlapping
                        .into_iter()
                        .map(|e| Candidate {
                            subject: e.row,
                            distance: 0,
                            lead: lead(&e),
                        })
                        .collect();
                }
                let mut candidates = to_candidates(upstream());
                candidates.extend(to_candidates(downstream()));
                let min = candidates.iter().map(|c| c.distance).min();
                candidates.retain(|c| Some(c.distance) == min);
                candidates
            }
        }
    }

    /// Apply the selection policy in place.
    fn select(&self, candidates: &mut Vec<Candidate>) {
        match self.selection {
            Selection::All => {
                candidates.sort_unstable_by_key(|c| c.subject);
            }
            Selection::Best => {
                let best = match self.predicate {
                    // Overlaps follow subject traversal order
                    Predicate::Overlaps(_) => candidates.iter().min_by_key(|c| c.subject),
                    _ => candidates
                        .iter()
                        .min_by_key(|c| (c.distance, c.lead, c.subject)),
                }
                .copied();
                candidates.clear();
                candidates.extend(best);
            }
        }
    }
}

/// Compute hits between `query` and `subject`.
pub fn find_matches(
    query: &Ranges,
    subject: &Ranges,
    predicate: Predicate,
    strand_mode: StrandMode,
    selection: Selection,
) -> Hits {
    MatchCommand {
        predicate,
        strand_mode,
        selection,
    }
    .find_matches(query, subject)
}
