//! Join resolver - turn hit sets into merged range collections.
//!
//! Output rows follow the query: grouped by query row ascending, then by
//! subject row. Coordinates, seqnames and strands come from the query (or the
//! query/subject intersection for `JoinType::Intersect`); metadata is the
//! query's columns followed by the subject's.
//!
//! # Column collisions
//!
//! Query columns keep their names. A subject column whose name is already
//! taken is renamed by appending [`SUBJECT_SUFFIX`] (`score` becomes
//! `score.subject`); if that name is also taken, `.subject.2`, `.subject.3`,
//! ... are tried in order.

use crate::commands::matches::{
    filter_directed, find_matches, Hit, Hits, OverlapOptions, Predicate, Selection, StrandMode,
};
use crate::error::{RangesError, Result};
use crate::interval::Interval;
use crate::metadata::Metadata;
use crate::ranges::Ranges;
use log::debug;

/// Suffix appended to colliding subject column names.
pub const SUBJECT_SUFFIX: &str = ".subject";

/// How hits are turned into output rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// One row per hit, query coordinates
    Inner,
    /// Inner rows plus one placeholder row per unmatched query row
    Left,
    /// One row per hit, coordinates clipped to the shared positions
    Intersect,
}

/// Output of a join plus the hits that produced no row.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub ranges: Ranges,
    /// Intersect hits whose intervals were too far apart to intersect
    pub dropped: Vec<Hit>,
}

/// Merge query and subject rows according to `hits`.
pub fn resolve(query: &Ranges, subject: &Ranges, hits: &Hits, join: JoinType) -> Result<Ranges> {
    let resolution = resolve_detailed(query, subject, hits, join)?;
    if !resolution.dropped.is_empty() {
        debug!(
            "intersect join dropped {} hit(s) without shared positions",
            resolution.dropped.len()
        );
    }
    Ok(resolution.ranges)
}

/// Like [`resolve`], also reporting the hits an intersect join dropped.
pub fn resolve_detailed(
    query: &Ranges,
    subject: &Ranges,
    hits: &Hits,
    join: JoinType,
) -> Result<Resolution> {
    for hit in hits.iter() {
        if hit.query >= query.len() || hit.subject >= subject.len() {
            return Err(RangesError::HitOutOfBounds {
                query: hit.query,
                subject: hit.subject,
                query_len: query.len(),
                subject_len: subject.len(),
            });
        }
    }

    let mut dropped = Vec::new();
    let mut q_rows: Vec<usize> = Vec::with_capacity(hits.len());
    let mut s_rows: Vec<Option<usize>> = Vec::with_capacity(hits.len());
    let mut intervals: Vec<Interval> = Vec::with_capacity(hits.len());

    match join {
        JoinType::Inner => {
            for hit in hits.iter() {
                q_rows.push(hit.query);
                s_rows.push(Some(hit.subject));
                intervals.push(query.interval(hit.query));
            }
        }
        JoinType::Left => {
            let pairs = hits.as_slice();
            let mut next = 0;
            for row in 0..query.len() {
                let first = next;
                while next < pairs.len() && pairs[next].query == row {
                    q_rows.push(row);
                    s_rows.push(Some(pairs[next].subject));
                    intervals.push(query.interval(row));
                    next += 1;
                }
                if next == first {
                    q_rows.push(row);
                    s_rows.push(None);
                    intervals.push(query.interval(row));
                }
            }
        }
        JoinType::Intersect => {
            for hit in hits.iter() {
                match query.interval(hit.query).intersect(&subject.interval(hit.subject)) {
                    Some(clipped) => {
                        q_rows.push(hit.query);
                        s_rows.push(Some(hit.subject));
                        intervals.push(clipped);
                    }
                    None => dropped.push(*hit),
                }
            }
        }
    }

    let base = query.take(&q_rows)?.with_intervals(intervals)?;
    let metadata = merge_metadata(base.metadata(), &subject.metadata().take_optional(&s_rows)?)?;

    Ok(Resolution {
        ranges: base.with_metadata(metadata)?,
        dropped,
    })
}

/// Append subject columns to the query's, renaming on collision.
fn merge_metadata(query: &Metadata, subject: &Metadata) -> Result<Metadata> {
    let mut merged = query.clone();
    for column in subject.columns() {
        let out_name = disambiguate(column.name().as_str(), &merged);
        let mut column = column.clone();
        column.rename(out_name.into());
        merged.set_column(column)?;
    }
    Ok(merged)
}

fn disambiguate(name: &str, taken: &Metadata) -> String {
    if !taken.contains(name) {
        return name.to_string();
    }
    let suffixed = format!("{}{}", name, SUBJECT_SUFFIX);
    if !taken.contains(&suffixed) {
        return suffixed;
    }
    (2..)
        .map(|n| format!("{}{}.{}", name, SUBJECT_SUFFIX, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or(suffixed)
}

fn overlap_join(
    query: &Ranges,
    subject: &Ranges,
    options: OverlapOptions,
    directed: bool,
    join: JoinType,
) -> Result<Ranges> {
    let mut hits = find_matches(
        query,
        subject,
        Predicate::Overlaps(options),
        StrandMode::Ignore,
        Selection::All,
    );
    if directed {
        hits = filter_directed(&hits, query, subject);
    }
    resolve(query, subject, &hits, join)
}

/// One row per overlapping pair, keeping query coordinates.
pub fn join_overlap_inner(query: &Ranges, subject: &Ranges, options: OverlapOptions) -> Result<Ranges> {
    overlap_join(query, subject, options, false, JoinType::Inner)
}

/// Inner overlap join restricted to queries contained in the subject.
pub fn join_overlap_inner_within(query: &Ranges, subject: &Ranges) -> Result<Ranges> {
    overlap_join(query, subject, OverlapOptions::within(), false, JoinType::Inner)
}

/// Inner overlap join rejecting pairs on opposite strands.
pub fn join_overlap_inner_directed(
    query: &Ranges,
    subject: &Ranges,
    options: OverlapOptions,
) -> Result<Ranges> {
    overlap_join(query, subject, options, true, JoinType::Inner)
}

/// Inner rows plus unmatched query rows with missing subject columns.
pub fn join_overlap_left(query: &Ranges, subject: &Ranges, options: OverlapOptions) -> Result<Ranges> {
    overlap_join(query, subject, options, false, JoinType::Left)
}

pub fn join_overlap_left_within(query: &Ranges, subject: &Ranges) -> Result<Ranges> {
    overlap_join(query, subject, OverlapOptions::within(), false, JoinType::Left)
}

pub fn join_overlap_left_directed(
    query: &Ranges,
    subject: &Ranges,
    options: OverlapOptions,
) -> Result<Ranges> {
    overlap_join(query, subject, options, true, JoinType::Left)
}

/// One row per overlapping pair with coordinates clipped to the shared positions.
pub fn join_overlap_intersect(
    query: &Ranges,
    subject: &Ranges,
    options: OverlapOptions,
) -> Result<Ranges> {
    overlap_join(query, subject, options, false, JoinType::Intersect)
}

pub fn join_overlap_intersect_within(query: &Ranges, subject: &Ranges) -> Result<Ranges> {
    overlap_join(query, subject, OverlapOptions::within(), false, JoinType::Intersect)
}

pub fn join_overlap_intersect_directed(
    query: &Ranges,
    subject: &Ranges,
    options: OverlapOptions,
) -> Result<Ranges> {
    overlap_join(query, subject, options, true, JoinType::Intersect)
}

fn neighbor_join(
    query: &Ranges,
    subject: &Ranges,
    predicate: Predicate,
    strand_mode: StrandMode,
) -> Result<Ranges> {
    let hits = find_matches(query, subject, predicate, strand_mode, Selection::Best);
    resolve(query, subject, &hits, JoinType::Inner)
}

/// Join each query row with its nearest subject row (overlaps count as distance 0).
pub fn join_nearest(query: &Ranges, subject: &Ranges) -> Result<Ranges> {
    neighbor_join(query, subject, Predicate::Nearest, StrandMode::Ignore)
}

/// Join each query row with the closest subject row entirely to its left.
pub fn join_follow(query: &Ranges, subject: &Ranges) -> Result<Ranges> {
    neighbor_join(query, subject, Predicate::Follows, StrandMode::Ignore)
}

/// Join each query row with the closest subject row entirely to its right.
pub fn join_precede(query: &Ranges, subject: &Ranges) -> Result<Ranges> {
    neighbor_join(query, subject, Predicate::Precedes, StrandMode::Ignore)
}

/// Strand-aware nearest join.
pub fn join_nearest_directed(query: &Ranges, subject: &Ranges) -> Result<Ranges> {
    neighbor_join(query, subject, Predicate::Nearest, StrandMode::Aware)
}

/// Join each query row with the closest compatible subject row upstream of it.
pub fn join_follow_upstream(query: &Ranges, subject: &Ranges) -> Result<Ranges> {
    neighbor_join(query, subject, Predicate::Follows, StrandMode::Aware)
}

/// Join each query row with the closest compatible subject row downstream of it.
pub fn join_precede_downstream(query: &Ranges, subject: &Ranges) -> Result<Ranges> {
    neighbor_join(query, subject, Predicate::Precedes, StrandMode::Aware)
}
