//! Range algebra verbs: matching, joins and anchored arithmetic.

pub mod anchor;
pub mod join;
pub mod matches;
pub mod overlaps;
pub mod shift;

pub use anchor::{resize, stretch, Anchor, AnchorCommand};
pub use join::{
    join_follow, join_follow_upstream, join_nearest, join_nearest_directed, join_overlap_inner,
    join_overlap_inner_directed, join_overlap_inner_within, join_overlap_intersect,
    join_overlap_intersect_directed, join_overlap_intersect_within, join_overlap_left,
    join_overlap_left_directed, join_overlap_left_within, join_precede, join_precede_downstream,
    resolve, resolve_detailed, JoinType, Resolution, SUBJECT_SUFFIX,
};
pub use matches::{
    filter_directed, find_matches, Hit, Hits, MatchCommand, OverlapKind, OverlapOptions,
    Predicate, Selection, StrandMode,
};
pub use overlaps::{add_overlap_counts, count_overlaps, filter_by_non_overlaps, filter_by_overlaps};
pub use shift::{flank, shift, Direction, ShiftCommand};
