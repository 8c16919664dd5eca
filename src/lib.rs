// Clippy allows for the whole crate
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

//! GRIT algebra: spatial joins and anchored arithmetic over range collections
//!
//! A [`Ranges`] is an ordered collection of closed integer intervals with
//! optional seqnames, strands and metadata columns. Verbs never mutate their
//! inputs.
//!
//! # Features
//!
//! - **Match engine**: overlap, precede, follow and nearest predicates, strand
//!   aware or not, all hits or the best hit per query row
//! - **Joins**: inner, left, intersect and directed joins with deterministic
//!   row order and column-collision renaming
//! - **Anchored arithmetic**: resize, stretch, shift and flank with
//!   start, end, center, 5' and 3' anchors
//! - **Grouping**: group-scoped filter, mutate and summarise
//! - **Parallel processing**: large inputs are processed with Rayon
//!
//! # Example
//!
//! ```rust,no_run
//! use grit_algebra::prelude::*;
//!
//! let genes = Ranges::from_pairs(&[(5, 9), (10, 14), (15, 19)]).unwrap();
//! let peaks = Ranges::from_pairs(&[(2, 4), (8, 12)]).unwrap();
//!
//! // Nearest peak to the left of every gene
//! let joined = join_follow(&genes, &peaks).unwrap();
//! assert_eq!(joined.len(), 3);
//!
//! // Promoters: 1kb upstream of the 5' end
//! let promoters = AnchorCommand::new(Anchor::FivePrime).resize(&genes, 1).unwrap();
//! let promoters = ShiftCommand::new(Direction::Left).flank(&promoters, 1000).unwrap();
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod group;
pub mod index;
pub mod interval;
pub mod metadata;
pub mod parallel;
pub mod ranges;

// Re-export commonly used types
pub use error::{GeometryError, RangesError, Result};
pub use group::{group_by, group_by_overlaps, Aggregate, GroupedRanges};
pub use index::IntervalIndex;
pub use interval::{Interval, Strand};
pub use metadata::Metadata;
pub use ranges::{bind_ranges, Ranges};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::commands::{
        join_follow, join_nearest, join_overlap_inner, join_overlap_intersect,
        join_overlap_left, join_precede, Anchor, AnchorCommand, Direction, MatchCommand,
        OverlapOptions, Predicate, Selection, ShiftCommand, StrandMode,
    };
    pub use crate::group::{group_by, Aggregate, GroupedRanges};
    pub use crate::interval::{Interval, Strand};
    pub use crate::metadata::Metadata;
    pub use polars::prelude::{AnyValue, NamedFrom, Series};
    pub use crate::ranges::Ranges;
}
