//! Grouped range collections.
//!
//! A `GroupedRanges` pairs a collection with the key columns partitioning it.
//! Filter, mutate and summarise run once per group; filter and mutate keep the
//! grouping, `ungroup` drops it. Grouping alone never changes the rows.

use crate::commands::join::{resolve, JoinType};
use crate::commands::matches::{find_matches, OverlapOptions, Predicate, Selection, StrandMode};
use crate::error::{RangesError, Result};
use crate::metadata::Metadata;
use crate::ranges::Ranges;
use polars::prelude::{
    col, len, AnyValue, DataFrame, DataType, Expr, IdxCa, IdxSize, IntoLazy, NamedFrom, Series,
};

/// Name of the column `group_by_overlaps` groups on.
pub const OVERLAP_GROUP_COLUMN: &str = "query";

/// One group: its key values and member rows (ascending).
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub key: Vec<AnyValue<'static>>,
    pub rows: Vec<usize>,
}

/// Summary to compute per group.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate {
    Count,
    Sum(String),
    Mean(String),
    Min(String),
    Max(String),
    NDistinct(String),
}

/// A range collection partitioned by key columns.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedRanges {
    ranges: Ranges,
    keys: Vec<String>,
    groups: Vec<Group>,
}

/// Group `ranges` by the named metadata columns.
pub fn group_by(ranges: &Ranges, keys: &[&str]) -> Result<GroupedRanges> {
    GroupedRanges::new(ranges.clone(), keys.iter().map(|k| k.to_string()).collect())
}

/// Inner overlap join of `query` and `subject`, grouped by query row.
///
/// The output carries an Int64 column named [`OVERLAP_GROUP_COLUMN`] holding
/// the query row of every hit. Fails with `DuplicateColumn` when the joined
/// metadata already has a column of that name.
pub fn group_by_overlaps(
    query: &Ranges,
    subject: &Ranges,
    options: OverlapOptions,
) -> Result<GroupedRanges> {
    let hits = find_matches(
        query,
        subject,
        Predicate::Overlaps(options),
        StrandMode::Ignore,
        Selection::All,
    );
    let joined = resolve(query, subject, &hits, JoinType::Inner)?;
    if joined.metadata().contains(OVERLAP_GROUP_COLUMN) {
        return Err(RangesError::DuplicateColumn(OVERLAP_GROUP_COLUMN.to_string()));
    }
    let labels: Vec<i64> = hits.iter().map(|h| h.query as i64).collect();
    let joined = joined.with_column(Series::new(OVERLAP_GROUP_COLUMN.into(), labels))?;
    GroupedRanges::new(joined, vec![OVERLAP_GROUP_COLUMN.to_string()])
}

impl GroupedRanges {
    /// Partition `ranges` by `keys`; groups appear in order of first row.
    pub fn new(ranges: Ranges, keys: Vec<String>) -> Result<Self> {
        let groups = partition(ranges.metadata(), &keys)?;
        Ok(Self {
            ranges,
            keys,
            groups,
        })
    }

    pub fn ranges(&self) -> &Ranges {
        &self.ranges
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// Drop the grouping.
    pub fn ungroup(self) -> Ranges {
        self.ranges
    }

    /// Keep rows selected by a group-scoped mask.
    ///
    /// `predicate` receives each group's rows as a collection and returns one
    /// flag per row.
    pub fn filter<F>(&self, predicate: F) -> Result<GroupedRanges>
    where
        F: Fn(&Ranges) -> Vec<bool>,
    {
        let mut mask = vec![false; self.ranges.len()];
        for group in &self.groups {
            let flags = predicate(&self.ranges.take(&group.rows)?);
            check_group_len("filter mask", group, flags.len())?;
            for (&row, keep) in group.rows.iter().zip(flags) {
                mask[row] = keep;
            }
        }
        GroupedRanges::new(self.ranges.filter_mask(&mask)?, self.keys.clone())
    }

    /// Add or replace column `name` with values computed per group.
    ///
    /// Group results are stacked in group order, then gathered back into row
    /// order.
    pub fn mutate<F>(&self, name: &str, compute: F) -> Result<GroupedRanges>
    where
        F: Fn(&Ranges) -> Series,
    {
        let mut stacked: Option<Series> = None;
        let mut position = vec![0 as IdxSize; self.ranges.len()];
        let mut offset = 0;
        for group in &self.groups {
            let values = compute(&self.ranges.take(&group.rows)?);
            check_group_len(name, group, values.len())?;
            for &row in &group.rows {
                position[row] = offset as IdxSize;
                offset += 1;
            }
            match stacked.as_mut() {
                Some(acc) => {
                    acc.append(&values)?;
                }
                None => stacked = Some(values),
            }
        }

        let mut column = match stacked {
            Some(values) => values.take(&IdxCa::from_vec("rows".into(), position))?,
            None => compute(&self.ranges.take(&[])?),
        };
        column.rename(name.into());
        GroupedRanges::new(self.ranges.with_column(column)?, self.keys.clone())
    }

    /// One row per group: key columns followed by the requested summaries.
    pub fn summarise(&self, summaries: &[(&str, Aggregate)]) -> Result<Metadata> {
        let md = self.ranges.metadata();
        let aggs = summaries
            .iter()
            .map(|(name, aggregate)| Ok(aggregate_expr(md, aggregate)?.alias(*name)))
            .collect::<Result<Vec<Expr>>>()?;

        if self.keys.is_empty() {
            let frame = md.frame().clone().lazy().select(aggs).collect()?;
            return Ok(Metadata::from_frame(frame));
        }

        let by: Vec<Expr> = self.keys.iter().map(|k| col(k.as_str())).collect();
        let frame = md
            .frame()
            .clone()
            .lazy()
            .group_by_stable(by)
            .agg(aggs)
            .collect()?;
        Ok(Metadata::from_frame(frame))
    }
}

/// Row groups of `md` keyed on `keys`, in order of first appearance.
///
/// Nulls form their own group. No keys means one group holding every row.
fn partition(md: &Metadata, keys: &[String]) -> Result<Vec<Group>> {
    for key in keys {
        md.require(key)?;
    }
    if md.nrows() == 0 {
        return Ok(Vec::new());
    }
    if keys.is_empty() {
        return Ok(vec![Group {
            key: Vec::new(),
            rows: (0..md.nrows()).collect(),
        }]);
    }

    let frame: DataFrame = md
        .frame()
        .group_by_stable(keys.iter().map(String::as_str))?
        .groups()?;
    let members = frame
        .column("groups")?
        .as_materialized_series()
        .list()?;
    let key_columns: Vec<&Series> = keys
        .iter()
        .map(|k| Ok(frame.column(k.as_str())?.as_materialized_series()))
        .collect::<Result<_>>()?;

    let mut groups = Vec::with_capacity(frame.height());
    for (i, rows) in members.into_iter().enumerate() {
        let rows = match rows {
            Some(rows) => rows.idx()?.into_no_null_iter().map(|r| r as usize).collect(),
            None => Vec::new(),
        };
        let key = key_columns
            .iter()
            .map(|c| Ok(c.get(i)?.into_static()))
            .collect::<Result<_>>()?;
        groups.push(Group { key, rows });
    }
    Ok(groups)
}

fn aggregate_expr(md: &Metadata, aggregate: &Aggregate) -> Result<Expr> {
    let name = match aggregate {
        Aggregate::Count => return Ok(len().cast(DataType::Int64)),
        Aggregate::NDistinct(c) => {
            md.require(c)?;
            return Ok(col(c.as_str()).n_unique().cast(DataType::Int64));
        }
        Aggregate::Sum(c) | Aggregate::Mean(c) | Aggregate::Min(c) | Aggregate::Max(c) => c,
    };

    let dtype = md.require(name)?.dtype();
    if !(dtype.is_integer() || dtype.is_float()) {
        return Err(RangesError::ColumnType {
            column: name.clone(),
            expected: "int or float",
            found: dtype.to_string(),
        });
    }

    let column = col(name.as_str());
    Ok(match aggregate {
        Aggregate::Sum(_) => column.sum(),
        Aggregate::Mean(_) => column.mean(),
        Aggregate::Min(_) => column.min(),
        _ => column.max(),
    })
}

fn check_group_len(what: &str, group: &Group, found: usize) -> Result<()> {
    if found != group.rows.len() {
        return Err(RangesError::LengthMismatch {
            what: format!("{} for group {:?}", what, group.key),
            expected: group.rows.len(),
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Interval;

    fn genes() -> Ranges {
        Ranges::from_pairs(&[(1, 10), (5, 20), (30, 35), (40, 60)])
            .unwrap()
            .with_column(Series::new("gene".into(), ["a", "b", "a", "b"]))
            .unwrap()
            .with_column(Series::new("score".into(), [1i64, 2, 3, 4]))
            .unwrap()
    }

    #[test]
    fn test_group_by_keeps_rows() {
        let grouped = group_by(&genes(), &["gene"]).unwrap();

        assert_eq!(grouped.n_groups(), 2);
        assert_eq!(grouped.groups()[0].key, vec![AnyValue::String("a").into_static()]);
        assert_eq!(grouped.groups()[0].rows, vec![0, 2]);
        assert_eq!(grouped.groups()[1].rows, vec![1, 3]);
        assert_eq!(grouped.ranges().len(), 4);
        assert_eq!(grouped.clone().ungroup(), genes());
    }

    #[test]
    fn test_group_by_unknown_column() {
        let err = group_by(&genes(), &["nope"]).unwrap_err();
        assert_eq!(err, RangesError::UnknownColumn("nope".into()));
    }

    #[test]
    fn test_group_by_float_keys_with_nulls() {
        let ranges = Ranges::from_pairs(&[(1, 2), (3, 4), (5, 6), (7, 8)])
            .unwrap()
            .with_column(Series::new("k".into(), [Some(1.5f64), None, Some(1.5), None]))
            .unwrap();

        let grouped = group_by(&ranges, &["k"]).unwrap();

        // Nulls share one group
        assert_eq!(grouped.n_groups(), 2);
        assert_eq!(grouped.groups()[0].key, vec![AnyValue::Float64(1.5)]);
        assert_eq!(grouped.groups()[0].rows, vec![0, 2]);
        assert_eq!(grouped.groups()[1].key, vec![AnyValue::Null]);
        assert_eq!(grouped.groups()[1].rows, vec![1, 3]);
    }

    #[test]
    fn test_summarise() {
        let grouped = group_by(&genes(), &["gene"]).unwrap();
        let summary = grouped
            .summarise(&[
                ("n", Aggregate::Count),
                ("total", Aggregate::Sum("score".into())),
                ("avg", Aggregate::Mean("score".into())),
                ("top", Aggregate::Max("score".into())),
                ("low", Aggregate::Min("score".into())),
            ])
            .unwrap();

        assert_eq!(summary.nrows(), 2);
        assert_eq!(
            summary.names().collect::<Vec<_>>(),
            vec!["gene", "n", "total", "avg", "top", "low"]
        );
        assert_eq!(summary.get(0, "gene"), Some(AnyValue::String("a")));
        assert_eq!(summary.get(0, "n"), Some(AnyValue::Int64(2)));
        assert_eq!(summary.get(0, "total"), Some(AnyValue::Int64(4)));
        assert_eq!(summary.get(1, "avg"), Some(AnyValue::Float64(3.0)));
        assert_eq!(summary.get(1, "top"), Some(AnyValue::Int64(4)));
        assert_eq!(summary.get(1, "low"), Some(AnyValue::Int64(2)));
    }

    #[test]
    fn test_summarise_n_distinct() {
        let ranges = genes()
            .with_column(Series::new("tag".into(), ["x", "x", "y", "z"]))
            .unwrap();
        let summary = group_by(&ranges, &["gene"])
            .unwrap()
            .summarise(&[("tags", Aggregate::NDistinct("tag".into()))])
            .unwrap();

        assert_eq!(summary.get(0, "tags"), Some(AnyValue::Int64(2)));
        assert_eq!(summary.get(1, "tags"), Some(AnyValue::Int64(2)));
    }

    #[test]
    fn test_summarise_rejects_string_sum() {
        let grouped = group_by(&genes(), &["gene"]).unwrap();
        let err = grouped
            .summarise(&[("bad", Aggregate::Sum("gene".into()))])
            .unwrap_err();
        assert!(matches!(err, RangesError::ColumnType { ref column, .. } if column == "gene"));
    }

    #[test]
    fn test_filter_within_group() {
        let grouped = group_by(&genes(), &["gene"]).unwrap();

        // Keep the widest range of each gene
        let widest = grouped
            .filter(|g| {
                let max = g.intervals().iter().map(|iv| iv.width()).max().unwrap_or(0);
                g.intervals().iter().map(|iv| iv.width() == max).collect()
            })
            .unwrap();

        assert_eq!(widest.n_groups(), 2);
        assert_eq!(
            widest.ranges().intervals(),
            &[Interval::new(1, 10), Interval::new(40, 60)]
        );
    }

    #[test]
    fn test_mutate_within_group() {
        let grouped = group_by(&genes(), &["gene"]).unwrap();

        let ranked = grouped
            .mutate("rank", |g| {
                let ranks: Vec<i64> = (1..=g.len() as i64).collect();
                Series::new("ignored".into(), ranks)
            })
            .unwrap();

        let md = ranked.ranges().metadata();
        assert_eq!(md.get(0, "rank"), Some(AnyValue::Int64(1)));
        assert_eq!(md.get(1, "rank"), Some(AnyValue::Int64(1)));
        assert_eq!(md.get(2, "rank"), Some(AnyValue::Int64(2)));
        assert_eq!(md.get(3, "rank"), Some(AnyValue::Int64(2)));
        assert_eq!(ranked.keys(), &["gene".to_string()]);
    }

    #[test]
    fn test_mutate_length_mismatch() {
        let grouped = group_by(&genes(), &["gene"]).unwrap();
        let err = grouped
            .mutate("x", |_| Series::new("x".into(), [1i64]))
            .unwrap_err();
        assert!(matches!(err, RangesError::LengthMismatch { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_group_by_overlaps() {
        let query = Ranges::from_pairs(&[(1, 10), (20, 30)]).unwrap();
        let subject = Ranges::from_pairs(&[(5, 6), (8, 25), (100, 200)]).unwrap();

        let grouped = group_by_overlaps(&query, &subject, OverlapOptions::default()).unwrap();

        assert_eq!(grouped.ranges().len(), 3);
        assert_eq!(grouped.n_groups(), 2);
        assert_eq!(grouped.groups()[0].key, vec![AnyValue::Int64(0)]);
        assert_eq!(grouped.groups()[0].rows, vec![0, 1]);
        assert_eq!(grouped.groups()[1].rows, vec![2]);
    }

    #[test]
    fn test_group_by_overlaps_existing_query_column() {
        let query = Ranges::from_pairs(&[(1, 10)])
            .unwrap()
            .with_column(Series::new(OVERLAP_GROUP_COLUMN.into(), ["q1"]))
            .unwrap();
        let subject = Ranges::from_pairs(&[(5, 6)]).unwrap();

        let err = group_by_overlaps(&query, &subject, OverlapOptions::default()).unwrap_err();
        assert_eq!(err, RangesError::DuplicateColumn("query".into()));
    }
}
