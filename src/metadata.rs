//! Column-oriented metadata carried alongside intervals.
//!
//! A thin wrapper over a polars `DataFrame` that also records its row count,
//! so a collection without metadata columns still has a height. Nulls are the
//! missing-value marker used throughout the crate (for example in unmatched
//! rows of a left join).

use crate::error::{RangesError, Result};
use polars::prelude::{AnyValue, Column, DataFrame, DataType, IdxCa, IdxSize, Series};

/// Named metadata columns, one cell per row.
#[derive(Debug, Clone)]
pub struct Metadata {
    nrows: usize,
    frame: DataFrame,
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new(0)
    }
}

impl PartialEq for Metadata {
    fn eq(&self, other: &Self) -> bool {
        self.nrows == other.nrows && self.frame.equals_missing(&other.frame)
    }
}

impl Metadata {
    /// Create an empty table with `nrows` rows and no columns.
    pub fn new(nrows: usize) -> Self {
        Self {
            nrows,
            frame: DataFrame::empty(),
        }
    }

    /// Wrap an existing frame.
    pub fn from_frame(frame: DataFrame) -> Self {
        Self {
            nrows: frame.height(),
            frame,
        }
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.frame.width()
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Column names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.frame.get_columns().iter().map(|c| c.name().as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.frame.get_column_index(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Series> {
        self.frame
            .column(name)
            .ok()
            .map(Column::as_materialized_series)
    }

    /// Column by name, or `UnknownColumn`.
    pub fn require(&self, name: &str) -> Result<&Series> {
        self.column(name)
            .ok_or_else(|| RangesError::UnknownColumn(name.to_string()))
    }

    pub fn columns(&self) -> impl Iterator<Item = &Series> {
        self.frame
            .get_columns()
            .iter()
            .map(Column::as_materialized_series)
    }

    /// Cell lookup; `AnyValue::Null` marks a missing cell.
    pub fn get(&self, row: usize, name: &str) -> Option<AnyValue<'_>> {
        if row >= self.nrows {
            return None;
        }
        self.column(name)?.get(row).ok()
    }

    /// Return a copy with the column replaced or appended (matched by name).
    pub fn with_column(&self, column: Series) -> Result<Metadata> {
        let mut out = self.clone();
        out.set_column(column)?;
        Ok(out)
    }

    pub(crate) fn set_column(&mut self, column: Series) -> Result<()> {
        if column.len() != self.nrows {
            return Err(RangesError::LengthMismatch {
                what: format!("column '{}'", column.name()),
                expected: self.nrows,
                found: column.len(),
            });
        }
        self.frame.with_column(column)?;
        Ok(())
    }

    /// Return a copy with column `from` renamed to `to`.
    pub fn rename(&self, from: &str, to: &str) -> Result<Metadata> {
        self.require(from)?;
        let mut out = self.clone();
        out.frame.rename(from, to.into())?;
        Ok(out)
    }

    /// Gather rows by index.
    pub fn take(&self, rows: &[usize]) -> Result<Metadata> {
        let idx = IdxCa::from_vec("rows".into(), rows.iter().map(|&r| r as IdxSize).collect());
        Ok(Metadata {
            nrows: rows.len(),
            frame: self.frame.take(&idx)?,
        })
    }

    /// Gather rows; `None` yields a null in every column.
    pub fn take_optional(&self, rows: &[Option<usize>]) -> Result<Metadata> {
        let idx: IdxCa = rows.iter().map(|r| r.map(|r| r as IdxSize)).collect();
        Ok(Metadata {
            nrows: rows.len(),
            frame: self.frame.take(&idx)?,
        })
    }

    /// Stack tables vertically.
    ///
    /// Columns are the union of all inputs in order of first appearance;
    /// rows from a table lacking a column get nulls. A column name used with
    /// two different types is a `SchemaMismatch`.
    pub fn concat(tables: &[&Metadata]) -> Result<Metadata> {
        let total: usize = tables.iter().map(|t| t.nrows).sum();
        let mut schema: Vec<(String, DataType)> = Vec::new();
        for table in tables {
            for column in table.columns() {
                match schema.iter().find(|(n, _)| n == column.name().as_str()) {
                    Some((_, dtype)) if dtype != column.dtype() => {
                        return Err(RangesError::SchemaMismatch {
                            column: column.name().to_string(),
                            left: dtype.to_string(),
                            right: column.dtype().to_string(),
                        });
                    }
                    Some(_) => {}
                    None => schema.push((column.name().to_string(), column.dtype().clone())),
                }
            }
        }

        if schema.is_empty() {
            return Ok(Metadata::new(total));
        }

        let mut stacked: Option<DataFrame> = None;
        for table in tables {
            let columns: Vec<Column> = schema
                .iter()
                .map(|(name, dtype)| {
                    table
                        .column(name)
                        .cloned()
                        .unwrap_or_else(|| Series::full_null(name.as_str().into(), table.nrows, dtype))
                        .into()
                })
                .collect();
            let part = DataFrame::new(columns)?;
            match stacked.as_mut() {
                Some(acc) => {
                    acc.vstack_mut(&part)?;
                }
                None => stacked = Some(part),
            }
        }

        let Some(frame) = stacked else {
            return Ok(Metadata::new(total));
        };
        Ok(Metadata {
            nrows: total,
            frame,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::NamedFrom;

    fn sample() -> Metadata {
        Metadata::new(3)
            .with_column(Series::new("name".into(), ["a", "b", "c"]))
            .unwrap()
            .with_column(Series::new("score".into(), [1i64, 2, 3]))
            .unwrap()
    }

    #[test]
    fn test_with_column_is_copy() {
        let md = sample();
        let md2 = md
            .with_column(Series::new("score".into(), [9i64, 9, 9]))
            .unwrap();

        assert_eq!(md.get(0, "score"), Some(AnyValue::Int64(1)));
        assert_eq!(md2.get(0, "score"), Some(AnyValue::Int64(9)));
        assert_eq!(md2.ncols(), 2);
    }

    #[test]
    fn test_with_column_length_mismatch() {
        let md = sample();
        let err = md.with_column(Series::new("x".into(), [1i64])).unwrap_err();
        assert!(matches!(err, RangesError::LengthMismatch { expected: 3, found: 1, .. }));
    }

    #[test]
    fn test_take_optional_fills_missing() {
        let md = sample().take_optional(&[Some(2), None]).unwrap();

        assert_eq!(md.nrows(), 2);
        assert_eq!(md.get(0, "name"), Some(AnyValue::String("c")));
        assert_eq!(md.get(1, "name"), Some(AnyValue::Null));
        assert_eq!(md.get(1, "score"), Some(AnyValue::Null));
    }

    #[test]
    fn test_take_without_columns_keeps_height() {
        let md = Metadata::new(4).take(&[0, 2]).unwrap();
        assert_eq!(md.nrows(), 2);
        assert_eq!(md.ncols(), 0);
    }

    #[test]
    fn test_concat_union_columns() {
        let a = sample();
        let b = Metadata::new(1)
            .with_column(Series::new("flag".into(), [true]))
            .unwrap();

        let md = Metadata::concat(&[&a, &b]).unwrap();

        assert_eq!(md.nrows(), 4);
        assert_eq!(md.names().collect::<Vec<_>>(), vec!["name", "score", "flag"]);
        assert_eq!(md.get(3, "name"), Some(AnyValue::Null));
        assert_eq!(md.get(0, "flag"), Some(AnyValue::Null));
        assert_eq!(md.get(3, "flag"), Some(AnyValue::Boolean(true)));
    }

    #[test]
    fn test_concat_type_conflict() {
        let a = sample();
        let b = Metadata::new(1)
            .with_column(Series::new("score".into(), ["high"]))
            .unwrap();

        let err = Metadata::concat(&[&a, &b]).unwrap_err();
        assert!(matches!(err, RangesError::SchemaMismatch { ref column, .. } if column == "score"));
    }

    #[test]
    fn test_rename_unknown() {
        assert!(sample().rename("nope", "x").is_err());
        let md = sample().rename("score", "value").unwrap();
        assert!(md.contains("value"));
        assert!(!md.contains("score"));
    }
}
