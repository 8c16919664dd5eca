//! Parallel processing utilities using Rayon.

use crate::config;
use crate::error::{GeometryError, RangesError, RowFailure};
use rayon::prelude::*;

/// Minimum number of rows before enabling parallelization.
/// Below this threshold, sequential processing is faster due to
/// thread spawn overhead.
pub const PARALLEL_THRESHOLD: usize = 10_000;

/// Returns true when `n` rows should be processed on the rayon pool.
#[inline]
pub fn use_parallel(n: usize) -> bool {
    n >= PARALLEL_THRESHOLD && config::is_parallel()
}

/// Apply `f` to every row index, preserving row order in the output.
pub fn map_rows<F, T>(n: usize, f: F) -> Vec<T>
where
    F: Fn(usize) -> T + Sync + Send,
    T: Send,
{
    if use_parallel(n) {
        (0..n).into_par_iter().map(f).collect()
    } else {
        (0..n).map(f).collect()
    }
}

/// Apply a fallible rowwise transformation.
///
/// Every failing row is collected so callers can see all offenders at once.
pub fn try_map_rows<F, T>(n: usize, f: F) -> Result<Vec<T>, RangesError>
where
    F: Fn(usize) -> Result<T, GeometryError> + Sync + Send,
    T: Send,
{
    let results = map_rows(n, f);

    let failures: Vec<RowFailure> = results
        .iter()
        .enumerate()
        .filter_map(|(row, r)| r.as_ref().err().map(|&error| RowFailure { row, error }))
        .collect();
    if !failures.is_empty() {
        return Err(RangesError::InvalidGeometry { failures });
    }

    Ok(results.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_rows_keeps_order() {
        let out = map_rows(PARALLEL_THRESHOLD + 5, |i| i * 2);
        assert_eq!(out.len(), PARALLEL_THRESHOLD + 5);
        assert!(out.iter().enumerate().all(|(i, &v)| v == i * 2));
    }

    #[test]
    fn test_try_map_rows_reports_every_failure() {
        let err = try_map_rows(6, |i| {
            if i % 3 == 0 {
                Err(GeometryError::NegativeWidth { width: -1 })
            } else {
                Ok(i)
            }
        })
        .unwrap_err();

        match err {
            RangesError::InvalidGeometry { failures } => {
                let rows: Vec<usize> = failures.iter().map(|f| f.row).collect();
                assert_eq!(rows, vec![0, 3]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_try_map_rows_ok() {
        let out = try_map_rows(3, |i| Ok::<_, GeometryError>(i + 1)).unwrap();
        assert_eq!(out, vec![1, 2, 3]);
    }
}
