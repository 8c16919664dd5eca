//! Global configuration for runtime behavior.
//!
//! This module provides thread-safe global switches read once per operation,
//! so they add no overhead to inner loops.

use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag allowing rowwise and per-query work to run on the rayon pool.
///
/// Output is identical either way; only scheduling changes.
static PARALLEL: AtomicBool = AtomicBool::new(true);

/// Enable or disable parallel execution.
///
/// # Example
///
/// ```
/// use grit_algebra::config;
///
/// config::set_parallel(false);
/// assert!(!config::is_parallel());
/// config::set_parallel(true);
/// ```
#[inline]
pub fn set_parallel(enabled: bool) {
    PARALLEL.store(enabled, Ordering::Release);
}

/// Check if parallel execution is enabled.
#[inline]
pub fn is_parallel() -> bool {
    PARALLEL.load(Ordering::Acquire)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_default_parallel() {
        set_parallel(true);
        assert!(is_parallel());
    }

    #[test]
    #[serial]
    fn test_toggle_parallel() {
        set_parallel(false);
        assert!(!is_parallel());
        set_parallel(true); // Reset
        assert!(is_parallel());
    }
}
