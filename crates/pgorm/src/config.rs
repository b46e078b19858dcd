//! Process-wide configuration flags.
//!
//! Grounded in `original_source/sqlx-runner/init.go`, which keeps `dat.Dialect`,
//! `Cache`, and `LogQueriesThreshold` as package-level globals set once at startup.
//! This module collects the non-dialect, non-cache flags named in the spec's External
//! Interfaces section.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

static ENABLE_INTERPOLATION: AtomicBool = AtomicBool::new(false);
static STRICT: AtomicBool = AtomicBool::new(false);
static LOG_QUERIES_THRESHOLD_MICROS: AtomicU64 = AtomicU64::new(0);

/// Whether builders interpolate literals into the SQL string by default.
///
/// Individual builders may still opt in per-call via `.set_is_interpolated(true)`
/// regardless of this flag.
pub fn enable_interpolation() -> bool {
    ENABLE_INTERPOLATION.load(Ordering::Relaxed)
}

pub fn set_enable_interpolation(enabled: bool) {
    ENABLE_INTERPOLATION.store(enabled, Ordering::Relaxed);
}

/// Strict mode: escalates certain transaction lifecycle violations (see
/// `crate::transaction`) to process abort instead of a returned error.
pub fn strict() -> bool {
    STRICT.load(Ordering::Relaxed)
}

pub fn set_strict(enabled: bool) {
    STRICT.store(enabled, Ordering::Relaxed);
}

/// Queries taking longer than this duration are always reported to the `sql` log sink,
/// regardless of whether a sink is installed for debug-level logging. Zero means "report
/// every query" is disabled (no threshold set).
pub fn log_queries_threshold() -> Option<Duration> {
    let micros = LOG_QUERIES_THRESHOLD_MICROS.load(Ordering::Relaxed);
    if micros == 0 {
        None
    } else {
        Some(Duration::from_micros(micros))
    }
}

pub fn set_log_queries_threshold(threshold: Duration) {
    let micros = threshold.as_micros().min(u64::MAX as u128) as u64;
    LOG_QUERIES_THRESHOLD_MICROS.store(micros.max(1), Ordering::Relaxed);
}

pub fn clear_log_queries_threshold() {
    LOG_QUERIES_THRESHOLD_MICROS.store(0, Ordering::Relaxed);
}
