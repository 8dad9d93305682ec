//! Engine run metrics.
//!
//! A small set of structs used to observe and debug engine behavior:
//!
//! - `Deconjugator::deconjugate` for normal operation.
//! - `Deconjugator::run_with_metrics` (and the crate-level
//!   `deconjugate_verbose_with`) for profiling and rule debugging.
//!
//! Metrics are intentionally simple and *opt-in*: the hot path only counts
//! passes, it never retains per-form detail.

use crate::form::Form;
use std::time::Duration;

/// Timing for one full engine call.
#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    /// Total elapsed time including the cache probe/store.
    pub total: Duration,
    /// Fixed-point search breakdown. Empty on a cache hit.
    pub search: SearchMetrics,
    /// Whether the result came straight from the cache.
    pub cache_hit: bool,
}

/// Timings for the saturation loop.
#[derive(Debug, Default, Clone)]
pub struct SearchMetrics {
    /// Total elapsed search time across all passes.
    pub total: Duration,
    /// One entry per frontier pass, including the final empty-producing one.
    pub passes: Vec<PassMetrics>,
}

/// One frontier pass of the fixed point.
#[derive(Debug, Default, Clone)]
pub struct PassMetrics {
    /// Elapsed time for the pass.
    pub duration: Duration,
    /// Number of forms in the frontier entering the pass.
    pub frontier: usize,
    /// Number of new forms admitted for the next frontier.
    pub produced: usize,
}

/// Engine output bundled with timing information.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// The full duplicate-free result set, identity form first.
    pub forms: Vec<Form>,
    /// Timing measurements for the run.
    pub metrics: RunMetrics,
}
