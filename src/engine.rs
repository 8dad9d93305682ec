//! Deconjugation engine.
//!
//! This module is the *public entry point* for the search machinery. It is
//! split into focused submodules under `src/engine/` while keeping paths
//! stable (for example `crate::engine::Deconjugator`).
//!
//! ## How the parts work together
//!
//! Deconjugating an input string is a pipeline:
//!
//! ```text
//! rule table (rules.rs)
//!        │  final-char index + always-on list
//!        v
//! input ── cache probe (cache.rs) ── hit? ──> cached forms
//!        │ miss
//!        v
//!   Deconjugator::search (search.rs)
//!     - seed identity form
//!     - iterate to fixpoint: apply every candidate rule
//!       to every frontier form (apply.rs)
//!     - dedup via FormKey (dedup.rs)
//!        │
//!        v
//!   cache store ──> Vec<Form>
//! ```
//!
//! The engine leans on **saturation**: repeatedly apply rules until an
//! iteration produces no new forms. Termination is not a step limit — it
//! falls out of two hard guards every tag-bearing handler enforces (text may
//! grow at most 10 chars past the original, the tag chain at most 6 past the
//! original's length), which make the reachable state space finite even on a
//! cyclic rule graph.
//!
//! ## Responsibilities by module
//!
//! - `apply.rs`: the six rule-kind handlers; pure functions from
//!   (form, rule) to zero or more child forms.
//! - `search.rs`: the frontier/discovered fixed-point driver and the
//!   [`Deconjugator`] handle.
//! - `dedup.rs`: the stable dedup key that keeps saturation finite.
//! - `cache.rs`: bounded thread-safe LRU over full result sets.
//! - `metrics.rs`: optional timing/trace data for runs and passes.

#[path = "engine/apply.rs"]
mod apply;
#[path = "engine/cache.rs"]
mod cache;
#[path = "engine/dedup.rs"]
mod dedup;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/search.rs"]
mod search;

pub use cache::{CacheStats, DEFAULT_CACHE_CAPACITY};
pub use metrics::{PassMetrics, RunMetrics, RunResult, SearchMetrics};
pub use search::Deconjugator;
