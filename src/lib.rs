//! modoshi — a rule-driven Japanese deconjugation engine.
//!
//! Given an inflected surface string, enumerate every plausible dictionary
//! ("base") form that could have produced it, together with the chain of
//! grammatical tags and a human-readable derivation trail. Candidates are
//! *not* validated against a dictionary; the downstream lookup pipeline does
//! that with each form's `text`.
//!
//! ```
//! use modoshi::deconjugate;
//!
//! let forms = deconjugate("食べたくなかった");
//! let base = forms.iter().find(|f| f.text == "食べる").unwrap();
//! assert_eq!(base.process_display(), "past tense → negative → want to");
//! ```

mod api;
mod engine;
mod form;
mod rules;

pub use api::{deconjugate, deconjugate_verbose_with, deconjugate_with, Options};
pub use engine::{CacheStats, Deconjugator, PassMetrics, RunMetrics, RunResult, SearchMetrics, DEFAULT_CACHE_CAPACITY};
pub use form::Form;
pub use rules::{ContextPredicate, Rule, RuleTable, RuleTableError, SubstitutionRule, SuffixRule};
