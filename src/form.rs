//! Search-state record for the deconjugation engine.
//!
//! A [`Form`] is one node of the search: a candidate text together with the
//! grammar-tag chain and the human-readable derivation trail that produced it.
//! Forms are created once by a rule application and never mutated afterwards;
//! the engine either keeps a form as part of the result set or discards it as
//! a duplicate.
//!
//! ## Equality
//!
//! Two forms are the same result iff `text`, `original_text`, `tags` and
//! `process` are all equal, in order. This equality is the *only* duplicate-
//! and cycle-suppression mechanism in the engine, so it is implemented by
//! hand here (rather than derived) to keep `seen_texts` out of it:
//! `seen_texts` is per-path bookkeeping used by the handlers, not an
//! observable part of the result.

use serde::Serialize;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

/// One candidate derivation: a possibly-rewritten text plus the trail that
/// led to it.
///
/// ```text
/// "食べたくなかった"          original_text
///      │ past tense
///      ▼
/// "食べたくない"   tags: [past, negative]
///      │ negative
///      ▼
/// "食べたい"       tags: [past, negative, adj-i]
///      │ want to
///      ▼
/// "食べる"         tags: [past, negative, adj-i, v1]   <- this Form
/// ```
///
/// `tags` records the grammatical states traversed (newest last; the final
/// element is the state the current `text` is in). `process` records one
/// rule description per applied rule, in application order.
#[derive(Debug, Clone, Serialize)]
pub struct Form {
    /// Current candidate text (the dictionary-lookup key).
    pub text: String,
    /// The exact string the caller asked to deconjugate. Identical for every
    /// form produced by one engine run.
    pub original_text: String,
    /// Grammar-tag labels accumulated along this derivation path.
    pub tags: Vec<String>,
    /// Human-readable rule descriptions applied along this path.
    pub process: Vec<String>,
    /// Texts already visited on this derivation path. Handlers consult and
    /// extend this while constructing child forms so a rule cannot re-derive
    /// a text the path has already been through. Not part of equality.
    #[serde(skip)]
    pub(crate) seen_texts: HashSet<String>,
}

impl Form {
    /// The zero-transformation form for `text`.
    pub fn identity(text: &str) -> Self {
        Form {
            text: text.to_string(),
            original_text: text.to_string(),
            tags: Vec::new(),
            process: Vec::new(),
            seen_texts: HashSet::new(),
        }
    }

    /// True for the untransformed seed form. Note a substitution-produced
    /// form also carries no tags; the derivation trail tells them apart.
    pub fn is_identity(&self) -> bool {
        self.tags.is_empty() && self.process.is_empty()
    }

    /// The grammatical state the current text is in, if any transformation
    /// has been applied yet.
    pub fn current_tag(&self) -> Option<&str> {
        self.tags.last().map(String::as_str)
    }

    /// The derivation trail joined for display, e.g. `"past tense → passive"`.
    pub fn process_display(&self) -> String {
        self.process.join(" → ")
    }
}

impl PartialEq for Form {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
            && self.original_text == other.original_text
            && self.tags == other.tags
            && self.process == other.process
    }
}

impl Eq for Form {}

impl Hash for Form {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
        self.original_text.hash(state);
        self.tags.hash(state);
        self.process.hash(state);
    }
}
