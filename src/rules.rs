//! Rule table: data model, resource loader, and application index.
//!
//! A deconjugation rule table is an ordered list of rule *families*. One
//! family describes several closely related ending substitutions sharing one
//! rationale: its `dec_end`/`con_end` (and, for tag-bearing kinds,
//! `dec_tag`/`con_tag`) vectors are parallel, one index position per member.
//! Shorter vectors are legal; a missing position reuses the nearest earlier
//! value (community rule files lean on this heavily, e.g. a single `con_tag`
//! shared by nine godan endings).
//!
//! The on-disk format is the community deconjugation-rule JSON: an array of
//! records with `kind` (the six-way discriminator), `dec_end`, `con_end`,
//! `detail`, and — depending on kind — `dec_tag`, `con_tag` and
//! `contextrule`. Existing community files are accepted unmodified: `type`
//! is an alias for `kind`, and any of the ending/tag fields may be a plain
//! string instead of a one-element array.
//!
//! Loading is all-or-nothing. A missing or unparseable resource is fatal to
//! the feature (no partial table, no synthesized default); a *ragged* family
//! is not an error and degrades via the index fallback above.
//!
//! ## Application index
//!
//! The table pre-indexes itself once at load so a search step only consults
//! plausible rules:
//!
//! - suffix rules are indexed by the final `char` of each `con_end` member
//!   (`by_final`);
//! - substitution rules (match anywhere) and suffix rules with an empty
//!   ending member (match any text) go to `always_on`.
//!
//! This is pure pruning: a skipped rule could not have matched, and the
//! handlers still perform the full per-member checks. A rule is enrolled
//! either in `always_on` or under its final chars, never both, so one lookup
//! yields each rule at most once.

use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Rule identifier (index into the table's rule vector).
pub(crate) type RuleId = usize;

// --- Rule data model ---------------------------------------------------------

/// One rule family, as a closed set of kinds.
///
/// Each variant carries only the fields its kind uses, and the handlers
/// dispatch with an exhaustive `match` — a kind can never silently do
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Baseline suffix substitution.
    Standard(SuffixRule),
    /// Suffix substitution that only applies when the ending is the *whole*
    /// text (whole-word rules for irregulars like きた → くる).
    Rewrite(SuffixRule),
    /// Suffix substitution usable only as the first transformation of a path.
    OnlyFinal(SuffixRule),
    /// Suffix substitution usable only after at least one transformation.
    NeverFinal(SuffixRule),
    /// Suffix substitution gated by a named predicate on the current form.
    Context(SuffixRule, ContextPredicate),
    /// Internal (non-suffix) text change, e.g. a sound contraction. Applies
    /// anywhere in the text, only as the very first step, and carries no
    /// tags.
    Substitution(SubstitutionRule),
}

/// The parallel-vector payload shared by all tag-bearing kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixRule {
    pub dec_end: Vec<String>,
    pub con_end: Vec<String>,
    pub dec_tag: Vec<String>,
    pub con_tag: Vec<String>,
    /// Human-readable description appended to a form's `process`. An empty
    /// detail marks a rule usable only as the first transformation of a
    /// path.
    pub detail: String,
}

/// Payload of a substitution rule: endings plus detail, no tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionRule {
    pub dec_end: Vec<String>,
    pub con_end: Vec<String>,
    pub detail: String,
}

/// One resolved member of a suffix family (after ragged-vector fallback).
#[derive(Debug, Clone, Copy)]
pub(crate) struct SuffixMember<'a> {
    pub dec_end: &'a str,
    pub con_end: &'a str,
    pub dec_tag: &'a str,
    pub con_tag: &'a str,
}

impl SuffixRule {
    /// Number of member positions in this family (the longest parallel
    /// vector drives; shorter ones fall back).
    pub(crate) fn family_len(&self) -> usize {
        self.dec_end
            .len()
            .max(self.con_end.len())
            .max(self.dec_tag.len())
            .max(self.con_tag.len())
    }

    /// Resolve member `i`, reusing the nearest earlier value for any vector
    /// shorter than the family. `None` if any vector is empty.
    pub(crate) fn member(&self, i: usize) -> Option<SuffixMember<'_>> {
        Some(SuffixMember {
            dec_end: nth_or_last(&self.dec_end, i)?,
            con_end: nth_or_last(&self.con_end, i)?,
            dec_tag: nth_or_last(&self.dec_tag, i)?,
            con_tag: nth_or_last(&self.con_tag, i)?,
        })
    }
}

impl SubstitutionRule {
    pub(crate) fn family_len(&self) -> usize {
        self.dec_end.len().max(self.con_end.len())
    }

    pub(crate) fn member(&self, i: usize) -> Option<(&str, &str)> {
        Some((nth_or_last(&self.con_end, i)?, nth_or_last(&self.dec_end, i)?))
    }
}

fn nth_or_last(xs: &[String], i: usize) -> Option<&str> {
    xs.get(i).or_else(|| xs.last()).map(String::as_str)
}

// --- Context predicates ------------------------------------------------------

/// Named boolean predicates available to `contextrule` entries.
///
/// Community rule files refer to these by name; a name this engine does not
/// recognize is kept (so newer corpora still load) but rejects every form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextPredicate {
    /// Rejects a form that carries exactly one tag when that tag is the
    /// continuative-stem state. Guards the ichidan bare-stem rule.
    V1InfinitiveTrap,
    /// Requires the candidate ending to match and the text before it not to
    /// end in "さ". Guards the する readings of される/させる against sa-row
    /// godan misparses.
    SaSpecial,
    /// Unrecognized predicate name; always rejects.
    Unknown(String),
}

/// Tag name of the continuative (renyoukei) stem state in the community tag
/// vocabulary.
pub(crate) const STEM_CONTINUATIVE_TAG: &str = "stem-ren";

impl ContextPredicate {
    fn from_name(name: &str) -> Self {
        match name {
            "v1inftrap" | "v1-infinitive-trap" => ContextPredicate::V1InfinitiveTrap,
            "saspecial" | "sa-special" => ContextPredicate::SaSpecial,
            other => ContextPredicate::Unknown(other.to_string()),
        }
    }
}

// --- Loader ------------------------------------------------------------------

/// Failure to obtain a usable rule table. All variants are fatal to the
/// deconjugation feature: there is no partial or degraded load.
#[derive(Debug, Error)]
pub enum RuleTableError {
    #[error("failed to read rule resource {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse rule resource: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("rule {index}: {problem}")]
    InvalidRule { index: usize, problem: String },
}

/// Raw on-disk record, before kind dispatch.
#[derive(Debug, Deserialize)]
struct RawRule {
    #[serde(alias = "type")]
    kind: String,
    #[serde(default)]
    dec_end: OneOrMany,
    #[serde(default)]
    con_end: OneOrMany,
    #[serde(default)]
    dec_tag: Option<OneOrMany>,
    #[serde(default)]
    con_tag: Option<OneOrMany>,
    #[serde(default)]
    detail: String,
    #[serde(default)]
    contextrule: Option<String>,
}

/// Community files write one-member families as plain strings.
#[derive(Debug, Deserialize, Default)]
#[serde(untagged)]
enum OneOrMany {
    #[default]
    Missing,
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::Missing => Vec::new(),
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

impl RawRule {
    fn into_rule(self, index: usize) -> Result<Rule, RuleTableError> {
        let invalid = |problem: String| RuleTableError::InvalidRule { index, problem };

        if self.kind == "substitution" {
            return Ok(Rule::Substitution(SubstitutionRule {
                dec_end: self.dec_end.into_vec(),
                con_end: self.con_end.into_vec(),
                detail: self.detail,
            }));
        }

        let dec_tag = self
            .dec_tag
            .ok_or_else(|| invalid(format!("kind {:?} requires dec_tag", self.kind)))?
            .into_vec();
        let con_tag = self
            .con_tag
            .ok_or_else(|| invalid(format!("kind {:?} requires con_tag", self.kind)))?
            .into_vec();

        let suffix = SuffixRule {
            dec_end: self.dec_end.into_vec(),
            con_end: self.con_end.into_vec(),
            dec_tag,
            con_tag,
            detail: self.detail,
        };

        match self.kind.as_str() {
            "stdrule" => Ok(Rule::Standard(suffix)),
            "rewriterule" => Ok(Rule::Rewrite(suffix)),
            "onlyfinalrule" => Ok(Rule::OnlyFinal(suffix)),
            "neverfinalrule" => Ok(Rule::NeverFinal(suffix)),
            "contextrule" => {
                let name = self
                    .contextrule
                    .ok_or_else(|| invalid("kind \"contextrule\" requires a predicate name".to_string()))?;
                let predicate = ContextPredicate::from_name(&name);
                if let ContextPredicate::Unknown(ref other) = predicate {
                    warn!("rule {index}: unknown context predicate {other:?}; rule will never apply");
                }
                Ok(Rule::Context(suffix, predicate))
            }
            other => Err(invalid(format!("unknown rule kind {other:?}"))),
        }
    }
}

// --- Rule table + application index ------------------------------------------

#[derive(Debug, Default)]
pub(crate) struct RuleIndex {
    /// Rules that must be consulted for every form: substitutions and suffix
    /// rules with an empty ending member.
    pub(crate) always_on: Vec<RuleId>,
    /// Suffix rules indexed by the final char of each `con_end` member.
    pub(crate) by_final: HashMap<char, Vec<RuleId>>,
}

/// The immutable, process-lifetime rule table.
///
/// Loaded once; read-only afterwards, so it is freely shared across threads
/// without synchronization.
#[derive(Debug)]
pub struct RuleTable {
    rules: Vec<Rule>,
    index: RuleIndex,
}

impl RuleTable {
    /// Build a table from already-constructed rules. This is the injection
    /// seam the engine tests use for synthetic tables.
    pub fn new(rules: Vec<Rule>) -> Self {
        let index = build_index(&rules);
        RuleTable { rules, index }
    }

    /// Parse a table from community-format JSON.
    pub fn from_json_str(json: &str) -> Result<Self, RuleTableError> {
        let raw: Vec<RawRule> = serde_json::from_str(json)?;
        let rules = raw
            .into_iter()
            .enumerate()
            .map(|(i, r)| r.into_rule(i))
            .collect::<Result<Vec<_>, _>>()?;
        let table = Self::new(rules);
        debug!(
            "loaded {} deconjugation rules ({} suffix-indexed endings, {} always-on)",
            table.rules.len(),
            table.index.by_final.len(),
            table.index.always_on.len()
        );
        Ok(table)
    }

    /// Load a table from a rule file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RuleTableError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RuleTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// The rule table bundled with the crate.
    pub fn bundled() -> &'static RuleTable {
        static BUNDLED: Lazy<RuleTable> = Lazy::new(|| {
            RuleTable::from_json_str(include_str!("../resources/deconjugation_rules.json"))
                .expect("bundled deconjugation rule table is valid")
        });
        &BUNDLED
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Rules that can possibly apply to `text`: the always-on set plus the
    /// suffix rules enrolled under `text`'s final char.
    pub(crate) fn candidates_for(&self, text: &str) -> impl Iterator<Item = &Rule> + '_ {
        let by_final = text
            .chars()
            .next_back()
            .and_then(|c| self.index.by_final.get(&c))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        self.index
            .always_on
            .iter()
            .chain(by_final.iter())
            .map(move |&id| &self.rules[id])
    }
}

fn build_index(rules: &[Rule]) -> RuleIndex {
    let mut index = RuleIndex::default();

    for (id, rule) in rules.iter().enumerate() {
        let con_end = match rule {
            Rule::Substitution(_) => {
                index.always_on.push(id);
                continue;
            }
            Rule::Standard(s) | Rule::Rewrite(s) | Rule::OnlyFinal(s) | Rule::NeverFinal(s) | Rule::Context(s, _) => {
                &s.con_end
            }
        };

        if con_end.iter().any(|e| e.is_empty()) {
            index.always_on.push(id);
            continue;
        }

        let mut finals: Vec<char> = con_end.iter().filter_map(|e| e.chars().next_back()).collect();
        finals.sort_unstable();
        finals.dedup();
        if finals.is_empty() {
            // No ending members at all: the rule can never match. Keep it out
            // of the index entirely.
            debug!("rule {id} has no endings and will never apply");
            continue;
        }
        for c in finals {
            index.by_final.entry(c).or_default().push(id);
        }
    }

    index
}
