//! Fixed-point search driver.
//!
//! This module is the operational core of the engine:
//!
//! - probe the result cache (unless the caller opted out);
//! - seed the frontier with the identity form;
//! - repeatedly apply every plausible rule to every frontier form
//!   (see `apply.rs`) until a pass produces nothing new;
//! - deduplicate produced forms to keep saturation finite and deterministic
//!   (see `dedup.rs`);
//! - store the finished set back into the cache.
//!
//! ## Pass structure
//!
//! ```text
//! frontier = { identity }
//!      │
//!      ▼
//!  apply all candidate rules to each frontier form
//!      │  keep only forms never seen before
//!      ▼
//!  discovered ∪= frontier; frontier = new forms
//!      └── repeat until the frontier is empty
//! ```
//!
//! The output is the discovered set in insertion order — identity form
//! first, then shallower derivations before deeper ones — so downstream
//! display and export are deterministic without a post-sort.

use super::apply::apply_rule;
use super::cache::{ResultCache, DEFAULT_CACHE_CAPACITY};
use super::dedup::FormKey;
use super::metrics::{PassMetrics, RunMetrics, RunResult, SearchMetrics};
use crate::form::Form;
use crate::rules::RuleTable;
use crate::Options;
use log::trace;
use std::collections::HashSet;
use std::time::Instant;

enum TableSource {
    /// The process-wide bundled table.
    Bundled(&'static RuleTable),
    /// A caller-supplied table (synthetic tables in tests, custom corpora).
    Owned(RuleTable),
}

/// Deconjugation engine: an immutable rule table plus a bounded result
/// cache.
///
/// The engine is a pure, synchronous computation per call; a shared
/// `Deconjugator` is safe to use from multiple threads (the table is
/// read-only and the cache synchronizes internally).
///
/// Usage: `Deconjugator::bundled()` for the built-in rule set, or
/// [`Deconjugator::new`] to inject any [`RuleTable`].
pub struct Deconjugator {
    table: TableSource,
    cache: ResultCache,
}

impl Deconjugator {
    /// Engine over a caller-supplied rule table, with the default cache
    /// capacity.
    pub fn new(table: RuleTable) -> Self {
        Self::with_cache_capacity(table, DEFAULT_CACHE_CAPACITY)
    }

    /// Engine over a caller-supplied rule table and cache capacity
    /// (clamped to at least one entry).
    pub fn with_cache_capacity(table: RuleTable, capacity: usize) -> Self {
        Deconjugator {
            table: TableSource::Owned(table),
            cache: ResultCache::new(capacity),
        }
    }

    /// Engine over the bundled rule table.
    pub fn bundled() -> Self {
        Deconjugator {
            table: TableSource::Bundled(RuleTable::bundled()),
            cache: ResultCache::new(DEFAULT_CACHE_CAPACITY),
        }
    }

    /// The rule table this engine searches over.
    pub fn rules(&self) -> &RuleTable {
        match &self.table {
            TableSource::Bundled(table) => table,
            TableSource::Owned(table) => table,
        }
    }

    /// Snapshot of the result cache's performance counters.
    pub fn cache_stats(&self) -> super::cache::CacheStats {
        self.cache.stats()
    }

    /// Drop every cached result set (counters are cumulative and survive).
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Enumerate every plausible dictionary form for `text`, cached.
    ///
    /// The returned set always contains the identity form (first), is free
    /// of duplicates under `Form` equality, and is deterministic for a given
    /// rule table.
    pub fn deconjugate(&self, text: &str) -> Vec<Form> {
        self.deconjugate_with(text, &Options::default())
    }

    /// [`deconjugate`](Self::deconjugate) with explicit options. With
    /// `use_cache` off the cache is neither read nor written; the result set
    /// is equal either way.
    pub fn deconjugate_with(&self, text: &str, options: &Options) -> Vec<Form> {
        self.run_with_metrics(text, options).forms
    }

    /// Run the engine and return timing details alongside the result set.
    pub fn run_with_metrics(&self, text: &str, options: &Options) -> RunResult {
        let total_start = Instant::now();

        if options.use_cache {
            if let Some(forms) = self.cache.get(text) {
                return RunResult {
                    forms,
                    metrics: RunMetrics {
                        total: total_start.elapsed(),
                        search: SearchMetrics::default(),
                        cache_hit: true,
                    },
                };
            }
        }

        let (forms, search) = self.search(text);

        if options.use_cache {
            self.cache.put(text, forms.clone());
        }

        RunResult {
            forms,
            metrics: RunMetrics {
                total: total_start.elapsed(),
                search,
                cache_hit: false,
            },
        }
    }

    /// The fixed point itself: breadth-first over rule application as the
    /// edge relation.
    fn search(&self, text: &str) -> (Vec<Form>, SearchMetrics) {
        let search_start = Instant::now();
        let mut metrics = SearchMetrics::default();

        let table = self.rules();
        let identity = Form::identity(text);

        let mut seen: HashSet<FormKey> = HashSet::new();
        seen.insert(FormKey::from_form(&identity));

        let mut discovered: Vec<Form> = Vec::new();
        let mut frontier: Vec<Form> = vec![identity];
        let mut scratch: Vec<Form> = Vec::new();

        while !frontier.is_empty() {
            let pass_start = Instant::now();
            let mut next: Vec<Form> = Vec::new();

            for form in &frontier {
                for rule in table.candidates_for(&form.text) {
                    apply_rule(form, rule, &mut scratch);
                    for candidate in scratch.drain(..) {
                        // Equality over (text, original, tags, process) is
                        // the sole duplicate/cycle suppression across
                        // discovered ∪ frontier ∪ next.
                        if seen.insert(FormKey::from_form(&candidate)) {
                            next.push(candidate);
                        }
                    }
                }
            }

            metrics.passes.push(PassMetrics {
                duration: pass_start.elapsed(),
                frontier: frontier.len(),
                produced: next.len(),
            });
            trace!(
                "pass {}: {} frontier forms produced {} new",
                metrics.passes.len(),
                frontier.len(),
                next.len()
            );

            discovered.append(&mut frontier);
            frontier = next;
        }

        metrics.total = search_start.elapsed();
        (discovered, metrics)
    }
}

impl std::fmt::Debug for Deconjugator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deconjugator")
            .field("rules", &self.rules().len())
            .field("cache_capacity", &self.cache.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Rule, SubstitutionRule, SuffixRule};
    use std::collections::HashSet as StdHashSet;

    fn suffix(con: &[&str], dec: &[&str], con_tag: &[&str], dec_tag: &[&str], detail: &str) -> SuffixRule {
        SuffixRule {
            dec_end: dec.iter().map(|s| s.to_string()).collect(),
            con_end: con.iter().map(|s| s.to_string()).collect(),
            dec_tag: dec_tag.iter().map(|s| s.to_string()).collect(),
            con_tag: con_tag.iter().map(|s| s.to_string()).collect(),
            detail: detail.to_string(),
        }
    }

    fn engine(rules: Vec<Rule>) -> Deconjugator {
        Deconjugator::new(RuleTable::new(rules))
    }

    fn texts(forms: &[Form]) -> Vec<&str> {
        forms.iter().map(|f| f.text.as_str()).collect()
    }

    #[test]
    fn result_always_contains_identity_first() {
        let eng = engine(vec![]);
        let forms = eng.deconjugate("食べた");
        assert_eq!(forms.len(), 1);
        assert!(forms[0].is_identity());
        assert_eq!(forms[0].text, "食べた");

        // Even for the empty string.
        let forms = eng.deconjugate("");
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].text, "");
    }

    #[test]
    fn single_rule_application() {
        let eng = engine(vec![Rule::Standard(suffix(
            &["た"],
            &["る"],
            &["past"],
            &["dictionary"],
            "past tense",
        ))]);
        let forms = eng.deconjugate("食べた");
        assert_eq!(texts(&forms), vec!["食べた", "食べる"]);
        assert_eq!(forms[1].tags, vec!["past", "dictionary"]);
        assert_eq!(forms[1].process, vec!["past tense"]);
    }

    #[test]
    fn chained_rules_need_matching_tags() {
        let first = Rule::Standard(suffix(&["なかった"], &["ない"], &["past"], &["negative"], "past tense"));
        let second = Rule::Standard(suffix(&["ない"], &["る"], &["negative"], &["dictionary"], "negative"));
        let eng = engine(vec![first.clone(), second]);

        let forms = eng.deconjugate("食べなかった");
        assert_eq!(texts(&forms), vec!["食べなかった", "食べない", "食べる"]);
        assert_eq!(forms[2].tags, vec!["past", "negative", "dictionary"]);
        assert_eq!(forms[2].process, vec!["past tense", "negative"]);

        // With a non-matching con_tag on the second rule the chain stops.
        let broken = Rule::Standard(suffix(&["ない"], &["る"], &["imperative"], &["dictionary"], "negative"));
        let eng = engine(vec![first, broken]);
        let forms = eng.deconjugate("食べなかった");
        assert_eq!(texts(&forms), vec!["食べなかった", "食べない"]);
    }

    #[test]
    fn result_is_a_true_set() {
        // Two identical rule entries produce one child, not two.
        let rule = Rule::Standard(suffix(&["た"], &["る"], &["past"], &["dictionary"], "past tense"));
        let eng = engine(vec![rule.clone(), rule]);
        let forms = eng.deconjugate("食べた");
        assert_eq!(forms.len(), 2);

        let unique: StdHashSet<&Form> = forms.iter().collect();
        assert_eq!(unique.len(), forms.len());
    }

    #[test]
    fn bounds_hold_for_every_returned_form() {
        // A deliberately cyclic table.
        let rules = vec![
            Rule::Standard(suffix(&["た"], &["たた"], &["past"], &["past"], "a")),
            Rule::Standard(suffix(&["たた"], &["た"], &["past"], &["past"], "b")),
            Rule::Substitution(SubstitutionRule {
                dec_end: vec!["たた".to_string()],
                con_end: vec!["た".to_string()],
                detail: "c".to_string(),
            }),
        ];
        let eng = engine(rules);
        let input = "たたた";
        let len = input.chars().count();
        let forms = eng.deconjugate(input);
        assert!(forms.len() > 1);
        for f in &forms {
            assert!(f.text.chars().count() <= len + 10);
            assert!(f.tags.len() <= len + 6);
        }
    }

    #[test]
    fn substitution_feeds_suffix_rules() {
        let rules = vec![
            Rule::Substitution(SubstitutionRule {
                dec_end: vec!["らな".to_string()],
                con_end: vec!["んな".to_string()],
                detail: "contraction".to_string(),
            }),
            Rule::Standard(suffix(&["らない"], &["る"], &["negative"], &["v5r"], "negative")),
        ];
        let eng = engine(rules);
        let forms = eng.deconjugate("分かんない");
        assert_eq!(texts(&forms), vec!["分かんない", "分からない", "分かる"]);
        assert_eq!(forms[1].tags, Vec::<String>::new());
        assert_eq!(forms[1].process, vec!["contraction"]);
        assert_eq!(forms[2].tags, vec!["negative", "v5r"]);
        assert_eq!(forms[2].process, vec!["contraction", "negative"]);
    }

    #[test]
    fn cached_and_uncached_runs_agree() {
        let eng = engine(vec![Rule::Standard(suffix(
            &["た"],
            &["る"],
            &["past"],
            &["dictionary"],
            "past tense",
        ))]);

        let uncached = eng.deconjugate_with("食べた", &Options { use_cache: false });
        assert_eq!(eng.cache_stats().misses, 0, "use_cache=false must not touch the cache");

        let first = eng.deconjugate("食べた");
        let second = eng.deconjugate("食べた");
        assert_eq!(first, second);
        assert_eq!(first, uncached);

        let stats = eng.cache_stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn verbose_run_reports_cache_hit() {
        let eng = engine(vec![]);
        let opts = Options::default();
        let miss = eng.run_with_metrics("食べた", &opts);
        assert!(!miss.metrics.cache_hit);
        assert!(!miss.metrics.search.passes.is_empty());

        let hit = eng.run_with_metrics("食べた", &opts);
        assert!(hit.metrics.cache_hit);
        assert!(hit.metrics.search.passes.is_empty());
        assert_eq!(miss.forms, hit.forms);
    }

    #[test]
    fn cache_evicts_least_recently_used_input() {
        let eng = Deconjugator::with_cache_capacity(RuleTable::new(vec![]), 2);
        eng.deconjugate("a");
        eng.deconjugate("b");
        // Refresh "a", then insert a third input: "b" must be the victim.
        eng.deconjugate("a");
        eng.deconjugate("c");

        let stats = eng.cache_stats();
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.current_size, 2);

        // "a" and "c" hit; "b" recomputes.
        let hits_before = eng.cache_stats().hits;
        eng.deconjugate("a");
        eng.deconjugate("c");
        assert_eq!(eng.cache_stats().hits, hits_before + 2);
        let misses_before = eng.cache_stats().misses;
        eng.deconjugate("b");
        assert_eq!(eng.cache_stats().misses, misses_before + 1);
    }

    #[test]
    fn index_pruning_matches_linear_application() {
        // The same table, queried through the index and by brute force,
        // must agree.
        let rules = vec![
            Rule::Standard(suffix(&["た"], &["る"], &["past"], &["v1"], "past tense")),
            Rule::Standard(suffix(&["ない"], &["る"], &["negative"], &["v1"], "negative")),
            Rule::Standard(suffix(&[""], &["る"], &["stem-ren"], &["v1"], "infinitive")),
            Rule::Substitution(SubstitutionRule {
                dec_end: vec!["では".to_string()],
                con_end: vec!["じゃ".to_string()],
                detail: "contraction".to_string(),
            }),
        ];
        let table = RuleTable::new(rules.clone());
        let eng = engine(rules);

        for input in ["食べた", "食べない", "じゃ", "食べ", ""] {
            let via_index = eng.deconjugate_with(input, &Options { use_cache: false });

            // Brute force: the engine loop with no candidate pruning.
            let mut seen = StdHashSet::new();
            let identity = Form::identity(input);
            seen.insert(FormKey::from_form(&identity));
            let mut discovered = Vec::new();
            let mut frontier = vec![identity];
            let mut scratch = Vec::new();
            while !frontier.is_empty() {
                let mut next = Vec::new();
                for form in &frontier {
                    for rule in table.iter() {
                        apply_rule(form, rule, &mut scratch);
                        for cand in scratch.drain(..) {
                            if seen.insert(FormKey::from_form(&cand)) {
                                next.push(cand);
                            }
                        }
                    }
                }
                discovered.append(&mut frontier);
                frontier = next;
            }

            // The index reorders rule iteration, so compare as sets.
            let via_index: StdHashSet<Form> = via_index.into_iter().collect();
            let linear: StdHashSet<Form> = discovered.into_iter().collect();
            assert_eq!(via_index, linear, "pruning changed results for {input:?}");
        }
    }
}
