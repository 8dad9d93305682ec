//! Public API.
//!
//! The crate-level functions run against a process-wide engine built from
//! the bundled rule table; construct a [`Deconjugator`] directly to use a
//! custom table or cache capacity.

use crate::engine::{Deconjugator, RunResult};
use crate::form::Form;
use once_cell::sync::Lazy;

static DEFAULT_ENGINE: Lazy<Deconjugator> = Lazy::new(Deconjugator::bundled);

/// Options that affect a deconjugation call.
#[derive(Debug, Clone)]
pub struct Options {
    /// Read and write the engine's result cache. Off, the cache is neither
    /// consulted nor populated; the result set is equal either way.
    pub use_cache: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options { use_cache: true }
    }
}

/// Enumerate every plausible dictionary form for `text` using the bundled
/// rule table and a shared cache.
///
/// The result always contains the identity form (first), carries no
/// duplicates, and is deterministic. The engine does not check any candidate
/// against a dictionary — that is the caller's job.
///
/// # Example
/// ```
/// use modoshi::deconjugate;
///
/// let forms = deconjugate("食べた");
/// assert!(forms.iter().any(|f| f.text == "食べる"));
/// ```
pub fn deconjugate(text: &str) -> Vec<Form> {
    DEFAULT_ENGINE.deconjugate(text)
}

/// [`deconjugate`] with explicit [`Options`].
pub fn deconjugate_with(text: &str, options: &Options) -> Vec<Form> {
    DEFAULT_ENGINE.deconjugate_with(text, options)
}

/// [`deconjugate`] returning per-pass timing details alongside the result
/// set. Useful for profiling and rule debugging; the plain path does not
/// allocate these traces.
pub fn deconjugate_verbose_with(text: &str, options: &Options) -> RunResult {
    DEFAULT_ENGINE.run_with_metrics(text, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derives(input: &str, expected: &str) -> bool {
        deconjugate(input).iter().any(|f| f.text == expected)
    }

    #[test]
    fn bundled_examples_reach_their_dictionary_forms() {
        // Array of (expected_base, input_string)
        let cases: Vec<(&str, &str)> = vec![
            ("食べる", "食べた"),
            ("食べる", "食べて"),
            ("食べる", "食べない"),
            ("食べる", "食べました"),
            ("食べる", "食べません"),
            ("食べる", "食べられた"),
            ("食べる", "食べさせる"),
            ("食べる", "食べれば"),
            ("食べる", "食べたくなかった"),
            ("食べる", "食べなきゃ"),
            ("飲む", "飲んだ"),
            ("飲む", "飲みました"),
            ("飲む", "飲まない"),
            ("飲む", "飲まなかった"),
            ("飲む", "飲める"),
            ("飲む", "飲もう"),
            ("飲む", "飲まん"),
            ("飲む", "飲みすぎた"),
            ("書く", "書いた"),
            ("書く", "書かれていました"),
            ("行く", "行った"),
            ("話す", "話した"),
            ("泳ぐ", "泳いで"),
            ("待つ", "待って"),
            ("死ぬ", "死んだ"),
            ("遊ぶ", "遊んで"),
            ("分かる", "分かんない"),
            ("読む", "読みたい"),
            ("勉強する", "勉強しました"),
            ("勉強する", "勉強される"),
            ("する", "される"),
            ("くる", "きた"),
            ("くる", "きて"),
            ("くる", "こい"),
            ("来る", "来た"),
            ("高い", "高かった"),
            ("高い", "高くない"),
            ("高い", "高くて"),
        ];

        for (expected, input) in cases {
            assert!(derives(input, expected), "{input:?} did not derive {expected:?}");
        }
    }

    #[test]
    fn whole_word_rewrites_do_not_fire_mid_word() {
        // 起きた is the past of 起きる; the きた → くる rewrite must not
        // manufacture 起くる out of its tail.
        let forms = deconjugate("起きた");
        assert!(forms.iter().any(|f| f.text == "起きる"));
        assert!(!forms.iter().any(|f| f.text == "起くる"));
    }

    #[test]
    fn single_step_tag_and_process_shape() {
        let forms = deconjugate("食べた");
        let base = forms.iter().find(|f| f.text == "食べる" && f.tags == ["past", "v1"]).unwrap();
        assert_eq!(base.process, vec!["past tense"]);
        assert_eq!(base.original_text, "食べた");
    }

    #[test]
    fn chained_steps_accumulate_tags_and_process() {
        let forms = deconjugate("食べなかった");
        let base = forms
            .iter()
            .find(|f| f.text == "食べる" && f.tags == ["past", "negative", "v1"])
            .unwrap();
        assert_eq!(base.process, vec!["past tense", "negative"]);
        assert_eq!(base.process_display(), "past tense → negative");
    }

    #[test]
    fn polite_chain_goes_through_the_continuative_stem() {
        let forms = deconjugate("飲みました");
        let base = forms
            .iter()
            .find(|f| f.text == "飲む")
            .expect("polite past should reach the dictionary form");
        assert_eq!(base.tags, vec!["polite past", "stem-ren", "v5m"]);
        assert_eq!(base.process, vec!["polite past", "infinitive"]);
    }

    #[test]
    fn every_result_respects_the_growth_bounds() {
        for input in ["食べたくなかった", "書かれていました", "た", ""] {
            let len = input.chars().count();
            let forms = deconjugate(input);
            assert!(forms[0].is_identity());
            for f in &forms {
                assert!(f.text.chars().count() <= len + 10);
                assert!(f.tags.len() <= len + 6);
                // A tagged form went through at least one tag-bearing step,
                // so it must carry a derivation trail.
                if !f.tags.is_empty() {
                    assert!(!f.process.is_empty());
                }
            }
        }
    }

    #[test]
    fn repeated_calls_are_equal() {
        let first = deconjugate("食べていた");
        let second = deconjugate("食べていた");
        assert_eq!(first, second);

        let uncached = deconjugate_with("食べていた", &Options { use_cache: false });
        assert_eq!(first, uncached);
    }

    #[test]
    fn verbose_run_exposes_pass_metrics() {
        let run = deconjugate_verbose_with("飲みませんでした", &Options { use_cache: false });
        assert!(!run.metrics.cache_hit);
        assert!(!run.metrics.search.passes.is_empty());
        assert!(run.metrics.search.total <= run.metrics.total);
        // The final pass is the fixed point: it produces nothing.
        assert_eq!(run.metrics.search.passes.last().unwrap().produced, 0);
    }
}
