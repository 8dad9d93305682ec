//! Rule-kind handlers.
//!
//! Each handler attempts to apply one rule family to one form and pushes
//! every resulting child form into the caller's buffer. "Not applicable" is
//! ordinary control flow: a handler that matches nothing simply pushes
//! nothing. No handler errors on well-formed input.
//!
//! All tag-bearing kinds share one inner step ([`apply_suffix_family`]):
//! try every member of the family (with ragged-vector fallback), and for
//! each member check, in order —
//!
//! 1. hard guards: non-empty text, prospective text length within
//!    `original + 10` chars, prospective tag count within `original + 6`;
//! 2. the empty-detail gate: a rule with no description is usable only as
//!    the first (rightmost-applied) transformation of a path;
//! 3. continuity: a non-empty tag chain may only be extended from the state
//!    it currently ends in (`con_tag`);
//! 4. the suffix match itself, plus the kind's extra gating.
//!
//! On success the member's `con_end` suffix is rewritten to `dec_end`, the
//! rule's detail is appended to `process`, and the tag chain grows — by two
//! on the very first step (the state being left, then the state being
//! entered), by one afterwards.
//!
//! Substitution is the odd one out: it matches anywhere in the text (first
//! occurrence), applies only while `process` is empty, and never touches
//! tags.

use crate::form::Form;
use crate::rules::{ContextPredicate, Rule, SubstitutionRule, SuffixRule, STEM_CONTINUATIVE_TAG};

/// How much longer than the original a candidate text may grow.
const TEXT_GROWTH_LIMIT: usize = 10;
/// How much longer than the original's char count a tag chain may grow.
const TAG_GROWTH_LIMIT: usize = 6;

/// Dispatch one rule against one form, appending children to `out`.
pub(crate) fn apply_rule(form: &Form, rule: &Rule, out: &mut Vec<Form>) {
    match rule {
        Rule::Standard(family) => apply_suffix_family(form, family, false, None, out),
        Rule::Rewrite(family) => apply_suffix_family(form, family, true, None, out),
        Rule::OnlyFinal(family) => {
            if form.tags.is_empty() {
                apply_suffix_family(form, family, false, None, out);
            }
        }
        Rule::NeverFinal(family) => {
            if !form.tags.is_empty() {
                apply_suffix_family(form, family, false, None, out);
            }
        }
        Rule::Context(family, predicate) => {
            apply_suffix_family(form, family, false, Some(predicate), out);
        }
        Rule::Substitution(family) => apply_substitution(form, family, out),
    }
}

/// The shared apply-one-ending-pair step, over every member of a family.
fn apply_suffix_family(
    form: &Form,
    family: &SuffixRule,
    whole_word: bool,
    predicate: Option<&ContextPredicate>,
    out: &mut Vec<Form>,
) {
    if form.text.is_empty() {
        return;
    }
    if family.detail.is_empty() && !form.tags.is_empty() {
        return;
    }

    let text_chars = form.text.chars().count();
    let original_chars = form.original_text.chars().count();
    let new_tag_count = form.tags.len() + if form.tags.is_empty() { 2 } else { 1 };
    if new_tag_count > original_chars + TAG_GROWTH_LIMIT {
        return;
    }

    for i in 0..family.family_len() {
        let Some(member) = family.member(i) else {
            // A parallel vector is empty outright: the family has no usable
            // members at all.
            return;
        };

        if let Some(predicate) = predicate {
            if !predicate_holds(predicate, form, member.con_end) {
                continue;
            }
        }

        let con_chars = member.con_end.chars().count();
        if con_chars > text_chars {
            continue;
        }
        let new_text_chars = text_chars - con_chars + member.dec_end.chars().count();
        if new_text_chars > original_chars + TEXT_GROWTH_LIMIT {
            continue;
        }

        if let Some(last) = form.tags.last() {
            if last != member.con_tag {
                continue;
            }
        }
        if !form.text.ends_with(member.con_end) {
            continue;
        }
        if whole_word && form.text != member.con_end {
            continue;
        }

        let stem = &form.text[..form.text.len() - member.con_end.len()];
        let new_text = format!("{stem}{}", member.dec_end);

        let Some(seen_texts) = advance_seen(form, &new_text) else {
            continue;
        };

        let mut tags = form.tags.clone();
        if tags.is_empty() {
            tags.push(member.con_tag.to_string());
        }
        tags.push(member.dec_tag.to_string());

        let mut process = form.process.clone();
        process.push(family.detail.clone());

        out.push(Form {
            text: new_text,
            original_text: form.original_text.clone(),
            tags,
            process,
            seen_texts,
        });
    }
}

/// Internal text change: first occurrence of `con_end` anywhere becomes
/// `dec_end`. Only ever the first transformation of a path; tags are left
/// alone.
fn apply_substitution(form: &Form, family: &SubstitutionRule, out: &mut Vec<Form>) {
    if !form.process.is_empty() {
        return;
    }
    if form.text.is_empty() {
        return;
    }

    for i in 0..family.family_len() {
        let Some((con_end, dec_end)) = family.member(i) else {
            return;
        };
        if !form.text.contains(con_end) {
            continue;
        }
        let new_text = form.text.replacen(con_end, dec_end, 1);

        let Some(seen_texts) = advance_seen(form, &new_text) else {
            continue;
        };

        let mut process = form.process.clone();
        process.push(family.detail.clone());

        out.push(Form {
            text: new_text,
            original_text: form.original_text.clone(),
            tags: form.tags.clone(),
            process,
            seen_texts,
        });
    }
}

/// Path-visited-text bookkeeping. Returns the child's `seen_texts`, or
/// `None` when `new_text` re-derives a text this path has already been
/// through (including the parent's own text).
fn advance_seen(form: &Form, new_text: &str) -> Option<std::collections::HashSet<String>> {
    let mut seen = form.seen_texts.clone();
    if seen.is_empty() {
        seen.insert(form.text.clone());
    }
    if seen.contains(new_text) {
        return None;
    }
    seen.insert(new_text.to_string());
    Some(seen)
}

fn predicate_holds(predicate: &ContextPredicate, form: &Form, con_end: &str) -> bool {
    match predicate {
        // The bare-stem rule must not treat a lone continuative-stem state
        // as a complete derivation.
        ContextPredicate::V1InfinitiveTrap => {
            !(form.tags.len() == 1 && form.tags[0] == STEM_CONTINUATIVE_TAG)
        }
        // される/させる read as する only when the preceding text does not
        // itself end in さ (which signals a sa-row godan stem instead).
        ContextPredicate::SaSpecial => {
            if !form.text.ends_with(con_end) {
                return false;
            }
            let stem = &form.text[..form.text.len() - con_end.len()];
            !stem.ends_with('さ')
        }
        ContextPredicate::Unknown(_) => false,
    }
}
