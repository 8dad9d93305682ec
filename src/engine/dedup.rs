//! Deduplication keys for the fixed-point search.
//!
//! Saturation works by repeatedly applying rules and admitting newly
//! produced forms to the frontier. Without a *stable* deduplication
//! strategy, the engine can:
//!
//! - loop indefinitely (rules re-deriving the same result along different
//!   paths)
//! - grow memory unbounded
//! - produce non-deterministic output (depending on iteration order)
//!
//! This module defines [`FormKey`], the hashable identity the driver checks
//! before admitting a candidate. It mirrors the observable equality of
//! `Form` — text plus the ordered tag chain plus the ordered derivation
//! trail — with one economy: `original_text` is identical for every form in
//! a run, so it adds nothing to the key and is omitted.

use crate::form::Form;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct FormKey {
    text: String,
    tags: Vec<String>,
    process: Vec<String>,
}

impl FormKey {
    pub(crate) fn from_form(form: &Form) -> Self {
        FormKey {
            text: form.text.clone(),
            tags: form.tags.clone(),
            process: form.process.clone(),
        }
    }
}
