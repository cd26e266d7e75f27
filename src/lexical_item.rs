//! Lexical items: a phonetic form paired with a feature list.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::feature::{display_features, Feature};

/// A single entry in a [`crate::Lexicon`]: a phonetic form and the feature
/// list consumed, left to right, as it participates in a derivation.
///
/// `weight` is the item's contribution to a derivation's log-probability.
/// It defaults to `1.0` (log-weight `0.0`, i.e. uniform) and is only ever
/// set away from that by [`crate::Lexicon::random_lexicon`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexicalItem {
    /// The phonetic/surface form. Empty string for null (unpronounced) heads.
    pub form: String,
    /// The feature list, in consumption order.
    pub features: Vec<Feature>,
    /// Relative weight used for log-probability scoring. Defaults to `1.0`.
    pub weight: f64,
}

impl LexicalItem {
    /// Build an item with the default (uniform) weight.
    pub fn new(form: impl Into<String>, features: Vec<Feature>) -> Self {
        LexicalItem {
            form: form.into(),
            features,
            weight: 1.0,
        }
    }

    /// Build an item with an explicit weight (used by `random_lexicon`).
    pub fn with_weight(form: impl Into<String>, features: Vec<Feature>, weight: f64) -> Self {
        LexicalItem {
            form: form.into(),
            features,
            weight,
        }
    }

    /// This item's contribution to a derivation's accumulated log-probability.
    pub fn log_weight(&self) -> f64 {
        self.weight.ln()
    }

    /// Whether this item's form is empty (a null head, e.g. a silent complementizer).
    pub fn is_null(&self) -> bool {
        self.form.is_empty()
    }

    /// The `"form::features"` representation used by grammar text and by
    /// [`crate::Derivation::contains_lexical_entry`].
    pub fn entry_string(&self) -> String {
        format!("{}::{}", self.form, display_features(&self.features))
    }
}

impl fmt::Display for LexicalItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.entry_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_string_matches_grammar_text_format() {
        let item = LexicalItem::new(
            "which",
            vec![
                Feature::Selector("N".into()),
                Feature::Category("D".into()),
                Feature::Licensee("W".into()),
            ],
        );
        assert_eq!(item.entry_string(), "which::N= D -W");
    }

    #[test]
    fn default_weight_is_uniform() {
        let item = LexicalItem::new("a", vec![Feature::Category("S".into())]);
        assert_eq!(item.weight, 1.0);
        assert_eq!(item.log_weight(), 0.0);
    }

    #[test]
    fn empty_form_is_null() {
        let item = LexicalItem::new("", vec![Feature::Category("C".into())]);
        assert!(item.is_null());
    }
}
