//! Grammar text parsing, the lexicon itself, and its token table.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::feature::Feature;
use crate::lexical_item::LexicalItem;

/// Reserved token id for the beginning-of-sequence sentinel.
pub const BOS_ID: u32 = 0;
/// Reserved token id for the end-of-sequence sentinel.
pub const EOS_ID: u32 = 1;
/// Reserved token id for the padding sentinel.
pub const PAD_ID: u32 = 2;

/// Reserved token form for the beginning-of-sequence sentinel.
pub const BOS: &str = "[BOS]";
/// Reserved token form for the end-of-sequence sentinel.
pub const EOS: &str = "[EOS]";
/// Reserved token form for the padding sentinel.
pub const PAD: &str = "[PAD]";

/// Bidirectional mapping between surface forms and interned token ids.
///
/// Ids `0`, `1`, and `2` are always the reserved sentinels
/// ([`BOS_ID`]/[`EOS_ID`]/[`PAD_ID`]); real surface forms are interned
/// starting at id `3`, in first-occurrence order over the lexicon's items.
/// Empty (null-head) forms never occupy a token id: they are never part of
/// the pronounced surface string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenTable {
    form_to_id: HashMap<String, u32>,
    id_to_form: Vec<String>,
}

impl TokenTable {
    fn build(items: &[LexicalItem]) -> Self {
        let mut form_to_id = HashMap::new();
        let mut id_to_form = vec![BOS.to_string(), EOS.to_string(), PAD.to_string()];
        form_to_id.insert(BOS.to_string(), BOS_ID);
        form_to_id.insert(EOS.to_string(), EOS_ID);
        form_to_id.insert(PAD.to_string(), PAD_ID);

        for item in items {
            if item.is_null() {
                continue;
            }
            if !form_to_id.contains_key(&item.form) {
                let id = id_to_form.len() as u32;
                form_to_id.insert(item.form.clone(), id);
                id_to_form.push(item.form.clone());
            }
        }
        TokenTable {
            form_to_id,
            id_to_form,
        }
    }

    /// Number of distinct non-reserved surface forms.
    pub fn surface_form_count(&self) -> usize {
        self.id_to_form.len() - 3
    }

    /// The id for a surface form (including the reserved sentinels).
    pub fn id_of(&self, form: &str) -> Option<u32> {
        self.form_to_id.get(form).copied()
    }

    /// The surface form for an id. An out-of-range id is [`Error::UnknownToken`]
    /// (it is non-negative by construction; [`Error::InvalidTokenId`] is reserved
    /// for the negative-in-a-batch case callers reject before reaching this).
    pub fn form_of(&self, id: u32) -> Result<&str> {
        self.id_to_form
            .get(id as usize)
            .map(String::as_str)
            .ok_or_else(|| Error::UnknownToken(id.to_string()))
    }

    /// Total number of ids in this table, including the three reserved sentinels.
    pub fn vocab_size(&self) -> usize {
        self.id_to_form.len()
    }

    /// Encode a surface token sequence (no BOS/EOS) as ids.
    pub fn encode(&self, tokens: &[&str]) -> Result<Vec<u32>> {
        tokens
            .iter()
            .map(|t| {
                self.id_of(t)
                    .ok_or_else(|| Error::UnknownToken((*t).to_string()))
            })
            .collect()
    }

    /// Decode an id sequence back to surface forms.
    pub fn decode(&self, ids: &[u32]) -> Result<Vec<String>> {
        ids.iter().map(|&id| self.form_of(id).map(String::from)).collect()
    }

    /// The full `form -> id` map, including the reserved sentinels.
    pub fn as_map(&self) -> HashMap<String, u32> {
        self.form_to_id.clone()
    }
}

/// A Minimalist Grammar lexicon: a finite set of lexical items plus the
/// indices derived from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lexicon {
    items: Vec<LexicalItem>,
    categories: HashSet<String>,
    by_category: HashMap<String, Vec<usize>>,
    tokens: TokenTable,
}

impl PartialEq for Lexicon {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Lexicon {
    /// Parse grammar text (one `form::features` entry per line, blank lines
    /// and `#`-comments ignored) into a validated lexicon.
    pub fn from_text(text: &str) -> Result<Lexicon> {
        let mut items = Vec::new();
        for (i, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (form, rest) = line.split_once("::").ok_or_else(|| Error::GrammarSyntaxError {
                line: i + 1,
                message: format!("missing '::' separator in {line:?}"),
            })?;

            let mut features = Vec::new();
            let mut seen_licensees = HashSet::new();
            for token in rest.split_whitespace() {
                let feature = Feature::parse(token).ok_or_else(|| Error::GrammarSyntaxError {
                    line: i + 1,
                    message: format!("empty feature token in {line:?}"),
                })?;
                if let Feature::Licensee(name) = &feature {
                    if !seen_licensees.insert(name.clone()) {
                        return Err(Error::DuplicateLicensee(name.clone()));
                    }
                }
                features.push(feature);
            }
            if features.is_empty() {
                return Err(Error::GrammarSyntaxError {
                    line: i + 1,
                    message: "lexical item has no features".into(),
                });
            }
            items.push(LexicalItem::new(form, features));
        }
        Lexicon::from_items(items)
    }

    /// Build and validate a lexicon from already-parsed items.
    pub fn from_items(items: Vec<LexicalItem>) -> Result<Lexicon> {
        let mut categories = HashSet::new();
        for item in &items {
            for f in &item.features {
                if let Feature::Category(name) = f {
                    categories.insert(name.clone());
                }
            }
        }
        for item in &items {
            for f in &item.features {
                if f.is_selector() && !categories.contains(f.name()) {
                    return Err(Error::EmptyCategory(f.name().to_string()));
                }
            }
        }

        let mut by_category: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, item) in items.iter().enumerate() {
            for f in &item.features {
                if let Feature::Category(name) = f {
                    by_category.entry(name.clone()).or_default().push(idx);
                }
            }
        }

        let tokens = TokenTable::build(&items);
        Ok(Lexicon {
            items,
            categories,
            by_category,
            tokens,
        })
    }

    /// All items in the lexicon, in declaration order.
    pub fn items(&self) -> &[LexicalItem] {
        &self.items
    }

    /// Every category name that appears as a `Feature::Category` somewhere
    /// in the lexicon.
    pub fn categories(&self) -> &HashSet<String> {
        &self.categories
    }

    /// Indices of items carrying `Feature::Category(name)` anywhere in
    /// their feature list — candidate complements/roots for `name`.
    pub fn items_with_category(&self, name: &str) -> &[usize] {
        static EMPTY: &[usize] = &[];
        self.by_category.get(name).map(Vec::as_slice).unwrap_or(EMPTY)
    }

    /// The token table backing [`Lexicon::tokens`]/[`Lexicon::detokenize`].
    pub fn token_table(&self) -> &TokenTable {
        &self.tokens
    }

    /// Map from surface form to token id, including the reserved sentinels.
    pub fn tokens(&self) -> HashMap<String, u32> {
        self.tokens.as_map()
    }

    /// Decode a single id sequence to surface forms.
    pub fn detokenize(&self, ids: &[u32]) -> Result<Vec<String>> {
        self.tokens.decode(ids)
    }

    /// Decode a batch of id sequences.
    pub fn detokenize_batch(&self, batch: &[Vec<u32>]) -> Result<Vec<Vec<String>>> {
        batch.iter().map(|ids| self.tokens.decode(ids)).collect()
    }

    /// Minimum-description-length score of this lexicon given a vocabulary
    /// of size `vocab_size`: the negated sum of each item's feature count
    /// (weighted by `ln(vocab_size)`) plus a code for the surface vocabulary
    /// itself. Always `<= 0`.
    pub fn mdl(&self, vocab_size: usize) -> f64 {
        let log_sigma = (vocab_size.max(1) as f64).ln();
        let items_cost: f64 = self
            .items
            .iter()
            .map(|item| item.features.len() as f64 * log_sigma)
            .sum();
        let vocab_cost = self.tokens.surface_form_count() as f64 * log_sigma;
        -(items_cost + vocab_cost)
    }

    /// Deterministically sample a random, well-formed lexicon over the
    /// given lemmas: every lemma gets a random head category (drawn from a
    /// pool of `num_categories` synthetic category names) and 0-2 random
    /// selectors targeting that same pool, plus a random weight. Every
    /// referenced category is guaranteed to have at least one producing
    /// item, so the result always passes [`Lexicon::from_items`] validation.
    ///
    /// Movement features are not sampled; callers who need movement should
    /// hand-author those entries and merge them with `from_items`.
    pub fn random_lexicon(lemmas: &[&str], num_categories: usize, seed: u64) -> Lexicon {
        let mut rng = Pcg64::seed_from_u64(seed);
        let categories: Vec<String> =
            (0..num_categories.max(1)).map(|i| format!("C{i}")).collect();

        let mut items: Vec<LexicalItem> = lemmas
            .iter()
            .map(|lemma| {
                let head = categories.choose(&mut rng).expect("non-empty pool").clone();
                let n_selectors = rng.gen_range(0..=2);
                let mut features = Vec::with_capacity(n_selectors + 1);
                for _ in 0..n_selectors {
                    let target = categories.choose(&mut rng).expect("non-empty pool").clone();
                    features.push(Feature::Selector(target));
                }
                features.push(Feature::Category(head));
                let weight = rng.gen_range(0.1..1.0);
                LexicalItem::with_weight(*lemma, features, weight)
            })
            .collect();

        for cat in &categories {
            let produced = items
                .iter()
                .any(|it| matches!(it.features.last(), Some(Feature::Category(n)) if n == cat));
            if !produced {
                items.push(LexicalItem::new("", vec![Feature::Category(cat.clone())]));
            }
        }

        Lexicon::from_items(items).expect("random_lexicon always produces a well-formed grammar")
    }

    /// Serialize this lexicon to a byte string. Round-trips through
    /// [`Lexicon::from_bytes`] under structural equality (see [`PartialEq`]).
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::SerializationError(e.to_string()))
    }

    /// Deserialize a lexicon previously produced by [`Lexicon::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Lexicon> {
        bincode::deserialize(bytes).map_err(|e| Error::SerializationError(e.to_string()))
    }
}

/// Parse grammar text into a validated [`Lexicon`]. Equivalent to
/// [`Lexicon::from_text`]; kept as a free function to mirror how callers
/// typically reach for it (`build_lexicon(text)?`).
pub fn build_lexicon(text: &str) -> Result<Lexicon> {
    Lexicon::from_text(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_grammar() {
        let lex = build_lexicon("a::b= a\nb::b").unwrap();
        assert_eq!(lex.items().len(), 2);
        assert!(lex.categories().contains("a"));
        assert!(lex.categories().contains("b"));
    }

    #[test]
    fn ignores_blank_lines_and_comments() {
        let lex = build_lexicon("# a tiny grammar\n\na::b= a\n\nb::b\n").unwrap();
        assert_eq!(lex.items().len(), 2);
    }

    #[test]
    fn missing_separator_is_syntax_error() {
        let err = build_lexicon("a b").unwrap_err();
        assert!(matches!(err, Error::GrammarSyntaxError { line: 1, .. }));
    }

    #[test]
    fn duplicate_licensee_is_rejected() {
        let err = build_lexicon("a::b= c= +a +e C\nb::b -a -a\nc::c -e").unwrap_err();
        assert_eq!(err, Error::DuplicateLicensee("a".into()));
    }

    #[test]
    fn unreachable_selector_target_is_empty_category() {
        let err = build_lexicon("a::b= a").unwrap_err();
        assert_eq!(err, Error::EmptyCategory("b".into()));
    }

    #[test]
    fn token_table_reserves_bos_eos_pad_and_interns_forms_in_order() {
        let lex = build_lexicon("the::N= D\nqueen::N\n::T= D").unwrap();
        let tokens = lex.tokens();
        assert_eq!(tokens[BOS], BOS_ID);
        assert_eq!(tokens[EOS], EOS_ID);
        assert_eq!(tokens[PAD], PAD_ID);
        assert_eq!(tokens["the"], 3);
        assert_eq!(tokens["queen"], 4);
        assert!(!tokens.contains_key(""));
    }

    #[test]
    fn detokenize_round_trips_through_tokens() {
        let lex = build_lexicon("the::N= D\nqueen::N").unwrap();
        let ids = vec![lex.tokens()["the"], lex.tokens()["queen"]];
        assert_eq!(lex.detokenize(&ids).unwrap(), vec!["the", "queen"]);
    }

    #[test]
    fn detokenize_rejects_out_of_range_id() {
        let lex = build_lexicon("a::S").unwrap();
        assert_eq!(
            lex.detokenize(&[999]).unwrap_err(),
            Error::UnknownToken("999".into())
        );
    }

    #[test]
    fn mdl_is_non_positive_and_grows_with_grammar_size() {
        let small = build_lexicon("a::S").unwrap();
        let big = build_lexicon("a::B= S\nb::B").unwrap();
        assert!(small.mdl(10) <= 0.0);
        assert!(big.mdl(10) < small.mdl(10));
    }

    #[test]
    fn random_lexicon_is_deterministic_and_well_formed() {
        let a = Lexicon::random_lexicon(&["cat", "dog", "run", "the"], 3, 42);
        let b = Lexicon::random_lexicon(&["cat", "dog", "run", "the"], 3, 42);
        assert_eq!(a.items().len(), b.items().len());
        for (x, y) in a.items().iter().zip(b.items()) {
            assert_eq!(x.form, y.form);
            assert_eq!(x.features, y.features);
        }
    }

    #[test]
    fn serialization_round_trips() {
        let lex = build_lexicon("the::N= D\nqueen::N\nwhich::N= D -W").unwrap();
        let bytes = lex.to_bytes().unwrap();
        let restored = Lexicon::from_bytes(&bytes).unwrap();
        assert_eq!(lex, restored);
    }

    #[test]
    fn from_bytes_rejects_garbage() {
        assert!(Lexicon::from_bytes(&[0xff, 0x01, 0x02]).is_err());
    }
}
