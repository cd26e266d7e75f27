//! The public operations: parse, generate, and their entry points.

use crate::config::SearchConfig;
use crate::derivation::Derivation;
use crate::error::{Error, Result};
use crate::lexicon::Lexicon;
use crate::search;
use crate::tree::Tree;

/// Parse `text` against `category`: every finished derivation whose normal
/// (movement-independent) surface string equals `text` exactly, in
/// non-increasing log-probability order.
///
/// Uses [`search::search_filtered`] with "surface string equals `text`" as
/// the acceptance predicate, so a low-probability exact match still counts
/// toward `cfg.max_strings` — it isn't crowded out by unrelated
/// higher-probability derivations the way reusing [`generate_grammar`]'s
/// unfiltered results and filtering afterward would be. Parse and generate
/// differ only in this predicate. Returns an empty list, never an error, if
/// nothing matches within `cfg`'s bounds.
pub fn parse(lexicon: &Lexicon, text: &str, category: &str, cfg: &SearchConfig) -> Vec<Derivation> {
    let target: Vec<&str> = text.split_whitespace().collect();
    let accept = |completed: &search::Completed| {
        let words = Tree::build(&completed.node).normal_words();
        words.len() == target.len() && words.iter().zip(target.iter()).all(|(w, t)| w.as_str() == *t)
    };
    search::search_filtered(lexicon, category, cfg, &accept)
        .into_iter()
        .map(Derivation::from_completed)
        .collect()
}

/// Parse a token-id sequence (no BOS/EOS) against `category`: detokenizes
/// through `lexicon`'s table, then behaves exactly as [`parse`].
pub fn parse_tokens(
    lexicon: &Lexicon,
    ids: &[u32],
    category: &str,
    cfg: &SearchConfig,
) -> Result<Vec<Derivation>> {
    let words = lexicon.detokenize(ids)?;
    Ok(parse(lexicon, &words.join(" "), category, cfg))
}

/// Every derivation of `category` the search reaches within `cfg`'s bounds,
/// in non-increasing log-probability order (ties broken by step count, then
/// fingerprint — see [`crate::search`]).
pub fn generate_grammar(lexicon: &Lexicon, category: &str, cfg: &SearchConfig) -> Vec<Derivation> {
    search::search(lexicon, category, cfg)
        .into_iter()
        .map(Derivation::from_completed)
        .collect()
}

/// The first `n` *distinct surface strings* of `category`, each paired with
/// the log-probability of the highest-scoring derivation that produced it
/// (later, lower-scoring derivations of an already-seen string are dropped,
/// not summed — log-probabilities of multiple derivations sharing a surface
/// form are not combined).
///
/// The acceptance predicate passed to [`search::search_filtered`] is "this
/// surface string hasn't been seen yet," so repeats of an already-found
/// string don't count toward the `n`-result bound and the search keeps
/// going until `n` genuinely distinct strings are found (or its other
/// bounds are exhausted).
pub fn generate_unique_strings(
    lexicon: &Lexicon,
    category: &str,
    n: usize,
    cfg: &SearchConfig,
) -> Vec<(String, f64)> {
    let seen = std::cell::RefCell::new(std::collections::HashSet::new());
    let accept = |completed: &search::Completed| {
        let surface = Tree::build(&completed.node).normal_string();
        seen.borrow_mut().insert(surface)
    };
    let mut local_cfg = cfg.clone();
    local_cfg.max_strings = n;
    search::search_filtered(lexicon, category, &local_cfg, &accept)
        .into_iter()
        .map(|completed| {
            let surface = Tree::build(&completed.node).normal_string();
            (surface, completed.log_prob)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::build_lexicon;

    #[test]
    fn generates_the_simplest_grammar_s_one_string() {
        let lexicon = build_lexicon("a::b= a\nb::b").unwrap();
        let cfg = SearchConfig::default();
        let strings: Vec<String> = generate_grammar(&lexicon, "a", &cfg)
            .iter()
            .map(|d| d.surface_string())
            .collect();
        assert_eq!(strings, vec!["a b".to_string()]);
    }

    #[test]
    fn parse_finds_a_matching_derivation_and_its_latex_is_wrapped() {
        let lexicon = build_lexicon("a::b= a\nb::b").unwrap();
        let cfg = SearchConfig::default();
        let results = parse(&lexicon, "a b", "a", &cfg);
        assert!(!results.is_empty());
        let latex = results[0].latex();
        assert!(latex.starts_with("\\begin{forest}"));
        assert!(latex.ends_with("\\end{forest}"));
    }

    #[test]
    fn parse_rejects_a_non_matching_string() {
        let lexicon = build_lexicon("a::b= a\nb::b").unwrap();
        let cfg = SearchConfig::default();
        assert!(parse(&lexicon, "b a", "a", &cfg).is_empty());
    }

    #[test]
    fn generate_grammar_is_non_increasing_in_log_prob() {
        let lexicon = build_lexicon("a::S= b= S\n::S\nb::b").unwrap();
        let cfg = SearchConfig::default();
        let derivations = generate_grammar(&lexicon, "S", &cfg);
        assert!(derivations
            .windows(2)
            .all(|w| w[0].log_prob() >= w[1].log_prob()));
    }

    #[test]
    fn generate_unique_strings_drops_duplicate_surfaces() {
        let lexicon = build_lexicon("a::S= b= S\n::S\nb::b").unwrap();
        let cfg = SearchConfig::default();
        let uniq = generate_unique_strings(&lexicon, "S", 3, &cfg);
        let strings: Vec<&str> = uniq.iter().map(|(s, _)| s.as_str()).collect();
        let mut sorted = strings.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(strings.len(), sorted.len());
    }

    #[test]
    fn parse_tokens_rejects_unknown_ids() {
        let lexicon = build_lexicon("a::b= a\nb::b").unwrap();
        let cfg = SearchConfig::default();
        let err = parse_tokens(&lexicon, &[9999], "a", &cfg).unwrap_err();
        assert_eq!(err, Error::UnknownToken("9999".into()));
    }
}
