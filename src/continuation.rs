//! Projecting a prefix onto the set of surface tokens that can grammatically
//! follow it.

use std::collections::HashSet;

use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::lexicon::{Lexicon, EOS_ID, PAD_ID};
use crate::search;
use crate::tree::Tree;

/// An admissible next surface token, or the end-of-sequence sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Continuation {
    /// A pronounced surface form that may legally follow the prefix.
    Token(String),
    /// The prefix is itself already a complete derivation of the goal category.
    Eos,
}

/// Every token (or EOS) that can legally follow `prefix` in a derivation of
/// `category`.
///
/// Runs [`search::search_filtered`] with "this derivation's normal-order
/// surface string extends `prefix`" as the acceptance predicate, rather than
/// running unconstrained generation and filtering its output afterward: the
/// latter stops once `cfg.max_strings` derivations exist *at all*, so a
/// prefix with only low-probability continuations can be starved out by
/// unrelated higher-probability derivations of the same category before the
/// search ever reaches it. Gating the bound on prefix-consistency instead
/// means the search keeps going — within `cfg`'s other limits — until it
/// finds `cfg.max_strings` derivations that actually extend `prefix`, or
/// exhausts the reachable space.
pub fn continuations(
    lexicon: &Lexicon,
    prefix: &str,
    category: &str,
    cfg: &SearchConfig,
) -> HashSet<Continuation> {
    let prefix_tokens: Vec<&str> = prefix.split_whitespace().collect();
    let extends_prefix = |words: &[String]| -> bool {
        words.len() >= prefix_tokens.len()
            && words
                .iter()
                .zip(prefix_tokens.iter())
                .all(|(w, p)| w.as_str() == *p)
    };
    let accept = |completed: &search::Completed| {
        extends_prefix(&Tree::build(&completed.node).normal_words())
    };
    let mut out = HashSet::new();
    for completed in search::search_filtered(lexicon, category, cfg, &accept) {
        let tree = Tree::build(&completed.node);
        let words = tree.normal_words();
        if words.len() == prefix_tokens.len() {
            out.insert(Continuation::Eos);
        } else {
            out.insert(Continuation::Token(words[prefix_tokens.len()].clone()));
        }
    }
    out
}

/// Batch form of [`continuations`] over token-id rows: for every row and
/// every position up to (and including) its last non-padding token, which
/// token ids (by index into `lexicon`'s vocabulary) can legally come next.
///
/// `id_batch` entries past the first [`PAD_ID`] in a row are ignored for
/// length detection, per the reserved-id contract. A negative id anywhere in
/// a row is rejected before any search runs.
///
/// Each position still runs its own [`continuations`] search rather than
/// sharing one search across a row: a position's admissible set depends on
/// every derivation consistent with *that* prefix, including ones that
/// diverge from the row's later tokens, so a single pass keyed on the row's
/// full length wouldn't recover the earlier positions' answers.
pub fn token_continuations(
    lexicon: &Lexicon,
    id_batch: &[Vec<i64>],
    category: &str,
    cfg: &SearchConfig,
) -> Result<Vec<Vec<Vec<bool>>>> {
    let vocab_size = lexicon.token_table().vocab_size();

    for row in id_batch {
        if let Some(&bad) = row.iter().find(|&&id| id < 0) {
            return Err(Error::InvalidTokenId(bad));
        }
    }

    let mut out = Vec::with_capacity(id_batch.len());
    for row in id_batch {
        let mut content_len = row.len();
        for (i, &id) in row.iter().enumerate() {
            if id as u32 == PAD_ID {
                content_len = i;
                break;
            }
        }
        let mut decoded = Vec::with_capacity(content_len);
        for &id in &row[..content_len] {
            decoded.push(lexicon.token_table().form_of(id as u32)?.to_string());
        }

        let mut positions = Vec::with_capacity(content_len);
        for pos in 0..content_len {
            let prefix = decoded[..=pos].join(" ");
            let conts = continuations(lexicon, &prefix, category, cfg);
            let mut bits = vec![false; vocab_size];
            for c in conts {
                match c {
                    Continuation::Eos => bits[EOS_ID as usize] = true,
                    Continuation::Token(form) => {
                        if let Some(id) = lexicon.token_table().id_of(&form) {
                            bits[id as usize] = true;
                        }
                    }
                }
            }
            positions.push(bits);
        }
        out.push(positions);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::build_lexicon;

    #[test]
    fn projects_the_three_position_grammar() {
        let lexicon = build_lexicon("a::S= b= S\n::S\nb::b").unwrap();
        let cfg = SearchConfig::default();

        let at_start = continuations(&lexicon, "", "S", &cfg);
        assert_eq!(
            at_start,
            HashSet::from([Continuation::Eos, Continuation::Token("a".to_string())])
        );

        let after_a = continuations(&lexicon, "a", "S", &cfg);
        assert_eq!(
            after_a,
            HashSet::from([Continuation::Token("a".to_string()), Continuation::Token("b".to_string())])
        );

        let after_a_b = continuations(&lexicon, "a b", "S", &cfg);
        assert_eq!(after_a_b, HashSet::from([Continuation::Eos]));
    }

    #[test]
    fn token_continuations_rejects_negative_ids() {
        let lexicon = build_lexicon("a::S= b= S\n::S\nb::b").unwrap();
        let cfg = SearchConfig::default();
        let err = token_continuations(&lexicon, &[vec![-1]], "S", &cfg).unwrap_err();
        assert_eq!(err, Error::InvalidTokenId(-1));
    }

    #[test]
    fn token_continuations_stops_length_detection_at_first_pad() {
        let lexicon = build_lexicon("a::S= b= S\n::S\nb::b").unwrap();
        let cfg = SearchConfig::default();
        let a_id = lexicon.tokens()["a"] as i64;
        let pad_id = PAD_ID as i64;
        let out = token_continuations(&lexicon, &[vec![a_id, pad_id, pad_id]], "S", &cfg).unwrap();
        assert_eq!(out[0].len(), 1);
    }

    /// A prefix whose only completion is low-probability relative to the
    /// many other sentences this fragment derives: if the search stopped
    /// once `cfg.max_strings` *unrelated* derivations were found (the bug
    /// this module used to have), this prefix's only continuation would
    /// never be reached and the result would come back empty.
    #[test]
    fn finds_a_deep_low_probability_continuation_in_a_large_fragment() {
        let lexicon = build_lexicon(
            "::T<= +q Q
what::d[in] -subj3 -q -wh
what::d[in] -acc -wh
who::d[an] -subj3 -q -wh
who::d[an] -acc -wh
::T<= +q +wh Q
::q -q
does::V= q= +subj3 T
do::V= q= +subj2 T
do::V= q= +subj1 T
did::V= q= +subj3 T
did::V= q= +subj2 T
did::V= q= +subj1 T
::q -q
to::theme[an]= p
talk::p= v
see::d[an]= +acc v
see::d[in]= +acc v
devour::d[in]= +acc v
want::d[in]= +acc v
run::v
you::d[an] -subj2
you::d[an] -acc
I::d[an] -subj1
me::d[an] -acc
he::d[an] -subj3
him::d[an] -acc
she::d[an] -subj3
her::d[an] -acc
::d[an]= +theme theme[an]
that::C= +r +rel[in] d[in] -acc
that::C= +r +rel[in] d[in] -subj3
who::C= +r +rel[an] d[an] -acc
who::C= +r +rel[an] d[an] -subj3
::=>v =d[an] V
man::N[an]
woman::N[an]
cake::N[in]
John::d[an] -subj3
John::d[an] -acc
Mary::d[an] -subj3
Mary::d[an] -acc
the::N[in]= d[in] -theme
the::N[in]= d[in] -subj3
the::N[in]= d[in] -acc
the[OBJ_REL]::N[in]= d[in] -acc -rel[in]
the[SUB_REL]::N[in]= d[in] -subj3 -rel[in]
the::N[an]= d[an] -theme
the::N[an]= d[an] -subj3
the::N[an]= d[an] -acc
the[OBJ_REL]::N[an]= d[an] -acc -rel[an]
the[SUB_REL]::N[an]= d[an] -subj3 -rel[an]
a::N[in]= d[in] -theme
a::N[in]= d[in] -subj3
a::N[in]= d[in] -acc
a[OBJ_REL]::N[in]= d[in] -acc -rel[in]
a[SUB_REL]::N[in]= d[in] -subj3 -rel[in]
a::N[an]= d[an] -theme
a::N[an]= d[an] -subj3
a::N[an]= d[an] -acc
a[OBJ_REL]::N[an]= d[an] -acc -rel[an]
a[SUB_REL]::N[an]= d[an] -subj3 -rel[an]
can::V= +subj3 T
can::V= +subj2 T
can::V= +subj1 T
can::V= q= +subj3 T
can::V= q= +subj2 T
can::V= q= +subj1 T
can::V= r= +subj3 T
can::V= r= +subj2 T
can::V= r= +subj1 T
am::prog= +subj1 T
are::prog= +subj2 T
is::prog= +subj3 T
am::prog= q= +subj1 T
are::prog= q= +subj2 T
is::prog= q= +subj3 T
am::prog= r= +subj1 T
are::prog= r= +subj2 T
is::prog= r= +subj3 T
ing::=>V prog
PAST::=>V +subj3 t
PAST::=>V +subj2 t
PAST::=>V +subj1 t
::T= C
::t= T
::t= r= T
::r -r
3PRES::=>V +subj3 t
2PRES::=>V +subj2 t
1PRES::=>V +subj1 t",
        )
        .unwrap();
        let cfg = SearchConfig::default();

        assert_eq!(
            continuations(&lexicon, "he is run-ing", "C", &cfg),
            HashSet::from([Continuation::Eos])
        );
    }
}
