//! A finished derivation: the value [`crate::parse`], [`crate::generate_grammar`],
//! and friends hand back to callers.

use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::lexicon::{Lexicon, BOS_ID, EOS_ID};
use crate::node::{self, Node};
use crate::search::Completed;
use crate::tree::Tree;

/// One completed Merge/Move chain reducing to the goal category.
///
/// A `Derivation` owns its constituent DAG (shared-by-reference with any
/// sibling derivation produced by the same search, per [`crate::node::Node`]'s
/// ownership contract) plus the score and step count accumulated along the
/// way. [`Derivation::to_tree`] lowers it into the arena-indexed, renderable
/// [`Tree`] on demand; nothing about a `Derivation` itself is tied to a tree
/// representation.
#[derive(Clone)]
pub struct Derivation {
    node: Rc<Node>,
    log_prob: f64,
    steps: u32,
    peak_movers: usize,
}

impl Derivation {
    pub(crate) fn from_completed(completed: Completed) -> Derivation {
        Derivation {
            node: completed.node,
            log_prob: completed.log_prob,
            steps: completed.steps,
            peak_movers: completed.peak_movers,
        }
    }

    /// Accumulated log-probability: the sum of every Merge/Move step's
    /// weight plus each lexical item's own log-weight.
    pub fn log_prob(&self) -> f64 {
        self.log_prob
    }

    /// `exp(self.log_prob())`.
    pub fn prob(&self) -> f64 {
        self.log_prob.exp()
    }

    /// Number of Merge/Move steps this derivation took.
    pub fn n_steps(&self) -> u32 {
        self.steps
    }

    /// The largest number of simultaneously outstanding movers this
    /// derivation ever carried.
    pub fn max_memory_load(&self) -> usize {
        self.peak_movers
    }

    /// Lower this derivation into an explicit, renderable tree.
    pub fn to_tree(&self) -> Tree {
        Tree::build(&self.node)
    }

    /// The surface string this derivation produces, independent of movement
    /// (the "normal string"): space-joined pronounced leaf forms.
    pub fn surface_string(&self) -> String {
        self.to_tree().normal_string()
    }

    /// This derivation's token ids against `lexicon`'s table: `[BOS, ...,
    /// EOS]`. Fails if a pronounced form isn't in `lexicon`'s token table,
    /// which can only happen if `lexicon` isn't the one this derivation was
    /// searched against.
    pub fn tokens(&self, lexicon: &Lexicon) -> Result<Vec<u32>> {
        let mut ids = vec![BOS_ID];
        for word in self.to_tree().normal_words() {
            let id = lexicon
                .token_table()
                .id_of(&word)
                .ok_or_else(|| Error::UnknownToken(word.clone()))?;
            ids.push(id);
        }
        ids.push(EOS_ID);
        Ok(ids)
    }

    /// This derivation's tree as a `\begin{forest} ... \end{forest}` block.
    pub fn latex(&self) -> String {
        self.to_tree().latex()
    }

    /// Whether any leaf (including ones silenced by head movement) has
    /// surface form `word`. `None` asks about null (empty-form) heads.
    pub fn contains_word(&self, word: Option<&str>) -> bool {
        let leaves = node::leaves(&self.node);
        match word {
            None => leaves.iter().any(|item| item.is_null()),
            Some(w) => leaves.iter().any(|item| item.form == w),
        }
    }

    /// Whether any leaf's full `form::features` entry string equals `entry`.
    pub fn contains_lexical_entry(&self, entry: &str) -> bool {
        node::leaves(&self.node)
            .iter()
            .any(|item| item.entry_string() == entry)
    }
}

impl fmt::Display for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.surface_string())
    }
}
