//! # mg
//!
//! A Minimalist Grammar (MG) engine: parse a surface string into its
//! derivations, generate the derivations of a grammar in non-increasing
//! probability order, and project the set of surface tokens that can
//! grammatically follow a given prefix.
//!
//! The formalism follows Stabler's Minimalist Grammars: a lexicon of
//! feature-annotated lexical items combined by Merge and Move under a
//! shortest-move constraint. [`build_lexicon`] parses grammar text into a
//! [`Lexicon`]; [`parse`], [`generate_grammar`], and [`continuations`] share
//! one priority-ordered beam search (see [`search`]) that differs only in
//! how it seeds its frontier and which finished states it keeps.
//!
//! A finished derivation ([`Derivation`]) can be lowered on demand into an
//! explicit, renderable [`Tree`] — the constituent graph with trace nodes
//! and dashed movement edges that downstream visualisation consumes.
//!
//! Array/linear-algebra F1 scoring against a neural model's predictions,
//! image rendering, and LaTeX-to-PDF compilation are collaborators outside
//! this crate; [`reduction`] exposes only the boundary this crate owns —
//! validating which reduction mode those external helpers were asked for.

pub mod config;
pub mod continuation;
pub mod derivation;
pub mod error;
pub mod feature;
pub mod lexical_item;
pub mod lexicon;
pub mod node;
pub mod reduction;
pub mod search;
pub mod tree;

mod api;

pub use config::SearchConfig;
pub use continuation::{continuations, token_continuations, Continuation};
pub use derivation::Derivation;
pub use error::{Error, Result};
pub use feature::Feature;
pub use lexical_item::LexicalItem;
pub use lexicon::{build_lexicon, Lexicon, BOS, BOS_ID, EOS, EOS_ID, PAD, PAD_ID};
pub use reduction::{reduce, Reduction};
pub use tree::{BaseToken, Tree};

pub use api::{generate_grammar, generate_unique_strings, parse, parse_tokens};
