//! Error types for lexicon construction and derivation search.

use thiserror::Error;

/// Errors that can arise while building or querying a [`crate::Lexicon`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A line of grammar text could not be split into a form and a feature list.
    #[error("grammar syntax error on line {line}: {message}")]
    GrammarSyntaxError {
        /// 1-indexed line number within the grammar text.
        line: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// A single lexical item named the same licensee feature more than once.
    #[error("duplicate licensee '-{0}' in a single lexical item")]
    DuplicateLicensee(String),

    /// A selector targets a category that no item ever exposes.
    #[error("category '{0}' is never produced by any lexical item")]
    EmptyCategory(String),

    /// A surface form, or a non-negative token id, was not found in a
    /// lexicon's token table.
    #[error("unknown token: {0:?}")]
    UnknownToken(String),

    /// A negative token id appeared in a batch, rejected before any search
    /// runs. Out-of-range but non-negative ids are [`Error::UnknownToken`],
    /// not this variant.
    #[error("invalid token id: {0}")]
    InvalidTokenId(i64),

    /// `reduction` was given a value other than `"none"` or `"sentence_mean"`.
    #[error("invalid reduction '{0}', expected \"none\" or \"sentence_mean\"")]
    ReductionError(String),

    /// A lexicon's persisted byte string could not be read back.
    #[error("lexicon serialization error: {0}")]
    SerializationError(String),
}

/// Result type for operations that can fail with a lexicon [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
