//! The core's boundary surface for batch F1 helpers.
//!
//! Computing token-level F1 against a neural model's predictions requires
//! array/linear-algebra machinery that lives outside this crate; what the
//! core owns is validating the `reduction` mode those external helpers take,
//! since an unrecognized mode is still this engine's [`crate::Error`] to raise.

use crate::error::{Error, Result};

/// How a batch of per-example scores collapses across a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Leave every row's score as-is.
    None,
    /// Average the non-padding positions of each row down to one score.
    SentenceMean,
}

impl Reduction {
    /// Parse a reduction mode name, the one point where external F1 helpers
    /// hand this crate a string that must be validated.
    pub fn parse(name: &str) -> Result<Reduction> {
        match name {
            "none" => Ok(Reduction::None),
            "sentence_mean" => Ok(Reduction::SentenceMean),
            other => Err(Error::ReductionError(other.to_string())),
        }
    }
}

/// Apply a reduction mode to one score per row. `None` passes `scores`
/// through unchanged; `SentenceMean` collapses them to their mean (`0.0` for
/// an empty batch, matching the convention that an empty sum over an empty
/// count reports no signal rather than `NaN`).
pub fn reduce(scores: &[f64], mode: &str) -> Result<Vec<f64>> {
    match Reduction::parse(mode)? {
        Reduction::None => Ok(scores.to_vec()),
        Reduction::SentenceMean => {
            if scores.is_empty() {
                Ok(vec![0.0])
            } else {
                Ok(vec![scores.iter().sum::<f64>() / scores.len() as f64])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_passes_scores_through() {
        assert_eq!(reduce(&[1.0, 2.0, 3.0], "none").unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn sentence_mean_averages_the_row() {
        assert_eq!(reduce(&[1.0, 0.5], "sentence_mean").unwrap(), vec![0.75]);
    }

    #[test]
    fn unknown_mode_is_a_reduction_error() {
        assert_eq!(
            reduce(&[1.0], "geometric_mean").unwrap_err(),
            Error::ReductionError("geometric_mean".into())
        );
    }
}
