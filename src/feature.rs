//! Features that make up a Minimalist Grammar lexical item.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single feature in a Minimalist Grammar lexical item.
///
/// Lexical items carry a sequence of these, consumed left to right over the
/// course of a derivation. `Category` never drives an operation by itself;
/// the other six kinds each trigger (or participate in) exactly one of
/// Merge or Move.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    /// Bare category feature, e.g. `D`.
    Category(String),
    /// `X=`: plain selector, right-attaching complement.
    Selector(String),
    /// `=X`: plain selector, left-attaching complement (no phonological fusion).
    LeftSelector(String),
    /// `=>X`: head-movement selector; the selectee's head incorporates as a
    /// suffix onto this head's phonetic form.
    RightAffixSelector(String),
    /// `X<=`: head-movement selector; this head's phonetic form incorporates
    /// as a prefix onto the selectee's head.
    LeftAffixSelector(String),
    /// `+x`: licensor, attracts a matching mover.
    Licensor(String),
    /// `-x`: licensee, marks an item as a mover awaiting attraction.
    Licensee(String),
}

impl Feature {
    /// The name this feature carries, with polarity/arrows stripped.
    pub fn name(&self) -> &str {
        match self {
            Feature::Category(n)
            | Feature::Selector(n)
            | Feature::LeftSelector(n)
            | Feature::RightAffixSelector(n)
            | Feature::LeftAffixSelector(n)
            | Feature::Licensor(n)
            | Feature::Licensee(n) => n,
        }
    }

    /// Parse a single whitespace-delimited feature token, e.g. `"=>V"` or `"-wh"`.
    pub fn parse(token: &str) -> Option<Feature> {
        if token.is_empty() {
            return None;
        }
        if let Some(rest) = token.strip_prefix("=>") {
            return Some(Feature::RightAffixSelector(rest.to_string()));
        }
        if let Some(rest) = token.strip_suffix("<=") {
            return Some(Feature::LeftAffixSelector(rest.to_string()));
        }
        if let Some(rest) = token.strip_prefix('=') {
            return Some(Feature::LeftSelector(rest.to_string()));
        }
        if let Some(rest) = token.strip_suffix('=') {
            return Some(Feature::Selector(rest.to_string()));
        }
        if let Some(rest) = token.strip_prefix('+') {
            return Some(Feature::Licensor(rest.to_string()));
        }
        if let Some(rest) = token.strip_prefix('-') {
            return Some(Feature::Licensee(rest.to_string()));
        }
        Some(Feature::Category(token.to_string()))
    }

    /// Whether this feature is one of the four selector variants.
    pub fn is_selector(&self) -> bool {
        matches!(
            self,
            Feature::Selector(_)
                | Feature::LeftSelector(_)
                | Feature::RightAffixSelector(_)
                | Feature::LeftAffixSelector(_)
        )
    }

    /// Whether this selector variant triggers head movement (phonological fusion)
    /// rather than plain phrasal Merge.
    pub fn is_head_movement_selector(&self) -> bool {
        matches!(
            self,
            Feature::RightAffixSelector(_) | Feature::LeftAffixSelector(_)
        )
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Category(n) => write!(f, "{n}"),
            Feature::Selector(n) => write!(f, "{n}="),
            Feature::LeftSelector(n) => write!(f, "={n}"),
            Feature::RightAffixSelector(n) => write!(f, "=>{n}"),
            Feature::LeftAffixSelector(n) => write!(f, "{n}<="),
            Feature::Licensor(n) => write!(f, "+{n}"),
            Feature::Licensee(n) => write!(f, "-{n}"),
        }
    }
}

/// Render a feature list the way a lexical entry's `features` field prints,
/// e.g. `N= D -W`.
pub fn display_features(features: &[Feature]) -> String {
    features
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_variant() {
        assert_eq!(Feature::parse("D"), Some(Feature::Category("D".into())));
        assert_eq!(Feature::parse("N="), Some(Feature::Selector("N".into())));
        assert_eq!(Feature::parse("=D"), Some(Feature::LeftSelector("D".into())));
        assert_eq!(
            Feature::parse("=>V"),
            Some(Feature::RightAffixSelector("V".into()))
        );
        assert_eq!(
            Feature::parse("T<="),
            Some(Feature::LeftAffixSelector("T".into()))
        );
        assert_eq!(Feature::parse("+wh"), Some(Feature::Licensor("wh".into())));
        assert_eq!(Feature::parse("-wh"), Some(Feature::Licensee("wh".into())));
    }

    #[test]
    fn display_round_trips_tokens() {
        for token in ["D", "N=", "=D", "=>V", "T<=", "+wh", "-wh"] {
            let feature = Feature::parse(token).unwrap();
            assert_eq!(feature.to_string(), token);
        }
    }

    #[test]
    fn display_features_joins_with_spaces() {
        let features = vec![
            Feature::Selector("N".into()),
            Feature::Category("D".into()),
            Feature::Licensee("W".into()),
        ];
        assert_eq!(display_features(&features), "N= D -W");
    }
}
