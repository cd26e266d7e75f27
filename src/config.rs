//! Knobs shared by parsing, generation, and continuation search.

/// Bounds and weighting shared by [`crate::parse`], [`crate::generate_grammar`],
/// and [`crate::continuations`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Hard ceiling on Merge+Move steps for any single derivation.
    pub max_steps: u32,
    /// Width of the priority frontier kept at each point in the search.
    pub n_beams: usize,
    /// Stop once this many complete derivations have been produced.
    pub max_strings: usize,
    /// Prune any state whose accumulated log-probability falls below this.
    pub min_log_prob: f64,
    /// Probability mass assigned to a Move step; `1 - move_prob` goes to Merge.
    pub move_prob: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_steps: 64,
            n_beams: 256,
            max_strings: 100,
            min_log_prob: -128.0,
            move_prob: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let cfg = SearchConfig::default();
        assert_eq!(cfg.max_steps, 64);
        assert_eq!(cfg.n_beams, 256);
        assert_eq!(cfg.max_strings, 100);
        assert_eq!(cfg.min_log_prob, -128.0);
        assert_eq!(cfg.move_prob, 0.5);
    }
}
