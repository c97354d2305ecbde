//! Offline decision-tree builder for the 5-letter word-guessing game: given
//! a list of admissible secrets and a (superset) list of admissible
//! guesses, precompute a tree whose every root-to-leaf path wins within six
//! guesses, for every secret.
//!
//! The heavy lifting is [`builder::Builder`]; everything else in this crate
//! exists to feed it (word lists, the feedback primitive, the pattern
//! matrix, candidate sets, the heuristic evaluator) or to consume its
//! output (the tree serializer/verifier).

pub mod builder;
pub mod candidates;
pub mod error;
pub mod heuristic;
pub mod matrix;
pub mod pattern;
pub mod tree;
pub mod wordlist;

pub use builder::Builder;
pub use error::{Error, Result};
pub use heuristic::Heuristic;
pub use wordlist::WordList;

/// Number of distinct feedback patterns: 3 colors across 5 positions.
pub const MAX_PATTERNS: usize = 243;

use std::rc::Rc;

/// Build a decision tree over `words` with the given `heuristic` and forced
/// root guess `start_word`. This is the single call the builder CLI (and
/// integration tests) need: it wires together C2 (pattern matrix) and C5
/// (the recursive search) without exposing their internals.
pub fn build_tree(
    words: &WordList,
    heuristic: Heuristic,
    start_word: &str,
) -> Result<(Rc<tree::Node>, matrix::PatternMatrix)> {
    let matrix = matrix::PatternMatrix::generate(words);
    let mut builder = Builder::new(words, &matrix, heuristic, start_word)?;
    let root = builder.build()?;
    Ok((root, matrix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn word_list(words: &[&str]) -> WordList {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        for w in words {
            writeln!(f, "{}", w).unwrap();
        }
        WordList::load_single(f.path()).unwrap()
    }

    #[test]
    fn build_tree_end_to_end_on_tiny_list() {
        let words = word_list(&["apple", "pearl", "spell"]);
        let (root, _matrix) = build_tree(&words, Heuristic::Entropy, "pearl").unwrap();
        let report = tree::verify_in_memory(&root, &words).unwrap();
        assert!(report.max_depth <= 2);
    }
}
