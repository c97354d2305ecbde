//! The builder (C5): recursive, memoized beam search producing a decision
//! tree that solves every secret within six guesses.
//!
//! Grounded directly on the reference `Builder::solve` recursion: cache
//! probe, trivial/budget base cases, active-letter pruning, R=1 "must solve
//! now" restriction, parallel scoring with the R=2/R=3 filters, then
//! iterative beam widening over `[5, 50, usize::MAX]`.

use std::collections::HashMap;
use std::rc::Rc;

use rayon::prelude::*;

use crate::candidates::CandidateSet;
use crate::error::{Error, Result};
use crate::heuristic::{self, Heuristic};
use crate::matrix::{letter_masks, PatternMatrix};
use crate::pattern;
use crate::tree::Node;
use crate::wordlist::WordList;
use crate::MAX_PATTERNS;

const MAX_DEPTH: usize = 6;
const BEAM_WIDTHS: [usize; 3] = [5, 50, usize::MAX];
const PARALLEL_THRESHOLD: usize = 100;
const R3_MAX_BUCKET_CUTOFF: usize = 5;
const R3_PENALTY: f64 = 10.0;

/// Immutable configuration shared by every recursive call.
pub struct Builder<'a> {
    words: &'a WordList,
    matrix: &'a PatternMatrix,
    heuristic: Heuristic,
    start_word_idx: u32,
    guess_letter_masks: Vec<u32>,
    secret_letter_masks: Vec<u32>,
    secret_to_guess: &'a [u32],
    cache: HashMap<CandidateSet, Rc<Node>>,
}

#[derive(Debug, Clone, Copy)]
struct ScoredGuess {
    guess_idx: u32,
    score: f64,
    max_bucket: usize,
}

impl<'a> Builder<'a> {
    pub fn new(
        words: &'a WordList,
        matrix: &'a PatternMatrix,
        heuristic: Heuristic,
        start_word: &str,
    ) -> Result<Self> {
        let start_word_idx = words
            .guess_index(start_word)
            .ok_or_else(|| Error::UnknownStartWord(start_word.to_string()))? as u32;

        Ok(Self {
            words,
            matrix,
            heuristic,
            start_word_idx,
            guess_letter_masks: letter_masks(&words.guesses),
            secret_letter_masks: letter_masks(&words.secrets),
            secret_to_guess: &words.secret_to_guess,
            cache: HashMap::new(),
        })
    }

    /// Build the full tree over every secret. Returns
    /// [`Error::SearchInfeasible`] if no guess sequence solves every secret
    /// within six guesses (beam widening to `usize::MAX` is exhaustive, so
    /// this only happens if the word lists themselves make the game
    /// unwinnable, e.g. two secrets indistinguishable from every guess).
    pub fn build(&mut self) -> Result<Rc<Node>> {
        let all = CandidateSet::full(self.words.num_secrets());
        self.solve(&all, 0).ok_or(Error::SearchInfeasible)
    }

    fn solve(&mut self, candidates: &CandidateSet, depth: usize) -> Option<Rc<Node>> {
        if let Some(cached) = self.cache.get(candidates) {
            return Some(cached.clone());
        }

        if candidates.count() == 1 {
            let secret_idx = candidates.single();
            return Some(Node::leaf(self.secret_to_guess[secret_idx]));
        }

        if depth >= MAX_DEPTH {
            return None;
        }

        let remaining_budget = MAX_DEPTH - depth;

        let scored = if depth == 0 {
            vec![ScoredGuess {
                guess_idx: self.start_word_idx,
                score: 0.0,
                max_bucket: candidates.count(),
            }]
        } else {
            let active_mask = self.active_letter_mask(candidates);
            let candidate_guesses = self.candidate_guesses(candidates, remaining_budget, active_mask);
            self.score_and_sort(candidates, &candidate_guesses, remaining_budget)
        };

        for &beam_width in &BEAM_WIDTHS {
            let limit = scored.len().min(beam_width);
            for scored_guess in &scored[..limit] {
                if let Some(node) = self.try_guess(candidates, scored_guess.guess_idx, depth) {
                    self.cache.insert(candidates.clone(), node.clone());
                    return Some(node);
                }
            }
        }

        None
    }

    fn active_letter_mask(&self, candidates: &CandidateSet) -> u32 {
        candidates
            .iter()
            .fold(0u32, |mask, secret_idx| mask | self.secret_letter_masks[secret_idx])
    }

    /// Called only for `depth > 0`: the active-letter-mask prune is disabled
    /// at the root so the forced start word is never eliminated.
    fn candidate_guesses(&self, candidates: &CandidateSet, remaining_budget: usize, active_mask: u32) -> Vec<u32> {
        if remaining_budget == 1 {
            // Last guess must itself solve the puzzle: only secrets still in
            // play are admissible.
            candidates.iter().map(|s| self.secret_to_guess[s]).collect()
        } else {
            (0..self.words.num_guesses() as u32)
                .filter(|&g| (self.guess_letter_masks[g as usize] & active_mask) != 0)
                .collect()
        }
    }

    fn score_and_sort(
        &self,
        candidates: &CandidateSet,
        candidate_guesses: &[u32],
        remaining_budget: usize,
    ) -> Vec<ScoredGuess> {
        let score_one = |&guess_idx: &u32| -> Option<ScoredGuess> {
            let result = heuristic::evaluate(candidates, guess_idx as usize, self.matrix, self.heuristic);

            if remaining_budget == 2 && result.max_bucket > 1 {
                return None;
            }

            let mut score = result.score;
            if remaining_budget == 3 && result.max_bucket > R3_MAX_BUCKET_CUTOFF {
                score = if self.heuristic.higher_is_better() {
                    score - R3_PENALTY
                } else {
                    score + R3_PENALTY
                };
            }

            Some(ScoredGuess {
                guess_idx,
                score,
                max_bucket: result.max_bucket,
            })
        };

        let mut scored: Vec<ScoredGuess> = if candidate_guesses.len() > PARALLEL_THRESHOLD {
            candidate_guesses.par_iter().filter_map(score_one).collect()
        } else {
            candidate_guesses.iter().filter_map(score_one).collect()
        };

        if self.heuristic.higher_is_better() {
            scored.sort_unstable_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        } else {
            scored.sort_unstable_by(|a, b| a.score.partial_cmp(&b.score).unwrap());
        }
        scored
    }

    /// Try `guess_idx` as the guess at `candidates`/`depth`. Returns `None`
    /// if the guess gains no information on some non-terminal bucket, or if
    /// any resulting bucket is itself unsolvable within the remaining
    /// budget.
    fn try_guess(&mut self, candidates: &CandidateSet, guess_idx: u32, depth: usize) -> Option<Rc<Node>> {
        let mut bins: Vec<Vec<usize>> = vec![Vec::new(); MAX_PATTERNS];
        let row = self.matrix.row(guess_idx as usize);
        for secret_idx in candidates.iter() {
            bins[row[secret_idx] as usize].push(secret_idx);
        }

        let total = candidates.count();
        let mut children = HashMap::new();

        for (p, members) in bins.into_iter().enumerate() {
            if members.is_empty() {
                continue;
            }
            let p = p as u8;

            if p != pattern::SOLVED && members.len() == total {
                // This guess gained no information: every candidate landed
                // in the same non-terminal bucket it started in.
                return None;
            }

            if p == pattern::SOLVED {
                continue;
            }

            let mut next = CandidateSet::new(self.words.num_secrets());
            for s in members {
                next.set(s);
            }

            let child = self.solve(&next, depth + 1)?;
            children.insert(p, child);
        }

        Some(Node::internal(guess_idx, children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::verify_in_memory;
    use std::io::Write;

    fn word_list(words: &[&str]) -> WordList {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        for w in words {
            writeln!(f, "{}", w).unwrap();
        }
        WordList::load_single(f.path()).unwrap()
    }

    #[test]
    fn tiny_list_solves_in_depth_two_with_forced_start_word() {
        let words = word_list(&["apple", "pearl", "spell"]);
        let matrix = PatternMatrix::generate(&words);
        let mut builder = Builder::new(&words, &matrix, Heuristic::Entropy, "pearl").unwrap();
        let root = builder.build().unwrap();

        assert_eq!(root.guess, words.guess_index("pearl").unwrap() as u32);

        let report = verify_in_memory(&root, &words).unwrap();
        assert!(report.max_depth <= 2);
    }

    #[test]
    fn every_secret_is_reachable_within_six_guesses() {
        let words = word_list(&[
            "apple", "pearl", "spell", "crane", "trace", "allay", "stare", "react", "slate",
        ]);
        let matrix = PatternMatrix::generate(&words);
        let mut builder = Builder::new(&words, &matrix, Heuristic::Entropy, "trace").unwrap();
        let root = builder.build().unwrap();

        let report = verify_in_memory(&root, &words).unwrap();
        assert!(report.max_depth <= 6);
    }

    #[test]
    fn min_expected_heuristic_also_solves() {
        let words = word_list(&["apple", "pearl", "spell", "crane", "trace", "allay"]);
        let matrix = PatternMatrix::generate(&words);
        let mut builder = Builder::new(&words, &matrix, Heuristic::MinExpected, "trace").unwrap();
        let root = builder.build().unwrap();

        let report = verify_in_memory(&root, &words).unwrap();
        assert!(report.max_depth <= 6);
    }

    #[test]
    fn unknown_start_word_is_rejected() {
        let words = word_list(&["apple", "pearl", "spell"]);
        let matrix = PatternMatrix::generate(&words);
        let err = Builder::new(&words, &matrix, Heuristic::Entropy, "zzzzz").unwrap_err();
        assert!(matches!(err, Error::UnknownStartWord(_)));
    }
}
