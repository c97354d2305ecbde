//! The pattern matrix (C2): a dense `num_guesses x num_secrets` table of
//! pattern codes, built once and read many times by the heuristic evaluator
//! and the builder.

use rayon::prelude::*;

use crate::pattern;
use crate::wordlist::{pack, PackedWord, WordList};

/// Row-major `P[g, s]`. Row `g` is contiguous so scoring a single guess
/// streams linearly through memory.
pub struct PatternMatrix {
    num_guesses: usize,
    num_secrets: usize,
    table: Vec<u8>,
}

impl PatternMatrix {
    /// Build the full matrix. Generation is embarrassingly parallel over
    /// guesses: each row is independent, so we hand disjoint row slices to
    /// rayon and let it partition the work across the global thread pool.
    pub fn generate(words: &WordList) -> Self {
        let num_guesses = words.num_guesses();
        let num_secrets = words.num_secrets();

        let packed_guesses: Vec<PackedWord> = words.guesses.iter().map(|w| pack(w)).collect();
        let packed_secrets: Vec<PackedWord> = words.secrets.iter().map(|w| pack(w)).collect();

        let mut table = vec![0u8; num_guesses * num_secrets];
        table
            .par_chunks_mut(num_secrets)
            .zip(packed_guesses.par_iter())
            .for_each(|(row, guess)| {
                for (cell, secret) in row.iter_mut().zip(packed_secrets.iter()) {
                    *cell = pattern::compute_packed(guess, secret);
                }
            });

        Self {
            num_guesses,
            num_secrets,
            table,
        }
    }

    #[inline]
    pub fn get(&self, guess_idx: usize, secret_idx: usize) -> u8 {
        debug_assert!(guess_idx < self.num_guesses);
        debug_assert!(secret_idx < self.num_secrets);
        self.table[guess_idx * self.num_secrets + secret_idx]
    }

    /// The full row for `guess_idx`, one pattern code per secret.
    #[inline]
    pub fn row(&self, guess_idx: usize) -> &[u8] {
        let start = guess_idx * self.num_secrets;
        &self.table[start..start + self.num_secrets]
    }

    pub fn num_guesses(&self) -> usize {
        self.num_guesses
    }

    pub fn num_secrets(&self) -> usize {
        self.num_secrets
    }
}

/// 26-bit masks of the letters present in each word, used by the builder to
/// prune guesses whose letters are disjoint from the active candidate set.
pub fn letter_masks(words: &[String]) -> Vec<u32> {
    words
        .iter()
        .map(|w| {
            w.bytes().fold(0u32, |mask, b| mask | (1 << (b - b'a')))
        })
        .collect()
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
    fn matrix_matches_scalar_pattern_computation() {
        let words = word_list(&["apple", "pearl", "spell", "allay", "crane"]);
        let matrix = PatternMatrix::generate(&words);
        for (g, guess) in words.guesses.iter().enumerate() {
            for (s, secret) in words.secrets.iter().enumerate() {
                assert_eq!(matrix.get(g, s), pattern::compute(guess, secret));
            }
        }
    }

    #[test]
    fn self_pattern_is_solved_on_diagonal() {
        let words = word_list(&["apple", "pearl", "spell"]);
        let matrix = PatternMatrix::generate(&words);
        for (s, secret) in words.secrets.iter().enumerate() {
            let g = words.guess_index(secret).unwrap();
            assert_eq!(matrix.get(g, s), pattern::SOLVED);
        }
    }

    #[test]
    fn letter_mask_covers_every_letter_once() {
        let masks = letter_masks(&["abcde".to_string()]);
        assert_eq!(masks[0], 0b11111);
    }
}
