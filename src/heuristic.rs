//! The heuristic evaluator (C4): score a `(candidate set, guess)` pair under
//! one of two scoring modes, plus report the max bucket size needed by the
//! builder's pruning rules.

use once_cell::sync::Lazy;

use crate::candidates::CandidateSet;
use crate::matrix::PatternMatrix;
use crate::MAX_PATTERNS;

/// Which score the builder maximizes (`Entropy`) or minimizes (`MinExpected`)
/// when ranking candidate guesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heuristic {
    /// Shannon entropy of the bucket distribution. Higher is better.
    Entropy,
    /// `1 + sum_p (n_p/N) * E(n_p)`, an estimate of expected remaining
    /// guesses. Lower is better.
    MinExpected,
}

impl Heuristic {
    /// Whether a higher score is better (`true`) or a lower score is
    /// better (`false`), used by the builder to pick a sort direction.
    pub fn higher_is_better(self) -> bool {
        matches!(self, Heuristic::Entropy)
    }
}

/// `score` is entropy (bits) for [`Heuristic::Entropy`] or expected
/// remaining guesses for [`Heuristic::MinExpected`]. `max_bucket` is the
/// size of the largest pattern bucket this guess produces over `candidates`,
/// independent of which heuristic was requested.
#[derive(Debug, Clone, Copy)]
pub struct Score {
    pub score: f64,
    pub max_bucket: usize,
}

/// Precomputed `n * log2(n)` table, indexed by bucket size. Pure function of
/// the index, so it is built once behind a process-wide `Lazy` guard rather
/// than recomputed per call.
static XLOGX: Lazy<Vec<f64>> = Lazy::new(|| {
    // Candidate sets never exceed the secret list length; a few thousand
    // entries comfortably covers any real word list while staying cheap to
    // build lazily.
    (0..=1 << 16)
        .map(|n| {
            if n == 0 {
                0.0
            } else {
                let n = n as f64;
                n * n.log2()
            }
        })
        .collect()
});

fn xlogx(n: usize) -> f64 {
    match XLOGX.get(n) {
        Some(&v) => v,
        None => {
            let n = n as f64;
            n * n.log2()
        }
    }
}

/// Precomputed monotone estimator of remaining cost by bucket size, used by
/// [`Heuristic::MinExpected`]. `E(0) = E(1) = 0`, `E(2) = 1`,
/// `E(n) = 1.5 * log2(n)` for `n >= 3`. The exact schedule is a heuristic,
/// not a proven optimum (see the open question in the design notes); any
/// monotone estimator that agrees with this one on the literal test
/// scenarios is an equally valid implementation.
static EXPECTED_COST: Lazy<Vec<f64>> = Lazy::new(|| {
    (0..=1 << 16)
        .map(|n| match n {
            0 | 1 => 0.0,
            2 => 1.0,
            n => 1.5 * (n as f64).log2(),
        })
        .collect()
});

fn expected_cost(n: usize) -> f64 {
    match EXPECTED_COST.get(n) {
        Some(&v) => v,
        None => match n {
            0 | 1 => 0.0,
            2 => 1.0,
            n => 1.5 * (n as f64).log2(),
        },
    }
}

/// Bucket `candidates` by the pattern `guess_idx` produces against each
/// member, returning counts indexed by pattern code.
pub fn histogram(candidates: &CandidateSet, guess_idx: usize, matrix: &PatternMatrix) -> [u32; MAX_PATTERNS] {
    let mut counts = [0u32; MAX_PATTERNS];
    let row = matrix.row(guess_idx);
    for secret_idx in candidates.iter() {
        counts[row[secret_idx] as usize] += 1;
    }
    counts
}

/// Score `guess_idx` over `candidates` under `heuristic`.
pub fn evaluate(
    candidates: &CandidateSet,
    guess_idx: usize,
    matrix: &PatternMatrix,
    heuristic: Heuristic,
) -> Score {
    let counts = histogram(candidates, guess_idx, matrix);
    let total = candidates.count();
    let max_bucket = counts.iter().copied().max().unwrap_or(0) as usize;

    let score = match heuristic {
        Heuristic::Entropy => {
            let log2_n = (total as f64).log2();
            let weighted: f64 = counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| xlogx(c as usize))
                .sum();
            log2_n - weighted / total as f64
        }
        Heuristic::MinExpected => {
            let expected: f64 = counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| (c as f64 / total as f64) * expected_cost(c as usize))
                .sum();
            1.0 + expected
        }
    };

    Score { score, max_bucket }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use crate::wordlist::WordList;

    fn word_list(words: &[&str]) -> WordList {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        for w in words {
            writeln!(f, "{}", w).unwrap();
        }
        WordList::load_single(f.path()).unwrap()
    }

    #[test]
    fn max_bucket_matches_scalar_loop() {
        let words = word_list(&["apple", "pearl", "spell", "allay", "crane", "trace"]);
        let matrix = PatternMatrix::generate(&words);
        let candidates = CandidateSet::full(words.num_secrets());

        for guess_idx in 0..words.num_guesses() {
            let scored = evaluate(&candidates, guess_idx, &matrix, Heuristic::Entropy);

            let mut buckets = std::collections::HashMap::new();
            for secret_idx in candidates.iter() {
                *buckets.entry(matrix.get(guess_idx, secret_idx)).or_insert(0usize) += 1;
            }
            let expected_max = buckets.values().copied().max().unwrap_or(0);
            assert_eq!(scored.max_bucket, expected_max);
        }
    }

    #[test]
    fn entropy_matches_reference_scalar_formula() {
        let words = word_list(&["apple", "pearl", "spell", "allay", "crane"]);
        let matrix = PatternMatrix::generate(&words);
        let candidates = CandidateSet::full(words.num_secrets());

        for guess_idx in 0..words.num_guesses() {
            let scored = evaluate(&candidates, guess_idx, &matrix, Heuristic::Entropy);

            let mut buckets = std::collections::HashMap::new();
            for secret_idx in candidates.iter() {
                *buckets.entry(matrix.get(guess_idx, secret_idx)).or_insert(0usize) += 1;
            }
            let total = candidates.count() as f64;
            let reference: f64 = -buckets
                .values()
                .map(|&c| {
                    let p = c as f64 / total;
                    p * p.log2()
                })
                .sum::<f64>();
            assert!((scored.score - reference).abs() < 1e-9);
        }
    }

    #[test]
    fn splitting_guess_beats_uninformative_guess() {
        // "pearl" splits {apple, pearl, spell} into three singleton buckets;
        // a guess sharing no letters with any candidate cannot.
        let words = word_list(&["apple", "pearl", "spell"]);
        let matrix = PatternMatrix::generate(&words);
        let candidates = CandidateSet::full(words.num_secrets());

        let pearl_idx = words.guess_index("pearl").unwrap();
        let pearl_score = evaluate(&candidates, pearl_idx, &matrix, Heuristic::Entropy);
        assert_eq!(pearl_score.max_bucket, 1);
        assert!(pearl_score.score > 1.0);
    }

    #[test]
    fn min_expected_prefers_lower_scores_for_better_splits() {
        let words = word_list(&["apple", "pearl", "spell"]);
        let matrix = PatternMatrix::generate(&words);
        let candidates = CandidateSet::full(words.num_secrets());

        let pearl_idx = words.guess_index("pearl").unwrap();
        let scored = evaluate(&candidates, pearl_idx, &matrix, Heuristic::MinExpected);
        // Three singleton buckets: E(1) == 0 for each, so expected cost is 1.0.
        assert!((scored.score - 1.0).abs() < 1e-9);
    }
}
