use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// A word, packed as five bytes in `[0, 25]` (letter minus `b'a'`).
///
/// Packing once up front means the hot loops in [`crate::pattern`] and
/// [`crate::matrix`] never touch ASCII arithmetic again.
pub type PackedWord = [u8; 5];

pub fn pack(word: &str) -> PackedWord {
    let bytes = word.as_bytes();
    debug_assert_eq!(bytes.len(), 5);
    let mut packed = [0u8; 5];
    for (p, &b) in packed.iter_mut().zip(bytes) {
        *p = b - b'a';
    }
    packed
}

/// The two ordered, deduplicated word sequences the rest of the crate works
/// against: `secrets` (admissible answers) and `guesses` (admissible inputs,
/// a superset of `secrets`). Indices into these `Vec`s are the stable
/// identifiers used everywhere else (pattern matrix rows/columns, candidate
/// set bit positions, serialized node `guess_index`).
#[derive(Debug, Clone)]
pub struct WordList {
    pub secrets: Vec<String>,
    pub guesses: Vec<String>,
    /// `secrets[i]` is identical to `guesses[secret_to_guess[i]]`.
    pub secret_to_guess: Vec<u32>,
    checksum: u64,
}

impl WordList {
    /// Load SECRETS and GUESSES from two separate files.
    pub fn load(secrets_path: &Path, guesses_path: &Path) -> Result<Self> {
        let secrets = load_words(secrets_path)?;
        let guesses = load_words(guesses_path)?;
        Self::from_lists(secrets, guesses)
    }

    /// Load a single file and use it for both roles (`--single-list`).
    pub fn load_single(path: &Path) -> Result<Self> {
        let words = load_words(path)?;
        Self::from_lists(words.clone(), words)
    }

    fn from_lists(secrets: Vec<String>, guesses: Vec<String>) -> Result<Self> {
        let mut secret_to_guess = Vec::with_capacity(secrets.len());
        for secret in &secrets {
            let idx = guesses
                .binary_search(secret)
                .map_err(|_| Error::SecretNotInGuesses {
                    secret: secret.clone(),
                })?;
            secret_to_guess.push(idx as u32);
        }

        let checksum = guesses_checksum(&guesses);

        Ok(Self {
            secrets,
            guesses,
            secret_to_guess,
            checksum,
        })
    }

    /// 64-bit FNV-1a checksum of the GUESSES list, with a `0x00` separator
    /// between words. Embedded in the serialized tree header so a runner can
    /// detect it was built against a different word list.
    pub fn checksum(&self) -> u64 {
        self.checksum
    }

    pub fn num_secrets(&self) -> usize {
        self.secrets.len()
    }

    pub fn num_guesses(&self) -> usize {
        self.guesses.len()
    }

    /// The index of `word` within GUESSES, if present.
    pub fn guess_index(&self, word: &str) -> Option<usize> {
        self.guesses.binary_search(&word.to_string()).ok()
    }
}

fn guesses_checksum(guesses: &[String]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET_BASIS;
    for word in guesses {
        for &b in word.as_bytes() {
            hash ^= b as u64;
            hash = hash.wrapping_mul(PRIME);
        }
        hash ^= 0u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

fn load_words(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path).map_err(|source| Error::WordListIo {
        path: path.to_path_buf(),
        source,
    })?;

    let mut words = Vec::new();
    for line in contents.lines() {
        let word = line.trim();
        if word.is_empty() {
            continue;
        }
        if word.len() != 5 || !word.bytes().all(|b| b.is_ascii_lowercase()) {
            tracing::warn!(path = %path.display(), word, "skipping non-5-letter-lowercase line");
            continue;
        }
        words.push(word.to_string());
    }

    if words.is_empty() {
        return Err(Error::EmptyWordList {
            path: path.to_path_buf(),
        });
    }

    words.sort_unstable();
    words.dedup();
    Ok(words)
}
