use std::path::PathBuf;

/// Everything that can go wrong while loading word lists, building a tree, or
/// reading/writing the serialized format.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to read word list {path}: {source}")]
    WordListIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("word list {path} contained no usable 5-letter words")]
    EmptyWordList { path: PathBuf },

    #[error("secret '{secret}' has no matching entry in the guesses list")]
    SecretNotInGuesses { secret: String },

    #[error("start word '{0}' is not present in the guesses list")]
    UnknownStartWord(String),

    #[error("no guess sequence solves every secret within six guesses")]
    SearchInfeasible,

    #[error("failed to write serialized tree to {path}: {source}")]
    SerializationIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialized tree is corrupt: {0}")]
    CorruptTree(String),

    #[error("tree verification failed for secret '{secret}': {reason}")]
    VerificationFailed { secret: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
