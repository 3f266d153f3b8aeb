use thiserror::Error as ThisError;

/// Result alias for `miclass`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned while loading inputs or clustering.
///
/// Every variant is fatal for a clustering run: the computation is an offline
/// batch job with no partial results worth keeping.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Input was empty (no vocabulary, or no bigram mass).
    #[error("empty input provided")]
    EmptyInput,

    /// Invalid number of classes requested.
    #[error("cannot create {requested} classes from {n_items} words")]
    InvalidClusterCount {
        /// Requested count.
        requested: usize,
        /// Number of vocabulary words.
        n_items: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// A bigram referenced a word id outside the vocabulary.
    #[error("word id {id} out of range for vocabulary of {vocab_size} words")]
    WordOutOfRange {
        /// Offending id.
        id: usize,
        /// Vocabulary size.
        vocab_size: usize,
    },

    /// A bigram named a word that is not in the vocabulary.
    #[error("unknown word '{0}'")]
    UnknownWord(String),

    /// A class id beyond the pre-sized arena was requested.
    #[error(
        "input data too small for requested class count: class id {requested} exceeds arena capacity {capacity}"
    )]
    ArenaExhausted {
        /// Requested class id.
        requested: usize,
        /// Arena capacity (twice the vocabulary size).
        capacity: usize,
    },

    /// Malformed line in a bigram stream.
    #[error("parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// Reading an input or writing output failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
