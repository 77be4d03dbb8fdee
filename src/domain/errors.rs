// ============================================================
// Layer 3 — Domain Errors
// ============================================================
// Defined error kinds for conditions the pipeline refuses to
// continue from. The application layer wraps these in anyhow
// with file/line context; nothing here is retried.

use crate::domain::example::TargetFrameMap;

/// Errors raised while building an [`Example`](crate::domain::example::Example).
#[derive(Debug, thiserror::Error)]
pub enum ExampleError {
    /// Tokens of one target were annotated with different frames.
    #[error("different frames for neighboring targets: {targets:?}")]
    InconsistentFrames { targets: TargetFrameMap },

    /// The annotation block carries no lexical-unit token at all.
    #[error("sentence {sent_num} has no target tokens")]
    NoTargets { sent_num: usize },

    /// Token and POS sequences disagree in length.
    #[error("token/POS length mismatch: {tokens} tokens, {postags} POS tags")]
    LengthMismatch { tokens: usize, postags: usize },

    /// A target index points past the end of the sentence.
    #[error("target index {index} out of range for sentence of length {len}")]
    TargetOutOfRange { index: usize, len: usize },
}

/// Errors raised by the vocabulary lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VocabError {
    /// Insertion was attempted after the vocabulary was locked.
    #[error("vocabulary '{vocab}' is locked; cannot add '{item}'")]
    Locked { vocab: String, item: String },
}

/// Errors raised while reading corpus-like text resources.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected {expected} columns, found {found}")]
    ColumnCount { line: usize, expected: usize, found: usize },

    #[error("line {line}: cannot parse '{value}' as a number")]
    BadNumber { line: usize, value: String },

    #[error("line {line}: malformed lexical unit '{value}' (expected lemma.pos)")]
    BadLexicalUnit { line: usize, value: String },

    #[error("line {line}: vector has {found} dimensions, expected {expected}")]
    DimensionMismatch { line: usize, expected: usize, found: usize },

    #[error("invalid example ending at line {line}: {source}")]
    InvalidExample {
        line: usize,
        #[source]
        source: ExampleError,
    },
}

/// Errors in the run configuration, reported before any data is loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid mode '{0}': expected one of train, test, refresh, predict")]
    InvalidMode(String),

    #[error("predict mode requires --raw-input")]
    MissingRawInput,

    #[error("invalid optimizer '{0}': expected sgd or adam")]
    InvalidOptimizer(String),

    #[error("--{0} must be at least 1")]
    ZeroInterval(&'static str),
}
