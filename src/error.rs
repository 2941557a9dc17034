// ============================================================
// Core error taxonomy
// ============================================================
// Every failure the core can report is a deterministic function
// of its input, so there is no retry logic anywhere: callers get
// one of these variants and must fix the data or configuration.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A character id fell outside `[0, vocab_size)`.
    #[error("character id {index} is outside the vocabulary range [0, {vocab_size})")]
    InvalidIndex { index: usize, vocab_size: usize },

    #[error("batch size must be positive, got {batch_size}")]
    EmptyBatch { batch_size: usize },

    #[error("malformed data: {0}")]
    DataShape(String),

    /// Probability mass was exactly zero, so the log-probability is undefined.
    #[error("log-probability is undefined: {0}")]
    NumericDomain(String),

    #[error("character {0:?} is not in the vocabulary")]
    UnknownCharacter(char),

    #[error("tensor data error: {0}")]
    Tensor(String),
}

impl ModelError {
    pub fn tensor<E: std::fmt::Debug>(error: E) -> Self {
        ModelError::Tensor(format!("{error:?}"))
    }
}
