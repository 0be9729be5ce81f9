//! Error types for vocabulary storage and review scheduling.

use thiserror::Error;

/// Errors returned by the vocabulary library.
#[derive(Debug, Error)]
pub enum VocabError {
    /// The word does not exist or belongs to another owner.
    #[error("word {word_id} not found for owner '{owner_id}'")]
    NotFound { word_id: i64, owner_id: String },

    /// Difficulty ratings must be in 1..=5.
    #[error("invalid difficulty {0}, expected a value between 1 and 5")]
    InvalidDifficulty(i64),

    /// The owner already has this word in their vocabulary.
    #[error("word '{0}' is already in the vocabulary")]
    DuplicateWord(String),

    #[error("word must not be empty")]
    EmptyWord,

    /// A stored timestamp could not be converted back into a date.
    #[error("invalid stored timestamp: {0}")]
    InvalidTimestamp(i64),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VocabError {
    /// Returns `true` for conditions caused by the caller's input rather
    /// than by storage or I/O.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            VocabError::NotFound { .. }
                | VocabError::InvalidDifficulty(_)
                | VocabError::DuplicateWord(_)
                | VocabError::EmptyWord
        )
    }
}

pub type Result<T> = std::result::Result<T, VocabError>;
