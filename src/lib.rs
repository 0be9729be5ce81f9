//! Vocabulary review engine for TOEIC exam preparation.
//!
//! Stores each learner's vocabulary in SQLite and schedules reviews with a
//! simplified SM-2 spaced repetition algorithm.

pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;

pub use error::{Result, VocabError};
pub use models::{
    Difficulty, ReviewOutcome, StudySession, VocabularyEntry, VocabularyReviewState,
    VocabularyStats, WordList,
};
