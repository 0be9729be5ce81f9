use chrono::{DateTime, Utc};

use super::scheduler::{INITIAL_EASE_FACTOR, INITIAL_INTERVAL_DAYS};

/// Per-(owner, word) spaced repetition state.
#[derive(Clone, Debug, PartialEq)]
pub struct VocabularyReviewState {
    pub word_id: i64,
    pub owner_id: String,
    pub review_count: u32,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub ease_factor: f64,
    pub interval_days: u32,
    pub next_review_date: DateTime<Utc>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

impl VocabularyReviewState {
    /// State of a freshly added word. It is due immediately.
    pub fn new(word_id: i64, owner_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            word_id,
            owner_id: owner_id.into(),
            review_count: 0,
            correct_count: 0,
            incorrect_count: 0,
            ease_factor: INITIAL_EASE_FACTOR,
            interval_days: INITIAL_INTERVAL_DAYS,
            next_review_date: created_at,
            last_reviewed_at: None,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_date <= now
    }
}
