//! Spaced repetition scheduler for vocabulary reviews (a simplified SM-2).
//!
//! - A correct answer grows the interval 1 day → 6 days → previous interval ×
//!   ease factor. From the third review on, the ease factor is first adjusted
//!   by the difficulty rating (5 = felt easy, 1 = felt hard).
//! - The two learning-step reviews (`review_count` 0 and 1) do NOT recompute
//!   the ease factor, even when correct. This departs from the plain "adjust
//!   ease on every correct answer" rule: with it, three correct reviews at
//!   difficulty 3 would not give 1 → 6 → 14 days with a final ease of 2.36
//! - An incorrect answer resets the interval to 1 day and lowers the ease
//!   factor by a flat 0.2
//! - The ease factor never falls below 1.3
//!
//! Unlike full SM-2 the time elapsed since the last review is not taken into
//! account.

use super::VocabularyReviewState;
use crate::error::{Result, VocabError};
use chrono::{DateTime, Days, Utc};
use tracing::debug;

pub const INITIAL_EASE_FACTOR: f64 = 2.5;
pub const INITIAL_INTERVAL_DAYS: u32 = 1;
pub const MIN_EASE_FACTOR: f64 = 1.3;
/// Upper bound on intervals so date arithmetic stays in range.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

const INCORRECT_EASE_PENALTY: f64 = 0.2;

/// Subjective difficulty rating of a review, validated to 1..=5.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(VocabError::InvalidDifficulty(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Difficulty {
    type Error = VocabError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

/// Result of a single review.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewOutcome {
    Correct(Difficulty),
    Incorrect,
}

impl ReviewOutcome {
    /// Builds an outcome from raw caller input. The difficulty is validated
    /// even for incorrect answers so malformed submissions are rejected
    /// before any state is touched.
    pub fn from_submission(correct: bool, difficulty: i64) -> Result<Self> {
        let difficulty = Difficulty::new(difficulty)?;
        Ok(if correct {
            ReviewOutcome::Correct(difficulty)
        } else {
            ReviewOutcome::Incorrect
        })
    }

    pub fn is_correct(self) -> bool {
        matches!(self, ReviewOutcome::Correct(_))
    }
}

/// Ease factor after a correct answer with the given difficulty.
fn adjusted_ease(ease_factor: f64, difficulty: Difficulty) -> f64 {
    let q = 5.0 - f64::from(difficulty.value());
    let new_ef = ease_factor + (0.1 - q * (0.08 + q * 0.02));
    new_ef.max(MIN_EASE_FACTOR)
}

/// Computes the state after a review recorded at `now`.
pub fn calculate_next_review(
    state: &VocabularyReviewState,
    outcome: ReviewOutcome,
    now: DateTime<Utc>,
) -> VocabularyReviewState {
    let (new_ef, new_interval) = match outcome {
        ReviewOutcome::Correct(difficulty) => match state.review_count {
            0 => (state.ease_factor.max(MIN_EASE_FACTOR), 1),
            1 => (state.ease_factor.max(MIN_EASE_FACTOR), 6),
            _ => {
                let new_ef = adjusted_ease(state.ease_factor, difficulty);
                // f64 -> u32 casts saturate
                (new_ef, (f64::from(state.interval_days) * new_ef).round() as u32)
            }
        },
        ReviewOutcome::Incorrect => (
            (state.ease_factor - INCORRECT_EASE_PENALTY).max(MIN_EASE_FACTOR),
            1,
        ),
    };
    let new_interval = new_interval.clamp(1, MAX_INTERVAL_DAYS);

    let next_review_date = now
        .checked_add_days(Days::new(u64::from(new_interval)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    debug!(
        word_id = state.word_id,
        correct = outcome.is_correct(),
        ease_factor = new_ef,
        interval_days = new_interval,
        "scheduled next review"
    );

    let (correct_count, incorrect_count) = if outcome.is_correct() {
        (state.correct_count.saturating_add(1), state.incorrect_count)
    } else {
        (state.correct_count, state.incorrect_count.saturating_add(1))
    };

    VocabularyReviewState {
        word_id: state.word_id,
        owner_id: state.owner_id.clone(),
        review_count: state.review_count.saturating_add(1),
        correct_count,
        incorrect_count,
        ease_factor: new_ef,
        interval_days: new_interval,
        next_review_date,
        last_reviewed_at: Some(now),
    }
}
