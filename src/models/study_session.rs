//! Study session management for spaced repetition practice.
//! Handles multi-round review of due words with the review scheduler.

use super::{ReviewOutcome, StudyCard, VocabularyEntry, VocabularyReviewState};
use crate::database::db;
use crate::error::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

/// Manages a study session with multiple review rounds.
/// Words answered incorrectly are repeated in subsequent rounds.
pub struct StudySession {
    pub owner_id: String,
    pub all_cards: Vec<(i64, StudyCard, VocabularyReviewState)>,
    pub current_round_cards: Vec<usize>,
    pub current_index: usize,
    pub show_definition: bool,
    pub round_number: usize,
}

impl StudySession {
    /// Creates a new study session from words that are due for review.
    pub fn new_from_due_words(
        owner_id: impl Into<String>,
        words: Vec<(i64, VocabularyEntry, VocabularyReviewState)>,
    ) -> Self {
        let study_cards: Vec<_> = words
            .into_iter()
            .map(|(id, entry, state)| (id, StudyCard::new(entry), state))
            .collect();

        let indices: Vec<usize> = (0..study_cards.len()).collect();

        Self {
            owner_id: owner_id.into(),
            all_cards: study_cards,
            current_round_cards: indices,
            current_index: 0,
            show_definition: false,
            round_number: 1,
        }
    }

    pub fn current_card(&self) -> Option<&StudyCard> {
        self.current_round_cards
            .get(self.current_index)
            .and_then(|&idx| self.all_cards.get(idx).map(|(_, card, _)| card))
    }

    pub fn current_word_id(&self) -> Option<i64> {
        self.current_round_cards
            .get(self.current_index)
            .and_then(|&idx| self.all_cards.get(idx).map(|(id, _, _)| *id))
    }

    pub fn toggle_definition(&mut self) {
        self.show_definition = !self.show_definition;
    }

    pub fn next_card(&mut self) {
        if self.current_index + 1 < self.current_round_cards.len() {
            self.current_index += 1;
            self.show_definition = false;
        } else {
            self.start_next_round();
        }
    }

    /// Starts a new round with the words that were answered incorrectly.
    /// If none remain, the session is complete.
    fn start_next_round(&mut self) {
        let failed_indices: Vec<usize> = self
            .current_round_cards
            .iter()
            .copied()
            .filter(|&idx| {
                self.all_cards
                    .get(idx)
                    .map(|(_, card, _)| !card.is_learned)
                    .unwrap_or(false)
            })
            .collect();

        if !failed_indices.is_empty() {
            self.current_round_cards = failed_indices;
            self.current_index = 0;
            self.show_definition = false;
            self.round_number += 1;
        }
    }

    /// Records a review of the current word and stores the rescheduled state.
    /// Correctly answered words are marked as learned for this session.
    pub fn grade_current_card(
        &mut self,
        outcome: ReviewOutcome,
        now: DateTime<Utc>,
        conn: &Connection,
    ) -> Result<()> {
        let Some(&actual_idx) = self.current_round_cards.get(self.current_index) else {
            return Ok(());
        };
        let Some((word_id, card, state)) = self.all_cards.get_mut(actual_idx) else {
            return Ok(());
        };

        let updated = db::record_review(&self.owner_id, *word_id, outcome, now, conn)?;

        if outcome.is_correct() {
            card.mark_as_learned(now);
        } else {
            card.is_learned = false;
        }
        *state = updated;

        Ok(())
    }

    pub fn learned_count(&self) -> usize {
        self.current_round_cards
            .iter()
            .filter(|&&idx| {
                self.all_cards
                    .get(idx)
                    .map(|(_, card, _)| card.is_learned)
                    .unwrap_or(false)
            })
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.current_round_cards.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.learned_count()
    }

    /// Returns true when there was nothing to study or every word in the
    /// current round has been answered correctly.
    pub fn is_completed(&self) -> bool {
        self.current_round_cards.is_empty() || self.learned_count() == self.total_count()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} words", self.round_number, self.total_count())
        } else {
            format!(
                "Round {} (Review): {} words to retry",
                self.round_number,
                self.total_count()
            )
        }
    }
}
