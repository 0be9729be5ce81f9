//! Wrapper for vocabulary entries that tracks progress within a study session.
use super::VocabularyEntry;
use chrono::{DateTime, Utc};

#[derive(Clone, Debug)]
pub struct StudyCard {
    pub entry: VocabularyEntry,
    pub is_learned: bool,
    pub last_learned_at: Option<DateTime<Utc>>,
}

impl StudyCard {
    pub fn new(entry: VocabularyEntry) -> Self {
        Self {
            entry,
            is_learned: false,
            last_learned_at: None,
        }
    }

    pub fn mark_as_learned(&mut self, at: DateTime<Utc>) {
        self.is_learned = true;
        self.last_learned_at = Some(at);
    }
}
