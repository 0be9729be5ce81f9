//! Word list is the portable set of vocabulary entries owned by one user
use super::VocabularyEntry;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WordList {
    pub owner_id: String,
    pub words: Vec<VocabularyEntry>,
}

impl WordList {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            words: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
