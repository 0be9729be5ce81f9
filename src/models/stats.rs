//! Aggregate review statistics for one owner's vocabulary.
use serde::Serialize;

/// Words scheduled this far out are considered mastered.
pub const MASTERED_INTERVAL_DAYS: u32 = 21;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct VocabularyStats {
    pub total_words: u64,
    pub due_words: u64,
    pub mastered_words: u64,
    pub total_reviews: u64,
    pub correct_reviews: u64,
    pub incorrect_reviews: u64,
}

impl VocabularyStats {
    /// Share of reviews answered correctly, 0.0 when nothing was reviewed yet.
    pub fn accuracy(&self) -> f64 {
        if self.total_reviews == 0 {
            0.0
        } else {
            self.correct_reviews as f64 / self.total_reviews as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_without_reviews() {
        assert_eq!(VocabularyStats::default().accuracy(), 0.0);
    }

    #[test]
    fn test_accuracy() {
        let stats = VocabularyStats {
            total_reviews: 4,
            correct_reviews: 3,
            incorrect_reviews: 1,
            ..Default::default()
        };
        assert_eq!(stats.accuracy(), 0.75);
    }
}
