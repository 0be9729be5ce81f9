pub mod review_state;
pub mod scheduler;
pub mod stats;
pub mod study_card;
pub mod study_session;
pub mod vocabulary_entry;
pub mod word_list;

pub use review_state::VocabularyReviewState;
pub use scheduler::{Difficulty, ReviewOutcome};
pub use stats::VocabularyStats;
pub use study_card::StudyCard;
pub use study_session::StudySession;
pub use vocabulary_entry::VocabularyEntry;
pub use word_list::WordList;
