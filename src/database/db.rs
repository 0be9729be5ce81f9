//! Database operations for the vocabulary store
//!
//! Handles SQLite schema initialization, owner-scoped CRUD for vocabulary
//! words, and persistence of their spaced repetition state. Every query is
//! filtered by owner, so a word belonging to someone else behaves exactly
//! like a missing one.

use crate::error::{Result, VocabError};
use crate::models::scheduler;
use crate::models::stats::MASTERED_INTERVAL_DAYS;
use crate::models::{
    ReviewOutcome, VocabularyEntry, VocabularyReviewState, VocabularyStats, WordList,
};
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use tracing::{debug, info};

/// A stored word together with its review state.
pub type StoredWord = (i64, VocabularyEntry, VocabularyReviewState);

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS vocabulary_words (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id TEXT NOT NULL,
        word TEXT NOT NULL,
        definition TEXT NOT NULL,
        example TEXT,
        part_of_speech TEXT,
        created_at INTEGER NOT NULL,
        UNIQUE(owner_id, word)
    );

    CREATE TABLE IF NOT EXISTS review_states (
        word_id INTEGER PRIMARY KEY,
        review_count INTEGER NOT NULL DEFAULT 0,
        correct_count INTEGER NOT NULL DEFAULT 0,
        incorrect_count INTEGER NOT NULL DEFAULT 0,
        ease_factor REAL NOT NULL DEFAULT 2.5,
        interval_days INTEGER NOT NULL DEFAULT 1,
        next_review_date INTEGER NOT NULL,
        last_reviewed_at INTEGER,
        FOREIGN KEY (word_id) REFERENCES vocabulary_words(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_review_states_next_review
        ON review_states(next_review_date);
";

const WORD_COLUMNS: &str = "w.id, w.owner_id, w.word, w.definition, w.example, w.part_of_speech,
     r.review_count, r.correct_count, r.incorrect_count, r.ease_factor, r.interval_days,
     r.next_review_date, r.last_reviewed_at";

/// Opens (or creates) the SQLite database at `path` and ensures the schema exists.
pub fn init_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;
    info!(path = %path.display(), "vocabulary database ready");
    Ok(conn)
}

/// Opens a private in-memory database with the schema applied.
pub fn init_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}

/// Timestamps are stored as Unix milliseconds; anything finer is dropped
/// before a value is scheduled or written.
fn to_storage_precision(time: DateTime<Utc>) -> DateTime<Utc> {
    time.duration_trunc(TimeDelta::milliseconds(1))
        .unwrap_or(time)
}

fn timestamp_from_column(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(idx)?;
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            Box::new(VocabError::InvalidTimestamp(millis)),
        )
    })
}

fn stored_word_from_row(row: &Row) -> rusqlite::Result<StoredWord> {
    let id: i64 = row.get(0)?;
    let entry = VocabularyEntry {
        word: row.get(2)?,
        definition: row.get(3)?,
        example: row.get(4)?,
        part_of_speech: row.get(5)?,
    };
    let last_reviewed_at = match row.get::<_, Option<i64>>(12)? {
        Some(_) => Some(timestamp_from_column(row, 12)?),
        None => None,
    };
    let state = VocabularyReviewState {
        word_id: id,
        owner_id: row.get(1)?,
        review_count: row.get(6)?,
        correct_count: row.get(7)?,
        incorrect_count: row.get(8)?,
        ease_factor: row.get(9)?,
        interval_days: row.get(10)?,
        next_review_date: timestamp_from_column(row, 11)?,
        last_reviewed_at,
    };
    Ok((id, entry, state))
}

fn not_found(owner_id: &str, word_id: i64) -> VocabError {
    VocabError::NotFound {
        word_id,
        owner_id: owner_id.to_string(),
    }
}

/// Inserts a word and its initial review state without opening a transaction.
fn insert_word(
    owner_id: &str,
    entry: &VocabularyEntry,
    now: DateTime<Utc>,
    conn: &Connection,
) -> Result<i64> {
    let now = to_storage_precision(now);
    let word = entry.word.trim();
    if word.is_empty() {
        return Err(VocabError::EmptyWord);
    }

    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM vocabulary_words WHERE owner_id = ?1 AND word = ?2)",
        params![owner_id, word],
        |row| row.get(0),
    )?;
    if exists {
        return Err(VocabError::DuplicateWord(word.to_string()));
    }

    conn.execute(
        "INSERT INTO vocabulary_words (owner_id, word, definition, example, part_of_speech, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            owner_id,
            word,
            entry.definition.trim(),
            entry.example,
            entry.part_of_speech,
            now.timestamp_millis()
        ],
    )?;
    let word_id = conn.last_insert_rowid();

    let state = VocabularyReviewState::new(word_id, owner_id, now);
    conn.execute(
        "INSERT INTO review_states (word_id, review_count, correct_count, incorrect_count,
                                    ease_factor, interval_days, next_review_date, last_reviewed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL)",
        params![
            word_id,
            state.review_count,
            state.correct_count,
            state.incorrect_count,
            state.ease_factor,
            state.interval_days,
            state.next_review_date.timestamp_millis()
        ],
    )?;

    Ok(word_id)
}

/// Adds a word to the owner's vocabulary and initializes its review state.
///
/// The new word is due immediately. Returns the word ID.
pub fn add_word(
    owner_id: &str,
    entry: &VocabularyEntry,
    now: DateTime<Utc>,
    conn: &Connection,
) -> Result<i64> {
    let tx = conn.unchecked_transaction()?;
    let word_id = insert_word(owner_id, entry, now, &tx)?;
    tx.commit()?;

    info!(owner_id, word_id, word = %entry.word.trim(), "added vocabulary word");
    Ok(word_id)
}

/// Retrieves a single word with its review state.
pub fn get_word(owner_id: &str, word_id: i64, conn: &Connection) -> Result<StoredWord> {
    let sql = format!(
        "SELECT {WORD_COLUMNS}
         FROM vocabulary_words w
         JOIN review_states r ON r.word_id = w.id
         WHERE w.id = ?1 AND w.owner_id = ?2"
    );
    conn.query_row(&sql, params![word_id, owner_id], stored_word_from_row)
        .optional()?
        .ok_or_else(|| not_found(owner_id, word_id))
}

/// Retrieves the review state of a word owned by `owner_id`.
pub fn get_review_state(
    owner_id: &str,
    word_id: i64,
    conn: &Connection,
) -> Result<VocabularyReviewState> {
    get_word(owner_id, word_id, conn).map(|(_, _, state)| state)
}

/// Retrieves every word of an owner, alphabetically.
pub fn list_words(owner_id: &str, conn: &Connection) -> Result<Vec<StoredWord>> {
    let sql = format!(
        "SELECT {WORD_COLUMNS}
         FROM vocabulary_words w
         JOIN review_states r ON r.word_id = w.id
         WHERE w.owner_id = ?1
         ORDER BY w.word ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let words = stmt
        .query_map(params![owner_id], stored_word_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(words)
}

/// Retrieves words due for review
///
/// Returns words where next_review_date <= now, ordered by
/// next_review_date (oldest first). `limit` of `None` returns all of them.
pub fn words_due_for_review(
    owner_id: &str,
    now: DateTime<Utc>,
    limit: Option<usize>,
    conn: &Connection,
) -> Result<Vec<StoredWord>> {
    let sql = format!(
        "SELECT {WORD_COLUMNS}
         FROM vocabulary_words w
         JOIN review_states r ON r.word_id = w.id
         WHERE w.owner_id = ?1 AND r.next_review_date <= ?2
         ORDER BY r.next_review_date ASC, w.id ASC
         LIMIT ?3"
    );
    // SQLite treats a negative LIMIT as unbounded
    let limit = limit
        .map(|l| i64::try_from(l).unwrap_or(i64::MAX))
        .unwrap_or(-1);

    let mut stmt = conn.prepare(&sql)?;
    let words = stmt
        .query_map(params![owner_id, now.timestamp_millis(), limit], stored_word_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(owner_id, due = words.len(), "loaded due words");
    Ok(words)
}

/// Records a review and persists the rescheduled state.
///
/// The read, the scheduling and the write happen in one transaction. If the
/// word does not exist for this owner nothing is written.
pub fn record_review(
    owner_id: &str,
    word_id: i64,
    outcome: ReviewOutcome,
    now: DateTime<Utc>,
    conn: &Connection,
) -> Result<VocabularyReviewState> {
    let now = to_storage_precision(now);
    let tx = conn.unchecked_transaction()?;

    let current = get_review_state(owner_id, word_id, &tx)?;
    let updated = scheduler::calculate_next_review(&current, outcome, now);

    tx.execute(
        "UPDATE review_states
         SET review_count = ?1, correct_count = ?2, incorrect_count = ?3, ease_factor = ?4,
             interval_days = ?5, next_review_date = ?6, last_reviewed_at = ?7
         WHERE word_id = ?8",
        params![
            updated.review_count,
            updated.correct_count,
            updated.incorrect_count,
            updated.ease_factor,
            updated.interval_days,
            updated.next_review_date.timestamp_millis(),
            updated.last_reviewed_at.map(|t| t.timestamp_millis()),
            word_id
        ],
    )?;
    tx.commit()?;

    info!(
        owner_id,
        word_id,
        correct = outcome.is_correct(),
        interval_days = updated.interval_days,
        "recorded review"
    );
    Ok(updated)
}

/// Deletes a word; its review state goes with it.
pub fn delete_word(owner_id: &str, word_id: i64, conn: &Connection) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM vocabulary_words WHERE id = ?1 AND owner_id = ?2",
        params![word_id, owner_id],
    )?;
    if deleted == 0 {
        return Err(not_found(owner_id, word_id));
    }

    info!(owner_id, word_id, "deleted vocabulary word");
    Ok(())
}

/// Aggregates review statistics for an owner at `now`.
pub fn vocabulary_stats(
    owner_id: &str,
    now: DateTime<Utc>,
    conn: &Connection,
) -> Result<VocabularyStats> {
    let stats = conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(CASE WHEN r.next_review_date <= ?2 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN r.interval_days >= ?3 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(r.review_count), 0),
                COALESCE(SUM(r.correct_count), 0),
                COALESCE(SUM(r.incorrect_count), 0)
         FROM vocabulary_words w
         JOIN review_states r ON r.word_id = w.id
         WHERE w.owner_id = ?1",
        params![owner_id, now.timestamp_millis(), MASTERED_INTERVAL_DAYS],
        |row| {
            let count = |idx: usize| -> rusqlite::Result<u64> {
                row.get::<_, i64>(idx).map(|v| v.max(0) as u64)
            };
            Ok(VocabularyStats {
                total_words: count(0)?,
                due_words: count(1)?,
                mastered_words: count(2)?,
                total_reviews: count(3)?,
                correct_reviews: count(4)?,
                incorrect_reviews: count(5)?,
            })
        },
    )?;
    Ok(stats)
}

/// Collects an owner's words into a portable word list.
pub fn export_word_list(owner_id: &str, conn: &Connection) -> Result<WordList> {
    let words = list_words(owner_id, conn)?
        .into_iter()
        .map(|(_, entry, _)| entry)
        .collect();
    Ok(WordList {
        owner_id: owner_id.to_string(),
        words,
    })
}

/// Adds every word of `list` to its owner's vocabulary.
///
/// Words the owner already has are skipped. Returns how many were added.
pub fn import_word_list(list: &WordList, now: DateTime<Utc>, conn: &Connection) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut added = 0;
    for entry in &list.words {
        match insert_word(&list.owner_id, entry, now, &tx) {
            Ok(_) => added += 1,
            Err(VocabError::DuplicateWord(word)) => {
                debug!(owner_id = %list.owner_id, word = %word, "skipping duplicate word");
            }
            Err(e) => return Err(e),
        }
    }
    tx.commit()?;

    info!(owner_id = %list.owner_id, added, total = list.words.len(), "imported word list");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;
    use chrono::{Days, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 2, 12, 0, 0).unwrap()
    }

    fn correct(d: i64) -> ReviewOutcome {
        ReviewOutcome::Correct(Difficulty::new(d).unwrap())
    }

    #[test]
    fn test_add_word_initializes_review_state() {
        let conn = init_in_memory().unwrap();
        let entry = VocabularyEntry::new("  merger ", "the joining of two companies")
            .with_example("The merger was approved last week.");
        let id = add_word("user-1", &entry, now(), &conn).unwrap();

        let (_, stored, state) = get_word("user-1", id, &conn).unwrap();
        assert_eq!(stored.word, "merger");
        assert_eq!(
            stored.example.as_deref(),
            Some("The merger was approved last week.")
        );
        assert_eq!(state.review_count, 0);
        assert_eq!(state.interval_days, 1);
        assert_eq!(state.ease_factor, 2.5);
        assert_eq!(state.next_review_date, now());
        assert!(state.last_reviewed_at.is_none());
    }

    #[test]
    fn test_duplicate_and_empty_words_rejected() {
        let conn = init_in_memory().unwrap();
        let entry = VocabularyEntry::new("refund", "money paid back");
        add_word("user-1", &entry, now(), &conn).unwrap();

        assert!(matches!(
            add_word("user-1", &entry, now(), &conn),
            Err(VocabError::DuplicateWord(w)) if w == "refund"
        ));
        // same word for a different owner is fine
        add_word("user-2", &entry, now(), &conn).unwrap();

        assert!(matches!(
            add_word("user-1", &VocabularyEntry::new("   ", "blank"), now(), &conn),
            Err(VocabError::EmptyWord)
        ));
    }

    #[test]
    fn test_record_review_persists_state() {
        let conn = init_in_memory().unwrap();
        let id = add_word("user-1", &VocabularyEntry::new("audit", "an official inspection"), now(), &conn)
            .unwrap();

        let updated = record_review("user-1", id, correct(3), now(), &conn).unwrap();
        let stored = get_review_state("user-1", id, &conn).unwrap();
        assert_eq!(stored, updated);
        assert_eq!(stored.review_count, 1);
        assert_eq!(stored.correct_count, 1);
        assert_eq!(stored.next_review_date, now() + Days::new(1));
        assert_eq!(stored.last_reviewed_at, Some(now()));
    }

    #[test]
    fn test_record_review_with_sub_second_now_matches_stored_state() {
        let conn = init_in_memory().unwrap();
        let added_at = now() + TimeDelta::nanoseconds(250_123_456);
        let id = add_word("user-1", &VocabularyEntry::new("tenant", "one who rents"), added_at, &conn)
            .unwrap();
        let (_, _, fresh) = get_word("user-1", id, &conn).unwrap();
        assert_eq!(fresh.next_review_date, now() + TimeDelta::milliseconds(250));

        let reviewed_at = now() + TimeDelta::nanoseconds(750_999_999);
        let returned = record_review("user-1", id, correct(4), reviewed_at, &conn).unwrap();
        let stored = get_review_state("user-1", id, &conn).unwrap();

        assert_eq!(returned, stored);
        let expected_now = now() + TimeDelta::milliseconds(750);
        assert_eq!(stored.last_reviewed_at, Some(expected_now));
        assert_eq!(stored.next_review_date, expected_now + Days::new(1));

        // due as soon as the stored date is reached, not a second later
        let due = words_due_for_review("user-1", expected_now + Days::new(1), None, &conn).unwrap();
        assert_eq!(due.len(), 1);
    }

    #[test]
    fn test_record_review_for_foreign_word_is_not_found() {
        let conn = init_in_memory().unwrap();
        let id = add_word("owner", &VocabularyEntry::new("lease", "a rental contract"), now(), &conn)
            .unwrap();

        let err = record_review("intruder", id, ReviewOutcome::Incorrect, now(), &conn).unwrap_err();
        assert!(matches!(err, VocabError::NotFound { word_id, .. } if word_id == id));

        let err = record_review("owner", id + 100, correct(4), now(), &conn).unwrap_err();
        assert!(matches!(err, VocabError::NotFound { .. }));

        let untouched = get_review_state("owner", id, &conn).unwrap();
        assert_eq!(untouched.review_count, 0);
        assert_eq!(untouched.incorrect_count, 0);
    }

    #[test]
    fn test_due_words_ordered_oldest_first() {
        let conn = init_in_memory().unwrap();
        let first = add_word("user-1", &VocabularyEntry::new("agenda", "a list of items"), now(), &conn)
            .unwrap();
        let second = add_word(
            "user-1",
            &VocabularyEntry::new("deadline", "latest time"),
            now() - Days::new(2),
            &conn,
        )
        .unwrap();
        let reviewed = add_word("user-1", &VocabularyEntry::new("vendor", "a seller"), now(), &conn)
            .unwrap();
        record_review("user-1", reviewed, correct(5), now(), &conn).unwrap();

        let due = words_due_for_review("user-1", now(), None, &conn).unwrap();
        let ids: Vec<i64> = due.iter().map(|(id, _, _)| *id).collect();
        assert_eq!(ids, vec![second, first]);

        let limited = words_due_for_review("user-1", now(), Some(1), &conn).unwrap();
        assert_eq!(limited.len(), 1);

        let tomorrow = words_due_for_review("user-1", now() + Days::new(1), None, &conn).unwrap();
        assert_eq!(tomorrow.len(), 3);

        assert!(words_due_for_review("user-2", now(), None, &conn).unwrap().is_empty());
    }

    #[test]
    fn test_delete_word_cascades() {
        let conn = init_in_memory().unwrap();
        let id = add_word("user-1", &VocabularyEntry::new("invoice", "a bill"), now(), &conn).unwrap();

        assert!(matches!(
            delete_word("user-2", id, &conn),
            Err(VocabError::NotFound { .. })
        ));
        delete_word("user-1", id, &conn).unwrap();

        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM review_states", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
        assert!(matches!(
            delete_word("user-1", id, &conn),
            Err(VocabError::NotFound { .. })
        ));
    }

    #[test]
    fn test_vocabulary_stats() {
        let conn = init_in_memory().unwrap();
        let a = add_word("user-1", &VocabularyEntry::new("asset", "something valuable"), now(), &conn)
            .unwrap();
        add_word("user-1", &VocabularyEntry::new("liability", "a debt"), now(), &conn).unwrap();
        add_word("user-2", &VocabularyEntry::new("asset", "something valuable"), now(), &conn)
            .unwrap();

        record_review("user-1", a, correct(4), now(), &conn).unwrap();
        record_review("user-1", a, ReviewOutcome::Incorrect, now(), &conn).unwrap();

        let stats = vocabulary_stats("user-1", now(), &conn).unwrap();
        assert_eq!(stats.total_words, 2);
        assert_eq!(stats.due_words, 1);
        assert_eq!(stats.mastered_words, 0);
        assert_eq!(stats.total_reviews, 2);
        assert_eq!(stats.correct_reviews, 1);
        assert_eq!(stats.incorrect_reviews, 1);
        assert_eq!(stats.accuracy(), 0.5);

        let empty = vocabulary_stats("nobody", now(), &conn).unwrap();
        assert_eq!(empty, VocabularyStats::default());
    }

    #[test]
    fn test_import_skips_existing_words() {
        let conn = init_in_memory().unwrap();
        add_word("user-1", &VocabularyEntry::new("quote", "an estimate"), now(), &conn).unwrap();

        let mut list = WordList::new("user-1");
        list.words.push(VocabularyEntry::new("quote", "an estimate"));
        list.words.push(VocabularyEntry::new("shipment", "goods sent together"));

        assert_eq!(import_word_list(&list, now(), &conn).unwrap(), 1);

        let exported = export_word_list("user-1", &conn).unwrap();
        let words: Vec<&str> = exported.words.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, vec!["quote", "shipment"]);
    }

    #[test]
    fn test_init_database_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.sqlite3");
        {
            let conn = init_database(&path).unwrap();
            add_word("user-1", &VocabularyEntry::new("payroll", "list of employees paid"), now(), &conn)
                .unwrap();
        }
        let conn = init_database(&path).unwrap();
        assert_eq!(list_words("user-1", &conn).unwrap().len(), 1);
    }
}
