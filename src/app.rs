//! Command implementations for the toeic-vocab binary.
//! Each command runs against the configured database for one owner.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::io::{BufRead, Write};
use std::path::Path;

use toeic_vocab::database::db;
use toeic_vocab::export::json::{export_json_to_path, import_json};
use toeic_vocab::models::{ReviewOutcome, StudySession, VocabularyEntry, VocabularyReviewState};

pub struct App {
    conn: Connection,
    owner_id: String,
    default_due_limit: usize,
}

/// Formats a timestamp as YYYY-MM-DD
fn format_date(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d").to_string()
}

fn describe_schedule(state: &VocabularyReviewState) -> String {
    format!(
        "next {} (every {}d, ease {:.2}, {}/{} correct)",
        format_date(state.next_review_date),
        state.interval_days,
        state.ease_factor,
        state.correct_count,
        state.review_count
    )
}

/// Parses a study answer such as `y 4`, `n` or `n 2`.
fn parse_answer(line: &str) -> Option<ReviewOutcome> {
    let mut parts = line.split_whitespace();
    let correct = match parts.next()?.to_ascii_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => return None,
    };
    let difficulty = match parts.next() {
        Some(d) => d.parse::<i64>().ok()?,
        // an incorrect answer does not need a rating
        None if !correct => 1,
        None => return None,
    };
    ReviewOutcome::from_submission(correct, difficulty).ok()
}

impl App {
    pub fn new(conn: Connection, owner_id: String, default_due_limit: usize) -> Self {
        Self {
            conn,
            owner_id,
            default_due_limit,
        }
    }

    pub fn add(
        &self,
        word: String,
        definition: String,
        example: Option<String>,
        part_of_speech: Option<String>,
    ) -> Result<()> {
        let entry = VocabularyEntry {
            word,
            definition,
            example,
            part_of_speech,
        };
        let id = db::add_word(&self.owner_id, &entry, Utc::now(), &self.conn)?;
        println!("Added '{}' (id {id})", entry.word.trim());
        Ok(())
    }

    pub fn list(&self) -> Result<()> {
        let words = db::list_words(&self.owner_id, &self.conn)?;
        if words.is_empty() {
            println!("No words yet. Add one with `toeic-vocab add <word> <definition>`.");
            return Ok(());
        }
        for (id, entry, state) in &words {
            println!(
                "{id:>5}  {:<20} {}",
                entry.word,
                describe_schedule(state)
            );
        }
        println!("\n{} word(s)", words.len());
        Ok(())
    }

    pub fn due(&self, limit: Option<usize>) -> Result<()> {
        let limit = limit.unwrap_or(self.default_due_limit);
        let words = db::words_due_for_review(&self.owner_id, Utc::now(), Some(limit), &self.conn)?;
        if words.is_empty() {
            println!("Nothing due for review.");
            return Ok(());
        }
        for (id, entry, _) in &words {
            println!("{id:>5}  {:<20} {}", entry.word, entry.definition);
        }
        Ok(())
    }

    pub fn review(&self, word_id: i64, correct: bool, difficulty: i64) -> Result<()> {
        let outcome = ReviewOutcome::from_submission(correct, difficulty)?;
        let state = db::record_review(&self.owner_id, word_id, outcome, Utc::now(), &self.conn)?;
        println!("Word {word_id}: {}", describe_schedule(&state));
        Ok(())
    }

    pub fn delete(&self, word_id: i64) -> Result<()> {
        db::delete_word(&self.owner_id, word_id, &self.conn)?;
        println!("Deleted word {word_id}");
        Ok(())
    }

    pub fn stats(&self) -> Result<()> {
        let stats = db::vocabulary_stats(&self.owner_id, Utc::now(), &self.conn)?;
        println!("Words:     {}", stats.total_words);
        println!("Due now:   {}", stats.due_words);
        println!("Mastered:  {}", stats.mastered_words);
        println!(
            "Reviews:   {} ({} correct, {} incorrect)",
            stats.total_reviews, stats.correct_reviews, stats.incorrect_reviews
        );
        println!("Accuracy:  {:.1}%", stats.accuracy() * 100.0);
        Ok(())
    }

    /// Runs an interactive study session over due words.
    ///
    /// For each word the definition is revealed after Enter, then the answer
    /// is read as `y <1-5>` or `n`. Words answered incorrectly come back in
    /// the next round. Stops early at end of input.
    pub fn study<R: BufRead, W: Write>(
        &self,
        limit: Option<usize>,
        input: &mut R,
        output: &mut W,
    ) -> Result<()> {
        let limit = limit.unwrap_or(self.default_due_limit);
        let due = db::words_due_for_review(&self.owner_id, Utc::now(), Some(limit), &self.conn)?;
        let mut session = StudySession::new_from_due_words(self.owner_id.clone(), due);

        if session.is_completed() {
            writeln!(output, "Nothing due for review.")?;
            return Ok(());
        }

        let mut line = String::new();
        let mut round = 0;
        while !session.is_completed() {
            if session.round_number != round {
                round = session.round_number;
                writeln!(output, "\n{}", session.phase_message())?;
            }
            let Some(card) = session.current_card() else {
                break;
            };
            write!(output, "\n{} ", card.entry.word)?;
            if let Some(pos) = &card.entry.part_of_speech {
                write!(output, "({pos}) ")?;
            }
            writeln!(output, "[Enter to reveal]")?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            session.toggle_definition();
            if let Some(card) = session.current_card() {
                writeln!(output, "  {}", card.entry.definition)?;
                if let Some(example) = &card.entry.example {
                    writeln!(output, "  e.g. {example}")?;
                }
            }

            let outcome = loop {
                write!(output, "Correct? [y <difficulty 1-5> / n]: ")?;
                output.flush()?;
                line.clear();
                if input.read_line(&mut line)? == 0 {
                    writeln!(output)?;
                    return Ok(());
                }
                match parse_answer(&line) {
                    Some(outcome) => break outcome,
                    None => writeln!(output, "Please answer like `y 4` or `n`.")?,
                }
            };

            session
                .grade_current_card(outcome, Utc::now(), &self.conn)
                .context("failed to record review")?;
            session.next_card();
        }

        if session.is_completed() {
            writeln!(output, "\nSession complete after {} round(s).", session.round_number)?;
        }
        Ok(())
    }

    pub fn export(&self, path: &Path) -> Result<()> {
        let list = db::export_word_list(&self.owner_id, &self.conn)?;
        export_json_to_path(&list, path)
            .with_context(|| format!("failed to export to {}", path.display()))?;
        println!("Exported {} word(s) to {}", list.len(), path.display());
        Ok(())
    }

    /// Imports a word list into the current owner's vocabulary, whatever
    /// owner the file was exported from.
    pub fn import(&self, path: &Path) -> Result<()> {
        let mut list =
            import_json(path).with_context(|| format!("failed to import {}", path.display()))?;
        list.owner_id = self.owner_id.clone();
        let added = db::import_word_list(&list, Utc::now(), &self.conn)?;
        println!(
            "Imported {added} new word(s) ({} skipped)",
            list.len() - added
        );
        Ok(())
    }
}
