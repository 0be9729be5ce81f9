//! JSON import/export of word lists.
//! Saves and loads an owner's WordList to/from JSON files.

use crate::error::Result;
use crate::models::WordList;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

/// Exports a word list to a pretty-printed JSON file at the specified path.
pub fn export_json_to_path(list: &WordList, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json_string = serde_json::to_string_pretty(list)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;

    info!(owner_id = %list.owner_id, words = list.len(), path = %path.display(), "exported word list");
    Ok(())
}

/// Imports a word list from a JSON file.
/// Returns an error if the file doesn't exist or contains invalid JSON.
pub fn import_json(path: impl AsRef<Path>) -> Result<WordList> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let list: WordList = serde_json::from_str(&contents)?;

    info!(owner_id = %list.owner_id, words = list.len(), path = %path.display(), "read word list");
    Ok(list)
}
