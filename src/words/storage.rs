//! Storage operations for the word list
//!
//! All words live in one pretty-printed JSON array. Every mutation reads the
//! whole array, changes it in memory and writes it back, holding the store's
//! write lock for the full cycle. Writes go to `words.json.tmp` first and are
//! renamed over the data file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use super::models::*;

#[derive(Error, Debug)]
pub enum WordStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Word not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, WordStorageError>;

/// Storage manager for the word list
pub struct WordStorage {
    data_file: PathBuf,
    /// Return an empty list instead of an error when the file can't be read
    lenient_reads: bool,
    write_lock: Mutex<()>,
}

impl WordStorage {
    pub fn new(data_file: PathBuf) -> Self {
        Self {
            data_file,
            lenient_reads: false,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_lenient_reads(mut self, lenient: bool) -> Self {
        self.lenient_reads = lenient;
        self
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    fn tmp_path(&self) -> PathBuf {
        self.data_file.with_extension("json.tmp")
    }

    /// Read the whole list. A missing file is an empty list.
    fn read_words(&self) -> Result<Vec<WordRecord>> {
        if !self.data_file.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.data_file)?;
        let words: Vec<WordRecord> = serde_json::from_str(&content)?;
        Ok(words)
    }

    /// Write the whole list via a temp file so a failed write leaves the old
    /// content in place.
    fn write_words(&self, words: &[WordRecord]) -> Result<()> {
        if let Some(parent) = self.data_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.tmp_path();
        let json = serde_json::to_string_pretty(words)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.data_file)?;
        Ok(())
    }

    /// Run one read-modify-write cycle under the write lock. Nothing is
    /// written if the read or `f` fails.
    fn transact<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<WordRecord>) -> Result<T>,
    {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut words = self.read_words()?;
        let result = f(&mut words)?;
        self.write_words(&words)?;
        Ok(result)
    }

    // ==================== Read Operations ====================

    /// List all words, in insertion order
    pub fn list(&self) -> Result<Vec<WordRecord>> {
        match self.read_words() {
            Ok(words) => Ok(words),
            Err(e) if self.lenient_reads => {
                log::warn!(
                    "Failed to read {:?}, returning an empty list: {}",
                    self.data_file,
                    e
                );
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Get a specific word
    pub fn get(&self, id: &str) -> Result<WordRecord> {
        self.list()?
            .into_iter()
            .find(|w| w.id() == Some(id))
            .ok_or_else(|| WordStorageError::NotFound(id.to_string()))
    }

    // ==================== Write Operations ====================

    /// Create a new word with a fresh id and defaults applied
    pub fn create(&self, draft: WordDraft) -> Result<WordRecord> {
        let record = WordRecord::from_draft(draft);

        self.transact(|words| {
            words.push(record.clone());
            Ok(())
        })?;

        log::info!(
            "Created word {} ({} - {})",
            record.id().unwrap_or_default(),
            record.polish(),
            record.english()
        );
        Ok(record)
    }

    /// Merge a patch into an existing word
    pub fn update(&self, id: &str, patch: WordPatch) -> Result<WordRecord> {
        let updated = self.transact(|words| {
            let word = words
                .iter_mut()
                .find(|w| w.id() == Some(id))
                .ok_or_else(|| WordStorageError::NotFound(id.to_string()))?;

            word.apply_patch(patch);
            Ok(word.clone())
        })?;

        log::debug!("Updated word {}", id);
        Ok(updated)
    }

    /// Delete a word. Deleting an id that isn't stored is an error.
    pub fn delete(&self, id: &str) -> Result<()> {
        self.transact(|words| {
            let initial_len = words.len();
            words.retain(|w| w.id() != Some(id));

            if words.len() == initial_len {
                return Err(WordStorageError::NotFound(id.to_string()));
            }
            Ok(())
        })?;

        log::info!("Deleted word {}", id);
        Ok(())
    }

    /// Append several new words in one write. Each draft gets its own id
    /// and defaults, exactly as with `create`.
    pub fn bulk_create(&self, drafts: Vec<WordDraft>) -> Result<usize> {
        let records: Vec<WordRecord> = drafts.into_iter().map(WordRecord::from_draft).collect();
        let count = records.len();

        self.transact(|words| {
            words.extend(records);
            Ok(())
        })?;

        log::info!("Bulk-added {} words", count);
        Ok(count)
    }

    /// Import records as-is: no id generation, no defaults, no
    /// deduplication. Returns the number of stored records afterwards.
    pub fn import(&self, records: Vec<WordRecord>, mode: ImportMode) -> Result<usize> {
        let total = match mode {
            ImportMode::Overwrite => {
                // The existing file is never read, so a corrupt file can be
                // restored from a backup.
                let _guard = self
                    .write_lock
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                self.write_words(&records)?;
                records.len()
            }
            ImportMode::Merge => self.transact(|words| {
                words.extend(records);
                Ok(words.len())
            })?,
        };

        log::info!("Imported words ({}), {} total", mode, total);
        Ok(total)
    }
}
