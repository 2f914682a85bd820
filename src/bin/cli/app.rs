use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde_json::Value;

use fiszki_lib::words::{ImportMode, WordDraft, WordRecord, WordStorage};
use fiszki_lib::{dispatch, CommandOutput, Config, WordCommand};

/// Shared application state for CLI commands
pub struct App {
    pub config: Config,
    pub storage: Arc<WordStorage>,
}

impl App {
    /// Load config and open the words file
    pub fn new(config_path: Option<&Path>, data_file: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::load(config_path).context("Failed to load config")?;
        if let Some(path) = data_file {
            config.storage.data_file = Some(path);
        }

        let storage = Arc::new(
            config
                .storage
                .open()
                .context("Failed to locate the words file")?,
        );
        log::debug!("Using words file {:?}", storage.data_file());

        Ok(Self { config, storage })
    }

    fn run(&self, command: WordCommand) -> Result<CommandOutput> {
        Ok(dispatch(&self.storage, command)?)
    }

    /// List all words
    pub fn list_words(&self) -> Result<Vec<WordRecord>> {
        match self.run(WordCommand::List).context("Failed to list words")? {
            CommandOutput::Words(words) => Ok(words),
            other => bail!("Unexpected response to list: {:?}", other),
        }
    }

    /// One word by id
    pub fn get_word(&self, id: &str) -> Result<WordRecord> {
        let command = WordCommand::Get { id: id.to_string() };
        match self.run(command).context("Failed to get word")? {
            CommandOutput::Word(word) => Ok(word),
            other => bail!("Unexpected response to get: {:?}", other),
        }
    }

    /// Add one word
    pub fn add_word(&self, draft: WordDraft) -> Result<WordRecord> {
        let body = serde_json::to_value(draft)?;
        match self.run(WordCommand::Add(body)).context("Failed to add word")? {
            CommandOutput::Word(word) => Ok(word),
            other => bail!("Unexpected response to add: {:?}", other),
        }
    }

    /// Merge a patch into a word
    pub fn update_word(&self, id: &str, patch: Value) -> Result<WordRecord> {
        let command = WordCommand::Update {
            id: id.to_string(),
            patch,
        };
        match self.run(command).context("Failed to update word")? {
            CommandOutput::Word(word) => Ok(word),
            other => bail!("Unexpected response to update: {:?}", other),
        }
    }

    /// Delete a word
    pub fn delete_word(&self, id: &str) -> Result<()> {
        self.run(WordCommand::Delete { id: id.to_string() })
            .context("Failed to delete word")?;
        Ok(())
    }

    /// Add every word in a JSON array; returns how many were added
    pub fn bulk_add(&self, words: Value) -> Result<usize> {
        match self.run(WordCommand::BulkAdd(words)).context("Failed to bulk add")? {
            CommandOutput::Added { count } => Ok(count),
            other => bail!("Unexpected response to bulk add: {:?}", other),
        }
    }

    /// Import records; returns the total count afterwards
    pub fn import_words(&self, words: Value, mode: ImportMode) -> Result<usize> {
        let body = serde_json::json!({ "words": words, "mode": mode });
        match self.run(WordCommand::Import(body)).context("Failed to import")? {
            CommandOutput::Imported { count, .. } => Ok(count),
            other => bail!("Unexpected response to import: {:?}", other),
        }
    }

    /// Full list as pretty JSON
    pub fn export_words(&self) -> Result<String> {
        match self.run(WordCommand::Export).context("Failed to export words")? {
            CommandOutput::Export(json) => Ok(json),
            other => bail!("Unexpected response to export: {:?}", other),
        }
    }
}
