//! Repository commands for the word list
//!
//! Every client operation is a `WordCommand` value run through `dispatch`.
//! Request bodies arrive as raw JSON so shape errors (an object where an
//! array is required, a non-object word) become input errors with a message
//! the client can show.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::words::{ImportMode, WordDraft, WordPatch, WordRecord, WordStorage, WordStorageError};

/// Error category reported to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Malformed or wrong-shaped request body
    InputError,
    /// The targeted id doesn't exist
    NotFound,
    /// The words file couldn't be read or written
    StorageError,
}

#[derive(Debug, Error, Serialize)]
#[error("{message}")]
pub struct CommandError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CommandError {
    pub fn input(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InputError,
            message: message.into(),
        }
    }
}

impl From<WordStorageError> for CommandError {
    fn from(err: WordStorageError) -> Self {
        let kind = match err {
            WordStorageError::NotFound(_) => ErrorKind::NotFound,
            WordStorageError::Io(_) | WordStorageError::Json(_) => ErrorKind::StorageError,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

/// A repository operation with its raw request payload
#[derive(Debug, Clone)]
pub enum WordCommand {
    List,
    /// One word by id
    Get { id: String },
    /// Body: one partial word object
    Add(Value),
    /// Body: a partial word object merged over the stored one
    Update { id: String, patch: Value },
    Delete { id: String },
    /// Body: an array of partial word objects
    BulkAdd(Value),
    /// Body: `{ "words": [...], "mode": "overwrite" | "merge" }`
    Import(Value),
    /// Full list as pretty JSON, for backups
    Export,
}

/// Result of a successful command, shaped as the JSON the client expects
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    Words(Vec<WordRecord>),
    Word(WordRecord),
    Deleted { success: bool },
    Added { count: usize },
    Imported { success: bool, count: usize },
    Export(String),
}

/// Run a command against the store
pub fn dispatch(storage: &WordStorage, command: WordCommand) -> CommandResult<CommandOutput> {
    log::debug!("Dispatching {:?}", command);

    match command {
        WordCommand::List => Ok(CommandOutput::Words(storage.list()?)),
        WordCommand::Get { id } => Ok(CommandOutput::Word(storage.get(&id)?)),
        WordCommand::Add(body) => {
            let draft: WordDraft = parse_object(body)?;
            Ok(CommandOutput::Word(storage.create(draft)?))
        }
        WordCommand::Update { id, patch } => {
            let patch: WordPatch = parse_object(patch)?;
            Ok(CommandOutput::Word(storage.update(&id, patch)?))
        }
        WordCommand::Delete { id } => {
            storage.delete(&id)?;
            Ok(CommandOutput::Deleted { success: true })
        }
        WordCommand::BulkAdd(body) => {
            let drafts = parse_drafts(body)?;
            let count = storage.bulk_create(drafts)?;
            Ok(CommandOutput::Added { count })
        }
        WordCommand::Import(body) => {
            let (records, mode) = parse_import(body)?;
            let count = storage.import(records, mode)?;
            Ok(CommandOutput::Imported {
                success: true,
                count,
            })
        }
        WordCommand::Export => {
            let words = storage.list()?;
            let json = serde_json::to_string_pretty(&words).map_err(|e| CommandError {
                kind: ErrorKind::StorageError,
                message: format!("Failed to serialize words: {}", e),
            })?;
            Ok(CommandOutput::Export(json))
        }
    }
}

fn parse_object<T: DeserializeOwned>(value: Value) -> CommandResult<T> {
    if !value.is_object() {
        return Err(CommandError::input("Word must be a JSON object"));
    }
    serde_json::from_value(value).map_err(|e| CommandError::input(format!("Invalid word: {}", e)))
}

fn parse_list<T: DeserializeOwned>(items: Vec<Value>) -> CommandResult<Vec<T>> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            parse_object(item).map_err(|e| CommandError::input(format!("Item {}: {}", i, e.message)))
        })
        .collect()
}

/// Bulk-add body: an array of partial words
fn parse_drafts(body: Value) -> CommandResult<Vec<WordDraft>> {
    match body {
        Value::Array(items) => parse_list(items),
        _ => Err(CommandError::input("Input must be an array")),
    }
}

/// Import body: `words` (or `records`) must be an array. A missing or
/// unknown `mode` means merge.
fn parse_import(body: Value) -> CommandResult<(Vec<WordRecord>, ImportMode)> {
    let Value::Object(mut body) = body else {
        return Err(CommandError::input("Invalid data format"));
    };

    let records = match body.remove("words").or_else(|| body.remove("records")) {
        Some(Value::Array(items)) => parse_list(items)?,
        _ => return Err(CommandError::input("Invalid data format")),
    };

    let mode = body
        .remove("mode")
        .and_then(|m| serde_json::from_value::<ImportMode>(m).ok())
        .unwrap_or_default();

    Ok((records, mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_storage() -> (WordStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = WordStorage::new(temp_dir.path().join("words.json"));
        (storage, temp_dir)
    }

    fn words(storage: &WordStorage) -> Vec<WordRecord> {
        match dispatch(storage, WordCommand::List).unwrap() {
            CommandOutput::Words(words) => words,
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[test]
    fn test_add_and_list() {
        let (storage, _temp) = create_test_storage();

        let output = dispatch(
            &storage,
            WordCommand::Add(json!({ "polish": "Test", "english": "Test", "category": "Testing" })),
        )
        .unwrap();
        let CommandOutput::Word(word) = output else {
            panic!("expected a word");
        };
        assert_eq!(word.polish(), "Test");
        assert_eq!(word.category(), Some("Testing"));

        assert_eq!(words(&storage).len(), 1);
    }

    #[test]
    fn test_add_rejects_non_object() {
        let (storage, _temp) = create_test_storage();
        let err = dispatch(&storage, WordCommand::Add(json!(["kot"]))).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InputError);
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let (storage, _temp) = create_test_storage();
        let err = dispatch(
            &storage,
            WordCommand::Update {
                id: "nope".to_string(),
                patch: json!({ "active": false }),
            },
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(words(&storage).is_empty());
    }

    #[test]
    fn test_delete_twice() {
        let (storage, _temp) = create_test_storage();
        let CommandOutput::Word(word) =
            dispatch(&storage, WordCommand::Add(json!({ "polish": "a", "english": "b" }))).unwrap()
        else {
            panic!("expected a word");
        };

        let id = word.id().unwrap().to_string();

        let output = dispatch(&storage, WordCommand::Delete { id: id.clone() }).unwrap();
        assert_eq!(serde_json::to_value(output).unwrap(), json!({ "success": true }));

        let err = dispatch(&storage, WordCommand::Delete { id }).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_bulk_add_requires_array() {
        let (storage, _temp) = create_test_storage();

        let err = dispatch(&storage, WordCommand::BulkAdd(json!({ "polish": "a" }))).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InputError);
        assert_eq!(err.message, "Input must be an array");

        let output = dispatch(
            &storage,
            WordCommand::BulkAdd(json!([
                { "polish": "Bulk1", "english": "Bulk1" },
                { "polish": "Bulk2", "english": "Bulk2" }
            ])),
        )
        .unwrap();
        assert_eq!(serde_json::to_value(output).unwrap(), json!({ "count": 2 }));
    }

    #[test]
    fn test_bulk_add_reports_bad_item() {
        let (storage, _temp) = create_test_storage();
        let err = dispatch(
            &storage,
            WordCommand::BulkAdd(json!([{ "polish": "ok" }, 42])),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InputError);
        assert!(err.message.starts_with("Item 1"));
        assert!(words(&storage).is_empty());
    }

    #[test]
    fn test_import_modes() {
        let (storage, _temp) = create_test_storage();
        dispatch(&storage, WordCommand::Add(json!({ "polish": "a", "english": "b" }))).unwrap();

        // No mode means merge
        let output = dispatch(
            &storage,
            WordCommand::Import(json!({ "words": [{ "id": "x", "polish": "c", "english": "d" }] })),
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(output).unwrap(),
            json!({ "success": true, "count": 2 })
        );

        let output = dispatch(
            &storage,
            WordCommand::Import(json!({
                "records": [{ "id": "y", "polish": "e", "english": "f" }],
                "mode": "overwrite"
            })),
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(output).unwrap(),
            json!({ "success": true, "count": 1 })
        );
        assert_eq!(words(&storage)[0].id(), Some("y"));
    }

    #[test]
    fn test_import_trusts_records_as_given() {
        let (storage, _temp) = create_test_storage();
        let records = json!([
            { "id": "a", "english": "cat", "polishType": null },
            { "id": 7, "english": "seven", "tags": "a,b", "active": "yes" }
        ]);

        let output = dispatch(
            &storage,
            WordCommand::Import(json!({ "words": records.clone(), "mode": "overwrite" })),
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(output).unwrap(),
            json!({ "success": true, "count": 2 })
        );
        assert_eq!(serde_json::to_value(words(&storage)).unwrap(), records);
    }

    #[test]
    fn test_get() {
        let (storage, _temp) = create_test_storage();
        let CommandOutput::Word(word) =
            dispatch(&storage, WordCommand::Add(json!({ "polish": "a", "english": "b" }))).unwrap()
        else {
            panic!("expected a word");
        };

        let output = dispatch(
            &storage,
            WordCommand::Get {
                id: word.id().unwrap().to_string(),
            },
        )
        .unwrap();
        assert_eq!(serde_json::to_value(output).unwrap(), serde_json::to_value(&word).unwrap());

        let err = dispatch(&storage, WordCommand::Get { id: "nope".to_string() }).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_import_requires_array() {
        let (storage, _temp) = create_test_storage();
        for body in [json!([]), json!({ "words": { "polish": "a" } }), json!({ "mode": "merge" })] {
            let err = dispatch(&storage, WordCommand::Import(body)).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InputError);
            assert_eq!(err.message, "Invalid data format");
        }
    }

    #[test]
    fn test_storage_error_kind() {
        let (storage, _temp) = create_test_storage();
        std::fs::write(storage.data_file(), "[oops").unwrap();
        let err = dispatch(&storage, WordCommand::List).unwrap_err();
        assert_eq!(err.kind, ErrorKind::StorageError);
    }

    #[test]
    fn test_export_is_pretty_json_list() {
        let (storage, _temp) = create_test_storage();
        dispatch(&storage, WordCommand::Add(json!({ "polish": "a", "english": "b" }))).unwrap();

        let CommandOutput::Export(json) = dispatch(&storage, WordCommand::Export).unwrap() else {
            panic!("expected export text");
        };
        assert!(json.starts_with("[\n  {"));
        let parsed: Vec<WordRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, words(&storage));
    }
}
