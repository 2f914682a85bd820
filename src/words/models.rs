//! Data models for the word list

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Category given to new words that don't name one
pub const DEFAULT_CATEGORY: &str = "General";

/// One bilingual vocabulary entry as stored in the words file.
///
/// The record is the JSON object itself. Records written by
/// `create`/`bulk_create` always carry `id`, `category`, `tags` and `active`;
/// imported records are kept exactly as supplied, including keys of the
/// wrong type, explicit nulls and missing keys. The accessors read known
/// keys leniently: a value of the wrong type reads as absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordRecord(Map<String, Value>);

impl WordRecord {
    /// Build a new record from a draft, assigning a fresh id and filling in
    /// `active`, `tags` and `category` when the draft leaves them out.
    pub fn from_draft(draft: WordDraft) -> Self {
        let mut record = Self(draft.extra);
        record.set("id", Uuid::new_v4().to_string());
        record.set("polish", draft.polish.unwrap_or_default());
        record.set("english", draft.english.unwrap_or_default());

        let annotations = [
            ("polishType", draft.polish_type),
            ("englishType", draft.english_type),
            ("polishPronunciation", draft.polish_pronunciation),
            ("englishPronunciation", draft.english_pronunciation),
            ("polishExample", draft.polish_example),
            ("englishExample", draft.english_example),
        ];
        for (key, value) in annotations {
            if let Some(value) = value {
                record.set(key, value);
            }
        }

        record.set(
            "category",
            draft
                .category
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        );
        record.set("tags", draft.tags.unwrap_or_default());
        record.set("active", draft.active.unwrap_or(true));
        record
    }

    /// Shallow-merge a patch over this record. Keys absent from the patch
    /// keep their value; the id never changes. A cleared annotation is
    /// stored as `null`.
    pub fn apply_patch(&mut self, patch: WordPatch) {
        if let Some(polish) = patch.polish {
            self.set("polish", polish);
        }
        if let Some(english) = patch.english {
            self.set("english", english);
        }

        let nullable = [
            ("polishType", patch.polish_type),
            ("englishType", patch.english_type),
            ("polishPronunciation", patch.polish_pronunciation),
            ("englishPronunciation", patch.english_pronunciation),
            ("polishExample", patch.polish_example),
            ("englishExample", patch.english_example),
            ("category", patch.category),
        ];
        for (key, value) in nullable {
            if let Some(value) = value {
                self.set(key, value);
            }
        }

        if let Some(tags) = patch.tags {
            self.set("tags", tags);
        }
        if let Some(active) = patch.active {
            self.set("active", active);
        }
        for (key, value) in patch.extra {
            if key != "id" {
                self.0.insert(key, value);
            }
        }
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Raw value of any key, known or not
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// The id, when it is a string. Update and delete only match string ids.
    pub fn id(&self) -> Option<&str> {
        self.text("id")
    }

    pub fn polish(&self) -> &str {
        self.text("polish").unwrap_or_default()
    }

    pub fn english(&self) -> &str {
        self.text("english").unwrap_or_default()
    }

    pub fn polish_type(&self) -> Option<&str> {
        self.text("polishType")
    }

    pub fn english_type(&self) -> Option<&str> {
        self.text("englishType")
    }

    pub fn polish_pronunciation(&self) -> Option<&str> {
        self.text("polishPronunciation")
    }

    pub fn english_pronunciation(&self) -> Option<&str> {
        self.text("englishPronunciation")
    }

    pub fn polish_example(&self) -> Option<&str> {
        self.text("polishExample")
    }

    pub fn english_example(&self) -> Option<&str> {
        self.text("englishExample")
    }

    pub fn category(&self) -> Option<&str> {
        self.text("category")
    }

    /// Category for option lists; records without one are grouped as "General"
    pub fn category_or_default(&self) -> &str {
        self.category().unwrap_or(DEFAULT_CATEGORY)
    }

    /// String tags; anything but an array of strings reads as no tags
    pub fn tags(&self) -> Vec<&str> {
        match self.0.get("tags") {
            Some(Value::Array(tags)) => tags.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().contains(&tag)
    }

    /// Missing `active` counts as inactive
    pub fn is_active(&self) -> bool {
        self.0.get("active") == Some(&Value::Bool(true))
    }
}

/// A partial record used for add and bulk-add. Every field may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WordDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polish: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub english: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polish_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub english_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polish_pronunciation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub english_pronunciation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polish_example: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub english_example: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WordDraft {
    pub fn new(polish: impl Into<String>, english: impl Into<String>) -> Self {
        Self {
            polish: Some(polish.into()),
            english: Some(english.into()),
            ..Default::default()
        }
    }
}

/// A partial update. `None` = don't change, `Some(None)` = clear (JSON null),
/// `Some(Some(v))` = set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WordPatch {
    pub polish: Option<String>,
    pub english: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub polish_type: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub english_type: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub polish_pronunciation: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub english_pronunciation: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub polish_example: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub english_example: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub active: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// How imported records combine with the existing list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Replace the whole list
    Overwrite,
    /// Append after the existing records, no deduplication
    #[default]
    #[serde(other)]
    Merge,
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overwrite => write!(f, "overwrite"),
            Self::Merge => write!(f, "merge"),
        }
    }
}
