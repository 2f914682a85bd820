//! Management view filter over the full word list

use serde::{Deserialize, Serialize};

use super::session::Selection;
use crate::words::WordRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    fn matches(self, word: &WordRecord) -> bool {
        match self {
            Self::All => true,
            Self::Active => word.is_active(),
            Self::Inactive => !word.is_active(),
        }
    }
}

/// Search text, category and status. Inactive words are included.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManageFilter {
    pub search: String,
    pub category: Selection,
    pub status: StatusFilter,
}

impl ManageFilter {
    /// Case-insensitive substring match on either language
    fn matches_search(&self, needle: &str, word: &WordRecord) -> bool {
        needle.is_empty()
            || word.polish().to_lowercase().contains(needle)
            || word.english().to_lowercase().contains(needle)
    }

    pub fn apply<'a>(&self, words: &'a [WordRecord]) -> Vec<&'a WordRecord> {
        let needle = self.search.to_lowercase();
        words
            .iter()
            .filter(|w| {
                self.matches_search(&needle, w)
                    && self.category.matches(w.category())
                    && self.status.matches(w)
            })
            .collect()
    }
}

/// Distinct categories across all words, first-seen order
pub fn category_options(words: &[WordRecord]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for word in words {
        let category = word.category_or_default();
        if !categories.iter().any(|c| c == category) {
            categories.push(category.to_string());
        }
    }
    categories
}
