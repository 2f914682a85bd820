//! Study session: deck derivation, card projection and navigation
//!
//! The deck is recomputed from the full word list whenever the list is
//! reloaded or a filter changes. Nothing here touches storage.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::words::WordRecord;

/// A filter axis: everything, or one exact value
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// `"all"` (or an empty string) selects everything
    pub fn parse(value: &str) -> Self {
        if value.is_empty() || value == "all" {
            Self::All
        } else {
            Self::Only(value.to_string())
        }
    }

    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => value == Some(wanted.as_str()),
        }
    }
}

/// Which language is on the front of the card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "pl-en")]
    PolishToEnglish,
    #[serde(rename = "en-pl")]
    EnglishToPolish,
}

impl Direction {
    pub fn toggled(self) -> Self {
        match self {
            Self::PolishToEnglish => Self::EnglishToPolish,
            Self::EnglishToPolish => Self::PolishToEnglish,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PolishToEnglish => write!(f, "pl-en"),
            Self::EnglishToPolish => write!(f, "en-pl"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pl-en" => Ok(Self::PolishToEnglish),
            "en-pl" => Ok(Self::EnglishToPolish),
            other => Err(format!("unknown direction '{}', expected pl-en or en-pl", other)),
        }
    }
}

/// Study filters: category and tag
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyFilter {
    pub category: Selection,
    pub tag: Selection,
}

impl StudyFilter {
    pub fn matches(&self, word: &WordRecord) -> bool {
        let matches_tag = match &self.tag {
            Selection::All => true,
            Selection::Only(tag) => word.has_tag(tag),
        };
        word.is_active() && self.category.matches(word.category()) && matches_tag
    }
}

/// Active words passing the filter, in source order
pub fn derive_deck(words: &[WordRecord], filter: &StudyFilter) -> Vec<WordRecord> {
    words.iter().filter(|w| filter.matches(w)).cloned().collect()
}

/// Values offered by the study filter dropdowns
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyOptions {
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

/// Distinct categories and tags of active words, in first-seen order
pub fn study_options(words: &[WordRecord]) -> StudyOptions {
    let mut options = StudyOptions::default();
    for word in words.iter().filter(|w| w.is_active()) {
        let category = word.category_or_default();
        if !options.categories.iter().any(|c| c == category) {
            options.categories.push(category.to_string());
        }
        for tag in word.tags() {
            if !options.tags.iter().any(|t| t == tag) {
                options.tags.push(tag.to_string());
            }
        }
    }
    options
}

/// One side of a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardFace {
    pub word: String,
    pub word_type: Option<String>,
    pub pronunciation: Option<String>,
    pub example: Option<String>,
    pub tags: Vec<String>,
}

impl CardFace {
    fn polish(word: &WordRecord) -> Self {
        Self {
            word: word.polish().to_string(),
            word_type: word.polish_type().map(str::to_string),
            pronunciation: word.polish_pronunciation().map(str::to_string),
            example: word.polish_example().map(str::to_string),
            tags: owned_tags(word),
        }
    }

    fn english(word: &WordRecord) -> Self {
        Self {
            word: word.english().to_string(),
            word_type: word.english_type().map(str::to_string),
            pronunciation: word.english_pronunciation().map(str::to_string),
            example: word.english_example().map(str::to_string),
            tags: owned_tags(word),
        }
    }
}

fn owned_tags(word: &WordRecord) -> Vec<String> {
    word.tags().into_iter().map(str::to_string).collect()
}

/// Front and back of a word for the given direction
pub fn project(word: &WordRecord, direction: Direction) -> (CardFace, CardFace) {
    match direction {
        Direction::PolishToEnglish => (CardFace::polish(word), CardFace::english(word)),
        Direction::EnglishToPolish => (CardFace::english(word), CardFace::polish(word)),
    }
}

/// What the study view shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum CardView {
    /// No card matches the filters
    Empty,
    Card {
        front: CardFace,
        back: CardFace,
        /// Zero-based cursor
        index: usize,
        total: usize,
        flipped: bool,
    },
}

impl CardView {
    pub fn progress(&self) -> String {
        match self {
            Self::Empty => "0 of 0".to_string(),
            Self::Card { index, total, .. } => format!("Card {} of {}", index + 1, total),
        }
    }
}

/// Explicit study state: filters, direction, deck and cursor
#[derive(Debug, Clone, Default)]
pub struct StudySession {
    filter: StudyFilter,
    direction: Direction,
    deck: Vec<WordRecord>,
    index: usize,
    flipped: bool,
}

impl StudySession {
    pub fn new(words: &[WordRecord], filter: StudyFilter, direction: Direction) -> Self {
        let deck = derive_deck(words, &filter);
        Self {
            filter,
            direction,
            deck,
            index: 0,
            flipped: false,
        }
    }

    pub fn filter(&self) -> &StudyFilter {
        &self.filter
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn deck(&self) -> &[WordRecord] {
        &self.deck
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Recompute the deck after the word list was refetched. The cursor is
    /// kept unless it no longer points into the deck. Filter values that no
    /// longer exist among active words fall back to `All`.
    pub fn reload(&mut self, words: &[WordRecord]) {
        let options = study_options(words);
        if let Selection::Only(category) = &self.filter.category {
            if !options.categories.contains(category) {
                self.filter.category = Selection::All;
            }
        }
        if let Selection::Only(tag) = &self.filter.tag {
            if !options.tags.contains(tag) {
                self.filter.tag = Selection::All;
            }
        }

        self.deck = derive_deck(words, &self.filter);
        if self.index >= self.deck.len() {
            self.index = 0;
        }
        self.flipped = false;
    }

    pub fn set_category(&mut self, words: &[WordRecord], category: Selection) {
        self.filter.category = category;
        self.refilter(words);
    }

    pub fn set_tag(&mut self, words: &[WordRecord], tag: Selection) {
        self.filter.tag = tag;
        self.refilter(words);
    }

    fn refilter(&mut self, words: &[WordRecord]) {
        self.deck = derive_deck(words, &self.filter);
        self.index = 0;
        self.flipped = false;
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
        self.flipped = false;
    }

    pub fn toggle_direction(&mut self) -> Direction {
        self.set_direction(self.direction.toggled());
        self.direction
    }

    /// Move forward; a no-op on the last card
    pub fn next(&mut self) -> bool {
        if self.index + 1 < self.deck.len() {
            self.index += 1;
            self.flipped = false;
            true
        } else {
            false
        }
    }

    /// Move back; a no-op on the first card
    pub fn prev(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            self.flipped = false;
            true
        } else {
            false
        }
    }

    pub fn flip(&mut self) {
        if !self.deck.is_empty() {
            self.flipped = !self.flipped;
        }
    }

    /// Uniformly permute the deck and go back to the first card
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.deck.shuffle(rng);
        self.index = 0;
        self.flipped = false;
    }

    pub fn has_prev(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.deck.len()
    }

    pub fn view(&self) -> CardView {
        match self.deck.get(self.index) {
            None => CardView::Empty,
            Some(word) => {
                let (front, back) = project(word, self.direction);
                CardView::Card {
                    front,
                    back,
                    index: self.index,
                    total: self.deck.len(),
                    flipped: self.flipped,
                }
            }
        }
    }
}
