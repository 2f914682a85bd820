//! Client-side views derived from the word list
//!
//! - `session`: the study deck, card faces and navigation
//! - `manage`: the filter behind the word management list

pub mod manage;
pub mod session;

pub use manage::{category_options, ManageFilter, StatusFilter};
pub use session::{
    derive_deck, project, study_options, CardFace, CardView, Direction, Selection, StudyFilter,
    StudyOptions, StudySession,
};
