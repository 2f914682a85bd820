//! Word list for fiszki
//!
//! This module provides:
//! - The persisted `WordRecord` model and its draft/patch shapes
//! - `WordStorage`, the single writer of the words file

pub mod models;
pub mod storage;

pub use models::*;
pub use storage::{WordStorage, WordStorageError};
