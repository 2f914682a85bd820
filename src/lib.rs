pub mod commands;
pub mod config;
pub mod server;
pub mod study;
pub mod words;

pub use commands::{dispatch, CommandError, CommandOutput, WordCommand};
pub use config::Config;
pub use words::{WordRecord, WordStorage};
