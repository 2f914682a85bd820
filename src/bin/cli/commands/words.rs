use anyhow::Result;
use serde_json::Value;

use fiszki_lib::words::{WordDraft, WordRecord};

use crate::app::App;
use crate::render::terminal::render_word_line;
use crate::OutputFormat;

fn print_word(word: &WordRecord, heading: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(word)?),
        OutputFormat::Plain => {
            println!("{}", heading);
            println!("  {}", render_word_line(word, use_color));
            println!("  ID: {}", word.id().unwrap_or("-"));
        }
    }
    Ok(())
}

pub fn run_show(app: &App, id: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let word = app.get_word(id)?;
    print_word(&word, "Word:", format, use_color)
}

pub fn run_add(app: &App, draft: WordDraft, format: &OutputFormat, use_color: bool) -> Result<()> {
    let word = app.add_word(draft)?;
    print_word(&word, "Added word:", format, use_color)
}

pub fn run_update(
    app: &App,
    id: &str,
    patch: Value,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let word = app.update_word(id, patch)?;
    print_word(&word, "Updated word:", format, use_color)
}

pub fn run_delete(app: &App, id: &str, format: &OutputFormat) -> Result<()> {
    app.delete_word(id)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "success": true })),
        OutputFormat::Plain => println!("Deleted word {}", id),
    }
    Ok(())
}
