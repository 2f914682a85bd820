//! Bulk add, import and export of JSON word files

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use fiszki_lib::words::ImportMode;

use crate::app::App;
use crate::OutputFormat;

/// Read JSON from a file, or from stdin for "-"
fn read_json(source: &str) -> Result<Value> {
    let text = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))?
    };

    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", source))
}

pub fn run_bulk(app: &App, source: &str, format: &OutputFormat) -> Result<()> {
    let words = read_json(source)?;
    let count = app.bulk_add(words)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "count": count })),
        OutputFormat::Plain => println!("Added {} words", count),
    }
    Ok(())
}

pub fn run_import(app: &App, source: &str, mode: ImportMode, format: &OutputFormat) -> Result<()> {
    let words = read_json(source)?;
    let count = app.import_words(words, mode)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "success": true, "count": count }))
        }
        OutputFormat::Plain => println!("Import successful ({}): {} words stored", mode, count),
    }
    Ok(())
}

pub fn run_export(app: &App, target: Option<&Path>) -> Result<()> {
    let json = app.export_words()?;

    match target {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Exported words to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
