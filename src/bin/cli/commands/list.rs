use anyhow::Result;

use fiszki_lib::study::{category_options, ManageFilter, Selection, StatusFilter};

use crate::app::App;
use crate::render::terminal::Color;
use crate::OutputFormat;

pub fn run(
    app: &App,
    search: Option<&str>,
    category: Option<&str>,
    status: StatusFilter,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let words = app.list_words()?;
    let filter = ManageFilter {
        search: search.unwrap_or_default().to_string(),
        category: category.map(Selection::parse).unwrap_or_default(),
        status,
    };
    let filtered = filter.apply(&words);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&filtered)?);
        }
        OutputFormat::Plain => {
            if filtered.is_empty() {
                println!("No words found.");
                if !words.is_empty() {
                    println!("Categories: {}", category_options(&words).join(", "));
                }
                return Ok(());
            }

            let word_width = filtered
                .iter()
                .map(|w| w.polish().chars().count() + w.english().chars().count() + 3)
                .max()
                .unwrap_or(4)
                .min(40)
                .max(4);
            let category_width = 14;
            let tags_width = 20;

            println!(
                "{:<ww$} {:<cw$} {:<tw$} {:<8} ID",
                "Word", "Category", "Tags", "Status",
                ww = word_width, cw = category_width, tw = tags_width
            );
            println!(
                "{} {} {} {} {}",
                "\u{2500}".repeat(word_width),
                "\u{2500}".repeat(category_width),
                "\u{2500}".repeat(tags_width),
                "\u{2500}".repeat(8),
                "\u{2500}".repeat(36)
            );

            for word in &filtered {
                let pair = truncate(&format!("{} - {}", word.polish(), word.english()), word_width);
                let category = truncate(word.category().unwrap_or_default(), category_width);
                let tags = truncate(&word.tags().join(", "), tags_width);
                let status = if word.is_active() { "Active" } else { "Inactive" };

                let line = format!(
                    "{:<ww$} {:<cw$} {:<tw$} {:<8} {}",
                    pair, category, tags, status, word.id().unwrap_or("-"),
                    ww = word_width, cw = category_width, tw = tags_width
                );
                if use_color && !word.is_active() {
                    println!("{}{}{}", Color::DIM, line, Color::RESET);
                } else {
                    println!("{}", line);
                }
            }

            println!("\n{} of {} words", filtered.len(), words.len());
        }
    }

    Ok(())
}

/// Cut to `width` characters, marking the cut with "..."
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
