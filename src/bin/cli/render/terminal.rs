use fiszki_lib::study::{CardFace, CardView};
use fiszki_lib::words::WordRecord;

/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const ITALIC: &str = "\x1b[3m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// One-line summary used by the word list and add/update output
pub fn render_word_line(word: &WordRecord, use_color: bool) -> String {
    let mut line = format!("{} - {}", paint(word.polish(), Color::BOLD, use_color), word.english());
    if let Some(category) = word.category() {
        line.push_str(&format!(" [{}]", category));
    }
    let tags = word.tags();
    if !tags.is_empty() {
        let tags = tags.iter().map(|t| format!("#{}", t)).collect::<Vec<_>>().join(" ");
        line.push_str(&format!(" {}", paint(&tags, Color::CYAN, use_color)));
    }
    if !word.is_active() {
        line.push_str(&format!(" {}", paint("(inactive)", Color::GRAY, use_color)));
    }
    line
}

/// Lines for one card face: the word, its annotations and tags
fn render_face(face: &CardFace, use_color: bool) -> Vec<String> {
    let mut lines = vec![format!("    {}", paint(&face.word, Color::BOLD, use_color))];

    let details: Vec<&str> = [face.word_type.as_deref(), face.pronunciation.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();
    if !details.is_empty() {
        lines.push(format!("    {}", paint(&details.join("  "), Color::GRAY, use_color)));
    }

    if let Some(example) = face.example.as_deref().filter(|e| !e.is_empty()) {
        lines.push(format!("    {}", paint(example, Color::ITALIC, use_color)));
    }

    if !face.tags.is_empty() {
        let tags = face.tags.iter().map(|t| format!("#{}", t)).collect::<Vec<_>>().join(" ");
        lines.push(format!("    {}", paint(&tags, Color::CYAN, use_color)));
    }

    lines
}

/// Render the study view: the front always, the back once flipped
pub fn render_card(view: &CardView, use_color: bool) -> String {
    let mut lines = vec![paint(&view.progress(), Color::YELLOW, use_color)];

    match view {
        CardView::Empty => {
            lines.push(format!("    {}", paint("No words found", Color::BOLD, use_color)));
            lines.push("    Try changing filters".to_string());
        }
        CardView::Card { front, back, flipped, .. } => {
            lines.extend(render_face(front, use_color));
            lines.push(format!("    {}", "\u{2500}".repeat(24)));
            if *flipped {
                lines.extend(render_face(back, use_color));
            } else {
                lines.push(format!("    {}", paint("(f to flip)", Color::GRAY, use_color)));
            }
        }
    }

    lines.join("\n")
}
