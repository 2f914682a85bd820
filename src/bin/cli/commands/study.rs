//! Line-based study loop over a `StudySession`

use std::io::{BufRead, Write};

use anyhow::Result;

use fiszki_lib::study::{study_options, Direction, Selection, StudyFilter, StudySession};

use crate::app::App;
use crate::render::terminal::render_card;

const HELP: &str = "n next, p prev, f or Enter flip, s shuffle, d direction, \
c <category|all>, t <tag|all>, r reload, q quit";

#[derive(Debug, PartialEq, Eq)]
enum StudyInput {
    Next,
    Prev,
    Flip,
    Shuffle,
    ToggleDirection,
    Category(Selection),
    Tag(Selection),
    Reload,
    Help,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> StudyInput {
    let line = line.trim();
    let (cmd, arg) = match line.split_once(' ') {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (line, ""),
    };

    match cmd {
        "" | "f" => StudyInput::Flip,
        "n" => StudyInput::Next,
        "p" => StudyInput::Prev,
        "s" => StudyInput::Shuffle,
        "d" => StudyInput::ToggleDirection,
        "c" => StudyInput::Category(Selection::parse(arg)),
        "t" => StudyInput::Tag(Selection::parse(arg)),
        "r" => StudyInput::Reload,
        "h" | "?" => StudyInput::Help,
        "q" => StudyInput::Quit,
        other => StudyInput::Unknown(other.to_string()),
    }
}

pub fn run(
    app: &App,
    category: Option<&str>,
    tag: Option<&str>,
    direction: Option<Direction>,
    shuffle: bool,
    use_color: bool,
) -> Result<()> {
    let mut words = app.list_words()?;
    let filter = StudyFilter {
        category: category.map(Selection::parse).unwrap_or_default(),
        tag: tag.map(Selection::parse).unwrap_or_default(),
    };
    let direction = direction.unwrap_or(app.config.study.direction);

    let mut session = StudySession::new(&words, filter, direction);
    let mut rng = rand::thread_rng();
    if shuffle {
        session.shuffle(&mut rng);
    }

    let options = study_options(&words);
    println!("Direction: {}", session.direction());
    if !options.categories.is_empty() {
        println!("Categories: {}", options.categories.join(", "));
    }
    if !options.tags.is_empty() {
        println!("Tags: {}", options.tags.join(", "));
    }
    println!("{}\n", HELP);

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        println!("{}", render_card(&session.view(), use_color));
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };

        match parse_input(&line?) {
            StudyInput::Next => {
                session.next();
            }
            StudyInput::Prev => {
                session.prev();
            }
            StudyInput::Flip => session.flip(),
            StudyInput::Shuffle => session.shuffle(&mut rng),
            StudyInput::ToggleDirection => {
                let direction = session.toggle_direction();
                println!("Direction: {}", direction);
            }
            StudyInput::Category(selection) => session.set_category(&words, selection),
            StudyInput::Tag(selection) => session.set_tag(&words, selection),
            StudyInput::Reload => {
                words = app.list_words()?;
                session.reload(&words);
            }
            StudyInput::Help => println!("{}", HELP),
            StudyInput::Quit => break,
            StudyInput::Unknown(cmd) => println!("Unknown command '{}'. {}", cmd, HELP),
        }
        println!();
    }

    Ok(())
}
