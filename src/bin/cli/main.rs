mod app;
mod commands;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fiszki_lib::study::{Direction, StatusFilter};
use fiszki_lib::words::ImportMode;

#[derive(Parser)]
#[command(name = "fiszki-cli", about = "Vocabulary flashcards: server, word list and study", version)]
struct Cli {
    /// Config file (default: <config dir>/fiszki/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Words file, overriding the configured one
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum StatusArg {
    All,
    Active,
    Inactive,
}

impl From<StatusArg> for StatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::All => StatusFilter::All,
            StatusArg::Active => StatusFilter::Active,
            StatusArg::Inactive => StatusFilter::Inactive,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum ModeArg {
    Overwrite,
    Merge,
}

impl From<ModeArg> for ImportMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Overwrite => ImportMode::Overwrite,
            ModeArg::Merge => ImportMode::Merge,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server until Ctrl-C
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Directory with the browser UI
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// List words, with the management filters
    List {
        /// Case-insensitive text matched against both languages
        #[arg(long)]
        search: Option<String>,
        /// Category name, or "all"
        #[arg(long)]
        category: Option<String>,
        #[arg(long, value_enum, default_value = "all")]
        status: StatusArg,
    },

    /// Show one word
    Show { id: String },

    /// Add a word
    Add {
        #[arg(long)]
        polish: String,
        #[arg(long)]
        english: String,
        #[arg(long)]
        category: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        polish_type: Option<String>,
        #[arg(long)]
        english_type: Option<String>,
        #[arg(long)]
        polish_pronunciation: Option<String>,
        #[arg(long)]
        english_pronunciation: Option<String>,
        #[arg(long)]
        polish_example: Option<String>,
        #[arg(long)]
        english_example: Option<String>,
        /// Store the word as inactive (excluded from study)
        #[arg(long)]
        inactive: bool,
    },

    /// Change fields of an existing word
    Update {
        id: String,
        #[arg(long)]
        polish: Option<String>,
        #[arg(long)]
        english: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Comma-separated tags (replaces the existing tags)
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },

    /// Delete a word
    Delete { id: String },

    /// Add every word from a JSON array file ("-" for stdin)
    Bulk { file: String },

    /// Import a JSON array of words ("-" for stdin)
    Import {
        file: String,
        #[arg(long, value_enum, default_value = "merge")]
        mode: ModeArg,
    },

    /// Write all words as JSON (stdout if no file is given)
    Export { file: Option<PathBuf> },

    /// Study active words as flashcards in the terminal
    Study {
        /// Category name, or "all"
        #[arg(long)]
        category: Option<String>,
        /// Tag, or "all"
        #[arg(long)]
        tag: Option<String>,
        /// pl-en or en-pl (default from config)
        #[arg(long)]
        direction: Option<Direction>,
        /// Shuffle the deck before starting
        #[arg(long)]
        shuffle: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && atty_check();
    let app = app::App::new(cli.config.as_deref(), cli.data_file)?;

    match cli.command {
        Command::Serve { host, port, static_dir } => {
            commands::serve::run(&app, host, port, static_dir)?;
        }
        Command::List { search, category, status } => {
            commands::list::run(
                &app,
                search.as_deref(),
                category.as_deref(),
                status.into(),
                &cli.format,
                use_color,
            )?;
        }
        Command::Show { id } => {
            commands::words::run_show(&app, &id, &cli.format, use_color)?;
        }
        Command::Add {
            polish,
            english,
            category,
            tags,
            polish_type,
            english_type,
            polish_pronunciation,
            english_pronunciation,
            polish_example,
            english_example,
            inactive,
        } => {
            let draft = fiszki_lib::words::WordDraft {
                polish: Some(polish),
                english: Some(english),
                polish_type,
                english_type,
                polish_pronunciation,
                english_pronunciation,
                polish_example,
                english_example,
                category,
                tags: tags.as_deref().map(commands::split_tags),
                active: if inactive { Some(false) } else { None },
                extra: Default::default(),
            };
            commands::words::run_add(&app, draft, &cli.format, use_color)?;
        }
        Command::Update { id, polish, english, category, tags, active } => {
            let mut patch = serde_json::Map::new();
            if let Some(polish) = polish {
                patch.insert("polish".into(), polish.into());
            }
            if let Some(english) = english {
                patch.insert("english".into(), english.into());
            }
            if let Some(category) = category {
                patch.insert("category".into(), category.into());
            }
            if let Some(tags) = tags {
                patch.insert("tags".into(), commands::split_tags(&tags).into());
            }
            if let Some(active) = active {
                patch.insert("active".into(), active.into());
            }
            commands::words::run_update(&app, &id, patch.into(), &cli.format, use_color)?;
        }
        Command::Delete { id } => {
            commands::words::run_delete(&app, &id, &cli.format)?;
        }
        Command::Bulk { file } => {
            commands::transfer::run_bulk(&app, &file, &cli.format)?;
        }
        Command::Import { file, mode } => {
            commands::transfer::run_import(&app, &file, mode.into(), &cli.format)?;
        }
        Command::Export { file } => {
            commands::transfer::run_export(&app, file.as_deref())?;
        }
        Command::Study { category, tag, direction, shuffle } => {
            commands::study::run(
                &app,
                category.as_deref(),
                tag.as_deref(),
                direction,
                shuffle,
                use_color,
            )?;
        }
    }

    Ok(())
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    use std::io::IsTerminal;
    std::io::stdout().is_terminal()
}
