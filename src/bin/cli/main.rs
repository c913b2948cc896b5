mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tkvocab_lib::vocabulary::ReviewOutcome;

#[derive(Parser)]
#[command(name = "tkvocab-cli", about = "Spaced-repetition vocabulary tracker", version)]
struct Cli {
    /// Word database to use (default: from config, else the data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format (default: from config, else plain)
    #[arg(long, global = true)]
    format: Option<OutputFormat>,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Add a new word, due for review immediately
    Add {
        /// The word to learn
        word: String,
        /// Definition or note (use "-" to read from stdin)
        #[arg(long, short)]
        comment: Option<String>,
    },

    /// List all words in alphabetical order
    List,

    /// Delete a word (deleting a missing word is not an error)
    Delete {
        word: String,
    },

    /// Show the most overdue word
    Next,

    /// Review a word: show its interval choices, or record the chosen one
    Review {
        /// Word to review (default: the most overdue word)
        word: Option<String>,
        /// Schedule the next review this many days from now
        #[arg(long, allow_hyphen_values = true, conflicts_with = "outcome")]
        days: Option<i64>,
        /// Pick one of the offered intervals: again, hard, good or easy
        #[arg(long)]
        outcome: Option<ReviewOutcome>,
    },
}

/// Resolve "-" as stdin
fn resolve_comment(comment: Option<String>) -> anyhow::Result<String> {
    match comment.as_deref() {
        Some("-") => {
            let mut buf = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf)?;
            Ok(buf)
        }
        Some(_) => Ok(comment.unwrap_or_default()),
        None => Ok(String::new()),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();

    let app = app::App::new(cli.config.as_deref(), cli.db.as_deref())?;
    let format = cli.format.unwrap_or_else(|| app.default_format());

    match cli.command {
        // No subcommand → show what is due, like a home screen
        None | Some(Command::Next) => {
            commands::next::run(&app, &format, use_color)?;
        }
        Some(Command::Add { word, comment }) => {
            let comment = resolve_comment(comment)?;
            commands::add::run(&app, &word, &comment, &format, use_color)?;
        }
        Some(Command::List) => {
            commands::list::run(&app, &format, use_color)?;
        }
        Some(Command::Delete { word }) => {
            commands::delete::run(&app, &word, &format)?;
        }
        Some(Command::Review { word, days, outcome }) => {
            commands::review::run(&app, word.as_deref(), days, outcome, &format, use_color)?;
        }
    }

    Ok(())
}
