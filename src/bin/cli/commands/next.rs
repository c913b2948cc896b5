use anyhow::Result;

use crate::app::App;
use crate::render::terminal::{format_local, paint, Color};
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let due = app.scheduler.get_due_entry_now()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&due)?);
        }
        OutputFormat::Plain => match due {
            None => {
                println!("{}", paint("No words to review. Congrats!", Color::BOLD, use_color));
                println!("Add new words to start spaced repetition.");
            }
            Some(entry) => {
                println!("Next review word:");
                println!("  {}", paint(&entry.word, Color::BOLD, use_color));
                if !entry.comment.is_empty() {
                    println!("  {}", entry.comment);
                }
                println!("Interval days: {}", entry.interval_days);
                println!("Next review date: {}", format_local(entry.next_review_date));
                println!("\nRun `tkvocab-cli review` to review it.");
            }
        },
    }

    Ok(())
}
