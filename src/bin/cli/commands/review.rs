use anyhow::{Context, Result};

use tkvocab_lib::vocabulary::algorithm::format_interval;
use tkvocab_lib::vocabulary::{ReviewOutcome, VocabularyEntry};

use crate::app::App;
use crate::render::terminal::{format_local, paint, Color};
use crate::OutputFormat;

pub fn run(
    app: &App,
    word: Option<&str>,
    days: Option<i64>,
    outcome: Option<ReviewOutcome>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let entry = match word {
        Some(word) => app
            .store()
            .get(word)?
            .with_context(|| format!("Word '{}' not found", word))?,
        None => match app.scheduler.get_due_entry_now()? {
            Some(entry) => entry,
            None => {
                match format {
                    OutputFormat::Json => println!("null"),
                    OutputFormat::Plain => println!("No words to review right now. Great job!"),
                }
                return Ok(());
            }
        },
    };

    let updated = match (days, outcome) {
        (Some(days), _) => app.scheduler.record_review(&entry.word, days)?,
        (None, Some(outcome)) => app.scheduler.record_outcome(&entry.word, outcome)?,
        (None, None) => return show_choices(app, &entry, format, use_color),
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }
        OutputFormat::Plain => {
            println!(
                "Next review of '{}' scheduled in {} day(s), on {}.",
                paint(&updated.word, Color::GREEN, use_color),
                updated.interval_days,
                format_local(updated.next_review_date)
            );
        }
    }

    Ok(())
}

fn show_choices(
    app: &App,
    entry: &VocabularyEntry,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let choices = app.scheduler.interval_choices(entry.interval_days);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "entry": entry,
                "choices": ReviewOutcome::ALL
                    .iter()
                    .zip(choices)
                    .map(|(outcome, days)| serde_json::json!({ "outcome": outcome, "intervalDays": days }))
                    .collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Review");
            println!("  {}", paint(&entry.word, Color::BOLD, use_color));
            if !entry.comment.is_empty() {
                println!("  {}", entry.comment);
            }
            println!();
            for (outcome, days) in ReviewOutcome::ALL.iter().zip(choices) {
                let style = match outcome {
                    ReviewOutcome::Again => Color::RED,
                    _ => Color::DIM,
                };
                println!(
                    "  {:<6} {:>5}  {}",
                    outcome.as_str(),
                    format_interval(days),
                    paint(&format!("--days {}", days), style, use_color),
                );
            }
            println!("\nRecord with `tkvocab-cli review {} --outcome <choice>`.", entry.word);
        }
    }

    Ok(())
}
