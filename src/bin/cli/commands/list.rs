use anyhow::Result;

use tkvocab_lib::vocabulary::algorithm::format_interval;

use crate::app::App;
use crate::render::terminal::{format_local, paint, truncate, Color};
use crate::OutputFormat;

const COMMENT_WIDTH: usize = 36;
const INTERVAL_WIDTH: usize = 8;
const DATE_WIDTH: usize = 16;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let entries = app.store().list()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Plain => {
            if entries.is_empty() {
                println!("No words yet. Add one with `tkvocab-cli add <word>`.");
                return Ok(());
            }

            let word_width = entries
                .iter()
                .map(|e| e.word.chars().count())
                .max()
                .unwrap_or(4)
                .clamp(4, 30);

            println!(
                "{:<ww$} {:<cw$} {:<iw$} {:<dw$} Added",
                "Word",
                "Comment",
                "Interval",
                "Next review",
                ww = word_width,
                cw = COMMENT_WIDTH,
                iw = INTERVAL_WIDTH,
                dw = DATE_WIDTH,
            );
            println!(
                "{} {} {} {} {}",
                "\u{2500}".repeat(word_width),
                "\u{2500}".repeat(COMMENT_WIDTH),
                "\u{2500}".repeat(INTERVAL_WIDTH),
                "\u{2500}".repeat(DATE_WIDTH),
                "\u{2500}".repeat(10),
            );

            let now = app.store().clock().now();
            for entry in &entries {
                let next_review = format!(
                    "{:<dw$}",
                    format_local(entry.next_review_date),
                    dw = DATE_WIDTH
                );
                let next_review = if entry.is_due(now) {
                    paint(&next_review, Color::YELLOW, use_color)
                } else {
                    next_review
                };

                println!(
                    "{:<ww$} {:<cw$} {:<iw$} {} {}",
                    truncate(&entry.word, word_width),
                    truncate(&entry.comment, COMMENT_WIDTH),
                    format_interval(entry.interval_days),
                    next_review,
                    entry.created_at.format("%Y-%m-%d"),
                    ww = word_width,
                    cw = COMMENT_WIDTH,
                    iw = INTERVAL_WIDTH,
                );
            }

            println!("\n{} words total", entries.len());
        }
    }

    Ok(())
}
