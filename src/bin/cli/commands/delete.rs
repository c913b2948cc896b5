use anyhow::Result;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, word: &str, format: &OutputFormat) -> Result<()> {
    let removed = app.store().delete(word)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "word": word,
                "deleted": removed,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if removed {
                println!("Deleted '{}'", word);
            } else {
                println!("'{}' was not in your list", word);
            }
        }
    }

    Ok(())
}
