use anyhow::{bail, Result};

use tkvocab_lib::vocabulary::VocabularyStorageError;

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub fn run(
    app: &App,
    word: &str,
    comment: &str,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let word = word.trim();
    let comment = comment.trim();
    if word.is_empty() {
        bail!("Word is required.");
    }

    let entry = match app.store().add(word, comment) {
        Ok(entry) => entry,
        Err(VocabularyStorageError::DuplicateKey(w)) => {
            bail!("Could not add word: '{}' is already in your list", w)
        }
        Err(e) => return Err(e.into()),
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        OutputFormat::Plain => {
            println!("Added '{}'", paint(&entry.word, Color::GREEN, use_color));
        }
    }

    Ok(())
}
