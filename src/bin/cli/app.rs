use std::path::Path;

use anyhow::{Context, Result};

use tkvocab_lib::config::VocabConfig;
use tkvocab_lib::vocabulary::{Scheduler, VocabularyStorage};

use crate::OutputFormat;

/// Shared application state for CLI commands
pub struct App {
    pub config: VocabConfig,
    pub scheduler: Scheduler,
}

impl App {
    /// Load configuration and open the word database
    pub fn new(config_path: Option<&Path>, db_override: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => VocabConfig::load_from(path),
            None => VocabConfig::load(),
        }
        .context("Failed to load configuration")?;

        let db_path = match db_override {
            Some(path) => path.to_path_buf(),
            None => config
                .database_path()
                .context("Failed to resolve word database path")?,
        };

        let store = VocabularyStorage::open(&db_path)
            .with_context(|| format!("Failed to open word database {:?}", db_path))?;

        Ok(Self {
            config,
            scheduler: Scheduler::new(store),
        })
    }

    pub fn store(&self) -> &VocabularyStorage {
        self.scheduler.store()
    }

    pub fn default_format(&self) -> OutputFormat {
        if self.config.json_output {
            OutputFormat::Json
        } else {
            OutputFormat::Plain
        }
    }
}
