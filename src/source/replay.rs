use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::RawCard;
use crate::source::PageSource;

/// Replays a captured page from a JSON file of cards.
/// The file is re-read on every fetch so it can be edited between cycles.
pub struct FileCardSource {
    path: PathBuf,
}

impl FileCardSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn load(&self) -> Result<Vec<RawCard>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read card file: {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid card file format: {}", self.path.display()))
    }
}

#[async_trait]
impl PageSource for FileCardSource {
    async fn open(&mut self) -> Result<()> {
        if !self.path.exists() {
            anyhow::bail!("Card file not found: {}", self.path.display());
        }
        Ok(())
    }

    async fn fetch_cards(&mut self) -> Result<Vec<RawCard>> {
        self.load()
    }

    async fn close(&mut self) {}

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
