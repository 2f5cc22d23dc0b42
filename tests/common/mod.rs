use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use signal_scraper::config::Config;
use signal_scraper::models::{RawCard, SubValue};
use signal_scraper::source::PageSource;

pub fn capture_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-06-01T12:30:15Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Card laid out like the live page: three leading cells, then entry,
/// take-profit and stop-loss.
pub fn price_card(symbol: &str, classes: &str, text: &str, prices: [&str; 3]) -> RawCard {
    let cells = ["vor 5 Min", "Mittel", "10x", prices[0], prices[1], prices[2]];
    RawCard {
        text: text.to_string(),
        classes: classes.to_string(),
        symbol: symbol.to_string(),
        values: cells.iter().map(|t| SubValue::new("", *t)).collect(),
    }
}

pub fn text_card(symbol: &str, classes: &str, text: &str) -> RawCard {
    RawCard {
        text: text.to_string(),
        classes: classes.to_string(),
        symbol: symbol.to_string(),
        values: Vec::new(),
    }
}

pub fn test_config(signals_dir: &std::path::Path) -> Config {
    let mut cfg = Config::default();
    cfg.signals_dir = signals_dir.to_string_lossy().to_string();
    cfg.scrape_interval_min = 0;
    cfg.scrape_interval_max = 0;
    cfg.retry_backoff = 0;
    cfg
}

/// Serves the same page on every fetch.
pub struct MockSource {
    pub cards: Vec<RawCard>,
    pub fetches: Arc<AtomicUsize>,
}

impl MockSource {
    pub fn new(cards: Vec<RawCard>) -> Self {
        Self {
            cards,
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl PageSource for MockSource {
    async fn open(&mut self) -> Result<()> {
        Ok(())
    }

    async fn fetch_cards(&mut self) -> Result<Vec<RawCard>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.cards.clone())
    }

    async fn close(&mut self) {}

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
