use anyhow::Result;

use signal_scraper::config::Config;
use signal_scraper::scraper::SignalScraper;
use signal_scraper::source::{FileCardSource, HttpCardSource, PageSource};
use signal_scraper::storage::{JsonFileStore, StateStore};
use signal_scraper::telemetry::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    init_logging(&cfg.log_level);

    cfg.validate()?;

    let files = JsonFileStore::open(&cfg.signals_dir)?;
    let state = StateStore::open(files, cfg.ledger_cap)?;

    let source: Box<dyn PageSource> = match &cfg.source_file {
        Some(path) => Box::new(FileCardSource::new(path)),
        None => Box::new(HttpCardSource::new(&cfg)),
    };

    let mut scraper = SignalScraper::new(cfg, source, state);
    scraper.run().await?;

    Ok(())
}
