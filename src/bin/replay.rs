use anyhow::{Context, Result};

use signal_scraper::config::Config;
use signal_scraper::scraper::SignalScraper;
use signal_scraper::source::FileCardSource;
use signal_scraper::storage::{JsonFileStore, StateStore};
use signal_scraper::telemetry::init_logging;

/// Run a single cycle against a saved card file.
///
/// Usage: replay <cards.json> [signals_dir]
#[tokio::main]
async fn main() -> Result<()> {
    let mut cfg = Config::from_env();

    init_logging(&cfg.log_level);

    let args: Vec<String> = std::env::args().collect();
    let cards_path = args
        .get(1)
        .context("usage: replay <cards.json> [signals_dir]")?
        .clone();
    if let Some(dir) = args.get(2) {
        cfg.signals_dir = dir.clone();
    }
    cfg.validate()?;

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║          SIGNAL SCRAPER - REPLAY                         ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!("  Cards:    {}", cards_path);
    println!("  State:    {}", cfg.signals_dir);
    println!("  Symbols:  {}", cfg.target_symbols.join(", "));
    println!();

    let files = JsonFileStore::open(&cfg.signals_dir)?;
    let state = StateStore::open(files, cfg.ledger_cap)?;

    let source = FileCardSource::new(&cards_path);
    let mut scraper = SignalScraper::new(cfg, Box::new(source), state);
    let report = scraper.run_once().await;

    match report {
        Ok(report) => {
            let s = &report.summary;
            println!("Cards:        {}", s.cards);
            println!("Parsed:       {}", s.parsed);
            println!("Rejected:     {}", s.rejected);
            println!("Off-target:   {}", s.off_target);
            println!("New active:   {}", s.new_active);
            for signal in &report.active {
                println!("  {}", signal);
            }
            println!("Terminated:   {}", s.new_terminated);
            for signal in &report.terminated {
                println!("  CLOSE {}", signal.symbol());
            }
            println!("Ledger size:  {}", scraper.state().ledger().len());
            Ok(())
        }
        Err(e) => {
            println!("ERROR: {}", e);
            Err(e)
        }
    }
}
