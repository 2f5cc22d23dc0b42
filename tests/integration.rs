mod common;

use std::fs;
use tempfile::tempdir;

use signal_scraper::core::{filter_new, Ledger, Rejection, SignalPipeline};
use signal_scraper::models::Direction;
use signal_scraper::scraper::SignalScraper;
use signal_scraper::source::FileCardSource;
use signal_scraper::storage::{DocumentKey, JsonFileStore, StateStore};

use common::{capture_time, price_card, test_config, text_card, MockSource};

fn live_page() -> Vec<signal_scraper::models::RawCard> {
    vec![
        price_card(
            "BTC/USDT",
            "signal-card buy",
            "BTC/USDT vor 5 Min Kaufen bei 106050",
            ["106050", "108000", "104000"],
        ),
        text_card("XRP/USDT", "signal-card", "XRP/USDT vor 1 Stunde Terminiert"),
        text_card("ETH/USDT", "signal-card", "ETH/USDT vor 2 Stunden"),
        price_card("DOT/USDT", "signal-card buy", "DOT/USDT Kaufen", ["7.5", "8.1", "7.0"]),
        price_card("SOL/USDT", "signal-card sell", "SOL/USDT Verkaufen", ["150", "0", "160"]),
    ]
}

#[tokio::test]
async fn full_cycle_against_file_store() {
    let dir = tempdir().expect("tmp");
    let cfg = test_config(dir.path());
    let files = JsonFileStore::open(&cfg.signals_dir).expect("files");
    let state = StateStore::open(files.clone(), cfg.ledger_cap).expect("state");

    let mut scraper = SignalScraper::new(cfg, Box::new(MockSource::new(live_page())), state);
    let report = scraper.run_cycle_at(capture_time()).await.expect("cycle");

    // New long entry
    assert_eq!(report.active.len(), 1);
    let btc = &report.active[0];
    assert_eq!(btc.symbol(), "BTCUSDT");
    assert_eq!(btc.direction(), Direction::Long);
    assert_eq!(btc.entry_price(), 106050.0);
    assert_eq!(btc.take_profit(), 108000.0);
    assert_eq!(btc.stop_loss(), 104000.0);

    // Termination by keyword
    assert_eq!(report.terminated.len(), 1);
    let xrp = &report.terminated[0];
    assert_eq!(xrp.symbol(), "XRPUSDT");
    assert_eq!(xrp.direction(), Direction::Terminate);
    assert_eq!(
        (xrp.entry_price(), xrp.take_profit(), xrp.stop_loss()),
        (0.0, 0.0, 0.0)
    );

    // Ambiguous ETH and zero-price SOL rejected, DOT off the allow-list.
    assert_eq!(report.summary.cards, 5);
    assert_eq!(report.summary.rejected, 2);
    assert_eq!(report.summary.off_target, 1);

    let ledger = scraper.state().ledger();
    assert_eq!(ledger.len(), 2);
    assert!(ledger.contains(btc.fingerprint()));
    assert!(ledger.contains(xrp.fingerprint()));

    // On-disk layout read by the trading process.
    let raw = fs::read_to_string(files.path_of(DocumentKey::Snapshot)).expect("current.json");
    let current: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(current["total_signals"], 1);
    assert_eq!(current["terminated_count"], 1);
    assert_eq!(current["signals"][0]["signal_id"], btc.fingerprint());
    assert_eq!(current["signals"][0]["direction"], "LONG");
    assert_eq!(current["signals"][0]["processed"], false);
    assert_eq!(current["terminated_signals"][0]["symbol"], "XRPUSDT");
    assert!(current["last_update"].is_string());

    let raw = fs::read_to_string(files.path_of(DocumentKey::Status)).expect("status.json");
    let status: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(status["symbols_active"], serde_json::json!(["BTCUSDT"]));
    assert_eq!(status["symbols_terminated"], serde_json::json!(["XRPUSDT"]));

    let raw = fs::read_to_string(files.path_of(DocumentKey::Ledger)).expect("processed.json");
    let processed: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(processed["processed_ids"].as_array().map(|a| a.len()), Some(2));
}

#[tokio::test]
async fn restart_does_not_reemit_recorded_signals() {
    let dir = tempdir().expect("tmp");
    let cfg = test_config(dir.path());

    {
        let files = JsonFileStore::open(&cfg.signals_dir).expect("files");
        let state = StateStore::open(files, cfg.ledger_cap).expect("state");
        let mut scraper =
            SignalScraper::new(cfg.clone(), Box::new(MockSource::new(live_page())), state);
        let first = scraper.run_cycle_at(capture_time()).await.expect("first");
        assert_eq!(first.summary.new_total(), 2);
    }

    let files = JsonFileStore::open(&cfg.signals_dir).expect("files");
    let state = StateStore::open(files, cfg.ledger_cap).expect("state");
    let mut scraper = SignalScraper::new(cfg, Box::new(MockSource::new(live_page())), state);
    let later = capture_time() + chrono::Duration::seconds(30);
    let second = scraper.run_cycle_at(later).await.expect("second");
    assert_eq!(second.summary.new_total(), 0);

    let snapshot = scraper.state().snapshot().expect("snapshot");
    assert!(snapshot.signals.is_empty());
    assert!(snapshot.terminated_signals.is_empty());
    assert_eq!((snapshot.total_signals, snapshot.terminated_count), (0, 0));
    assert_eq!(snapshot.last_update, Some(later));

    let status = scraper.state().status().expect("status");
    assert_eq!(status.last_scrape, Some(later));
    assert_eq!(status.active_signals, 0);
    assert!(status.symbols_terminated.is_empty());
    assert_eq!(scraper.state().ledger().len(), 2);
}

#[test]
fn same_cards_twice_yield_nothing_new() {
    let cfg = test_config(std::path::Path::new("unused"));
    let pipeline = SignalPipeline::new(&cfg);
    let observer = signal_scraper::telemetry::TracingObserver;

    let first = pipeline.extract(&live_page(), capture_time(), &observer).signals;
    let mut ledger = Ledger::new(cfg.ledger_cap);
    let fresh = filter_new(first, &ledger);
    assert_eq!(fresh.len(), 2);
    ledger.extend(fresh.iter().map(|s| s.fingerprint()));

    let second = pipeline.extract(&live_page(), capture_time(), &observer).signals;
    assert!(filter_new(second, &ledger).is_empty());
}

#[test]
fn accepted_signals_respect_price_invariant() {
    let cfg = test_config(std::path::Path::new("unused"));
    let pipeline = SignalPipeline::new(&cfg);

    let mut cards = live_page();
    cards.push(price_card("ETH/USDT", "buy", "Kaufen", ["2,500.50", "2,600", "2,400"]));
    cards.push(price_card("BTC/USDT", "buy", "Kaufen", ["106.05", "108", "104"]));
    cards.push(price_card("ADA/USDT", "sell filled", "ADA/USDT", ["0.81", "0.78", "0.84"]));

    let signals = pipeline
        .extract(&cards, capture_time(), &signal_scraper::telemetry::TracingObserver)
        .signals;
    assert!(!signals.is_empty());
    for s in &signals {
        let prices = [s.entry_price(), s.take_profit(), s.stop_loss()];
        if s.direction() == Direction::Terminate {
            assert!(prices.iter().all(|p| *p == 0.0), "{s}");
        } else {
            assert!(prices.iter().all(|p| *p > 0.0), "{s}");
        }
    }

    let eth = signals.iter().find(|s| s.symbol() == "ETHUSDT").expect("eth");
    assert_eq!(eth.entry_price(), 2500.5);
    let ada = signals.iter().find(|s| s.symbol() == "ADAUSDT").expect("ada");
    assert_eq!(ada.direction(), Direction::Terminate);
    // BTC at 106.05 is a lost decimal point, not a real entry.
    assert!(signals
        .iter()
        .all(|s| !(s.symbol() == "BTCUSDT" && s.entry_price() < 1000.0)));
}

#[test]
fn out_of_allow_list_symbol_never_reaches_ledger() {
    let cfg = test_config(std::path::Path::new("unused"));
    let pipeline = SignalPipeline::new(&cfg);
    let card = price_card("DOT/USDT", "buy", "Kaufen", ["7.5", "8.1", "7.0"]);

    let result = pipeline.evaluate(&card, capture_time());
    assert!(matches!(result, Err(Rejection::NotTargeted { ref symbol }) if symbol == "DOTUSDT"));
}

#[tokio::test]
async fn replay_from_card_file() {
    let dir = tempdir().expect("tmp");
    let cards_path = dir.path().join("cards.json");
    fs::write(&cards_path, serde_json::to_vec(&live_page()).expect("encode")).expect("write");

    let cfg = test_config(&dir.path().join("signals"));
    let files = JsonFileStore::open(&cfg.signals_dir).expect("files");
    let state = StateStore::open(files, cfg.ledger_cap).expect("state");
    let mut scraper = SignalScraper::new(cfg, Box::new(FileCardSource::new(&cards_path)), state);

    let report = scraper.run_once().await.expect("run");
    assert_eq!(report.summary.new_active, 1);
    assert_eq!(report.summary.new_terminated, 1);
}
