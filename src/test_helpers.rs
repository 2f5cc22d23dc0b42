use chrono::{DateTime, TimeZone, Utc};

use crate::config::Config;
use crate::models::{RawCard, SubValue};

/// Fixed capture time used across unit tests.
pub fn captured_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 15).unwrap()
}

/// Labels of the value cells on a live signal card, in page order.
pub const VALUE_LABELS: [&str; 6] = ["Zeit", "Risiko", "Hebel", "Einstieg", "Ziel", "Stop"];

/// Build a card with arbitrary value cells.
pub fn make_card(symbol: &str, classes: &str, text: &str, values: &[&str]) -> RawCard {
    RawCard {
        text: text.to_string(),
        classes: classes.to_string(),
        symbol: symbol.to_string(),
        values: values
            .iter()
            .enumerate()
            .map(|(i, v)| SubValue::new(VALUE_LABELS.get(i).copied().unwrap_or(""), *v))
            .collect(),
    }
}

/// Build a card laid out like the live page: three leading cells, then entry,
/// take-profit and stop-loss.
pub fn make_price_card(
    symbol: &str,
    classes: &str,
    text: &str,
    entry: &str,
    take_profit: &str,
    stop_loss: &str,
) -> RawCard {
    make_card(
        symbol,
        classes,
        text,
        &["vor 5 Min", "Mittel", "10x", entry, take_profit, stop_loss],
    )
}

pub fn default_test_config() -> Config {
    let mut cfg = Config::default();
    cfg.signals_dir = std::env::temp_dir()
        .join("signal_scraper_test")
        .to_string_lossy()
        .to_string();
    cfg.scrape_interval_min = 0;
    cfg.scrape_interval_max = 0;
    cfg.retry_backoff = 0;
    cfg.log_level = "ERROR".to_string();
    cfg
}
