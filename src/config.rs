use anyhow::{bail, Result};
use std::collections::HashMap;

pub const DEFAULT_TARGET_SYMBOLS: &[&str] = &[
    "BTCUSDT", "ETHUSDT", "XRPUSDT", "ADAUSDT", "SOLUSDT", "DOGEUSDT", "LTCUSDT", "TRXUSDT",
    "LINKUSDT",
];

/// Status words (German and English) meaning the signal is no longer live.
pub const DEFAULT_TERMINATION_KEYWORDS: &[&str] = &[
    "terminiert",
    "terminated",
    "ausgeführt",
    "executed",
    "filled",
    "abgelaufen",
    "expired",
    "geschlossen",
    "closed",
    "abgebrochen",
    "cancelled",
    "canceled",
];

pub const DEFAULT_BUY_KEYWORDS: &[&str] = &["kaufen", "buy"];
pub const DEFAULT_SELL_KEYWORDS: &[&str] = &["verkaufen", "sell"];
pub const DEFAULT_PRICE_FLOORS: &str = "BTCUSDT:1000,ETHUSDT:100";

#[derive(Debug, Clone)]
pub struct Config {
    // Page source
    pub source_url: String,
    pub source_file: Option<String>,
    pub user_agent: String,
    pub request_timeout_secs: u64,

    // Card parsing
    pub quote_asset: String,
    pub termination_keywords: Vec<String>,
    pub buy_keywords: Vec<String>,
    pub sell_keywords: Vec<String>,
    /// Value-cell positions of entry, take-profit and stop-loss.
    pub price_ordinals: [usize; 3],

    // Classification
    pub target_symbols: Vec<String>,
    /// Minimum plausible entry price per symbol.
    pub price_floors: HashMap<String, f64>,

    // State
    pub signals_dir: String,
    pub ledger_cap: usize,

    // Scheduling (seconds)
    pub scrape_interval_min: u64,
    pub scrape_interval_max: u64,
    pub retry_backoff: u64,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let list = |key: &str, default: &[&str]| -> Vec<String> {
            match lookup(key).filter(|v| !v.trim().is_empty()) {
                Some(raw) => split_list(&raw),
                None => default.iter().map(|s| s.to_string()).collect(),
            }
        };

        let target_symbols = list("TARGET_SYMBOLS", DEFAULT_TARGET_SYMBOLS)
            .into_iter()
            .map(|s| s.to_uppercase())
            .collect();
        let lower = |v: Vec<String>| -> Vec<String> { v.into_iter().map(|s| s.to_lowercase()).collect() };

        let price_floors = parse_price_floors(&env("PRICE_FLOORS", DEFAULT_PRICE_FLOORS));
        let price_ordinals = parse_ordinals(&env("PRICE_ORDINALS", "3,4,5")).unwrap_or([3, 4, 5]);

        Config {
            source_url: env("SOURCE_URL", "http://127.0.0.1:9222/cards"),
            source_file: lookup("SOURCE_FILE").filter(|v| !v.trim().is_empty()),
            user_agent: env(
                "SOURCE_USER_AGENT",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
            ),
            request_timeout_secs: env("SOURCE_TIMEOUT_SECS", "30").parse().unwrap_or(30),
            quote_asset: env("QUOTE_ASSET", "USDT").to_uppercase(),
            termination_keywords: lower(list("TERMINATION_KEYWORDS", DEFAULT_TERMINATION_KEYWORDS)),
            buy_keywords: lower(list("BUY_KEYWORDS", DEFAULT_BUY_KEYWORDS)),
            sell_keywords: lower(list("SELL_KEYWORDS", DEFAULT_SELL_KEYWORDS)),
            price_ordinals,
            target_symbols,
            price_floors,
            signals_dir: env("SIGNALS_DIR", "signals"),
            ledger_cap: env("LEDGER_CAP", "1000").parse().unwrap_or(1000),
            scrape_interval_min: env("SCRAPE_INTERVAL_MIN_SECS", "1080").parse().unwrap_or(18 * 60),
            scrape_interval_max: env("SCRAPE_INTERVAL_MAX_SECS", "1320").parse().unwrap_or(22 * 60),
            retry_backoff: env("RETRY_BACKOFF_SECS", "300").parse().unwrap_or(300),
            log_level: env("LOG_LEVEL", "INFO"),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_symbols.is_empty() {
            bail!("TARGET_SYMBOLS must list at least one symbol");
        }
        if self.ledger_cap == 0 {
            bail!("LEDGER_CAP must be greater than zero");
        }
        if self.scrape_interval_min > self.scrape_interval_max {
            bail!(
                "scrape interval min ({}s) exceeds max ({}s)",
                self.scrape_interval_min,
                self.scrape_interval_max
            );
        }
        let [a, b, c] = self.price_ordinals;
        if a == b || b == c || a == c {
            bail!("PRICE_ORDINALS must be three distinct positions, got {:?}", self.price_ordinals);
        }
        if self.termination_keywords.is_empty() {
            bail!("TERMINATION_KEYWORDS must not be empty");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Parse `SYMBOL:floor` pairs, skipping malformed entries.
fn parse_price_floors(raw: &str) -> HashMap<String, f64> {
    split_list(raw)
        .into_iter()
        .filter_map(|pair| {
            let (symbol, floor) = pair.split_once(':')?;
            let floor: f64 = floor.trim().parse().ok()?;
            Some((symbol.trim().to_uppercase(), floor))
        })
        .collect()
}

fn parse_ordinals(raw: &str) -> Option<[usize; 3]> {
    let parsed: Vec<usize> = split_list(raw)
        .iter()
        .map(|s| s.parse().ok())
        .collect::<Option<_>>()?;
    parsed.try_into().ok()
}
