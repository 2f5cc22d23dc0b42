use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::core::rejection::Rejection;
use crate::models::{Card, Direction, SubValue};

const SYMBOL_SEPARATOR: char = '/';
/// Class fragment the page sets on cards whose order was filled.
const FILLED_TAG: &str = "filled";
const BUY_TAG: &str = "buy";
const SELL_TAG: &str = "sell";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prices {
    pub entry: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
}

/// A parsed card that has not yet passed plausibility checks.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub symbol: String,
    pub direction: Direction,
    /// `None` for termination events.
    pub prices: Option<Prices>,
    pub captured_at: DateTime<Utc>,
}

/// Turns one card into a [`Candidate`]. Pure over the card's content.
#[derive(Debug, Clone)]
pub struct CardParser {
    quote_asset: String,
    termination_keywords: Vec<String>,
    buy_keywords: Vec<String>,
    sell_keywords: Vec<String>,
    price_ordinals: [usize; 3],
}

impl CardParser {
    pub fn new(cfg: &Config) -> Self {
        Self {
            quote_asset: cfg.quote_asset.to_uppercase(),
            termination_keywords: cfg.termination_keywords.clone(),
            buy_keywords: cfg.buy_keywords.clone(),
            sell_keywords: cfg.sell_keywords.clone(),
            price_ordinals: cfg.price_ordinals,
        }
    }

    pub fn parse<C: Card + ?Sized>(
        &self,
        card: &C,
        captured_at: DateTime<Utc>,
    ) -> Result<Candidate, Rejection> {
        let symbol = self.parse_symbol(card.symbol_text())?;

        let text = card.text().to_lowercase();
        let tags = card.tags().to_lowercase();

        // Termination wins over any directional hint on the card.
        if self.is_terminated(&text, &tags) {
            return Ok(Candidate {
                symbol,
                direction: Direction::Terminate,
                prices: None,
                captured_at,
            });
        }

        let direction = match self.direction(&tags, &text) {
            Some(d) => d,
            None => return Err(Rejection::AmbiguousDirection { symbol }),
        };

        let prices = self.parse_prices(&symbol, card.sub_values())?;

        Ok(Candidate {
            symbol,
            direction,
            prices: Some(prices),
            captured_at,
        })
    }

    /// `BTC/USDT` -> `BTCUSDT`.
    fn parse_symbol(&self, raw: &str) -> Result<String, Rejection> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Rejection::MissingSymbol);
        }
        let upper = raw.to_uppercase();
        if !upper.contains(SYMBOL_SEPARATOR) || !upper.contains(&self.quote_asset) {
            return Err(Rejection::UnsupportedSymbol(raw.to_string()));
        }
        Ok(upper
            .chars()
            .filter(|c| *c != SYMBOL_SEPARATOR && !c.is_whitespace())
            .collect())
    }

    fn is_terminated(&self, text: &str, tags: &str) -> bool {
        tags.contains(FILLED_TAG)
            || self
                .termination_keywords
                .iter()
                .any(|kw| text.contains(kw.as_str()))
    }

    fn direction(&self, tags: &str, text: &str) -> Option<Direction> {
        let has_buy_tag = tags.split_whitespace().any(|t| t.contains(BUY_TAG));
        let has_sell_tag = tags.split_whitespace().any(|t| t.contains(SELL_TAG));
        match (has_buy_tag, has_sell_tag) {
            (true, false) => return Some(Direction::Long),
            (false, true) => return Some(Direction::Short),
            _ => {}
        }

        // Whole words, so "verkaufen" does not count as "kaufen".
        let has_word = |keywords: &[String]| {
            text.split(|c: char| !c.is_alphanumeric())
                .any(|word| keywords.iter().any(|kw| kw == word))
        };
        match (has_word(&self.buy_keywords), has_word(&self.sell_keywords)) {
            (true, false) => Some(Direction::Long),
            (false, true) => Some(Direction::Short),
            _ => None,
        }
    }

    fn parse_prices(&self, symbol: &str, values: &[SubValue]) -> Result<Prices, Rejection> {
        let required = self.price_ordinals.iter().max().copied().unwrap_or(0) + 1;
        if values.len() < required {
            return Err(Rejection::MissingPrices {
                symbol: symbol.to_string(),
                found: values.len(),
                required,
            });
        }

        let mut parsed = [0.0; 3];
        for (slot, &ordinal) in parsed.iter_mut().zip(self.price_ordinals.iter()) {
            let raw = &values[ordinal].text;
            *slot = clean_price(raw).ok_or_else(|| Rejection::InvalidPrice {
                symbol: symbol.to_string(),
                ordinal,
                raw: raw.clone(),
            })?;
        }

        let [entry, take_profit, stop_loss] = parsed;
        Ok(Prices {
            entry,
            take_profit,
            stop_loss,
        })
    }
}

/// Strip everything but digits and decimal separators, drop thousands
/// commas, and parse. `"$106,050.5 USDT"` -> `106050.5`.
pub fn clean_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let value: f64 = cleaned.parse().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}
