use std::collections::HashMap;

use crate::config::Config;
use crate::core::parser::Candidate;
use crate::core::rejection::Rejection;
use crate::models::{Direction, Signal};

/// Sanity checks applied to parsed candidates before they become signals.
///
/// Floors catch decimal points lost while scraping (`106.050` read as `106`).
/// They are deployment heuristics, not a correctness guarantee.
#[derive(Debug, Clone, Default)]
pub struct PlausibilityGuard {
    floors: HashMap<String, f64>,
}

impl PlausibilityGuard {
    pub fn new(cfg: &Config) -> Self {
        Self {
            floors: cfg.price_floors.clone(),
        }
    }

    pub fn with_floor(mut self, symbol: &str, floor: f64) -> Self {
        self.floors.insert(symbol.to_uppercase(), floor);
        self
    }

    pub fn floor(&self, symbol: &str) -> Option<f64> {
        self.floors.get(symbol).copied()
    }

    pub fn classify(&self, candidate: Candidate) -> Result<Signal, Rejection> {
        let Candidate {
            symbol,
            direction,
            prices,
            captured_at,
        } = candidate;

        let prices = match (direction, prices) {
            (Direction::Terminate, _) => return Ok(Signal::terminate(symbol, captured_at)?),
            (_, Some(p)) => p,
            (_, None) => {
                return Err(Rejection::MissingPrices {
                    symbol,
                    found: 0,
                    required: 3,
                })
            }
        };

        if prices.entry <= 0.0 || prices.take_profit <= 0.0 || prices.stop_loss <= 0.0 {
            return Err(Rejection::NonPositivePrice { symbol });
        }

        if let Some(floor) = self.floor(&symbol) {
            if prices.entry < floor {
                return Err(Rejection::BelowFloor {
                    symbol,
                    entry: prices.entry,
                    floor,
                });
            }
        }

        Ok(Signal::entry(
            symbol,
            direction,
            prices.entry,
            prices.take_profit,
            prices.stop_loss,
            captured_at,
        )?)
    }
}
