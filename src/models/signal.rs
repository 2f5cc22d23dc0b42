use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

use crate::models::Direction;

/// Hex characters kept from the SHA-256 digest.
pub const FINGERPRINT_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    #[error("{direction} signal for {symbol} has non-positive price (entry={entry}, tp={take_profit}, sl={stop_loss})")]
    NonPositivePrice {
        symbol: String,
        direction: Direction,
        entry: f64,
        take_profit: f64,
        stop_loss: f64,
    },
    #[error("use Signal::terminate for termination events")]
    TerminateWithPrices,
    #[error("empty symbol")]
    EmptySymbol,
}

/// A validated trading signal. Never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    symbol: String,
    direction: Direction,
    entry_price: f64,
    take_profit: f64,
    stop_loss: f64,
    timestamp: DateTime<Utc>,
    fingerprint: String,
}

impl Signal {
    /// Build a directional entry. All prices must be finite and strictly positive.
    pub fn entry(
        symbol: impl Into<String>,
        direction: Direction,
        entry_price: f64,
        take_profit: f64,
        stop_loss: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, SignalError> {
        let symbol = symbol.into();
        if symbol.is_empty() {
            return Err(SignalError::EmptySymbol);
        }
        if direction == Direction::Terminate {
            return Err(SignalError::TerminateWithPrices);
        }
        let valid = |p: f64| p.is_finite() && p > 0.0;
        if !(valid(entry_price) && valid(take_profit) && valid(stop_loss)) {
            return Err(SignalError::NonPositivePrice {
                symbol,
                direction,
                entry: entry_price,
                take_profit,
                stop_loss,
            });
        }

        let fingerprint = fingerprint(&symbol, direction, entry_price, &timestamp);
        Ok(Self {
            symbol,
            direction,
            entry_price,
            take_profit,
            stop_loss,
            timestamp,
            fingerprint,
        })
    }

    /// Build a termination event. Prices are fixed at zero.
    pub fn terminate(
        symbol: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, SignalError> {
        let symbol = symbol.into();
        if symbol.is_empty() {
            return Err(SignalError::EmptySymbol);
        }
        let fingerprint = fingerprint(&symbol, Direction::Terminate, 0.0, &timestamp);
        Ok(Self {
            symbol,
            direction: Direction::Terminate,
            entry_price: 0.0,
            take_profit: 0.0,
            stop_loss: 0.0,
            timestamp,
            fingerprint,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn entry_price(&self) -> f64 {
        self.entry_price
    }

    pub fn take_profit(&self) -> f64 {
        self.take_profit
    }

    pub fn stop_loss(&self) -> f64 {
        self.stop_loss
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn is_terminated(&self) -> bool {
        self.direction == Direction::Terminate
    }

    pub fn to_record(&self) -> SignalRecord {
        SignalRecord {
            fingerprint: self.fingerprint.clone(),
            symbol: self.symbol.clone(),
            direction: self.direction,
            entry_price: self.entry_price,
            take_profit: self.take_profit,
            stop_loss: self.stop_loss,
            timestamp: self.timestamp,
            processed: false,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_terminated() {
            return write!(f, "{} TERMINATED", self.symbol);
        }
        write!(
            f,
            "{} {} @ {} (TP: {}, SL: {})",
            self.symbol, self.direction, self.entry_price, self.take_profit, self.stop_loss
        )
    }
}

/// Stable identifier for one observed event.
///
/// Hashes symbol, direction, entry price and the capture time truncated to
/// the minute, so two scrapes of the same card within one minute collapse.
pub fn fingerprint(
    symbol: &str,
    direction: Direction,
    entry_price: f64,
    timestamp: &DateTime<Utc>,
) -> String {
    let minute = timestamp.format("%Y-%m-%dT%H:%M");
    let data = format!("{}_{}_{:?}_{}", symbol, direction, entry_price, minute);
    let digest = Sha256::digest(data.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// Serialized form of a [`Signal`] as the downstream trading process reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalRecord {
    #[serde(rename = "signal_id")]
    pub fingerprint: String,
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub timestamp: DateTime<Utc>,
    /// Owned by the consumer; always written as `false`.
    #[serde(default)]
    pub processed: bool,
}
