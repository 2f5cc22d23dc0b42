use thiserror::Error;

use crate::models::SignalError;

/// Why a card did not become a signal.
///
/// Scraped pages are noisy, so these are routine outcomes rather than errors
/// worth propagating.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("card has no symbol link")]
    MissingSymbol,
    #[error("unsupported symbol text {0:?}")]
    UnsupportedSymbol(String),
    #[error("could not determine direction for {symbol}")]
    AmbiguousDirection { symbol: String },
    #[error("{symbol}: not enough value cells ({found} < {required})")]
    MissingPrices {
        symbol: String,
        found: usize,
        required: usize,
    },
    #[error("{symbol}: unparseable price {raw:?} at position {ordinal}")]
    InvalidPrice {
        symbol: String,
        ordinal: usize,
        raw: String,
    },
    #[error("{symbol}: non-positive price")]
    NonPositivePrice { symbol: String },
    #[error("{symbol}: entry {entry} below plausible floor {floor}")]
    BelowFloor {
        symbol: String,
        entry: f64,
        floor: f64,
    },
    #[error("{symbol} is not a target symbol")]
    NotTargeted { symbol: String },
    #[error(transparent)]
    Invalid(#[from] SignalError),
}
