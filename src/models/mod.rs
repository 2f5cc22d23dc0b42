pub mod card;
pub mod direction;
pub mod signal;

pub use card::{Card, RawCard, SubValue};
pub use direction::Direction;
pub use signal::{fingerprint, Signal, SignalError, SignalRecord};
