pub mod classifier;
pub mod dedup;
pub mod parser;
pub mod pipeline;
pub mod rejection;

pub use classifier::PlausibilityGuard;
pub use dedup::{filter_new, Ledger};
pub use parser::{Candidate, CardParser, Prices};
pub use pipeline::{Extraction, SignalPipeline};
pub use rejection::Rejection;
