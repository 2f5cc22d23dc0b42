pub mod config;
pub mod core;
pub mod models;
pub mod scraper;
pub mod source;
pub mod storage;
pub mod telemetry;
#[cfg(test)]
pub mod test_helpers;
