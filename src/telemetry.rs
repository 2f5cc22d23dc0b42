use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::core::Rejection;
use crate::models::Signal;
use crate::scraper::CycleError;

/// Receives everything worth reporting during a scrape.
///
/// Components take this as a parameter instead of logging through globals,
/// so tests can record events and deployments can forward them elsewhere.
pub trait ScrapeObserver: Send + Sync {
    fn card_rejected(&self, index: usize, reason: &Rejection);
    fn new_signal(&self, signal: &Signal);
    /// A position must be closed. Reported at the highest severity.
    fn terminated(&self, signal: &Signal);
    fn cycle_failed(&self, error: &CycleError);
    fn cycle_completed(&self, summary: &CycleSummary);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub cards: usize,
    pub parsed: usize,
    pub rejected: usize,
    pub off_target: usize,
    pub new_active: usize,
    pub new_terminated: usize,
}

impl CycleSummary {
    pub fn new_total(&self) -> usize {
        self.new_active + self.new_terminated
    }
}

/// Default observer writing through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ScrapeObserver for TracingObserver {
    fn card_rejected(&self, index: usize, reason: &Rejection) {
        debug!("Card {} skipped: {}", index + 1, reason);
    }

    fn new_signal(&self, signal: &Signal) {
        info!("  NEW {} [{}]", signal, signal.fingerprint());
    }

    fn terminated(&self, signal: &Signal) {
        error!(
            "CLOSE NOW: {} TERMINATED [{}] - trading bot should close position!",
            signal.symbol(),
            signal.fingerprint()
        );
    }

    fn cycle_failed(&self, error: &CycleError) {
        error!("Scrape cycle failed: {}", error);
    }

    fn cycle_completed(&self, summary: &CycleSummary) {
        info!(
            "Cycle done: {} cards, {} parsed, {} rejected, {} off-target",
            summary.cards, summary.parsed, summary.rejected, summary.off_target
        );
        if summary.new_total() == 0 {
            info!("No new signals found");
        } else {
            info!(
                "Saved {} active signals, {} terminated",
                summary.new_active, summary.new_terminated
            );
        }
        if summary.new_terminated > 0 {
            warn!(
                "EMERGENCY: {} positions should be closed immediately!",
                summary.new_terminated
            );
        }
    }
}

/// Install the global `tracing` subscriber. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();
}

#[cfg(test)]
pub mod recording {
    use super::*;
    use std::sync::Mutex;

    /// Observer that keeps everything it is told, for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingObserver {
        pub rejections: Mutex<Vec<(usize, Rejection)>>,
        pub new_signals: Mutex<Vec<Signal>>,
        pub terminations: Mutex<Vec<Signal>>,
        pub failures: Mutex<Vec<String>>,
        pub summaries: Mutex<Vec<CycleSummary>>,
    }

    impl ScrapeObserver for RecordingObserver {
        fn card_rejected(&self, index: usize, reason: &Rejection) {
            self.rejections.lock().unwrap().push((index, reason.clone()));
        }

        fn new_signal(&self, signal: &Signal) {
            self.new_signals.lock().unwrap().push(signal.clone());
        }

        fn terminated(&self, signal: &Signal) {
            self.terminations.lock().unwrap().push(signal.clone());
        }

        fn cycle_failed(&self, error: &CycleError) {
            self.failures.lock().unwrap().push(error.to_string());
        }

        fn cycle_completed(&self, summary: &CycleSummary) {
            self.summaries.lock().unwrap().push(summary.clone());
        }
    }
}
