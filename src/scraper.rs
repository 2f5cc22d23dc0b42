use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::Config;
use crate::core::{filter_new, SignalPipeline};
use crate::models::Signal;
use crate::source::PageSource;
use crate::storage::{DocumentStore, StateStore, StoreError};
use crate::telemetry::{CycleSummary, ScrapeObserver, TracingObserver};

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("card extraction failed: {0:#}")]
    Extraction(anyhow::Error),
    #[error("page returned no signal cards")]
    NoCards,
    #[error("failed to persist state: {0}")]
    Persistence(#[from] StoreError),
}

#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub summary: CycleSummary,
    pub active: Vec<Signal>,
    pub terminated: Vec<Signal>,
}

/// Drives fetch -> parse -> classify -> dedup -> persist, one cycle at a time.
pub struct SignalScraper<D: DocumentStore> {
    config: Config,
    source: Box<dyn PageSource>,
    pipeline: SignalPipeline,
    state: StateStore<D>,
    observer: Arc<dyn ScrapeObserver>,
}

impl<D: DocumentStore> SignalScraper<D> {
    pub fn new(config: Config, source: Box<dyn PageSource>, state: StateStore<D>) -> Self {
        info!("{}", "=".repeat(60));
        info!("Signal scraper starting up");
        info!("Source: {}", source.describe());
        info!("Target symbols: {}", config.target_symbols.join(", "));
        info!(
            "Interval: {}-{}s, retry back-off {}s",
            config.scrape_interval_min, config.scrape_interval_max, config.retry_backoff
        );
        info!("Known fingerprints: {}", state.ledger().len());
        info!("{}", "=".repeat(60));

        let pipeline = SignalPipeline::new(&config);
        Self {
            config,
            source,
            pipeline,
            state,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ScrapeObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn state(&self) -> &StateStore<D> {
        &self.state
    }

    /// Run until Ctrl+C.
    pub async fn run(&mut self) -> Result<()> {
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Scraper stopped by user");
                let _ = tx.send(true);
            }
        });
        self.run_until(rx).await
    }

    /// Run cycles until `shutdown` turns true. Shutdown is honoured between
    /// cycles, never in the middle of one. The source is closed on every exit.
    pub async fn run_until(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        self.open_source().await?;
        info!("Scraper is now running. Press Ctrl+C to stop.");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let wait = match self.run_cycle().await {
                Ok(_) => self.next_interval(),
                Err(e) => {
                    self.observer.cycle_failed(&e);
                    self.backoff_for(&e)
                }
            };
            info!("Next scrape in {:.1} minutes", wait.as_secs_f64() / 60.0);

            tokio::select! {
                changed = shutdown.changed() => {
                    // Sender gone: nobody can ask us to stop, keep the cadence.
                    if changed.is_err() {
                        tokio::time::sleep(wait).await;
                    }
                }
                _ = tokio::time::sleep(wait) => {}
            }
        }

        self.source.close().await;
        info!("Source closed");
        Ok(())
    }

    /// Open the source, run exactly one cycle, close the source.
    pub async fn run_once(&mut self) -> Result<CycleReport> {
        self.open_source().await?;
        let result = self.run_cycle().await;
        self.source.close().await;
        if let Err(e) = &result {
            self.observer.cycle_failed(e);
        }
        Ok(result?)
    }

    async fn open_source(&mut self) -> Result<()> {
        if let Err(e) = self.source.open().await {
            self.source.close().await;
            return Err(e).with_context(|| format!("Failed to open source {}", self.source.describe()));
        }
        Ok(())
    }

    pub async fn run_cycle(&mut self) -> Result<CycleReport, CycleError> {
        self.run_cycle_at(Utc::now()).await
    }

    pub async fn run_cycle_at(&mut self, captured_at: DateTime<Utc>) -> Result<CycleReport, CycleError> {
        info!("Starting scrape cycle...");

        let cards = self
            .source
            .fetch_cards()
            .await
            .map_err(CycleError::Extraction)?;
        if cards.is_empty() {
            return Err(CycleError::NoCards);
        }

        let extraction = self
            .pipeline
            .extract(&cards, captured_at, self.observer.as_ref());
        info!(
            "Found {} signals on {} cards ({} target symbols)",
            extraction.signals.len() + extraction.off_target,
            extraction.cards,
            extraction.signals.len()
        );

        let mut summary = CycleSummary {
            cards: extraction.cards,
            parsed: extraction.signals.len() + extraction.off_target,
            rejected: extraction.rejected,
            off_target: extraction.off_target,
            ..Default::default()
        };

        let fresh = filter_new(extraction.signals, self.state.ledger());
        if !fresh.is_empty() {
            info!("NEW SIGNALS: {} found!", fresh.len());
        }
        for signal in &fresh {
            self.observer.new_signal(signal);
        }

        // Snapshot and status are replaced every cycle, even when nothing is new.
        let (active, terminated) = self.state.persist_at(&fresh, captured_at)?;
        debug!("Ledger now holds {} fingerprints", self.state.ledger().len());

        for signal in &terminated {
            self.observer.terminated(signal);
        }

        summary.new_active = active.len();
        summary.new_terminated = terminated.len();
        self.observer.cycle_completed(&summary);

        Ok(CycleReport {
            summary,
            active,
            terminated,
        })
    }

    /// Jittered wait so polling does not line up with anyone else's.
    fn next_interval(&self) -> Duration {
        let (min, max) = (self.config.scrape_interval_min, self.config.scrape_interval_max);
        let secs = if min >= max {
            min
        } else {
            rand::thread_rng().gen_range(min..=max)
        };
        Duration::from_secs(secs)
    }

    fn backoff_for(&self, error: &CycleError) -> Duration {
        match error {
            CycleError::NoCards => self.next_interval(),
            CycleError::Extraction(_) | CycleError::Persistence(_) => {
                Duration::from_secs(self.config.retry_backoff)
            }
        }
    }
}
