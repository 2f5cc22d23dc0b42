use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::config::Config;
use crate::core::classifier::PlausibilityGuard;
use crate::core::parser::CardParser;
use crate::core::rejection::Rejection;
use crate::models::{Card, Signal};
use crate::telemetry::ScrapeObserver;

/// Result of running one page worth of cards through parse and classify.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Accepted target-symbol signals in page order.
    pub signals: Vec<Signal>,
    pub cards: usize,
    pub rejected: usize,
    pub off_target: usize,
}

/// Parser, plausibility guard and symbol allow-list chained together.
#[derive(Debug, Clone)]
pub struct SignalPipeline {
    parser: CardParser,
    guard: PlausibilityGuard,
    targets: HashSet<String>,
}

impl SignalPipeline {
    pub fn new(cfg: &Config) -> Self {
        Self {
            parser: CardParser::new(cfg),
            guard: PlausibilityGuard::new(cfg),
            targets: cfg.target_symbols.iter().cloned().collect(),
        }
    }

    pub fn is_target(&self, symbol: &str) -> bool {
        self.targets.contains(symbol)
    }

    /// Parse and validate a single card.
    pub fn evaluate<C: Card + ?Sized>(
        &self,
        card: &C,
        captured_at: DateTime<Utc>,
    ) -> Result<Signal, Rejection> {
        let candidate = self.parser.parse(card, captured_at)?;
        let signal = self.guard.classify(candidate)?;
        if !self.is_target(signal.symbol()) {
            return Err(Rejection::NotTargeted {
                symbol: signal.symbol().to_string(),
            });
        }
        Ok(signal)
    }

    /// Run every card; one bad card never affects the others.
    pub fn extract<C: Card>(
        &self,
        cards: &[C],
        captured_at: DateTime<Utc>,
        observer: &dyn ScrapeObserver,
    ) -> Extraction {
        let mut out = Extraction {
            cards: cards.len(),
            ..Default::default()
        };

        for (i, card) in cards.iter().enumerate() {
            match self.evaluate(card, captured_at) {
                Ok(signal) => out.signals.push(signal),
                Err(reason) => {
                    if matches!(reason, Rejection::NotTargeted { .. }) {
                        out.off_target += 1;
                    } else {
                        out.rejected += 1;
                    }
                    observer.card_rejected(i, &reason);
                }
            }
        }

        out
    }
}
