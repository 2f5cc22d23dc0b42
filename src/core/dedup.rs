use std::collections::{HashSet, VecDeque};

use crate::models::Signal;

pub const DEFAULT_LEDGER_CAP: usize = 1000;

/// Fingerprints already delivered downstream, oldest first.
///
/// Bounded: once `cap` is exceeded the oldest insertions are dropped. Entries
/// are never re-touched, so this is plain insertion-order eviction.
#[derive(Debug, Clone)]
pub struct Ledger {
    order: VecDeque<String>,
    index: HashSet<String>,
    cap: usize,
}

impl Ledger {
    pub fn new(cap: usize) -> Self {
        Self {
            order: VecDeque::new(),
            index: HashSet::new(),
            cap: cap.max(1),
        }
    }

    pub fn from_ids<I, S>(ids: I, cap: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ledger = Self::new(cap);
        ledger.extend(ids);
        ledger
    }

    pub fn contains(&self, fingerprint: &str) -> bool {
        self.index.contains(fingerprint)
    }

    /// Returns `false` if the fingerprint was already present.
    pub fn insert(&mut self, fingerprint: impl Into<String>) -> bool {
        let fingerprint = fingerprint.into();
        if self.index.contains(&fingerprint) {
            return false;
        }
        self.index.insert(fingerprint.clone());
        self.order.push_back(fingerprint);
        while self.order.len() > self.cap {
            if let Some(evicted) = self.order.pop_front() {
                self.index.remove(&evicted);
            }
        }
        true
    }

    pub fn extend<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in ids {
            self.insert(id);
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_CAP)
    }
}

/// Keep signals whose fingerprint is not in the ledger, in their original
/// order. A fingerprint repeated within the batch is kept once.
///
/// The ledger is not touched; recording happens only after persistence.
pub fn filter_new(candidates: Vec<Signal>, ledger: &Ledger) -> Vec<Signal> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|s| !ledger.contains(s.fingerprint()) && seen.insert(s.fingerprint().to_string()))
        .collect()
}
