use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::Ledger;
use crate::models::{Signal, SignalRecord};
use crate::storage::{DocumentKey, DocumentStore, StoreError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotDocument {
    #[serde(default)]
    pub signals: Vec<SignalRecord>,
    #[serde(default)]
    pub terminated_signals: Vec<SignalRecord>,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_signals: usize,
    #[serde(default)]
    pub terminated_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerDocument {
    #[serde(default)]
    pub processed_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusDocument {
    #[serde(default)]
    pub last_scrape: Option<DateTime<Utc>>,
    #[serde(default)]
    pub active_signals: usize,
    #[serde(default)]
    pub terminated_signals: usize,
    #[serde(default)]
    pub symbols_active: Vec<String>,
    #[serde(default)]
    pub symbols_terminated: Vec<String>,
}

/// Owns the snapshot, ledger and status documents.
///
/// The in-memory ledger mirrors what is on disk: it only changes after the
/// ledger document was written successfully.
pub struct StateStore<D: DocumentStore> {
    docs: D,
    ledger: Ledger,
}

impl<D: DocumentStore> StateStore<D> {
    /// Load state, writing empty documents for any that do not exist yet.
    pub fn open(docs: D, ledger_cap: usize) -> Result<Self, StoreError> {
        if docs.read(DocumentKey::Snapshot)?.is_none() {
            write_json(&docs, DocumentKey::Snapshot, &SnapshotDocument::default())?;
        }
        if docs.read(DocumentKey::Status)?.is_none() {
            write_json(&docs, DocumentKey::Status, &StatusDocument::default())?;
        }

        let ledger = match read_json::<LedgerDocument, _>(&docs, DocumentKey::Ledger) {
            Ok(Some(doc)) => Ledger::from_ids(doc.processed_ids, ledger_cap),
            Ok(None) => {
                let ledger = Ledger::new(ledger_cap);
                write_json(&docs, DocumentKey::Ledger, &LedgerDocument::default())?;
                ledger
            }
            Err(StoreError::Corrupt { key, source }) => {
                // Starting empty may re-emit old signals; losing new ones would be worse.
                warn!("{} unreadable ({}), starting with an empty ledger", key, source);
                Ledger::new(ledger_cap)
            }
            Err(e) => return Err(e),
        };

        debug!("State loaded: {} processed fingerprints", ledger.len());
        Ok(Self { docs, ledger })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn documents(&self) -> &D {
        &self.docs
    }

    pub fn persist(&mut self, new_signals: &[Signal]) -> Result<(Vec<Signal>, Vec<Signal>), StoreError> {
        self.persist_at(new_signals, Utc::now())
    }

    /// Replace the snapshot and status with this cycle's signals, then record
    /// their fingerprints. On error nothing is recorded, so the next cycle
    /// sees the same signals as new again.
    pub fn persist_at(
        &mut self,
        new_signals: &[Signal],
        now: DateTime<Utc>,
    ) -> Result<(Vec<Signal>, Vec<Signal>), StoreError> {
        let (active, terminated): (Vec<Signal>, Vec<Signal>) = new_signals
            .iter()
            .cloned()
            .partition(|s| s.direction().is_active());

        let snapshot = SnapshotDocument {
            signals: active.iter().map(Signal::to_record).collect(),
            terminated_signals: terminated.iter().map(Signal::to_record).collect(),
            last_update: Some(now),
            total_signals: active.len(),
            terminated_count: terminated.len(),
        };
        write_json(&self.docs, DocumentKey::Snapshot, &snapshot)?;

        let status = StatusDocument {
            last_scrape: Some(now),
            active_signals: active.len(),
            terminated_signals: terminated.len(),
            symbols_active: active.iter().map(|s| s.symbol().to_string()).collect(),
            symbols_terminated: terminated.iter().map(|s| s.symbol().to_string()).collect(),
        };
        write_json(&self.docs, DocumentKey::Status, &status)?;

        self.record_processed(new_signals.iter().map(|s| s.fingerprint()))?;

        Ok((active, terminated))
    }

    /// Append fingerprints to the ledger, evicting the oldest past the cap.
    pub fn record_processed<'a, I>(&mut self, fingerprints: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut next = self.ledger.clone();
        next.extend(fingerprints);

        let doc = LedgerDocument {
            processed_ids: next.ids().map(str::to_string).collect(),
        };
        write_json(&self.docs, DocumentKey::Ledger, &doc)?;

        self.ledger = next;
        Ok(())
    }

    pub fn snapshot(&self) -> Result<SnapshotDocument, StoreError> {
        Ok(read_json(&self.docs, DocumentKey::Snapshot)?.unwrap_or_default())
    }

    pub fn status(&self) -> Result<StatusDocument, StoreError> {
        Ok(read_json(&self.docs, DocumentKey::Status)?.unwrap_or_default())
    }
}

fn read_json<T, D>(docs: &D, key: DocumentKey) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    D: DocumentStore + ?Sized,
{
    match docs.read(key)? {
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Corrupt { key, source }),
        None => Ok(None),
    }
}

fn write_json<T, D>(docs: &D, key: DocumentKey, value: &T) -> Result<(), StoreError>
where
    T: Serialize,
    D: DocumentStore + ?Sized,
{
    let bytes =
        serde_json::to_vec_pretty(value).map_err(|source| StoreError::Encode { key, source })?;
    docs.write_atomic(key, &bytes)
}
