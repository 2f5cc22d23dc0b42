pub mod file;
pub mod memory;
pub mod state;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use state::{LedgerDocument, SnapshotDocument, StateStore, StatusDocument};

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// The three documents the scraper owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKey {
    /// Latest cycle's active and terminated signals.
    Snapshot,
    /// Fingerprints already delivered.
    Ledger,
    /// Summary for external consumers.
    Status,
}

impl DocumentKey {
    pub const ALL: [DocumentKey; 3] = [DocumentKey::Snapshot, DocumentKey::Ledger, DocumentKey::Status];

    pub fn file_name(&self) -> &'static str {
        match self {
            DocumentKey::Snapshot => "current.json",
            DocumentKey::Ledger => "processed.json",
            DocumentKey::Status => "status.json",
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O on {key}: {source}")]
    Io {
        key: DocumentKey,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: DocumentKey,
        #[source]
        source: serde_json::Error,
    },
    #[error("{key} is not valid JSON: {source}")]
    Corrupt {
        key: DocumentKey,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot prepare state directory {path}: {source}")]
    Setup {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Whole-document storage. Readers must never see a half-written document.
pub trait DocumentStore: Send + Sync {
    /// `Ok(None)` when the document has never been written.
    fn read(&self, key: DocumentKey) -> Result<Option<Vec<u8>>, StoreError>;
    fn write_atomic(&self, key: DocumentKey, bytes: &[u8]) -> Result<(), StoreError>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    fn read(&self, key: DocumentKey) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).read(key)
    }

    fn write_atomic(&self, key: DocumentKey, bytes: &[u8]) -> Result<(), StoreError> {
        (**self).write_atomic(key, bytes)
    }
}
