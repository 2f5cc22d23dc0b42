use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::storage::{DocumentKey, DocumentStore, StoreError};

/// In-process document store. Writes can be made to fail on demand.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<DocumentKey, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn get(&self, key: DocumentKey) -> Option<Vec<u8>> {
        self.docs.lock().ok()?.get(&key).cloned()
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, key: DocumentKey) -> Result<Option<Vec<u8>>, StoreError> {
        let docs = self.docs.lock().map_err(|_| StoreError::Io {
            key,
            source: io::Error::new(io::ErrorKind::Other, "memory store poisoned"),
        })?;
        Ok(docs.get(&key).cloned())
    }

    fn write_atomic(&self, key: DocumentKey, bytes: &[u8]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                key,
                source: io::Error::new(io::ErrorKind::Other, "simulated write failure"),
            });
        }
        let mut docs = self.docs.lock().map_err(|_| StoreError::Io {
            key,
            source: io::Error::new(io::ErrorKind::Other, "memory store poisoned"),
        })?;
        docs.insert(key, bytes.to_vec());
        Ok(())
    }
}
