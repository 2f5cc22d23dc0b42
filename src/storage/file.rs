use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::storage::{DocumentKey, DocumentStore, StoreError};

/// One pretty-printed JSON file per document inside a directory.
///
/// Writes go to a temp file in the same directory which is then renamed over
/// the target, so readers see either the old or the new document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Setup {
            path: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, key: DocumentKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

impl DocumentStore for JsonFileStore {
    fn read(&self, key: DocumentKey) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.path_of(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { key, source }),
        }
    }

    fn write_atomic(&self, key: DocumentKey, bytes: &[u8]) -> Result<(), StoreError> {
        let io = |source: std::io::Error| StoreError::Io { key, source };

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io)?;
        tmp.write_all(bytes).map_err(io)?;
        tmp.as_file().sync_all().map_err(io)?;
        tmp.persist(self.path_of(key)).map_err(|e| io(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_document_reads_as_none() {
        let dir = tempdir().expect("tmp");
        let store = JsonFileStore::open(dir.path()).expect("store");
        assert!(store.read(DocumentKey::Ledger).expect("read").is_none());
    }

    #[test]
    fn write_replaces_whole_document() {
        let dir = tempdir().expect("tmp");
        let store = JsonFileStore::open(dir.path().join("nested")).expect("store");
        store.write_atomic(DocumentKey::Status, b"{\"a\":1}").expect("write");
        store.write_atomic(DocumentKey::Status, b"{}").expect("write");

        let bytes = store.read(DocumentKey::Status).expect("read").expect("present");
        assert_eq!(bytes, b"{}");

        // No temp files left behind.
        let entries: Vec<_> = fs::read_dir(store.dir()).expect("ls").collect();
        assert_eq!(entries.len(), 1);
    }
}
