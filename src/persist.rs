//! Persistence port for the record stores
//!
//! Stores are write-through: every mutation serializes the full snapshot
//! and hands it to a [`DocumentStore`]. The filesystem backend keeps one
//! pretty-printed JSON document per key; the in-memory backend substitutes
//! for it in tests and benchmarks.
//!
//! There is no locking. Two processes writing the same document race, and
//! the later write wins — an accepted limitation, not a guarantee.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::Result;

/// Load/save abstraction over one JSON document per key.
///
/// The stores never interpret the document content here; serialization
/// happens at the aggregate level so a backend only moves strings.
pub trait DocumentStore: fmt::Debug + Send {
    /// Load the raw JSON document stored under `key`, if any.
    ///
    /// # Errors
    /// Returns an error if the document exists but cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the document stored under `key`.
    ///
    /// # Errors
    /// Returns an error if the document cannot be written.
    fn save(&self, key: &str, json: &str) -> Result<()>;
}

/// Directory-backed document store: `<dir>/<key>.json`.
#[derive(Debug)]
pub struct FsDocumentStore {
    dir: PathBuf,
}

impl FsDocumentStore {
    /// Open a document store rooted at `dir`, creating the directory if it
    /// does not exist.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The directory holding the documents.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn document_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl DocumentStore for FsDocumentStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.document_path(key);
        match fs::read_to_string(&path) {
            Ok(json) => {
                debug!(key, path = %path.display(), bytes = json.len(), "loaded document");
                Ok(Some(json))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, json: &str) -> Result<()> {
        let path = self.document_path(key);
        fs::write(&path, json)?;
        debug!(key, path = %path.display(), bytes = json.len(), "saved document");
        Ok(())
    }
}

/// In-memory document store for tests and benchmarks.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    docs: Mutex<HashMap<String, String>>,
}

impl MemoryDocumentStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let docs = self.docs.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(docs.get(key).cloned())
    }

    fn save(&self, key: &str, json: &str) -> Result<()> {
        let mut docs = self.docs.lock().unwrap_or_else(PoisonError::into_inner);
        docs.insert(key.to_string(), json.to_string());
        Ok(())
    }
}
