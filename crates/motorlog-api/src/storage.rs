// Persisted key-value storage
//
// The device keeps its token, guest flag, dictionary cache and offline
// mirrors as string values under fixed keys. `KeyValueStore` is the seam;
// `MemoryStore` backs tests and ephemeral sessions, `FileStore` writes one
// JSON file per key under a data directory.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::Error;

/// String-keyed persistent storage.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Missing keys are `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), Error>;
}

/// JSON helpers available on every store.
pub trait StoreExt: KeyValueStore {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, Error> {
        let Some(raw) = self.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| Error::Deserialization {
                message: format!("stored value for '{key}' is not valid: {e}"),
                body: raw,
            })
    }

    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), Error> {
        let raw = serde_json::to_string(value)
            .map_err(|e| Error::Storage(format!("failed to encode '{key}': {e}")))?;
        self.set(key, &raw)
    }
}

impl<S: KeyValueStore + ?Sized> StoreExt for S {}

// ── In-memory ────────────────────────────────────────────────────────

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.entries.remove(key);
        Ok(())
    }
}

// ── File-backed ──────────────────────────────────────────────────────

/// One file per key under `dir`. Writes go through a temp file and a
/// rename so a crash never leaves a half-written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage(format!("failed to read '{key}': {e}"))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| Error::Storage(format!("failed to create {}: {e}", self.dir.display())))?;

        // Unique temp name per writer; concurrent writes to one key each
        // commit whole files and the last rename wins.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .and_then(|mut f| f.write_all(value.as_bytes()).map(|()| f))
            .map_err(|e| Error::Storage(format!("failed to write '{key}': {e}")))?;
        tmp.as_file_mut()
            .sync_all()
            .map_err(|e| Error::Storage(format!("failed to write '{key}': {e}")))?;
        tmp.persist(self.path_for(key))
            .map_err(|e| Error::Storage(format!("failed to commit '{key}': {}", e.error)))?;

        trace!(key, "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!("failed to remove '{key}': {e}"))),
        }
    }
}
