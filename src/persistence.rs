//! Layout persistence: named snapshots of the whole document.
//!
//! DESIGN
//! ======
//! All saved layouts live under one storage key as a JSON array of
//! `{id, name, widgets, layout}`. The array is read once when the store is
//! opened (an absent key is an empty collection) and rewritten in full after
//! every save. Names are unique: saving under an existing name replaces that
//! entry's snapshot in place, keeping its id and its position in the list.
//!
//! ERROR HANDLING
//! ==============
//! A blank name aborts before anything changes. A storage write failure is
//! reported to the caller, but the in-memory collection already holds the
//! new snapshot; there is no retry and no rollback, so memory and storage
//! disagree until the next successful save.

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::consts::SAVED_LAYOUTS_KEY;
use crate::doc::Document;
use crate::error::{ErrorCode, ErrorKind};
use crate::widget::LayoutItem;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("layout name cannot be empty")]
    BlankName,
    #[error("layout not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Io(#[from] io::Error),
    #[error("stored layouts are corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl ErrorCode for PersistenceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::BlankName => "E_BLANK_NAME",
            Self::NotFound(_) => "E_LAYOUT_NOT_FOUND",
            Self::Io(_) => "E_STORAGE",
            Self::Corrupt(_) => "E_CORRUPT_STORAGE",
        }
    }

    fn kind(&self) -> ErrorKind {
        match self {
            Self::BlankName => ErrorKind::PersistenceName,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Io(_) => ErrorKind::Storage,
            Self::Corrupt(_) => ErrorKind::Payload,
        }
    }
}

// =============================================================================
// STORAGE
// =============================================================================

/// Durable key/value storage holding serialized strings.
pub trait Storage {
    /// Read a key. An absent key is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns any I/O failure other than the key being absent.
    fn read(&self, key: &str) -> io::Result<Option<String>>;

    /// Replace the value under a key.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O failure.
    fn write(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Writes to a sibling temp file and renames it over the target, so a
    /// failed write leaves the previous contents intact.
    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)
    }
}

/// In-process storage, for tests and embedders without a filesystem.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a key with a raw value.
    #[must_use]
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_owned(), value.to_owned());
        self
    }

    /// Make every following write fail with an I/O error.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::other("storage unavailable"));
        }
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

// =============================================================================
// LAYOUT STORE
// =============================================================================

/// A named snapshot of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLayout {
    /// Creation-ordered id (milliseconds since the epoch, bumped to stay increasing).
    pub id: u64,
    pub name: String,
    /// The rows at save time.
    pub widgets: Document,
    /// Positional entries of the rows at save time.
    #[serde(default)]
    pub layout: Vec<LayoutItem>,
}

/// Listing entry for the layout picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutSummary {
    pub id: u64,
    pub name: String,
}

fn now_ms() -> u64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    u64::try_from(dur.as_millis()).unwrap_or(0)
}

/// The saved-layout collection, backed by a [`Storage`].
#[derive(Debug)]
pub struct LayoutStore<S: Storage> {
    storage: S,
    key: String,
    layouts: Vec<SavedLayout>,
}

impl<S: Storage> LayoutStore<S> {
    /// Open the collection under the default key.
    ///
    /// # Errors
    ///
    /// Returns `Io` if storage cannot be read and `Corrupt` if the stored
    /// value is not a valid layout array.
    pub fn open(storage: S) -> Result<Self, PersistenceError> {
        Self::open_with_key(storage, SAVED_LAYOUTS_KEY)
    }

    /// Open the collection stored under `key`.
    ///
    /// # Errors
    ///
    /// Same as [`LayoutStore::open`].
    pub fn open_with_key(storage: S, key: &str) -> Result<Self, PersistenceError> {
        let layouts: Vec<SavedLayout> = match storage.read(key)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };
        info!(%key, count = layouts.len(), "saved layouts loaded");
        Ok(Self { storage, key: key.to_owned(), layouts })
    }

    /// Snapshot `doc` under `name` and rewrite storage. Returns the entry's id.
    ///
    /// # Errors
    ///
    /// Returns `BlankName` (nothing changed) for an empty or whitespace name,
    /// and `Io` / `Corrupt` if the collection could not be written; the
    /// in-memory collection keeps the new snapshot in that case.
    pub fn save(&mut self, name: &str, doc: &Document) -> Result<u64, PersistenceError> {
        if name.trim().is_empty() {
            return Err(PersistenceError::BlankName);
        }
        let widgets = doc.clone();
        let layout = doc.layout_items();
        let id = if let Some(existing) = self.layouts.iter_mut().find(|l| l.name == name) {
            existing.widgets = widgets;
            existing.layout = layout;
            existing.id
        } else {
            let id = self.next_id();
            self.layouts.push(SavedLayout { id, name: name.to_owned(), widgets, layout });
            id
        };
        info!(%name, id, rows = doc.len(), "layout saved");
        self.flush()?;
        Ok(id)
    }

    /// The snapshot stored under `name`. The collection is not changed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown name.
    pub fn load(&self, name: &str) -> Result<Document, PersistenceError> {
        self.get(name)
            .map(|l| l.widgets.clone())
            .ok_or_else(|| PersistenceError::NotFound(name.to_owned()))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SavedLayout> {
        self.layouts.iter().find(|l| l.name == name)
    }

    /// Saved layouts in collection order.
    #[must_use]
    pub fn list(&self) -> Vec<LayoutSummary> {
        self.layouts
            .iter()
            .map(|l| LayoutSummary { id: l.id, name: l.name.clone() })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn next_id(&self) -> u64 {
        let last = self.layouts.iter().map(|l| l.id).max().unwrap_or(0);
        now_ms().max(last.saturating_add(1))
    }

    fn flush(&mut self) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string(&self.layouts)?;
        if let Err(e) = self.storage.write(&self.key, &raw) {
            error!(key = %self.key, error = %e, "failed to write saved layouts");
            return Err(e.into());
        }
        Ok(())
    }
}
