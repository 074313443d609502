#![forbid(unsafe_code)]

//! Durable key/value preference storage.
//!
//! The sidebar persists exactly two scalars (collapsed flag and preferred
//! width). [`MemoryStore`] backs tests and sessions without a profile;
//! [`JsonFileStore`] keeps values in a small JSON document.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "items": { "inspector.collapsed": "false", "inspector.width": "400" }
//! }
//! ```
//!
//! # Atomic Writes
//!
//! Writes use a temp-file-then-rename pattern so a crash never leaves a
//! truncated file behind.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Current file format version.
const FORMAT_VERSION: u64 = 1;

/// String key/value storage shared by the UI thread.
pub trait PersistentStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: seed a value.
    #[must_use]
    pub fn with_item(self, key: &str, value: &str) -> Self {
        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
        self
    }
}

impl PersistentStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u64,
    items: BTreeMap<String, String>,
}

/// JSON file backed store with a write-through cache.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    items: RefCell<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`.
    ///
    /// - **Missing file** yields an empty store (not an error).
    /// - **Corrupted file** returns [`StoreError::Json`].
    /// - **Version mismatch** returns [`StoreError::Version`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let items = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            let file: StoreFile = serde_json::from_str(&contents)?;
            if file.version != FORMAT_VERSION {
                return Err(StoreError::Version {
                    found: file.version,
                    expected: FORMAT_VERSION,
                });
            }
            file.items
        } else {
            BTreeMap::new()
        };
        tracing::debug!(
            message = "store.open",
            path = %path.display(),
            items = items.len()
        );
        Ok(Self {
            path,
            items: RefCell::new(items),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let file = StoreFile {
            version: FORMAT_VERSION,
            items: self.items.borrow().clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        let temp = self.path.with_extension("json.tmp");
        std::fs::write(&temp, json)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

impl PersistentStore for JsonFileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let previous = self
            .items
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        if previous.as_deref() == Some(value) {
            return Ok(());
        }
        self.flush()
    }
}
