//! Durable key-value storage and the three persisted canvas namespaces.
//!
//! SYSTEM CONTEXT
//! ==============
//! In the browser the backing store is `window.localStorage`; natively and in
//! tests it is an in-memory map. Values are JSON strings. The namespace
//! loaders never fail: a missing key yields the default, a corrupt value is
//! logged and yields the default, and a single bad entry inside an otherwise
//! valid map is logged and skipped.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsValue;

use crate::camera::Viewport;
use crate::content::{ContentStore, Document, DocumentId};
use crate::error::{ErrorCode, StorageError};
use crate::visual::{VisualState, VisualStore};

/// String key → string value store.
pub trait KeyValueStorage {
    /// Read `key`. `Ok(None)` when absent.
    ///
    /// # Errors
    ///
    /// Returns `Read` when the backend refuses access.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns `Write` when the backend rejects the value (e.g. quota).
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `Write` when the backend refuses the removal.
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// MEMORY BACKEND
// =============================================================================

/// In-memory storage. Clones share the same underlying map, so a test can
/// keep a handle after giving one to the engine.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, as a full quota would.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Raw value under `key`, bypassing the trait.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    /// Store a raw value under `key`, bypassing the trait.
    pub fn put_raw(&self, key: &str, value: &str) {
        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Write { key: key.to_owned(), reason: "quota exceeded".to_owned() });
        }
        self.put_raw(key, value);
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Write { key: key.to_owned(), reason: "storage locked".to_owned() });
        }
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

// =============================================================================
// BROWSER BACKEND
// =============================================================================

/// `window.localStorage`.
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// Open the page's local storage.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` outside a browser window or when storage is
    /// disabled (private mode, sandboxed iframe).
    pub fn open() -> Result<Self, StorageError> {
        let window = web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".to_owned()))?;
        match window.local_storage() {
            Ok(Some(storage)) => Ok(Self { storage }),
            Ok(None) => Err(StorageError::Unavailable("localStorage disabled".to_owned())),
            Err(e) => Err(StorageError::Unavailable(js_reason(&e))),
        }
    }
}

impl KeyValueStorage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::Read { key: key.to_owned(), reason: js_reason(&e) })
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::Write { key: key.to_owned(), reason: js_reason(&e) })
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage
            .remove_item(key)
            .map_err(|e| StorageError::Write { key: key.to_owned(), reason: js_reason(&e) })
    }
}

/// Best-effort text for a thrown JS value.
pub(crate) fn js_reason(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

// =============================================================================
// NAMESPACES
// =============================================================================

/// Read and decode the JSON value under `key`. Empty strings read as absent.
///
/// # Errors
///
/// Propagates backend read errors and returns `Corrupt` for invalid JSON.
pub fn read_json<T: DeserializeOwned>(storage: &dyn KeyValueStorage, key: &str) -> Result<Option<T>, StorageError> {
    let Some(raw) = storage.get_item(key)? else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StorageError::Corrupt { key: key.to_owned(), source })
}

/// Encode `value` as JSON and write it under `key`.
///
/// # Errors
///
/// Returns `Serialize` if encoding fails and propagates backend write errors.
pub fn write_json<T: Serialize>(storage: &mut dyn KeyValueStorage, key: &str, value: &T) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialize { key: key.to_owned(), source })?;
    storage.set_item(key, &raw)
}

/// Write `value` under `key`, logging instead of failing. Returns whether the
/// write landed.
pub fn save_namespace<T: Serialize>(storage: &mut dyn KeyValueStorage, key: &str, value: &T) -> bool {
    match write_json(storage, key, value) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(key, code = e.error_code(), error = %e, "failed to save canvas state");
            false
        }
    }
}

/// Load the viewport record, or the default on any failure.
#[must_use]
pub fn load_viewport(storage: &dyn KeyValueStorage, key: &str) -> Viewport {
    match read_json::<Viewport>(storage, key) {
        Ok(Some(viewport)) => viewport,
        Ok(None) => Viewport::default(),
        Err(e) => {
            warn_load(key, &e);
            Viewport::default()
        }
    }
}

/// Load the visual-state map, skipping malformed entries.
#[must_use]
pub fn load_visuals(storage: &dyn KeyValueStorage, key: &str) -> VisualStore {
    load_entries::<VisualState>(storage, key).into_iter().collect()
}

/// Load the document map, skipping malformed entries. The map key is the
/// authoritative id.
#[must_use]
pub fn load_contents(storage: &dyn KeyValueStorage, key: &str) -> ContentStore {
    load_entries::<Document>(storage, key)
        .into_iter()
        .map(|(id, mut doc)| {
            doc.id = id;
            doc
        })
        .collect()
}

fn load_entries<V: DeserializeOwned>(storage: &dyn KeyValueStorage, key: &str) -> Vec<(DocumentId, V)> {
    let map = match read_json::<serde_json::Map<String, serde_json::Value>>(storage, key) {
        Ok(Some(map)) => map,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn_load(key, &e);
            return Vec::new();
        }
    };

    let mut entries = Vec::with_capacity(map.len());
    for (id, value) in map {
        match serde_json::from_value::<V>(value) {
            Ok(entry) => entries.push((DocumentId::from(id), entry)),
            Err(e) => tracing::warn!(key, id = %id, error = %e, "skipping malformed canvas entry"),
        }
    }
    entries
}

fn warn_load(key: &str, e: &StorageError) {
    tracing::warn!(key, code = e.error_code(), error = %e, "failed to load canvas state; using defaults");
}
