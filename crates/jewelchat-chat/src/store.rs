//! Persistence of the chat session identifier
//!
//! The widget keeps exactly one value in browser-local storage. Storage can
//! be missing or disabled (private browsing, quota, sandboxed iframes), so
//! every failure degrades to "nothing stored" instead of an error.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

use jewelchat_types::{SessionId, SESSION_STORAGE_KEY};

#[derive(Debug, Error)]
#[error("storage unavailable: {0}")]
pub struct StorageUnavailable(pub String);

/// Minimal string key/value storage, shaped after the Web Storage API
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageUnavailable>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageUnavailable>;
    fn remove_item(&self, key: &str) -> Result<(), StorageUnavailable>;
}

/// In-memory storage for native use and tests. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
    unavailable: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that fails every operation, like a disabled `localStorage`
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), StorageUnavailable> {
        if self.unavailable {
            Err(StorageUnavailable("storage disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageUnavailable> {
        self.check()?;
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageUnavailable> {
        self.check()?;
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageUnavailable> {
        self.check()?;
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Saves, loads and clears the session identifier under [`SESSION_STORAGE_KEY`]
#[derive(Clone)]
pub struct SessionStore {
    storage: Rc<dyn KeyValueStorage>,
}

impl SessionStore {
    pub fn new(storage: Rc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    pub fn in_memory() -> Self {
        Self::new(Rc::new(MemoryStorage::new()))
    }

    /// Store a non-empty identifier. Empty identifiers are ignored.
    pub fn save(&self, session_id: &str) {
        if session_id.is_empty() {
            return;
        }
        if let Err(e) = self.storage.set_item(SESSION_STORAGE_KEY, session_id) {
            log::warn!("Could not persist session id: {}", e);
        }
    }

    pub fn load(&self) -> Option<SessionId> {
        match self.storage.get_item(SESSION_STORAGE_KEY) {
            Ok(value) => value.filter(|id| !id.is_empty()),
            Err(e) => {
                log::warn!("Could not read session id: {}", e);
                None
            }
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.storage.remove_item(SESSION_STORAGE_KEY) {
            log::warn!("Could not clear session id: {}", e);
        }
    }
}
