use jewelchat_chat::{KeyValueStorage, StorageUnavailable};
use wasm_bindgen::JsValue;
use web_sys::Storage;

/// `window.localStorage`, looked up on every call so a blocked store
/// (private mode, disabled cookies) only fails the call that touches it
pub struct BrowserStorage;

fn local_storage() -> Result<Storage, StorageUnavailable> {
    web_sys::window()
        .ok_or_else(|| StorageUnavailable("no window object".to_string()))?
        .local_storage()
        .map_err(unavailable)?
        .ok_or_else(|| StorageUnavailable("localStorage is disabled".to_string()))
}

fn unavailable(err: JsValue) -> StorageUnavailable {
    StorageUnavailable(format!("{:?}", err))
}

impl KeyValueStorage for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageUnavailable> {
        local_storage()?.get_item(key).map_err(unavailable)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageUnavailable> {
        local_storage()?.set_item(key, value).map_err(unavailable)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageUnavailable> {
        local_storage()?.remove_item(key).map_err(unavailable)
    }
}
