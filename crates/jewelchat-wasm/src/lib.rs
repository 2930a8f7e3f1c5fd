use jewelchat_api::{ApiConfig, ChatBackend, HttpChatClient};
use jewelchat_chat::Storefront;
use jewelchat_types::DEFAULT_TRENDING_LIMIT;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

mod dom;
mod storage;
mod timers;
mod widget;

pub use storage::BrowserStorage;
pub use timers::TimeoutScheduler;
use widget::StorefrontApp;

/// Initialize the WASM module
/// This sets up panic hooks and logging
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    wasm_logger::init(wasm_logger::Config::default());

    log::info!("JewelChat WASM initialized");
}

/// Handle to a mounted storefront
#[wasm_bindgen]
pub struct StorefrontHandle {
    storefront: Storefront<TimeoutScheduler>,
}

#[wasm_bindgen]
impl StorefrontHandle {
    #[wasm_bindgen(js_name = openChat)]
    pub fn open_chat(&self) {
        self.storefront.open_chat();
    }

    #[wasm_bindgen(js_name = closeChat)]
    pub fn close_chat(&self) {
        self.storefront.close_chat();
    }

    /// Cancel pending scroll and auto-close timers
    pub fn unmount(&self) {
        self.storefront.unmount();
    }
}

/// Render the storefront into the element with id `root_id`.
/// `api_base_url` overrides the build-time backend address.
#[wasm_bindgen(js_name = mountStorefront)]
pub fn mount_storefront(root_id: String, api_base_url: Option<String>) -> Result<StorefrontHandle, JsValue> {
    let config = ApiConfig::resolve(api_base_url.as_deref());
    log::info!("Mounting storefront against {}", config.base_url);

    let app = StorefrontApp::mount(document()?, &root_id, config)?;
    Ok(StorefrontHandle {
        storefront: app.storefront().clone(),
    })
}

/// Fetch trending products as plain JS objects
#[wasm_bindgen(js_name = trendingProducts)]
pub async fn trending_products(limit: Option<u32>, api_base_url: Option<String>) -> Result<JsValue, JsValue> {
    let client = HttpChatClient::new(ApiConfig::resolve(api_base_url.as_deref()))
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let products = client
        .trending_products(limit.unwrap_or(DEFAULT_TRENDING_LIMIT))
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let json = serde_json::to_string(&products)
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize: {}", e)))?;
    js_sys::JSON::parse(&json)
}

/// Get the window object
fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))
}

/// Get the document object
fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("No document object"))
}
