//! # jewelchat-api
//!
//! REST client for the jewelry chatbot backend.
//!
//! ## Features
//!
//! - **Single configured client**: fixed base address ending in `/api/chatbot`, JSON content type
//! - **Envelope handling**: `{success, data, error}` responses are unwrapped into typed payloads
//! - **Normalized errors**: transport failures, non-2xx statuses and malformed bodies all map to [`ApiError`]
//! - **Backend trait**: [`ChatBackend`] lets the session controller run against fakes in tests
//!
//! No call is retried; recovery is left to the caller.
//!
//! ## Example
//!
//! ```rust,no_run
//! use jewelchat_api::{ApiConfig, ChatBackend, HttpChatClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), jewelchat_api::ApiError> {
//!     let client = HttpChatClient::new(ApiConfig::new("http://localhost:5000"))?;
//!
//!     let start = client.start_session().await?;
//!     println!("{}", start.message);
//!
//!     let reply = client
//!         .send_message(Some(&start.session_id), "Show me rings")
//!         .await?;
//!     println!("{} ({} products)", reply.message, reply.products.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;

#[cfg(test)]
mod tests;

pub use client::{http::HttpChatClient, ChatBackend, Envelope};
pub use config::{normalize_api_base_url, ApiConfig, API_PATH_SUFFIX, DEFAULT_API_BASE_URL};
pub use error::{ApiError, Result};
