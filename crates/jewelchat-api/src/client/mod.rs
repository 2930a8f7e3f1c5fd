use async_trait::async_trait;
use serde::Deserialize;

use jewelchat_types::{BotReply, History, InteractionKind, Product, ProductId, SessionStart};

use crate::error::{ApiError, Result};

pub mod http;

/// Response wrapper used by every backend endpoint: `{success, data?, error?}`
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, turning `success: false` or a missing `data` into an error
    pub fn into_data(self) -> Result<T> {
        if !self.success {
            let reason = self
                .error
                .or(self.message)
                .unwrap_or_else(|| "Unknown error from server".to_string());
            return Err(ApiError::Rejected(reason));
        }

        self.data
            .ok_or_else(|| ApiError::Malformed("response has no data".to_string()))
    }
}

/// Chatbot backend operations used by the widget
///
/// Futures are not `Send`: in the browser they run on the single-threaded
/// event loop.
#[async_trait(?Send)]
pub trait ChatBackend {
    /// Create a new session and return the welcome turn
    async fn start_session(&self) -> Result<SessionStart>;

    /// Send one user message. `session_id` may be absent; the backend decides what to do with that.
    async fn send_message(&self, session_id: Option<&str>, message: &str) -> Result<BotReply>;

    /// Report a product interaction. Callers treat this as best-effort.
    async fn track_interaction(
        &self,
        session_id: &str,
        product_id: &ProductId,
        action: InteractionKind,
    ) -> Result<()>;

    async fn trending_products(&self, limit: u32) -> Result<Vec<Product>>;

    /// Earlier turns of an existing session
    async fn conversation_history(&self, session_id: &str) -> Result<History>;
}
