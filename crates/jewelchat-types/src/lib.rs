//! Core types for jewelchat
//!
//! Wire payloads exchanged with the chatbot backend and the small domain
//! values shared by the client, the session controller and the browser widget.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

// ============================================================================
// Constants
// ============================================================================

/// Local-storage key the session identifier is persisted under
pub const SESSION_STORAGE_KEY: &str = "chatbot_session_id";

/// Default number of products requested from the trending endpoint
pub const DEFAULT_TRENDING_LIMIT: u32 = 6;

// ============================================================================
// Session
// ============================================================================

/// Server-issued session identifier (opaque)
pub type SessionId = String;

/// Treat an explicit JSON `null` the same as a missing field
pub fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Payload of a successful `POST /start`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStart {
    pub session_id: SessionId,
    pub message: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub options: Vec<String>,
}

// ============================================================================
// Messages
// ============================================================================

/// Body of `POST /message`. An absent session is sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRequest {
    pub session_id: Option<SessionId>,
    pub message: String,
}

/// Payload of a successful `POST /message`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BotReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    pub message: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub options: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub products: Vec<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_state: Option<String>,
}

/// One entry in the chat transcript shown by the widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub text: String,
    pub from_user: bool,
    #[serde(default)]
    pub is_error: bool,
}

impl ChatEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self { text: text.into(), from_user: true, is_error: false }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self { text: text.into(), from_user: false, is_error: false }
    }

    /// Locally synthesized failure notice, rendered as a bot bubble
    pub fn error(text: impl Into<String>) -> Self {
        Self { text: text.into(), from_user: false, is_error: true }
    }
}

/// Row of `GET /history/{session_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub message: String,
    pub sender: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl From<HistoryEntry> for ChatEntry {
    fn from(entry: HistoryEntry) -> Self {
        if entry.sender.eq_ignore_ascii_case("user") {
            ChatEntry::user(entry.message)
        } else {
            ChatEntry::bot(entry.message)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct History {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub history: Vec<HistoryEntry>,
}

// ============================================================================
// Products
// ============================================================================

/// Product identifier; the backend emits integers but any JSON scalar is tolerated
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ProductId {
    Number(i64),
    Text(String),
}

// Largest magnitude at which every integer is exact in an f64
const MAX_EXACT_F64_INT: f64 = 9_007_199_254_740_992.0;

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Ok(ProductId::Number(i));
                }
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT_F64_INT => {
                        Ok(ProductId::Number(f as i64))
                    }
                    _ => Ok(ProductId::Text(n.to_string())),
                }
            }
            Value::String(s) => Ok(ProductId::Text(s)),
            Value::Bool(b) => Ok(ProductId::Text(b.to_string())),
            other => Err(D::Error::custom(format!("product id must be a scalar, got {}", other))),
        }
    }
}

/// Read a number that may arrive as a JSON number or a numeric string.
/// Anything else reads as absent.
fn lenient_number(value: Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn deserialize_lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(Value::deserialize(deserializer)?)
        .filter(|price| price.is_finite())
        .unwrap_or_default())
}

fn deserialize_lenient_optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(Value::deserialize(deserializer)?))
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Number(n) => write!(f, "{}", n),
            ProductId::Text(s) => f.write_str(s),
        }
    }
}

/// Product recommendation as emitted by the backend. Rendered as-is.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub image_url: String,
    #[serde(default, deserialize_with = "deserialize_lenient_price")]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metal_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub popularity: Option<f64>,
}

impl Product {
    /// Optional descriptive tags in display order, skipping absent or blank ones
    pub fn tags(&self) -> Vec<&str> {
        [&self.category, &self.metal_type, &self.style]
            .into_iter()
            .filter_map(|tag| tag.as_deref())
            .filter(|tag| !tag.trim().is_empty())
            .collect()
    }
}

/// Payload of `GET /trending`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendingProducts {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub products: Vec<Product>,
}

// ============================================================================
// Interaction tracking
// ============================================================================

/// Kind of product interaction reported to `POST /track`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    View,
    Click,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::View => "view",
            InteractionKind::Click => "click",
        }
    }
}

/// Body of `POST /track`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRequest {
    pub session_id: SessionId,
    pub product_id: ProductId,
    pub action_type: InteractionKind,
}
