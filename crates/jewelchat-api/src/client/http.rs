use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use jewelchat_types::{
    BotReply, History, InteractionKind, MessageRequest, Product, ProductId, SessionStart,
    TrackRequest, TrendingProducts,
};

use crate::client::{ChatBackend, Envelope};
use crate::config::ApiConfig;
use crate::error::{ApiError, Result};

/// Chatbot client over HTTP/JSON. Works natively and in the browser (fetch).
#[derive(Debug, Clone)]
pub struct HttpChatClient {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpChatClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::Config(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Config(format!("{} cannot be a base URL", config.base_url)));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        log::info!("API base URL: {}", base_url);

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a request and unwrap the `{success, data}` envelope
    async fn call<B, T>(&self, operation: &str, method: Method, url: Url, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let result = self.call_raw(method, url, body).await.and_then(|text| {
            let envelope: Envelope<T> = serde_json::from_str(&text)?;
            envelope.into_data()
        });

        if let Err(e) = &result {
            log::error!("API call failed ({}): {}", operation, e);
        }
        result
    }

    /// Send a request and return the body of a 2xx response
    async fn call_raw<B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<String>
    where
        B: Serialize + ?Sized,
    {
        log::debug!("{} {}", method, url);

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        log::debug!("Response {}: {}", status, text);
        Ok(text)
    }
}

#[async_trait(?Send)]
impl ChatBackend for HttpChatClient {
    async fn start_session(&self) -> Result<SessionStart> {
        self.call::<(), _>("start session", Method::POST, self.endpoint(&["start"]), None)
            .await
    }

    async fn send_message(&self, session_id: Option<&str>, message: &str) -> Result<BotReply> {
        let body = MessageRequest {
            session_id: session_id.map(str::to_string),
            message: message.to_string(),
        };
        self.call("send message", Method::POST, self.endpoint(&["message"]), Some(&body))
            .await
    }

    async fn track_interaction(
        &self,
        session_id: &str,
        product_id: &ProductId,
        action: InteractionKind,
    ) -> Result<()> {
        let body = TrackRequest {
            session_id: session_id.to_string(),
            product_id: product_id.clone(),
            action_type: action,
        };

        // Response shape is not part of the contract; only the status matters.
        // Callers log failures at their own level.
        self.call_raw(Method::POST, self.endpoint(&["track"]), Some(&body))
            .await
            .map(|_| ())
    }

    async fn trending_products(&self, limit: u32) -> Result<Vec<Product>> {
        let mut url = self.endpoint(&["trending"]);
        url.query_pairs_mut().append_pair("limit", &limit.to_string());

        let trending: TrendingProducts = self
            .call::<(), _>("trending products", Method::GET, url, None)
            .await?;
        Ok(trending.products)
    }

    async fn conversation_history(&self, session_id: &str) -> Result<History> {
        self.call::<(), _>(
            "conversation history",
            Method::GET,
            self.endpoint(&["history", session_id]),
            None,
        )
        .await
    }
}
