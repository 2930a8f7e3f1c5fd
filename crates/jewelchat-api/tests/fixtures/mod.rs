use serde_json::{json, Value};
use wiremock::matchers::*;
use wiremock::{Mock, MockServer, ResponseTemplate};

use jewelchat_api::{ApiConfig, HttpChatClient};

/// Mock chatbot backend mounted under `/api/chatbot`
pub struct ChatbotMockServer {
    server: MockServer,
}

impl ChatbotMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Client pointed at the bare host; the suffix is added by normalization
    pub fn client(&self) -> HttpChatClient {
        HttpChatClient::new(ApiConfig::new(self.uri())).unwrap()
    }

    pub async fn mock_start(&self, session_id: &str, message: &str, options: &[&str]) {
        Mock::given(method("POST"))
            .and(path("/api/chatbot/start"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "session_id": session_id,
                    "message": message,
                    "options": options
                }
            })))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Reply to `POST /message` when the body matches `expected_body`
    pub async fn mock_message(&self, expected_body: Value, data: Value) {
        Mock::given(method("POST"))
            .and(path("/api/chatbot/message"))
            .and(header("content-type", "application/json"))
            .and(body_json(expected_body))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": data
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_status(&self, verb: &str, route: &str, status: u16, body: Value) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_track(&self, expected_body: Value) {
        Mock::given(method("POST"))
            .and(path("/api/chatbot/track"))
            .and(body_json(expected_body))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "Interaction tracked successfully"
            })))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_trending(&self, limit: u32, products: Value) {
        Mock::given(method("GET"))
            .and(path("/api/chatbot/trending"))
            .and(query_param("limit", limit.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"products": products}
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_history(&self, session_id: &str, history: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/api/chatbot/history/{}", session_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"history": history}
            })))
            .mount(&self.server)
            .await;
    }
}

pub fn sample_product(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "category": "Rings",
        "metal_type": "Gold",
        "price": 25000.0,
        "occasion": "Wedding",
        "style": "Classic",
        "image_url": format!("https://img.example/{}.jpg", id),
        "description": "Hand-finished band",
        "popularity": 0.5
    })
}
