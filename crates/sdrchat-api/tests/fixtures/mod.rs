use serde_json::{json, Value};
use wiremock::matchers::*;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock chat backend for exercising the HTTP client
pub struct ChatMockServer {
    server: MockServer,
}

impl ChatMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL the client should be pointed at
    pub fn api_base(&self) -> String {
        format!("{}/api", self.server.uri())
    }

    pub async fn mock_init_success(&self, session_id: &str, body: Value) {
        Mock::given(method("POST"))
            .and(path("/api/chat/init"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "session_id": session_id })))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_chat_success(&self, expected_request: Value, body: Value) {
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_json(expected_request))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Backend failure with a FastAPI-style detail body
    pub async fn mock_error(&self, endpoint: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "detail": "Error processing message: upstream model timed out"
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_malformed(&self, endpoint: &str) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_health(&self) {
        Mock::given(method("GET"))
            .and(path("/api/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "EliseAI SDR Chatbot API",
                "status": "running",
                "version": "1.0.0"
            })))
            .mount(&self.server)
            .await;
    }
}
