use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use sdrchat_types::{
    ApiMessage, ChatRequest, ChatResponse, HealthResponse, InitChatRequest, InitChatResponse,
};

use crate::error::{ApiError, Result};
use crate::ChatApi;

/// Default base URL of the chat service
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";

/// Chat service client speaking JSON over HTTP
#[derive(Debug, Clone)]
pub struct HttpChatApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpChatApi {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Client whose requests give up after `timeout`; `None` waits forever
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url,
            client: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Checks that the chat service is up
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.endpoint("");
        log::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        decode(response).await
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        log::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        decode(response).await
    }
}

async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::http(
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown"),
        ));
    }

    let response_text = response.text().await?;
    Ok(serde_json::from_str(&response_text)?)
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn init_chat(&self, session_id: &str) -> Result<InitChatResponse> {
        let request = InitChatRequest {
            session_id: session_id.to_string(),
        };
        self.post_json("chat/init", &request).await
    }

    async fn send_chat(&self, messages: Vec<ApiMessage>, session_id: &str) -> Result<ChatResponse> {
        let request = ChatRequest {
            messages,
            session_id: session_id.to_string(),
        };
        self.post_json("chat", &request).await
    }
}

/// Trims whitespace and trailing slashes and checks the URL parses
pub fn normalize_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    match reqwest::Url::parse(trimmed) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(trimmed.to_string()),
        _ => Err(ApiError::InvalidBaseUrl(url.to_string())),
    }
}
