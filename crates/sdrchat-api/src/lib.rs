//! Chat service client for sdrchat
//!
//! This crate provides the [`ChatApi`] port used by the conversation
//! controller and its HTTP implementation.

use async_trait::async_trait;
use sdrchat_types::{ApiMessage, ChatResponse, InitChatResponse};

pub mod error;
pub mod http_client;

pub use error::{ApiError, Result};
pub use http_client::{normalize_base_url, HttpChatApi, DEFAULT_API_BASE};

/// Remote chat service.
///
/// Both operations are stateless on the client side: the full transcript is
/// sent with every message, correlated by the session identifier.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Fetches the greeting and opening quick replies for a session
    async fn init_chat(&self, session_id: &str) -> Result<InitChatResponse>;

    /// Sends the transcript and returns the assistant's reply
    async fn send_chat(&self, messages: Vec<ApiMessage>, session_id: &str) -> Result<ChatResponse>;
}
