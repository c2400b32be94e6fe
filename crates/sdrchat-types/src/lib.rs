//! Core types and structures for sdrchat
//!
//! This crate provides the transcript model and the wire types shared by the
//! storage, API and controller crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ============================================================================
// Constants
// ============================================================================

/// Storage key holding the serialized transcript
pub const MESSAGES_KEY: &str = "eliseai_messages";

/// Storage key holding the session identifier
pub const SESSION_KEY: &str = "eliseai_session_id";

/// Shown when the greeting could not be fetched
pub const INIT_ERROR_MESSAGE: &str = "Failed to initialize chat. Please refresh the page.";

/// Shown when a user message could not be delivered
pub const SEND_ERROR_MESSAGE: &str = "Failed to send message. Please try again.";

/// Static booking link offered in the header, independent of any conversation
pub const DEMO_BOOKING_URL: &str = "https://calendly.com/eliseai-demo/30min";

// ============================================================================
// Message Types
// ============================================================================

/// Author of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Helper function to deserialize string or null values
pub fn deserialize_string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One entry of the transcript.
///
/// Messages are never mutated after creation; the transcript only grows,
/// gets rolled back to an earlier value, or is cleared as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }

    /// User message stamped with the current time
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, Some(Utc::now()))
    }

    /// Assistant message stamped with the given time
    pub fn assistant_at(content: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self::new(Role::Assistant, content, Some(at))
    }

    /// Wire form sent to the chat service (timestamps are not sent)
    pub fn to_api(&self) -> ApiMessage {
        ApiMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// `{role, content}` pair as the chat service expects it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub role: Role,
    pub content: String,
}

/// Suggested reply rendered as a selectable button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    pub label: String,
    pub value: String,
}

impl QuickReply {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Knowledge base citation attached to a reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub author: String,
    pub date: String,
}

// ============================================================================
// Chat Service Wire Types
// ============================================================================

/// Body of `POST /chat/init`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitChatRequest {
    pub session_id: String,
}

/// Greeting returned by `POST /chat/init`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitChatResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub quick_replies: Option<Vec<QuickReply>>,
    #[serde(default)]
    pub is_new_session: bool,
}

/// Body of `POST /chat`: the full transcript plus the session identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ApiMessage>,
    pub session_id: String,
}

/// Reply returned by `POST /chat`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub quick_replies: Option<Vec<QuickReply>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sources: Option<Vec<Source>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tool_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub calendly_url: Option<String>,
}

impl ChatResponse {
    /// Plain text reply with no attachments
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            ..Self::default()
        }
    }
}

/// Health check returned by `GET /`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub message: String,
    pub status: String,
    #[serde(default)]
    pub version: String,
}
