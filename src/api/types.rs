//! Wire types for the chat endpoints
//!
//! The shapes are owned by the remote service. Fields the client never
//! interprets are kept as opaque JSON and passed through untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sub-model selections registered with a new conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultModels {
    /// Text model
    pub text: String,
    /// Image model
    pub image: String,
    /// Web search model
    pub web_search: String,
}

/// Body of the "create conversation" call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    /// First message, used by the service to title the conversation
    pub message: String,
    /// Model answering in this conversation
    pub model: String,
    /// Default sub-model selections
    pub default_models: DefaultModels,
    /// Always null; assistants are not used
    pub assistant_id: Option<serde_json::Value>,
    /// Always empty
    pub attachments: Vec<serde_json::Value>,
}

/// Conversation record returned by the service
///
/// The only field the client relies on is `id`; it keys the send and delete
/// calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Server-assigned identifier
    pub id: i64,
    /// Model selected for the conversation
    pub model: String,
    /// Owning user, if reported
    #[serde(default)]
    pub user: Option<i64>,
    /// Title chosen by the service, if any
    #[serde(default)]
    pub title: Option<String>,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Opaque assistant identifier
    #[serde(default)]
    pub assistant_id: Option<serde_json::Value>,
    /// Opaque public identifier
    #[serde(default)]
    pub public_id: Option<serde_json::Value>,
}

/// JSON carried in the `messages` multipart field of the send call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContent {
    /// Message text
    pub content: String,
    /// Always empty
    pub images_data: Vec<serde_json::Value>,
    /// Always empty
    pub documents_data: Vec<serde_json::Value>,
}

impl MessageContent {
    /// Text-only message
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            images_data: Vec::new(),
            documents_data: Vec::new(),
        }
    }
}

/// Body of the "delete conversation" call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteConversationRequest {
    /// Conversation to delete
    pub id: i64,
}
