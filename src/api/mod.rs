//! Chat service API
//!
//! This module contains the conversation lifecycle abstraction and its
//! `reqwest` implementation against the chat web service.
//!
//! Every call distinguishes transport failure (`StoryloopError::Http`) from
//! an application-level refusal (`StoryloopError::Status`); a non-success
//! status is never treated as success.

pub mod client;
pub mod session;
pub mod types;

pub use client::WebChatClient;
pub use session::{Endpoints, Session};
pub use types::{Conversation, CreateConversationRequest, DefaultModels, MessageContent};

use crate::error::Result;
use async_trait::async_trait;

/// Conversation lifecycle calls
///
/// One conversation is created, used for a single message, and deleted in
/// each cycle. `delete_conversation` consumes the handle so a deleted
/// conversation cannot be reused.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Open a conversation seeded with `message`
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, a non-success status, or an
    /// undecodable response body.
    async fn create_conversation(&self, model: &str, message: &str) -> Result<Conversation>;

    /// Send `message` and return the raw reply body
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or a non-success status.
    async fn send_message(&self, conversation: &Conversation, message: &str) -> Result<String>;

    /// Delete the conversation on the server
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or a non-success status.
    async fn delete_conversation(&self, conversation: Conversation) -> Result<()>;
}
