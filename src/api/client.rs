//! `reqwest` implementation of the conversation lifecycle calls

use crate::api::session::Session;
use crate::api::types::{
    Conversation, CreateConversationRequest, DefaultModels, DeleteConversationRequest,
    MessageContent,
};
use crate::api::ChatApi;
use crate::config::Config;
use crate::error::{Result, StoryloopError};

use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Response;

/// Chat client backed by a cookie session
///
/// # Examples
///
/// ```no_run
/// use storyloop::api::{ChatApi, WebChatClient};
/// use storyloop::config::Config;
///
/// # tokio_test::block_on(async {
/// let config = Config::default();
/// let client = WebChatClient::new(&config)?;
/// let conversation = client
///     .create_conversation(&config.model.name, "Hello")
///     .await?;
/// let reply = client.send_message(&conversation, "Hello").await?;
/// client.delete_conversation(conversation).await?;
/// # Ok::<(), anyhow::Error>(())
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct WebChatClient {
    session: Session,
    default_models: DefaultModels,
}

impl WebChatClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the session cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            session: Session::new(&config.session)?,
            default_models: DefaultModels {
                text: config.model.default_text.clone(),
                image: config.model.default_image.clone(),
                web_search: config.model.default_web_search.clone(),
            },
        })
    }
}

/// Turn a non-success response into `StoryloopError::Status`
async fn check_status(operation: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::error!("{} returned error {}: {}", operation, status, body);
    Err(StoryloopError::Status {
        operation,
        status: status.as_u16(),
        body,
    }
    .into())
}

#[async_trait]
impl ChatApi for WebChatClient {
    async fn create_conversation(&self, model: &str, message: &str) -> Result<Conversation> {
        let request = CreateConversationRequest {
            message: message.to_string(),
            model: model.to_string(),
            default_models: self.default_models.clone(),
            assistant_id: None,
            attachments: Vec::new(),
        };

        tracing::debug!("Creating conversation: model={}", model);

        let response = self
            .session
            .client
            .post(self.session.endpoints.create())
            .json(&request)
            .send()
            .await
            .map_err(StoryloopError::Http)?;
        let response = check_status("create conversation", response).await?;

        let body = response.text().await.map_err(StoryloopError::Http)?;
        let conversation: Conversation =
            serde_json::from_str(&body).map_err(StoryloopError::Serialization)?;

        tracing::debug!("Created conversation {}", conversation.id);
        Ok(conversation)
    }

    async fn send_message(&self, conversation: &Conversation, message: &str) -> Result<String> {
        let messages = serde_json::to_string(&MessageContent::text(message))
            .map_err(StoryloopError::Serialization)?;
        let form = Form::new()
            .text("model", conversation.model.clone())
            .text("preprompt", "")
            .text("messages", messages);

        tracing::debug!("Sending message to conversation {}", conversation.id);

        let response = self
            .session
            .client
            .post(self.session.endpoints.send())
            .multipart(form)
            .send()
            .await
            .map_err(StoryloopError::Http)?;
        let response = check_status("send message", response).await?;

        let reply = response.text().await.map_err(StoryloopError::Http)?;
        Ok(reply)
    }

    async fn delete_conversation(&self, conversation: Conversation) -> Result<()> {
        tracing::debug!("Deleting conversation {}", conversation.id);

        let response = self
            .session
            .client
            .post(self.session.endpoints.delete())
            .json(&DeleteConversationRequest {
                id: conversation.id,
            })
            .send()
            .await
            .map_err(StoryloopError::Http)?;
        check_status("delete conversation", response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation_copies_default_models() {
        let mut config = Config::default();
        config.model.default_image = "image-model".to_string();
        let client = WebChatClient::new(&config).unwrap();
        assert_eq!(client.default_models.image, "image-model");
        assert_eq!(client.default_models.text, config.model.default_text);
        assert_eq!(client.default_models.web_search, "openperplex-v1");
    }

    #[test]
    fn test_client_creation_rejects_bad_base() {
        let mut config = Config::default();
        config.session.api_base = "::nope::".to_string();
        assert!(WebChatClient::new(&config).is_err());
    }
}
