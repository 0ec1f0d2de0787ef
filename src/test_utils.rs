//! Test utilities for Storyloop
//!
//! This module provides common test utilities including a scripted chat API,
//! a ready-to-run configuration, and assertion helpers.

use crate::api::{ChatApi, Conversation};
use crate::config::{BackoffConfig, Config};
use crate::error::{Result, StoryloopError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Scripted in-process chat API that records every call
///
/// Calls are recorded as `create:<model>:<message>`, `send:<id>` and
/// `delete:<id>`. Each operation can be told to fail with a 500 status.
#[derive(Clone, Default)]
pub struct FakeChatApi {
    /// Fail every create call
    pub fail_create: bool,
    /// Fail every send call
    pub fail_send: bool,
    /// Fail every delete call
    pub fail_delete: bool,
    /// Reply body returned by send
    pub reply: String,
    /// Conversation id handed out by create
    pub conversation_id: i64,
    pub(crate) calls: Arc<Mutex<Vec<String>>>,
}

impl FakeChatApi {
    /// API that succeeds and answers with `reply`
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            conversation_id: 42,
            ..Default::default()
        }
    }

    /// Calls recorded so far
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .expect("fake api call log poisoned")
            .clone()
    }

    fn record(&self, call: String) {
        self.calls
            .lock()
            .expect("fake api call log poisoned")
            .push(call);
    }

    fn failure(operation: &'static str) -> anyhow::Error {
        StoryloopError::Status {
            operation,
            status: 500,
            body: String::new(),
        }
        .into()
    }
}

#[async_trait]
impl ChatApi for FakeChatApi {
    async fn create_conversation(&self, model: &str, message: &str) -> Result<Conversation> {
        self.record(format!("create:{}:{}", model, message));
        if self.fail_create {
            return Err(Self::failure("create conversation"));
        }
        Ok(Conversation {
            id: self.conversation_id,
            model: model.to_string(),
            user: None,
            title: None,
            created_at: None,
            updated_at: None,
            assistant_id: None,
            public_id: None,
        })
    }

    async fn send_message(&self, conversation: &Conversation, _message: &str) -> Result<String> {
        self.record(format!("send:{}", conversation.id));
        if self.fail_send {
            return Err(Self::failure("send message"));
        }
        Ok(self.reply.clone())
    }

    async fn delete_conversation(&self, conversation: Conversation) -> Result<()> {
        self.record(format!("delete:{}", conversation.id));
        if self.fail_delete {
            return Err(Self::failure("delete conversation"));
        }
        Ok(())
    }
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = format!("{:#}", e);
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Create a valid test configuration with millisecond backoff
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.session.auth_session = "test-session".to_string();
    config.session.gcp_token = "test-gcp".to_string();
    config.backoff = BackoffConfig {
        success_min_ms: 1,
        success_max_ms: 3,
        error_min_ms: 3,
        error_max_ms: 5,
    };
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(StoryloopError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: Result<()> = Err(StoryloopError::Config("different error".to_string()).into());
        assert_error_contains(result, "not present");
    }

    #[test]
    fn test_test_config_is_valid() {
        assert!(test_config().validate().is_ok());
    }

    #[tokio::test]
    async fn test_fake_api_records_calls() {
        let api = FakeChatApi::replying("hi");
        let conversation = api.create_conversation("m", "msg").await.unwrap();
        assert_eq!(api.send_message(&conversation, "msg").await.unwrap(), "hi");
        api.delete_conversation(conversation).await.unwrap();
        assert_eq!(api.calls(), vec!["create:m:msg", "send:42", "delete:42"]);
    }
}
