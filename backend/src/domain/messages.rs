//! Append-only per-conversation message log with membership-gated access.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

use super::error::Error;
use super::ids::{ConversationId, UserId};
use super::ports::{MessageRepository, MessageRepositoryError};
use super::ApiResult;

/// A message as read back for a member, sender name resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: i64,
    pub sender_id: UserId,
    pub sender_name: String,
    pub text: String,
    /// Store-assigned UTC timestamp.
    pub sent_at: NaiveDateTime,
}

/// Message log service.
#[derive(Clone)]
pub struct MessageService {
    messages: Arc<dyn MessageRepository>,
}

impl MessageService {
    /// Create a new service over the given message store.
    pub fn new(messages: Arc<dyn MessageRepository>) -> Self {
        Self { messages }
    }

    /// All messages for the conversation in creation order.
    ///
    /// # Errors
    ///
    /// `forbidden` unless the caller is a member.
    pub fn list(&self, conversation: ConversationId, caller: UserId) -> ApiResult<Vec<MessageRecord>> {
        self.require_member(conversation, caller)?;
        self.messages.list(conversation).map_err(map_message_repo_error)
    }

    /// Append a message to the conversation.
    ///
    /// # Errors
    ///
    /// `forbidden` unless the caller is a member; `invalid_request` for
    /// empty or whitespace-only text.
    pub fn post(&self, conversation: ConversationId, caller: UserId, text: &str) -> ApiResult<()> {
        self.require_member(conversation, caller)?;
        let body = text.trim();
        if body.is_empty() {
            return Err(Error::invalid_request("message text must not be empty"));
        }
        self.messages
            .append(conversation, caller, body)
            .map_err(map_message_repo_error)
    }

    fn require_member(&self, conversation: ConversationId, caller: UserId) -> ApiResult<()> {
        let member = self
            .messages
            .is_member(conversation, caller)
            .map_err(map_message_repo_error)?;
        if member {
            Ok(())
        } else {
            Err(Error::forbidden("not a member of this conversation"))
        }
    }
}

fn map_message_repo_error(error: MessageRepositoryError) -> Error {
    match error {
        MessageRepositoryError::Connection { message } | MessageRepositoryError::Query { message } => {
            Error::internal(format!("message store failure: {message}"))
        }
    }
}
