//! SQLite-backed [`MessageRepository`] implementation.

use chrono::Utc;
use diesel::dsl::exists;
use diesel::prelude::*;
use tracing::debug;

use crate::domain::messages::MessageRecord;
use crate::domain::ports::{MessageRepository, MessageRepositoryError};
use crate::domain::{ConversationId, UserId};

use super::models::{MessageRow, NewMessageRow};
use super::pool::{DbConnection, DbPool};
use super::schema::{conversation_members, messages, users};

/// Diesel-backed implementation of the [`MessageRepository`] port.
#[derive(Clone)]
pub struct DieselMessageRepository {
    pool: DbPool,
}

impl DieselMessageRepository {
    /// Create a new repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<DbConnection, MessageRepositoryError> {
        self.pool
            .get()
            .map_err(|err| MessageRepositoryError::connection(err.to_string()))
    }
}

fn map_diesel_error(error: diesel::result::Error) -> MessageRepositoryError {
    debug!(error = %error, "message store operation failed");
    MessageRepositoryError::query(error.to_string())
}

impl MessageRepository for DieselMessageRepository {
    fn is_member(
        &self,
        conversation: ConversationId,
        user: UserId,
    ) -> Result<bool, MessageRepositoryError> {
        let mut conn = self.conn()?;
        diesel::select(exists(
            conversation_members::table
                .filter(conversation_members::conversation_id.eq(conversation.get()))
                .filter(conversation_members::user_id.eq(user.get())),
        ))
        .get_result(&mut conn)
        .map_err(map_diesel_error)
    }

    fn list(
        &self,
        conversation: ConversationId,
    ) -> Result<Vec<MessageRecord>, MessageRepositoryError> {
        let mut conn = self.conn()?;
        let rows: Vec<(MessageRow, String)> = messages::table
            .inner_join(users::table)
            .filter(messages::conversation_id.eq(conversation.get()))
            .order(messages::id.asc())
            .select((MessageRow::as_select(), users::name))
            .load(&mut conn)
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(row, sender_name)| MessageRecord {
                id: row.id,
                sender_id: UserId::new(row.sender_id),
                sender_name,
                text: row.body,
                sent_at: row.sent_at,
            })
            .collect())
    }

    fn append(
        &self,
        conversation: ConversationId,
        sender: UserId,
        body: &str,
    ) -> Result<(), MessageRepositoryError> {
        let mut conn = self.conn()?;
        diesel::insert_into(messages::table)
            .values(&NewMessageRow {
                conversation_id: conversation.get(),
                sender_id: sender.get(),
                body,
                sent_at: Utc::now().naive_utc(),
            })
            .execute(&mut conn)
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
