//! SQLite-backed [`ConversationRepository`] implementation.
//!
//! All provisioning paths run their find-or-create sequence inside one
//! transaction, so repeated or racing calls converge on a single
//! conversation per unordered pair and per route.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use tracing::debug;

use crate::domain::conversations::{group_title, ConversationSummary};
use crate::domain::ports::{ConversationRepository, ConversationRepositoryError};
use crate::domain::{ConversationId, RouteId, UserId};

use super::models::{ConversationRow, NewConversationRow, NewMemberRow, RouteRow};
use super::pool::{DbConnection, DbPool};
use super::schema::{calendar, conversation_members, conversations, links, messages, routes};

/// Diesel-backed implementation of the [`ConversationRepository`] port.
#[derive(Clone)]
pub struct DieselConversationRepository {
    pool: DbPool,
}

impl DieselConversationRepository {
    /// Create a new repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<DbConnection, ConversationRepositoryError> {
        self.pool
            .get()
            .map_err(|err| ConversationRepositoryError::connection(err.to_string()))
    }
}

fn map_diesel_error(error: diesel::result::Error) -> ConversationRepositoryError {
    debug!(error = %error, "conversation store operation failed");
    ConversationRepositoryError::query(error.to_string())
}

impl From<diesel::result::Error> for ConversationRepositoryError {
    fn from(error: diesel::result::Error) -> Self {
        map_diesel_error(error)
    }
}

impl ConversationRepository for DieselConversationRepository {
    fn ensure_direct(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<ConversationId, ConversationRepositoryError> {
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, ConversationRepositoryError, _>(|conn| {
            // A direct conversation for the pair is one whose membership
            // set is exactly {a, b}: scan a's non-group conversations and
            // compare membership sets.
            let candidates: Vec<i64> = conversation_members::table
                .inner_join(conversations::table)
                .filter(conversation_members::user_id.eq(a.get()))
                .filter(conversations::is_group.eq(false))
                .select(conversations::id)
                .load(conn)?;
            for candidate in candidates {
                let members: Vec<i64> = conversation_members::table
                    .filter(conversation_members::conversation_id.eq(candidate))
                    .select(conversation_members::user_id)
                    .load(conn)?;
                if members.len() == 2 && members.contains(&b.get()) {
                    return Ok(ConversationId::new(candidate));
                }
            }

            let id = diesel::insert_into(conversations::table)
                .values(&NewConversationRow {
                    title: None,
                    is_group: false,
                    route_id: None,
                })
                .returning(conversations::id)
                .get_result::<i64>(conn)?;
            diesel::insert_into(conversation_members::table)
                .values(&[
                    NewMemberRow {
                        conversation_id: id,
                        user_id: a.get(),
                    },
                    NewMemberRow {
                        conversation_id: id,
                        user_id: b.get(),
                    },
                ])
                .execute(conn)?;
            Ok(ConversationId::new(id))
        })
    }

    fn ensure_group_for_route(
        &self,
        route: RouteId,
        requester: UserId,
    ) -> Result<ConversationId, ConversationRepositoryError> {
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, ConversationRepositoryError, _>(|conn| {
            let route_row: Option<RouteRow> = routes::table
                .find(route.get())
                .select(RouteRow::as_select())
                .first(conn)
                .optional()?;
            let Some(route_row) = route_row else {
                return Err(ConversationRepositoryError::RouteNotFound);
            };

            // Seed-once semantics: an existing group is returned untouched,
            // even when new riders have joined since it was created.
            let existing: Option<i64> = conversations::table
                .filter(conversations::is_group.eq(true))
                .filter(conversations::route_id.eq(route.get()))
                .select(conversations::id)
                .first(conn)
                .optional()?;
            if let Some(id) = existing {
                return Ok(ConversationId::new(id));
            }

            let title = group_title(&route_row.slot_code, &route_row.end_point);
            let id = diesel::insert_into(conversations::table)
                .values(&NewConversationRow {
                    title: Some(&title),
                    is_group: true,
                    route_id: Some(route.get()),
                })
                .returning(conversations::id)
                .get_result::<i64>(conn)?;

            // Every distinct owning user across all join rows ever recorded
            // for the route, plus the requester.
            let owners: Vec<Option<i64>> = calendar::table
                .inner_join(links::table)
                .filter(calendar::route_id.eq(route.get()))
                .filter(links::user_id.is_not_null())
                .select(links::user_id)
                .distinct()
                .load(conn)?;
            let mut members: Vec<NewMemberRow> = owners
                .into_iter()
                .flatten()
                .map(|user_id| NewMemberRow {
                    conversation_id: id,
                    user_id,
                })
                .collect();
            if !members.iter().any(|m| m.user_id == requester.get()) {
                members.push(NewMemberRow {
                    conversation_id: id,
                    user_id: requester.get(),
                });
            }
            diesel::insert_or_ignore_into(conversation_members::table)
                .values(&members)
                .execute(conn)?;

            Ok(ConversationId::new(id))
        })
    }

    fn list_for_user(
        &self,
        user: UserId,
    ) -> Result<Vec<ConversationSummary>, ConversationRepositoryError> {
        let mut conn = self.conn()?;
        let rows: Vec<ConversationRow> = conversations::table
            .inner_join(conversation_members::table)
            .filter(conversation_members::user_id.eq(user.get()))
            .select(ConversationRow::as_select())
            .load(&mut conn)
            .map_err(map_diesel_error)?;

        let mut entries: Vec<(ConversationRow, Option<(String, NaiveDateTime)>)> = Vec::new();
        for row in rows {
            let last: Option<(String, NaiveDateTime)> = messages::table
                .filter(messages::conversation_id.eq(row.id))
                .order(messages::id.desc())
                .select((messages::body, messages::sent_at))
                .first(&mut conn)
                .optional()
                .map_err(map_diesel_error)?;
            entries.push((row, last));
        }

        // Most recent activity first: last message when there is one, the
        // conversation's creation time otherwise.
        entries.sort_by_key(|(row, last)| {
            std::cmp::Reverse(last.as_ref().map_or(row.created_at, |(_, sent_at)| *sent_at))
        });

        Ok(entries
            .into_iter()
            .map(|(row, last)| ConversationSummary {
                id: ConversationId::new(row.id),
                title: row.title,
                is_group: row.is_group,
                route_id: row.route_id.map(RouteId::new),
                last_message: last.map(|(body, _)| body),
            })
            .collect())
    }
}
