//! Driven ports: the edges of the hexagon.
//!
//! Each trait describes how the domain expects to talk to the store, with a
//! dedicated error enum so adapters map their failures into predictable
//! variants instead of leaking backend detail. Writes that must appear as
//! one unit (route plus activation row, rider link plus calendar row, group
//! conversation plus membership seeding, direct-pair dedup) are single port
//! methods, so the adapter runs the duplicate check and the inserts inside
//! the same transaction.

use chrono::NaiveDate;
use thiserror::Error;

use super::accounts::{AccountProfile, NewAccount};
use super::conversations::ConversationSummary;
use super::ids::{ConversationId, LinkId, RouteId, UserId};
use super::messages::MessageRecord;
use super::riders::{Gender, JoinDetails, RiderChanges, RiderRecord};
use super::routes::{NewRoute, RouteChanges, RouteSummary};

/// Store access for the route catalogue.
pub trait RouteRepository: Send + Sync {
    /// Create a route and its first activation row as one transaction.
    ///
    /// The duplicate tuple check (same date, endpoint case-insensitive,
    /// time empty-string-normalised, transport mode case-insensitive) runs
    /// inside the same transaction as the inserts.
    fn create_with_activation(
        &self,
        date: NaiveDate,
        route: &NewRoute,
    ) -> Result<RouteId, RouteRepositoryError>;

    /// Apply a partial update to a route's mutable fields.
    fn update(&self, id: RouteId, changes: &RouteChanges) -> Result<(), RouteRepositoryError>;

    /// Delete a route and all its calendar rows (activation and join rows
    /// alike). Rider links are left intact.
    fn delete(&self, id: RouteId) -> Result<(), RouteRepositoryError>;

    /// Fetch a route by id.
    fn find(&self, id: RouteId) -> Result<Option<RouteSummary>, RouteRepositoryError>;

    /// The sequence number the next created route will receive.
    fn next_sequence(&self) -> Result<i64, RouteRepositoryError>;
}

/// Failures surfaced by [`RouteRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteRepositoryError {
    /// Could not obtain a store connection.
    #[error("route store connection failed: {message}")]
    Connection { message: String },
    /// The store rejected or failed the query.
    #[error("route store query failed: {message}")]
    Query { message: String },
    /// An equivalent route already has an activation row on this date.
    #[error("a matching route already exists for this date")]
    DuplicateRoute,
    /// No route with the given id.
    #[error("route not found")]
    NotFound,
}

impl RouteRepositoryError {
    /// Build a [`Self::Connection`] error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Build a [`Self::Query`] error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Read access to the calendar index binding routes, dates, and riders.
pub trait CalendarRepository: Send + Sync {
    /// Distinct routes with an activation row on the date, newest route
    /// first.
    fn active_routes_on(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<RouteSummary>, CalendarRepositoryError>;

    /// Number of join rows for the (date, route) pair.
    fn rider_count(&self, date: NaiveDate, route: RouteId) -> Result<i64, CalendarRepositoryError>;

    /// Full rider detail for every join row on the (route, date) pair,
    /// newest first.
    fn join_rows(
        &self,
        route: RouteId,
        date: NaiveDate,
    ) -> Result<Vec<RiderRecord>, CalendarRepositoryError>;
}

/// Failures surfaced by [`CalendarRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarRepositoryError {
    /// Could not obtain a store connection.
    #[error("calendar store connection failed: {message}")]
    Connection { message: String },
    /// The store rejected or failed the query.
    #[error("calendar store query failed: {message}")]
    Query { message: String },
}

impl CalendarRepositoryError {
    /// Build a [`Self::Connection`] error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Build a [`Self::Query`] error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Store access for rider links.
pub trait RiderRepository: Send + Sync {
    /// Create a rider link and its calendar join row as one transaction.
    ///
    /// The duplicate check (an existing join row for the same date, route,
    /// and phone) runs inside the same transaction as the inserts.
    fn join(
        &self,
        date: NaiveDate,
        route: RouteId,
        details: &JoinDetails,
    ) -> Result<LinkId, RiderRepositoryError>;

    /// All rider links, optionally filtered by gender tag, newest first.
    fn list(&self, gender: Option<Gender>) -> Result<Vec<RiderRecord>, RiderRepositoryError>;

    /// Apply a partial update to a link's displayed fields.
    fn update(&self, id: LinkId, changes: &RiderChanges) -> Result<(), RiderRepositoryError>;

    /// Delete a link and its calendar join row as one transaction.
    fn delete(&self, id: LinkId) -> Result<(), RiderRepositoryError>;
}

/// Failures surfaced by [`RiderRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RiderRepositoryError {
    /// Could not obtain a store connection.
    #[error("rider store connection failed: {message}")]
    Connection { message: String },
    /// The store rejected or failed the query.
    #[error("rider store query failed: {message}")]
    Query { message: String },
    /// A join row already exists for this (date, route, phone).
    #[error("already joined")]
    DuplicateJoin,
    /// The route has no activation row on the requested date.
    #[error("route is not offered on the requested date")]
    RouteNotOffered,
    /// No link with the given id.
    #[error("rider link not found")]
    NotFound,
}

impl RiderRepositoryError {
    /// Build a [`Self::Connection`] error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Build a [`Self::Query`] error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Store access for conversation provisioning.
pub trait ConversationRepository: Send + Sync {
    /// Find or create the direct conversation for the unordered pair.
    ///
    /// The membership-set search and the create both happen inside one
    /// transaction, so repeated calls converge on a single conversation.
    fn ensure_direct(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<ConversationId, ConversationRepositoryError>;

    /// Find or create the group conversation for a route.
    ///
    /// On creation the membership is seeded from the distinct owning users
    /// of every join row ever recorded for the route, unioned with the
    /// requester, all in one transaction. An existing group is returned
    /// as-is; membership is never resynced.
    fn ensure_group_for_route(
        &self,
        route: RouteId,
        requester: UserId,
    ) -> Result<ConversationId, ConversationRepositoryError>;

    /// The caller's conversations with last-message preview, most recent
    /// activity first.
    fn list_for_user(
        &self,
        user: UserId,
    ) -> Result<Vec<ConversationSummary>, ConversationRepositoryError>;
}

/// Failures surfaced by [`ConversationRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationRepositoryError {
    /// Could not obtain a store connection.
    #[error("conversation store connection failed: {message}")]
    Connection { message: String },
    /// The store rejected or failed the query.
    #[error("conversation store query failed: {message}")]
    Query { message: String },
    /// The route to provision a group for does not exist.
    #[error("route not found")]
    RouteNotFound,
}

impl ConversationRepositoryError {
    /// Build a [`Self::Connection`] error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Build a [`Self::Query`] error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Store access for the append-only message log.
pub trait MessageRepository: Send + Sync {
    /// Whether the user is a member of the conversation.
    fn is_member(
        &self,
        conversation: ConversationId,
        user: UserId,
    ) -> Result<bool, MessageRepositoryError>;

    /// All messages for the conversation in creation order, sender names
    /// resolved.
    fn list(
        &self,
        conversation: ConversationId,
    ) -> Result<Vec<MessageRecord>, MessageRepositoryError>;

    /// Append a message with a store-assigned timestamp and sequence.
    fn append(
        &self,
        conversation: ConversationId,
        sender: UserId,
        body: &str,
    ) -> Result<(), MessageRepositoryError>;
}

/// Failures surfaced by [`MessageRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageRepositoryError {
    /// Could not obtain a store connection.
    #[error("message store connection failed: {message}")]
    Connection { message: String },
    /// The store rejected or failed the query.
    #[error("message store query failed: {message}")]
    Query { message: String },
}

impl MessageRepositoryError {
    /// Build a [`Self::Connection`] error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Build a [`Self::Query`] error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Store access for the account boundary.
pub trait UserRepository: Send + Sync {
    /// Create an account; emails are unique.
    fn create(&self, account: &NewAccount) -> Result<UserId, UserRepositoryError>;

    /// Look up an account by email and password digest.
    fn find_by_credentials(
        &self,
        email: &str,
        password_digest: &str,
    ) -> Result<Option<AccountProfile>, UserRepositoryError>;

    /// Whether a user with the given id exists.
    fn exists(&self, id: UserId) -> Result<bool, UserRepositoryError>;
}

/// Failures surfaced by [`UserRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserRepositoryError {
    /// Could not obtain a store connection.
    #[error("user store connection failed: {message}")]
    Connection { message: String },
    /// The store rejected or failed the query.
    #[error("user store query failed: {message}")]
    Query { message: String },
    /// An account already exists for this email.
    #[error("email already registered")]
    DuplicateEmail,
}

impl UserRepositoryError {
    /// Build a [`Self::Connection`] error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Build a [`Self::Query`] error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}
