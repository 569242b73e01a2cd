//! Conversation provisioning: deriving chats from match state.
//!
//! Conversations are created lazily on first need and never deleted. The
//! interesting logic is creation idempotence: one direct conversation per
//! unordered user pair, one group conversation per route. Group membership
//! is seeded once at creation and deliberately never resynced afterwards.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use super::error::Error;
use super::ids::{ConversationId, RouteId, UserId};
use super::ports::{
    ConversationRepository, ConversationRepositoryError, UserRepository, UserRepositoryError,
};
use super::ApiResult;

/// A conversation as listed for a member, with last-message preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub title: Option<String>,
    pub is_group: bool,
    /// Populated only for group conversations.
    pub route_id: Option<RouteId>,
    pub last_message: Option<String>,
}

/// Title a route's group conversation is created with.
pub fn group_title(slot_code: &str, end_point: &str) -> String {
    format!("Group: {slot_code} → {end_point}")
}

/// Conversation provisioning service.
#[derive(Clone)]
pub struct ConversationService {
    conversations: Arc<dyn ConversationRepository>,
    users: Arc<dyn UserRepository>,
}

impl ConversationService {
    /// Create a new service over the given stores.
    pub fn new(conversations: Arc<dyn ConversationRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self {
            conversations,
            users,
        }
    }

    /// Find or create the direct conversation between the caller and a peer.
    ///
    /// Safe to call repeatedly from either side of the pair; always
    /// converges on the same conversation id.
    ///
    /// # Errors
    ///
    /// `invalid_request` for a self-DM, `not_found` when the peer does not
    /// exist.
    pub fn ensure_direct(&self, caller: UserId, peer: UserId) -> ApiResult<ConversationId> {
        if caller == peer {
            return Err(Error::invalid_request(
                "cannot start a direct conversation with yourself",
            ));
        }
        if !self.users.exists(peer).map_err(map_user_repo_error)? {
            return Err(Error::not_found("peer user not found"));
        }
        self.conversations
            .ensure_direct(caller, peer)
            .map_err(map_conversation_repo_error)
    }

    /// Find or create the group conversation for a route.
    ///
    /// On creation, membership is seeded from every distinct owning user
    /// across all join rows ever recorded for the route, plus the requester.
    /// Repeat calls return the existing conversation without touching its
    /// membership.
    pub fn ensure_group_for_route(
        &self,
        route: RouteId,
        requester: UserId,
    ) -> ApiResult<ConversationId> {
        self.conversations
            .ensure_group_for_route(route, requester)
            .map_err(map_conversation_repo_error)
    }

    /// The caller's conversations, most recent activity first.
    pub fn list_for(&self, user: UserId) -> ApiResult<Vec<ConversationSummary>> {
        self.conversations
            .list_for_user(user)
            .map_err(map_conversation_repo_error)
    }
}

fn map_conversation_repo_error(error: ConversationRepositoryError) -> Error {
    match error {
        ConversationRepositoryError::RouteNotFound => Error::not_found("route not found"),
        ConversationRepositoryError::Connection { message }
        | ConversationRepositoryError::Query { message } => {
            Error::internal(format!("conversation store failure: {message}"))
        }
    }
}

fn map_user_repo_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::DuplicateEmail => Error::conflict("email already registered"),
        UserRepositoryError::Connection { message } | UserRepositoryError::Query { message } => {
            Error::internal(format!("user store failure: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::accounts::{AccountProfile, NewAccount};
    use crate::domain::ErrorCode;
    use rstest::rstest;

    struct StubConversations {
        group_result: Result<ConversationId, ConversationRepositoryError>,
    }

    impl ConversationRepository for StubConversations {
        fn ensure_direct(
            &self,
            _a: UserId,
            _b: UserId,
        ) -> Result<ConversationId, ConversationRepositoryError> {
            Ok(ConversationId::new(11))
        }

        fn ensure_group_for_route(
            &self,
            _route: RouteId,
            _requester: UserId,
        ) -> Result<ConversationId, ConversationRepositoryError> {
            self.group_result.clone()
        }

        fn list_for_user(
            &self,
            _user: UserId,
        ) -> Result<Vec<ConversationSummary>, ConversationRepositoryError> {
            Ok(Vec::new())
        }
    }

    struct StubUsers {
        peer_exists: bool,
    }

    impl UserRepository for StubUsers {
        fn create(&self, _account: &NewAccount) -> Result<UserId, UserRepositoryError> {
            unimplemented!("not used by conversation tests")
        }

        fn find_by_credentials(
            &self,
            _email: &str,
            _password_digest: &str,
        ) -> Result<Option<AccountProfile>, UserRepositoryError> {
            Ok(None)
        }

        fn exists(&self, _id: UserId) -> Result<bool, UserRepositoryError> {
            Ok(self.peer_exists)
        }
    }

    fn service(peer_exists: bool) -> ConversationService {
        ConversationService::new(
            Arc::new(StubConversations {
                group_result: Ok(ConversationId::new(21)),
            }),
            Arc::new(StubUsers { peer_exists }),
        )
    }

    #[rstest]
    fn self_direct_conversations_are_rejected() {
        let error = service(true)
            .ensure_direct(UserId::new(7), UserId::new(7))
            .expect_err("self-DM is rejected");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn direct_conversations_require_an_existing_peer() {
        let error = service(false)
            .ensure_direct(UserId::new(7), UserId::new(9))
            .expect_err("missing peer is rejected");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    fn direct_conversations_resolve_for_valid_pairs() {
        let id = service(true)
            .ensure_direct(UserId::new(7), UserId::new(9))
            .expect("pair resolves");
        assert_eq!(id, ConversationId::new(11));
    }

    #[rstest]
    fn missing_routes_surface_as_not_found() {
        let service = ConversationService::new(
            Arc::new(StubConversations {
                group_result: Err(ConversationRepositoryError::RouteNotFound),
            }),
            Arc::new(StubUsers { peer_exists: true }),
        );
        let error = service
            .ensure_group_for_route(RouteId::new(404), UserId::new(7))
            .expect_err("missing route is rejected");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    fn group_titles_name_the_slot_and_endpoint() {
        assert_eq!(group_title("SL0001", "CityMall"), "Group: SL0001 → CityMall");
    }
}
