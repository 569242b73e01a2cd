//! Conversation provisioning and listing endpoints.
//!
//! ```text
//! POST /api/v1/conversations/direct/{peer}
//! POST /api/v1/conversations/route-group/{routeId}
//! GET  /api/v1/conversations
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde_json::json;

use crate::domain::conversations::ConversationSummary;
use crate::domain::{Error, RouteId, UserId};

use super::session::SessionContext;
use super::state::HttpState;
use super::{run_blocking, ApiResult};

/// Find or create the direct conversation with a peer.
#[utoipa::path(
    post,
    path = "/api/v1/conversations/direct/{peer}",
    params(("peer" = i64, Path, description = "Peer user id")),
    responses(
        (status = 200, description = "Conversation id"),
        (status = 400, description = "Cannot DM yourself", body = Error),
        (status = 404, description = "Peer not found", body = Error)
    ),
    tags = ["conversations"],
    operation_id = "ensureDirectConversation"
)]
#[post("/conversations/direct/{peer}")]
pub async fn ensure_direct(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let peer = UserId::new(path.into_inner());
    let conversations = state.conversations.clone();
    let id = run_blocking(move || conversations.ensure_direct(caller, peer)).await?;
    Ok(HttpResponse::Ok().json(json!({ "conversationId": id })))
}

/// Find or create the group conversation for a route.
#[utoipa::path(
    post,
    path = "/api/v1/conversations/route-group/{id}",
    params(("id" = i64, Path, description = "Route id")),
    responses(
        (status = 200, description = "Conversation id"),
        (status = 404, description = "Route not found", body = Error)
    ),
    tags = ["conversations"],
    operation_id = "ensureRouteGroupConversation"
)]
#[post("/conversations/route-group/{id}")]
pub async fn ensure_route_group(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let route = RouteId::new(path.into_inner());
    let conversations = state.conversations.clone();
    let id = run_blocking(move || conversations.ensure_group_for_route(route, caller)).await?;
    Ok(HttpResponse::Ok().json(json!({ "conversationId": id })))
}

/// The caller's conversations, most recent activity first.
#[utoipa::path(
    get,
    path = "/api/v1/conversations",
    responses(
        (status = 200, description = "Conversations with last-message preview",
         body = [ConversationSummary])
    ),
    tags = ["conversations"],
    operation_id = "listConversations"
)]
#[get("/conversations")]
pub async fn list_conversations(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<ConversationSummary>>> {
    let caller = session.require_user_id()?;
    let conversations = state.conversations.clone();
    let items = run_blocking(move || conversations.list_for(caller)).await?;
    Ok(web::Json(items))
}
