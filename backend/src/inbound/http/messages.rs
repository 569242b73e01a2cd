//! Message retrieval and posting endpoints.
//!
//! ```text
//! GET  /api/v1/conversations/{id}/messages
//! POST /api/v1/conversations/{id}/messages {"text"}
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::messages::MessageRecord;
use crate::domain::{ConversationId, Error};

use super::session::SessionContext;
use super::state::HttpState;
use super::{run_blocking, ApiResult};

/// Message post body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PostMessageRequest {
    pub text: String,
}

/// All messages for a conversation, in the order they were posted.
#[utoipa::path(
    get,
    path = "/api/v1/conversations/{id}/messages",
    params(("id" = i64, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Messages in creation order", body = [MessageRecord]),
        (status = 403, description = "Not a member", body = Error)
    ),
    tags = ["messages"],
    operation_id = "listMessages"
)]
#[get("/conversations/{id}/messages")]
pub async fn list_messages(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Vec<MessageRecord>>> {
    let caller = session.require_user_id()?;
    let conversation = ConversationId::new(path.into_inner());
    let messages = state.messages.clone();
    let items = run_blocking(move || messages.list(conversation, caller)).await?;
    Ok(web::Json(items))
}

/// Append a message to a conversation.
#[utoipa::path(
    post,
    path = "/api/v1/conversations/{id}/messages",
    params(("id" = i64, Path, description = "Conversation id")),
    request_body = PostMessageRequest,
    responses(
        (status = 201, description = "Message accepted"),
        (status = 400, description = "Empty text", body = Error),
        (status = 403, description = "Not a member", body = Error)
    ),
    tags = ["messages"],
    operation_id = "postMessage"
)]
#[post("/conversations/{id}/messages")]
pub async fn post_message(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<PostMessageRequest>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let conversation = ConversationId::new(path.into_inner());
    let text = payload.into_inner().text;
    let messages = state.messages.clone();
    run_blocking(move || messages.post(conversation, caller, &text)).await?;
    Ok(HttpResponse::Created().json(json!({ "ok": true })))
}
