//! Account endpoints: register, login, logout, and identity echo.
//!
//! ```text
//! POST /api/v1/register {"name","email","password","gender"}
//! POST /api/v1/login    {"email","password"}
//! POST /api/v1/logout
//! GET  /api/v1/me
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::Error;

use super::session::SessionContext;
use super::state::HttpState;
use super::{run_blocking, ApiResult};

/// Registration request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Gender tag, `M` or `F`.
    pub gender: String,
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let accounts = state.accounts.clone();
    let request = payload.into_inner();
    run_blocking(move || {
        accounts.register(
            &request.name,
            &request.email,
            &request.password,
            &request.gender,
        )
    })
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}

/// Check credentials and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let accounts = state.accounts.clone();
    let request = payload.into_inner();
    let profile = run_blocking(move || accounts.login(&request.email, &request.password)).await?;
    session.persist(&profile)?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true, "name": profile.name })))
}

/// Drop the caller's session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 200, description = "Session cleared")),
    tags = ["accounts"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.clear();
    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}

/// Echo the authenticated identity, or `{"id": null}` for anonymous
/// callers.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses((status = 200, description = "Current identity")),
    tags = ["accounts"],
    operation_id = "me",
    security([])
)]
#[get("/me")]
pub async fn me(session: SessionContext) -> ApiResult<HttpResponse> {
    match session.user_id()? {
        Some(id) => {
            let name = session.user_name()?;
            Ok(HttpResponse::Ok().json(json!({ "id": id, "name": name })))
        }
        None => Ok(HttpResponse::Ok().json(json!({ "id": null }))),
    }
}
