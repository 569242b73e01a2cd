//! Rider join and link lifecycle endpoints.
//!
//! ```text
//! POST   /api/v1/routes/{id}/join
//! GET    /api/v1/riders?gender=M|F
//! PATCH  /api/v1/riders/{id}       (PUT accepted as an alias)
//! DELETE /api/v1/riders/{id}
//! ```

use actix_web::{delete, get, post, route, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::riders::{JoinRoute, RiderRecord, UpdateRider};
use crate::domain::{Error, LinkId, RouteId};

use super::session::SessionContext;
use super::state::HttpState;
use super::validation::{gender_filter, parse_travel_date};
use super::{run_blocking, ApiResult};

/// Join request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinRouteRequest {
    /// ISO travel date of the trip being joined.
    pub date: String,
    pub name: String,
    /// Gender tag, `M` or `F`.
    pub gender: String,
    /// Drop point; must match the route's endpoint when one is declared.
    pub drop: String,
    pub phone: String,
    pub course_year: String,
    pub branch: String,
}

/// Partial rider update body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRiderRequest {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub drop: Option<String>,
    pub phone: Option<String>,
    pub course_year: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RiderListQuery {
    gender: Option<String>,
}

/// Join a route on a date.
#[utoipa::path(
    post,
    path = "/api/v1/routes/{id}/join",
    params(("id" = i64, Path, description = "Route id")),
    request_body = JoinRouteRequest,
    responses(
        (status = 201, description = "Rider joined"),
        (status = 400, description = "Invalid field or endpoint mismatch", body = Error),
        (status = 404, description = "Route not found", body = Error),
        (status = 409, description = "Already joined", body = Error)
    ),
    tags = ["riders"],
    operation_id = "joinRoute"
)]
#[post("/routes/{id}/join")]
pub async fn join_route(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<JoinRouteRequest>,
) -> ApiResult<HttpResponse> {
    let acting_user = session.require_user_id()?;
    let route = RouteId::new(path.into_inner());
    let request = payload.into_inner();
    let travel_date = parse_travel_date(&request.date)?;
    let riders = state.riders.clone();
    let link_id = run_blocking(move || {
        riders.join(
            route,
            JoinRoute {
                travel_date,
                name: request.name,
                gender: request.gender,
                drop_point: request.drop,
                phone: request.phone,
                course_year: request.course_year,
                branch: request.branch,
            },
            Some(acting_user),
        )
    })
    .await?;
    Ok(HttpResponse::Created().json(json!({ "linkId": link_id })))
}

/// All rider links, optionally filtered by gender tag, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/riders",
    responses((status = 200, description = "Rider links", body = [RiderRecord])),
    tags = ["riders"],
    operation_id = "listRiders"
)]
#[get("/riders")]
pub async fn list_riders(
    session: SessionContext,
    state: web::Data<HttpState>,
    query: web::Query<RiderListQuery>,
) -> ApiResult<web::Json<Vec<RiderRecord>>> {
    session.require_user_id()?;
    let filter = gender_filter(query.into_inner().gender.as_deref());
    let riders = state.riders.clone();
    let records = run_blocking(move || riders.list(filter)).await?;
    Ok(web::Json(records))
}

/// Apply a partial update to a rider link.
#[utoipa::path(
    patch,
    path = "/api/v1/riders/{id}",
    params(("id" = i64, Path, description = "Link id")),
    request_body = UpdateRiderRequest,
    responses(
        (status = 200, description = "Link updated"),
        (status = 400, description = "No fields or invalid value", body = Error),
        (status = 404, description = "Link not found", body = Error)
    ),
    tags = ["riders"],
    operation_id = "updateRider"
)]
#[route("/riders/{id}", method = "PATCH", method = "PUT")]
pub async fn update_rider(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<UpdateRiderRequest>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let link = LinkId::new(path.into_inner());
    let request = payload.into_inner();
    let riders = state.riders.clone();
    run_blocking(move || {
        riders.update(
            link,
            UpdateRider {
                name: request.name,
                gender: request.gender,
                drop_point: request.drop,
                phone: request.phone,
                course_year: request.course_year,
                branch: request.branch,
            },
        )
    })
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}

/// Delete a rider link and its calendar join row.
#[utoipa::path(
    delete,
    path = "/api/v1/riders/{id}",
    params(("id" = i64, Path, description = "Link id")),
    responses(
        (status = 200, description = "Link deleted"),
        (status = 404, description = "Link not found", body = Error)
    ),
    tags = ["riders"],
    operation_id = "deleteRider"
)]
#[delete("/riders/{id}")]
pub async fn delete_rider(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let link = LinkId::new(path.into_inner());
    let riders = state.riders.clone();
    run_blocking(move || riders.delete(link)).await?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}
