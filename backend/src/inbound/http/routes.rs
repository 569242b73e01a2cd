//! Route catalogue and calendar endpoints.
//!
//! ```text
//! POST   /api/v1/routes
//! GET    /api/v1/routes/next-slot
//! GET    /api/v1/calendar/{date}
//! GET    /api/v1/routes/{id}/rider-count?date=YYYY-MM-DD
//! GET    /api/v1/routes/{id}/riders?date=YYYY-MM-DD
//! PATCH  /api/v1/routes/{id}       (PUT accepted as an alias)
//! DELETE /api/v1/routes/{id}
//! ```

use actix_web::{delete, get, post, route, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::riders::RiderRecord;
use crate::domain::routes::{CreateRoute, RouteChanges, RouteSummary};
use crate::domain::{Error, RouteId};

use super::session::SessionContext;
use super::state::HttpState;
use super::validation::parse_travel_date;
use super::{run_blocking, ApiResult};

/// Route creation request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRouteRequest {
    /// ISO travel date the route is first offered on.
    pub date: String,
    pub slot_code: String,
    pub end_point: String,
    pub major_stops: Option<String>,
    pub depart_time: Option<String>,
    pub transport_mode: Option<String>,
}

/// Partial route update body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRouteRequest {
    pub slot_code: Option<String>,
    pub end_point: Option<String>,
    pub major_stops: Option<String>,
    pub depart_time: Option<String>,
    pub transport_mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    date: Option<String>,
}

/// Create a route and its first activation row.
#[utoipa::path(
    post,
    path = "/api/v1/routes",
    request_body = CreateRouteRequest,
    responses(
        (status = 201, description = "Route created"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Duplicate route for this date", body = Error)
    ),
    tags = ["routes"],
    operation_id = "createRoute"
)]
#[post("/routes")]
pub async fn create_route(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: web::Json<CreateRouteRequest>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let request = payload.into_inner();
    let travel_date = parse_travel_date(&request.date)?;
    let catalog = state.catalog.clone();
    let route_id = run_blocking(move || {
        catalog.create(CreateRoute {
            travel_date,
            slot_code: request.slot_code,
            end_point: request.end_point,
            major_stops: request.major_stops,
            depart_time: request.depart_time,
            transport_mode: request.transport_mode,
        })
    })
    .await?;
    Ok(HttpResponse::Created().json(json!({ "routeId": route_id })))
}

/// The advisory slot code the next route would display.
#[utoipa::path(
    get,
    path = "/api/v1/routes/next-slot",
    responses((status = 200, description = "Next advisory slot code")),
    tags = ["routes"],
    operation_id = "nextSlotCode"
)]
#[get("/routes/next-slot")]
pub async fn next_slot(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let catalog = state.catalog.clone();
    let slot = run_blocking(move || catalog.next_slot_code()).await?;
    Ok(HttpResponse::Ok().json(json!({ "slot": slot })))
}

/// Distinct routes offered on a date, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/calendar/{date}",
    params(("date" = String, Path, description = "ISO travel date")),
    responses(
        (status = 200, description = "Routes active on the date", body = [RouteSummary]),
        (status = 400, description = "Invalid date", body = Error)
    ),
    tags = ["routes"],
    operation_id = "routesActiveOn"
)]
#[get("/calendar/{date}")]
pub async fn active_on_date(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<RouteSummary>>> {
    session.require_user_id()?;
    let date = parse_travel_date(&path.into_inner())?;
    let calendar = state.calendar.clone();
    let routes = run_blocking(move || calendar.active_routes_on(date)).await?;
    Ok(web::Json(routes))
}

/// Join-row count for a (date, route) pair; reads as zero on any lookup
/// failure so capacity display never errors.
#[utoipa::path(
    get,
    path = "/api/v1/routes/{id}/rider-count",
    params(("id" = i64, Path, description = "Route id")),
    responses((status = 200, description = "Rider count")),
    tags = ["routes"],
    operation_id = "riderCount"
)]
#[get("/routes/{id}/rider-count")]
pub async fn rider_count(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    query: web::Query<DateQuery>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let route = RouteId::new(path.into_inner());
    let date = query
        .into_inner()
        .date
        .as_deref()
        .and_then(|raw| parse_travel_date(raw).ok());
    let count = match date {
        Some(date) => {
            let calendar = state.calendar.clone();
            run_blocking(move || Ok(calendar.rider_count(date, route))).await?
        }
        None => 0,
    };
    Ok(HttpResponse::Ok().json(json!({ "count": count })))
}

/// Full rider detail for a (route, date) pair, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/routes/{id}/riders",
    params(("id" = i64, Path, description = "Route id")),
    responses(
        (status = 200, description = "Riders joined on the date", body = [RiderRecord]),
        (status = 400, description = "Missing or invalid date", body = Error)
    ),
    tags = ["routes"],
    operation_id = "ridersOnRoute"
)]
#[get("/routes/{id}/riders")]
pub async fn riders_on_route(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    query: web::Query<DateQuery>,
) -> ApiResult<web::Json<Vec<RiderRecord>>> {
    session.require_user_id()?;
    let route = RouteId::new(path.into_inner());
    let raw = query
        .into_inner()
        .date
        .ok_or_else(|| Error::invalid_request("date query parameter is required"))?;
    let date = parse_travel_date(&raw)?;
    let calendar = state.calendar.clone();
    let riders = run_blocking(move || calendar.join_rows(route, date)).await?;
    Ok(web::Json(riders))
}

/// Apply a partial update to a route.
#[utoipa::path(
    patch,
    path = "/api/v1/routes/{id}",
    params(("id" = i64, Path, description = "Route id")),
    request_body = UpdateRouteRequest,
    responses(
        (status = 200, description = "Route updated"),
        (status = 400, description = "No fields or invalid time", body = Error),
        (status = 404, description = "Route not found", body = Error)
    ),
    tags = ["routes"],
    operation_id = "updateRoute"
)]
#[route("/routes/{id}", method = "PATCH", method = "PUT")]
pub async fn update_route(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<UpdateRouteRequest>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let route = RouteId::new(path.into_inner());
    let request = payload.into_inner();
    let catalog = state.catalog.clone();
    run_blocking(move || {
        catalog.update(
            route,
            RouteChanges {
                slot_code: request.slot_code,
                end_point: request.end_point,
                major_stops: request.major_stops,
                depart_time: request.depart_time,
                transport_mode: request.transport_mode,
            },
        )
    })
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}

/// Delete a route and all its calendar rows. Rider links survive.
#[utoipa::path(
    delete,
    path = "/api/v1/routes/{id}",
    params(("id" = i64, Path, description = "Route id")),
    responses(
        (status = 200, description = "Route deleted"),
        (status = 404, description = "Route not found", body = Error)
    ),
    tags = ["routes"],
    operation_id = "deleteRoute"
)]
#[delete("/routes/{id}")]
pub async fn delete_route(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let route = RouteId::new(path.into_inner());
    let catalog = state.catalog.clone();
    run_blocking(move || catalog.delete(route)).await?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}
