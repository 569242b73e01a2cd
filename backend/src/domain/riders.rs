//! Rider registry: per-join personal and trip detail records.
//!
//! Joining a route creates a rider link plus its calendar join row in one
//! store transaction; deleting a link removes the join row with it. Links
//! are never removed by route deletion, so they stay addressable for audit
//! and undo.

use std::sync::Arc;

use chrono::NaiveDate;
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use super::error::Error;
use super::ids::{LinkId, RouteId, UserId};
use super::ports::{RiderRepository, RiderRepositoryError, RouteRepository};
use super::routes;
use super::ApiResult;

/// Rider gender tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Gender {
    M,
    F,
}

impl Gender {
    /// Parse a user-supplied tag, accepting either case.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_uppercase().as_str() {
            "M" => Some(Self::M),
            "F" => Some(Self::F),
            _ => None,
        }
    }

    /// The canonical single-letter tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::M => "M",
            Self::F => "F",
        }
    }
}

/// A rider link as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RiderRecord {
    pub id: LinkId,
    /// Owning account, when the rider joined while signed in.
    pub user_id: Option<UserId>,
    pub name: String,
    pub gender: Gender,
    pub drop_point: String,
    pub phone: String,
    pub course_year: String,
    pub branch: String,
}

/// Raw join request as received from the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRoute {
    pub travel_date: NaiveDate,
    pub name: String,
    pub gender: String,
    pub drop_point: String,
    pub phone: String,
    pub course_year: String,
    pub branch: String,
}

/// Validated rider detail handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinDetails {
    pub owner: Option<UserId>,
    pub name: String,
    pub gender: Gender,
    pub drop_point: String,
    pub phone: String,
    pub course_year: String,
    pub branch: String,
}

/// Raw partial update of a link's displayed fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRider {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub drop_point: Option<String>,
    pub phone: Option<String>,
    pub course_year: Option<String>,
    pub branch: Option<String>,
}

impl UpdateRider {
    /// Whether the update carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.gender.is_none()
            && self.drop_point.is_none()
            && self.phone.is_none()
            && self.course_year.is_none()
            && self.branch.is_none()
    }
}

/// Validated partial update handed to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiderChanges {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub drop_point: Option<String>,
    pub phone: Option<String>,
    pub course_year: Option<String>,
    pub branch: Option<String>,
}

/// Rider registry service.
#[derive(Clone)]
pub struct RiderRegistryService {
    riders: Arc<dyn RiderRepository>,
    routes: Arc<dyn RouteRepository>,
    clock: Arc<dyn Clock>,
}

impl RiderRegistryService {
    /// Create a new service over the given stores.
    pub fn new(
        riders: Arc<dyn RiderRepository>,
        routes: Arc<dyn RouteRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            riders,
            routes,
            clock,
        }
    }

    /// Join a route on a date.
    ///
    /// Validates every field, requires the drop point to match the route's
    /// declared endpoint (case-insensitive, trimmed), and writes the link
    /// plus its calendar join row in one transaction. The duplicate check
    /// on (date, route, phone) happens inside that transaction.
    ///
    /// # Errors
    ///
    /// `invalid_request` for field failures or an endpoint mismatch,
    /// `not_found` for an unknown route, `conflict` when the phone already
    /// joined the (date, route) pair.
    pub fn join(
        &self,
        route_id: RouteId,
        request: JoinRoute,
        acting_user: Option<UserId>,
    ) -> ApiResult<LinkId> {
        let name = require_field(&request.name, "name")?;
        let gender = parse_gender(&request.gender)?;
        let drop_point = require_field(&request.drop_point, "drop")?;
        let phone = parse_phone(&request.phone)?;
        let course_year = require_field(&request.course_year, "courseYear")?;
        let branch = require_field(&request.branch, "branch")?;

        let today = self.clock.utc().date_naive();
        if request.travel_date < today {
            return Err(Error::invalid_request("cannot join for a past date").with_details(
                json!({ "field": "date", "value": request.travel_date.to_string() }),
            ));
        }

        let route = self
            .routes
            .find(route_id)
            .map_err(map_route_lookup_error)?
            .ok_or_else(|| Error::not_found("route not found"))?;
        let end_point = route.end_point.trim();
        if !end_point.is_empty() && !end_point.eq_ignore_ascii_case(drop_point.trim()) {
            return Err(Error::invalid_request(format!(
                "drop point must match the route endpoint '{end_point}'"
            ))
            .with_details(json!({ "field": "drop", "requiredEndpoint": end_point })));
        }

        let details = JoinDetails {
            owner: acting_user,
            name,
            gender,
            drop_point,
            phone,
            course_year,
            branch,
        };
        self.riders
            .join(request.travel_date, route_id, &details)
            .map_err(map_rider_repo_error)
    }

    /// All rider links, optionally filtered by gender tag, newest first.
    pub fn list(&self, gender: Option<Gender>) -> ApiResult<Vec<RiderRecord>> {
        self.riders.list(gender).map_err(map_rider_repo_error)
    }

    /// Apply a partial update to a link's displayed fields.
    pub fn update(&self, id: LinkId, request: UpdateRider) -> ApiResult<()> {
        if request.is_empty() {
            return Err(Error::invalid_request("no fields to update"));
        }
        let gender = match request.gender.as_deref() {
            Some(raw) => Some(parse_gender(raw)?),
            None => None,
        };
        let phone = match request.phone.as_deref() {
            Some(raw) => Some(parse_phone(raw)?),
            None => None,
        };
        let changes = RiderChanges {
            name: request.name,
            gender,
            drop_point: request.drop_point,
            phone,
            course_year: request.course_year,
            branch: request.branch,
        };
        self.riders.update(id, &changes).map_err(map_rider_repo_error)
    }

    /// Delete a link and its calendar join row.
    pub fn delete(&self, id: LinkId) -> ApiResult<()> {
        self.riders.delete(id).map_err(map_rider_repo_error)
    }
}

fn require_field(value: &str, field: &'static str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_request(format!("{field} is required"))
            .with_details(json!({ "field": field, "code": "missing_field" })));
    }
    Ok(trimmed.to_owned())
}

fn parse_gender(raw: &str) -> ApiResult<Gender> {
    Gender::parse(raw).ok_or_else(|| {
        Error::invalid_request("gender must be M or F")
            .with_details(json!({ "field": "gender", "value": raw }))
    })
}

fn parse_phone(raw: &str) -> ApiResult<String> {
    let phone = raw.trim();
    if phone.len() < 7 || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(
            Error::invalid_request("phone must be all digits and at least 7 characters long")
                .with_details(json!({ "field": "phone", "value": raw })),
        );
    }
    Ok(phone.to_owned())
}

fn map_route_lookup_error(error: super::ports::RouteRepositoryError) -> Error {
    routes::map_lookup_failure(error)
}

fn map_rider_repo_error(error: RiderRepositoryError) -> Error {
    match error {
        RiderRepositoryError::DuplicateJoin => Error::conflict("already joined"),
        RiderRepositoryError::RouteNotOffered => {
            Error::invalid_request("route is not offered on the requested date")
        }
        RiderRepositoryError::NotFound => Error::not_found("rider link not found"),
        RiderRepositoryError::Connection { message } | RiderRepositoryError::Query { message } => {
            Error::internal(format!("rider store failure: {message}"))
        }
    }
}
