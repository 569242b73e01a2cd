//! Route catalogue: itinerary records and their lifecycle.
//!
//! A route is an opaque user-declared itinerary (endpoint, stops, optional
//! time and transport mode), independent of any date. Creating a route also
//! files its first calendar activation row; both writes happen in one store
//! transaction.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use mockable::Clock;
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use super::error::Error;
use super::ids::RouteId;
use super::ports::{RouteRepository, RouteRepositoryError};
use super::ApiResult;

/// Display prefix for advisory slot codes.
pub const SLOT_PREFIX: &str = "SL";

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Render a route sequence number as a slot code: upper-case base-36,
/// left-padded with zeros to four characters.
///
/// The code is advisory and display-only; there is no uniqueness guarantee
/// beyond the monotonicity of the underlying id sequence.
pub fn slot_code_for(sequence: i64) -> String {
    let mut n = u64::try_from(sequence).unwrap_or(0);
    let mut digits: Vec<char> = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize] as char);
        n /= 36;
    }
    while digits.len() < 4 {
        digits.push('0');
    }
    digits.iter().rev().collect()
}

/// A route as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    /// Store-assigned identity; never changes after creation.
    pub id: RouteId,
    /// Advisory display label.
    pub slot_code: String,
    /// Destination endpoint; compared case-insensitively for duplicate and
    /// drop matching.
    pub end_point: String,
    /// Free-text stop list.
    pub major_stops: Option<String>,
    /// Optional 24-hour `HH:MM` departure time.
    pub depart_time: Option<String>,
    /// Optional transport mode label.
    pub transport_mode: Option<String>,
    /// Cached rider count, maintained by the join/delete transactions.
    pub rider_count: i64,
}

/// Validated fields for a route creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoute {
    pub slot_code: String,
    pub end_point: String,
    pub major_stops: Option<String>,
    pub depart_time: Option<String>,
    pub transport_mode: Option<String>,
}

/// Partial update of a route's mutable fields. `None` leaves a field as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteChanges {
    pub slot_code: Option<String>,
    pub end_point: Option<String>,
    pub major_stops: Option<String>,
    pub depart_time: Option<String>,
    pub transport_mode: Option<String>,
}

impl RouteChanges {
    /// Whether the update carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.slot_code.is_none()
            && self.end_point.is_none()
            && self.major_stops.is_none()
            && self.depart_time.is_none()
            && self.transport_mode.is_none()
    }
}

/// Route creation request, date included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoute {
    pub travel_date: NaiveDate,
    pub slot_code: String,
    pub end_point: String,
    pub major_stops: Option<String>,
    pub depart_time: Option<String>,
    pub transport_mode: Option<String>,
}

/// Route catalogue service.
#[derive(Clone)]
pub struct RouteCatalogService {
    routes: Arc<dyn RouteRepository>,
    clock: Arc<dyn Clock>,
}

impl RouteCatalogService {
    /// Create a new service over the given route store.
    pub fn new(routes: Arc<dyn RouteRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { routes, clock }
    }

    /// Create a route and its first activation row.
    ///
    /// # Errors
    ///
    /// `invalid_request` for missing fields, a past date, or a malformed
    /// time; `conflict` when an equivalent route already exists on the date.
    pub fn create(&self, request: CreateRoute) -> ApiResult<RouteId> {
        let slot_code = require_field(&request.slot_code, "slotCode")?;
        let end_point = require_field(&request.end_point, "endPoint")?;
        self.require_not_past(request.travel_date)?;
        let depart_time = normalise_time(request.depart_time.as_deref())?;

        let route = NewRoute {
            slot_code,
            end_point,
            major_stops: normalise_optional(request.major_stops.as_deref()),
            depart_time,
            transport_mode: normalise_optional(request.transport_mode.as_deref()),
        };
        self.routes
            .create_with_activation(request.travel_date, &route)
            .map_err(map_route_repo_error)
    }

    /// Apply a partial update to a route.
    ///
    /// # Errors
    ///
    /// `invalid_request` when no fields are given or the time is malformed;
    /// `not_found` for an unknown id.
    pub fn update(&self, id: RouteId, changes: RouteChanges) -> ApiResult<()> {
        if changes.is_empty() {
            return Err(Error::invalid_request("no fields to update"));
        }
        if let Some(time) = changes.depart_time.as_deref() {
            if !time.trim().is_empty() {
                parse_time(time)?;
            }
        }
        self.routes.update(id, &changes).map_err(map_route_repo_error)
    }

    /// Delete a route and all its calendar rows. Rider links survive.
    pub fn delete(&self, id: RouteId) -> ApiResult<()> {
        self.routes.delete(id).map_err(map_route_repo_error)
    }

    /// Fetch a route by id.
    pub fn find(&self, id: RouteId) -> ApiResult<Option<RouteSummary>> {
        self.routes.find(id).map_err(map_route_repo_error)
    }

    /// The advisory slot code the next created route would display.
    pub fn next_slot_code(&self) -> ApiResult<String> {
        let sequence = self.routes.next_sequence().map_err(map_route_repo_error)?;
        Ok(format!("{SLOT_PREFIX}{}", slot_code_for(sequence)))
    }

    fn require_not_past(&self, date: NaiveDate) -> ApiResult<()> {
        let today = self.clock.utc().date_naive();
        if date < today {
            return Err(
                Error::invalid_request("cannot create a route for a past date").with_details(
                    json!({ "field": "date", "value": date.to_string() }),
                ),
            );
        }
        Ok(())
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

fn normalise_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

fn normalise_time(value: Option<&str>) -> ApiResult<Option<String>> {
    match normalise_optional(value) {
        Some(time) => {
            parse_time(&time)?;
            Ok(Some(time))
        }
        None => Ok(None),
    }
}

fn parse_time(value: &str) -> ApiResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| {
        Error::invalid_request("time must be a 24-hour HH:MM value")
            .with_details(json!({ "field": "departTime", "value": value }))
    })
}

/// Map a route-store failure raised during a lookup on behalf of another
/// service (rider joins, conversation provisioning).
pub(crate) fn map_lookup_failure(error: RouteRepositoryError) -> Error {
    map_route_repo_error(error)
}

fn map_route_repo_error(error: RouteRepositoryError) -> Error {
    match error {
        RouteRepositoryError::DuplicateRoute => {
            Error::conflict("a matching route already exists for this date")
        }
        RouteRepositoryError::NotFound => Error::not_found("route not found"),
        RouteRepositoryError::Connection { message } | RouteRepositoryError::Query { message } => {
            Error::internal(format!("route store failure: {message}"))
        }
    }
}
