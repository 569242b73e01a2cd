//! SQLite-backed [`RouteRepository`] implementation.

use chrono::NaiveDate;
use diesel::prelude::*;
use tracing::debug;

use crate::domain::ports::{RouteRepository, RouteRepositoryError};
use crate::domain::routes::{NewRoute, RouteChanges, RouteSummary};
use crate::domain::RouteId;

use super::models::{NewCalendarRow, NewRouteRow, RouteChangesetRow, RouteRow};
use super::pool::{DbConnection, DbPool};
use super::schema::{calendar, routes};

/// Diesel-backed implementation of the [`RouteRepository`] port.
#[derive(Clone)]
pub struct DieselRouteRepository {
    pool: DbPool,
}

impl DieselRouteRepository {
    /// Create a new repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<DbConnection, RouteRepositoryError> {
        self.pool
            .get()
            .map_err(|err| RouteRepositoryError::connection(err.to_string()))
    }
}

fn map_diesel_error(error: diesel::result::Error) -> RouteRepositoryError {
    debug!(error = %error, "route store operation failed");
    RouteRepositoryError::query(error.to_string())
}

impl From<diesel::result::Error> for RouteRepositoryError {
    fn from(error: diesel::result::Error) -> Self {
        map_diesel_error(error)
    }
}

/// Whether `candidate` collides with the requested route under the duplicate
/// rule: endpoint case-insensitive, time empty-string-normalised, transport
/// mode case-insensitive.
fn collides(candidate: &RouteRow, route: &NewRoute) -> bool {
    let time = route.depart_time.as_deref().unwrap_or("");
    let mode = route.transport_mode.as_deref().unwrap_or("");
    candidate.end_point.eq_ignore_ascii_case(&route.end_point)
        && candidate.depart_time.as_deref().unwrap_or("") == time
        && candidate
            .transport_mode
            .as_deref()
            .unwrap_or("")
            .eq_ignore_ascii_case(mode)
}

impl RouteRepository for DieselRouteRepository {
    fn create_with_activation(
        &self,
        date: NaiveDate,
        route: &NewRoute,
    ) -> Result<RouteId, RouteRepositoryError> {
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, RouteRepositoryError, _>(|conn| {
            // Check-then-insert inside one transaction so a concurrent
            // creation cannot slip between the existence check and the
            // insert.
            let active: Vec<RouteRow> = calendar::table
                .inner_join(routes::table)
                .filter(calendar::travel_date.eq(date))
                .filter(calendar::link_id.is_null())
                .select(RouteRow::as_select())
                .load(conn)?;
            if active.iter().any(|candidate| collides(candidate, route)) {
                return Err(RouteRepositoryError::DuplicateRoute);
            }

            let id = diesel::insert_into(routes::table)
                .values(&NewRouteRow {
                    slot_code: &route.slot_code,
                    end_point: &route.end_point,
                    major_stops: route.major_stops.as_deref(),
                    depart_time: route.depart_time.as_deref(),
                    transport_mode: route.transport_mode.as_deref(),
                    rider_count: 0,
                })
                .returning(routes::id)
                .get_result::<i64>(conn)?;

            diesel::insert_into(calendar::table)
                .values(&NewCalendarRow {
                    travel_date: date,
                    route_id: id,
                    link_id: None,
                })
                .execute(conn)?;

            Ok(RouteId::new(id))
        })
    }

    fn update(&self, id: RouteId, changes: &RouteChanges) -> Result<(), RouteRepositoryError> {
        let mut conn = self.conn()?;
        let changeset = RouteChangesetRow {
            slot_code: changes.slot_code.clone(),
            end_point: changes.end_point.clone(),
            major_stops: changes.major_stops.clone(),
            depart_time: changes.depart_time.clone(),
            transport_mode: changes.transport_mode.clone(),
        };
        let affected = diesel::update(routes::table.find(id.get()))
            .set(&changeset)
            .execute(&mut conn)
            .map_err(map_diesel_error)?;
        if affected == 0 {
            return Err(RouteRepositoryError::NotFound);
        }
        Ok(())
    }

    fn delete(&self, id: RouteId) -> Result<(), RouteRepositoryError> {
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, RouteRepositoryError, _>(|conn| {
            // Activation and join rows go with the route; rider links stay
            // addressable for audit and undo.
            diesel::delete(calendar::table.filter(calendar::route_id.eq(id.get())))
                .execute(conn)?;
            let affected = diesel::delete(routes::table.find(id.get())).execute(conn)?;
            if affected == 0 {
                return Err(RouteRepositoryError::NotFound);
            }
            Ok(())
        })
    }

    fn find(&self, id: RouteId) -> Result<Option<RouteSummary>, RouteRepositoryError> {
        let mut conn = self.conn()?;
        let row: Option<RouteRow> = routes::table
            .find(id.get())
            .select(RouteRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(RouteRow::into_summary))
    }

    fn next_sequence(&self) -> Result<i64, RouteRepositoryError> {
        let mut conn = self.conn()?;
        let max: Option<i64> = routes::table
            .select(diesel::dsl::max(routes::id))
            .get_result(&mut conn)
            .map_err(map_diesel_error)?;
        Ok(max.unwrap_or(0) + 1)
    }
}
