//! SQLite-backed [`CalendarRepository`] implementation (read side).

use chrono::NaiveDate;
use diesel::prelude::*;
use tracing::debug;

use crate::domain::ports::{CalendarRepository, CalendarRepositoryError};
use crate::domain::riders::RiderRecord;
use crate::domain::routes::RouteSummary;
use crate::domain::RouteId;

use super::models::{LinkRow, RouteRow};
use super::pool::{DbConnection, DbPool};
use super::schema::{calendar, links, routes};

/// Diesel-backed implementation of the [`CalendarRepository`] port.
#[derive(Clone)]
pub struct DieselCalendarRepository {
    pool: DbPool,
}

impl DieselCalendarRepository {
    /// Create a new repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<DbConnection, CalendarRepositoryError> {
        self.pool
            .get()
            .map_err(|err| CalendarRepositoryError::connection(err.to_string()))
    }
}

fn map_diesel_error(error: diesel::result::Error) -> CalendarRepositoryError {
    debug!(error = %error, "calendar store operation failed");
    CalendarRepositoryError::query(error.to_string())
}

impl CalendarRepository for DieselCalendarRepository {
    fn active_routes_on(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<RouteSummary>, CalendarRepositoryError> {
        let mut conn = self.conn()?;
        let rows: Vec<RouteRow> = calendar::table
            .inner_join(routes::table)
            .filter(calendar::travel_date.eq(date))
            .filter(calendar::link_id.is_null())
            .order(routes::id.desc())
            .select(RouteRow::as_select())
            .distinct()
            .load(&mut conn)
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(RouteRow::into_summary).collect())
    }

    fn rider_count(
        &self,
        date: NaiveDate,
        route: RouteId,
    ) -> Result<i64, CalendarRepositoryError> {
        let mut conn = self.conn()?;
        calendar::table
            .filter(calendar::travel_date.eq(date))
            .filter(calendar::route_id.eq(route.get()))
            .filter(calendar::link_id.is_not_null())
            .count()
            .get_result(&mut conn)
            .map_err(map_diesel_error)
    }

    fn join_rows(
        &self,
        route: RouteId,
        date: NaiveDate,
    ) -> Result<Vec<RiderRecord>, CalendarRepositoryError> {
        let mut conn = self.conn()?;
        let rows: Vec<LinkRow> = calendar::table
            .inner_join(links::table)
            .filter(calendar::travel_date.eq(date))
            .filter(calendar::route_id.eq(route.get()))
            .order(links::id.desc())
            .select(LinkRow::as_select())
            .load(&mut conn)
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(LinkRow::into_record).collect())
    }
}
