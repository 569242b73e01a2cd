//! Calendar index reads: who is actually travelling when.
//!
//! The calendar is written only as part of route creation (activation rows)
//! and rider joins (join rows); this service exposes the read side.

use std::sync::Arc;

use chrono::NaiveDate;

use super::error::Error;
use super::ids::RouteId;
use super::ports::{CalendarRepository, CalendarRepositoryError};
use super::riders::RiderRecord;
use super::routes::RouteSummary;
use super::ApiResult;

/// Read-side service over the calendar index.
#[derive(Clone)]
pub struct CalendarQueryService {
    calendar: Arc<dyn CalendarRepository>,
}

impl CalendarQueryService {
    /// Create a new service over the given calendar store.
    pub fn new(calendar: Arc<dyn CalendarRepository>) -> Self {
        Self { calendar }
    }

    /// Distinct routes offered on the date, most recently created first.
    pub fn active_routes_on(&self, date: NaiveDate) -> ApiResult<Vec<RouteSummary>> {
        self.calendar
            .active_routes_on(date)
            .map_err(map_calendar_repo_error)
    }

    /// Join-row count for the (date, route) pair.
    ///
    /// Total by contract: any lookup failure reads as zero, so capacity
    /// display never turns into an error page.
    pub fn rider_count(&self, date: NaiveDate, route: RouteId) -> i64 {
        self.calendar.rider_count(date, route).unwrap_or(0)
    }

    /// Full rider detail for every join row on the (route, date) pair.
    pub fn join_rows(&self, route: RouteId, date: NaiveDate) -> ApiResult<Vec<RiderRecord>> {
        self.calendar
            .join_rows(route, date)
            .map_err(map_calendar_repo_error)
    }
}

fn map_calendar_repo_error(error: CalendarRepositoryError) -> Error {
    match error {
        CalendarRepositoryError::Connection { message }
        | CalendarRepositoryError::Query { message } => {
            Error::internal(format!("calendar store failure: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct FailingCalendar;

    impl CalendarRepository for FailingCalendar {
        fn active_routes_on(
            &self,
            _date: NaiveDate,
        ) -> Result<Vec<RouteSummary>, CalendarRepositoryError> {
            Err(CalendarRepositoryError::query("no such table"))
        }

        fn rider_count(
            &self,
            _date: NaiveDate,
            _route: RouteId,
        ) -> Result<i64, CalendarRepositoryError> {
            Err(CalendarRepositoryError::query("no such table"))
        }

        fn join_rows(
            &self,
            _route: RouteId,
            _date: NaiveDate,
        ) -> Result<Vec<RiderRecord>, CalendarRepositoryError> {
            Err(CalendarRepositoryError::query("no such table"))
        }
    }

    #[rstest]
    fn rider_count_is_total_and_reads_zero_on_failure() {
        let service = CalendarQueryService::new(Arc::new(FailingCalendar));
        let date = NaiveDate::from_ymd_opt(2100, 3, 1).expect("valid date");
        assert_eq!(service.rider_count(date, RouteId::new(9)), 0);
    }
}
