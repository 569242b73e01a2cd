//! SQLite-backed [`RiderRepository`] implementation.

use chrono::NaiveDate;
use diesel::prelude::*;
use tracing::debug;

use crate::domain::ports::{RiderRepository, RiderRepositoryError};
use crate::domain::riders::{Gender, JoinDetails, RiderChanges, RiderRecord};
use crate::domain::{LinkId, RouteId};

use super::models::{LinkChangesetRow, LinkRow, NewCalendarRow, NewLinkRow};
use super::pool::{DbConnection, DbPool};
use super::schema::{calendar, links, routes};

/// Diesel-backed implementation of the [`RiderRepository`] port.
#[derive(Clone)]
pub struct DieselRiderRepository {
    pool: DbPool,
}

impl DieselRiderRepository {
    /// Create a new repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<DbConnection, RiderRepositoryError> {
        self.pool
            .get()
            .map_err(|err| RiderRepositoryError::connection(err.to_string()))
    }
}

fn map_diesel_error(error: diesel::result::Error) -> RiderRepositoryError {
    debug!(error = %error, "rider store operation failed");
    RiderRepositoryError::query(error.to_string())
}

impl From<diesel::result::Error> for RiderRepositoryError {
    fn from(error: diesel::result::Error) -> Self {
        map_diesel_error(error)
    }
}

impl RiderRepository for DieselRiderRepository {
    fn join(
        &self,
        date: NaiveDate,
        route: RouteId,
        details: &JoinDetails,
    ) -> Result<LinkId, RiderRepositoryError> {
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, RiderRepositoryError, _>(|conn| {
            // A join row must reference an activation row for the same
            // (date, route) pair.
            let activations: i64 = calendar::table
                .filter(calendar::travel_date.eq(date))
                .filter(calendar::route_id.eq(route.get()))
                .filter(calendar::link_id.is_null())
                .count()
                .get_result(conn)?;
            if activations == 0 {
                return Err(RiderRepositoryError::RouteNotOffered);
            }

            // Duplicate check inside the same transaction as the inserts.
            let already_joined: i64 = calendar::table
                .inner_join(links::table)
                .filter(calendar::travel_date.eq(date))
                .filter(calendar::route_id.eq(route.get()))
                .filter(links::phone.eq(&details.phone))
                .count()
                .get_result(conn)?;
            if already_joined > 0 {
                return Err(RiderRepositoryError::DuplicateJoin);
            }

            let link_id = diesel::insert_into(links::table)
                .values(&NewLinkRow {
                    user_id: details.owner.map(crate::domain::UserId::get),
                    name: &details.name,
                    gender: details.gender.as_str(),
                    drop_point: &details.drop_point,
                    phone: &details.phone,
                    course_year: &details.course_year,
                    branch: &details.branch,
                })
                .returning(links::id)
                .get_result::<i64>(conn)?;

            diesel::insert_into(calendar::table)
                .values(&NewCalendarRow {
                    travel_date: date,
                    route_id: route.get(),
                    link_id: Some(link_id),
                })
                .execute(conn)?;

            // Keep the display cache in step with the join rows.
            diesel::update(routes::table.find(route.get()))
                .set(routes::rider_count.eq(routes::rider_count + 1))
                .execute(conn)?;

            Ok(LinkId::new(link_id))
        })
    }

    fn list(&self, gender: Option<Gender>) -> Result<Vec<RiderRecord>, RiderRepositoryError> {
        let mut conn = self.conn()?;
        let mut query = links::table.select(LinkRow::as_select()).into_boxed();
        if let Some(gender) = gender {
            query = query.filter(links::gender.eq(gender.as_str()));
        }
        let rows: Vec<LinkRow> = query
            .order(links::id.desc())
            .load(&mut conn)
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(LinkRow::into_record).collect())
    }

    fn update(&self, id: LinkId, changes: &RiderChanges) -> Result<(), RiderRepositoryError> {
        let mut conn = self.conn()?;
        let changeset = LinkChangesetRow {
            name: changes.name.clone(),
            gender: changes.gender.map(|g| g.as_str().to_owned()),
            drop_point: changes.drop_point.clone(),
            phone: changes.phone.clone(),
            course_year: changes.course_year.clone(),
            branch: changes.branch.clone(),
        };
        let affected = diesel::update(links::table.find(id.get()))
            .set(&changeset)
            .execute(&mut conn)
            .map_err(map_diesel_error)?;
        if affected == 0 {
            return Err(RiderRepositoryError::NotFound);
        }
        Ok(())
    }

    fn delete(&self, id: LinkId) -> Result<(), RiderRepositoryError> {
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, RiderRepositoryError, _>(|conn| {
            // The routes this link was riding on, for cache upkeep. The
            // route may already be gone; its update then touches no rows.
            let route_ids: Vec<i64> = calendar::table
                .filter(calendar::link_id.eq(id.get()))
                .select(calendar::route_id)
                .load(conn)?;
            for route_id in route_ids {
                let target = routes::table
                    .filter(routes::id.eq(route_id))
                    .filter(routes::rider_count.gt(0));
                diesel::update(target)
                    .set(routes::rider_count.eq(routes::rider_count - 1))
                    .execute(conn)?;
            }

            diesel::delete(calendar::table.filter(calendar::link_id.eq(id.get())))
                .execute(conn)?;
            let affected = diesel::delete(links::table.find(id.get())).execute(conn)?;
            if affected == 0 {
                return Err(RiderRepositoryError::NotFound);
            }
            Ok(())
        })
    }
}
