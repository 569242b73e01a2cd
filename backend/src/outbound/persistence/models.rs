//! Row structs bridging the Diesel schema and the domain read models.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use tracing::warn;

use crate::domain::riders::{Gender, RiderRecord};
use crate::domain::routes::RouteSummary;
use crate::domain::{LinkId, RouteId, UserId};

use super::schema::{calendar, conversations, conversation_members, links, messages, routes, users};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = routes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RouteRow {
    pub id: i64,
    pub slot_code: String,
    pub end_point: String,
    pub major_stops: Option<String>,
    pub depart_time: Option<String>,
    pub transport_mode: Option<String>,
    pub rider_count: i64,
}

impl RouteRow {
    /// Convert into the domain read model.
    pub fn into_summary(self) -> RouteSummary {
        RouteSummary {
            id: RouteId::new(self.id),
            slot_code: self.slot_code,
            end_point: self.end_point,
            major_stops: self.major_stops,
            depart_time: self.depart_time,
            transport_mode: self.transport_mode,
            rider_count: self.rider_count,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = routes)]
pub struct NewRouteRow<'a> {
    pub slot_code: &'a str,
    pub end_point: &'a str,
    pub major_stops: Option<&'a str>,
    pub depart_time: Option<&'a str>,
    pub transport_mode: Option<&'a str>,
    pub rider_count: i64,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = routes)]
pub struct RouteChangesetRow {
    pub slot_code: Option<String>,
    pub end_point: Option<String>,
    pub major_stops: Option<String>,
    pub depart_time: Option<String>,
    pub transport_mode: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = links)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LinkRow {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub gender: String,
    pub drop_point: String,
    pub phone: String,
    pub course_year: String,
    pub branch: String,
}

impl LinkRow {
    /// Convert into the domain read model.
    ///
    /// The gender column only ever holds canonical tags written through
    /// [`Gender::as_str`]; anything else is logged and read as `M` rather
    /// than failing the whole listing.
    pub fn into_record(self) -> RiderRecord {
        let gender = Gender::parse(&self.gender).unwrap_or_else(|| {
            warn!(link_id = self.id, value = %self.gender, "unrecognised gender tag in store");
            Gender::M
        });
        RiderRecord {
            id: LinkId::new(self.id),
            user_id: self.user_id.map(UserId::new),
            name: self.name,
            gender,
            drop_point: self.drop_point,
            phone: self.phone,
            course_year: self.course_year,
            branch: self.branch,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = links)]
pub struct NewLinkRow<'a> {
    pub user_id: Option<i64>,
    pub name: &'a str,
    pub gender: &'a str,
    pub drop_point: &'a str,
    pub phone: &'a str,
    pub course_year: &'a str,
    pub branch: &'a str,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = links)]
pub struct LinkChangesetRow {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub drop_point: Option<String>,
    pub phone: Option<String>,
    pub course_year: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = calendar)]
pub struct NewCalendarRow {
    pub travel_date: NaiveDate,
    pub route_id: i64,
    pub link_id: Option<i64>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = conversations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ConversationRow {
    pub id: i64,
    pub title: Option<String>,
    pub is_group: bool,
    pub route_id: Option<i64>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = conversations)]
pub struct NewConversationRow<'a> {
    pub title: Option<&'a str>,
    pub is_group: bool,
    pub route_id: Option<i64>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = conversation_members)]
pub struct NewMemberRow {
    pub conversation_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MessageRow {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub body: String,
    pub sent_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessageRow<'a> {
    pub conversation_id: i64,
    pub sender_id: i64,
    pub body: &'a str,
    pub sent_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_digest: &'a str,
    pub gender: &'a str,
}
