//! Internal Diesel row structs.
//!
//! Never exposed to the domain; repositories convert to and from domain
//! types at their boundary.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{invitations, tour_participants, tours, users};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub display_name: String,
    pub role: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub display_name: &'a str,
    pub role: &'a str,
    pub is_active: bool,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tours)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TourRow {
    pub id: Uuid,
    pub leader_id: Uuid,
    pub title: String,
    pub tour_date: NaiveDate,
    pub description: Option<String>,
    pub max_participants: Option<i32>,
    pub status: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tours)]
pub(crate) struct NewTourRow<'a> {
    pub id: Uuid,
    pub leader_id: Uuid,
    pub title: &'a str,
    pub tour_date: NaiveDate,
    pub description: Option<&'a str>,
    pub max_participants: Option<i32>,
    pub status: &'a str,
}

/// Changeset written after every tour mutation.
///
/// `treat_none_as_null` so clearing the description or capacity sticks.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tours)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct TourUpdate<'a> {
    pub title: &'a str,
    pub tour_date: NaiveDate,
    pub description: Option<&'a str>,
    pub max_participants: Option<i32>,
    pub status: &'a str,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tour_participants)]
pub(crate) struct NewParticipantRow {
    pub tour_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = invitations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InvitationRow {
    pub token: Uuid,
    pub email: String,
    pub role: String,
    pub invited_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub accepted_user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = invitations)]
pub(crate) struct NewInvitationRow<'a> {
    pub token: Uuid,
    pub email: &'a str,
    pub role: &'a str,
    pub invited_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
