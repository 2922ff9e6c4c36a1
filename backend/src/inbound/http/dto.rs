//! JSON bodies shared by the HTTP handlers.
//!
//! Responses are built from domain aggregates; requests are validated into
//! domain values by the handlers, which own the error details.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    Error, Invitation, InvitationStatus, Role, Tour, TourDetails, TourStatus,
    TourValidationError, User, UserId,
};

use super::schemas::{RoleSchema, TourStatusSchema};

/// A club member as shown to other members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "Lea Brunner")]
    pub display_name: String,
    #[schema(value_type = RoleSchema)]
    pub role: Role,
    pub active: bool,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            display_name: user.display_name().to_string(),
            role: user.role(),
            active: user.is_active(),
        }
    }
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

/// A tour with its current sign-ups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TourDto {
    pub id: String,
    pub leader_id: String,
    #[schema(example = "Piz Palü traverse")]
    pub title: String,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub max_participants: Option<u32>,
    #[schema(value_type = TourStatusSchema)]
    pub status: TourStatus,
    pub participants: Vec<String>,
    pub is_full: bool,
}

impl From<&Tour> for TourDto {
    fn from(tour: &Tour) -> Self {
        let details = tour.details();
        Self {
            id: tour.id().to_string(),
            leader_id: tour.leader_id().to_string(),
            title: details.title.to_string(),
            date: details.date,
            description: details.description.clone(),
            max_participants: details.max_participants,
            status: tour.status(),
            participants: tour.participants().iter().map(UserId::to_string).collect(),
            is_full: tour.is_full(),
        }
    }
}

impl From<Tour> for TourDto {
    fn from(tour: Tour) -> Self {
        Self::from(&tour)
    }
}

/// Body for creating or editing a tour. Edits replace every field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TourRequest {
    #[schema(example = "Piz Palü traverse")]
    pub title: String,
    #[schema(example = "2026-02-14")]
    pub date: NaiveDate,
    pub description: Option<String>,
    #[schema(example = 8, minimum = 1, maximum = 500)]
    pub max_participants: Option<u32>,
}

impl TryFrom<TourRequest> for TourDetails {
    type Error = Error;

    fn try_from(request: TourRequest) -> Result<Self, Self::Error> {
        Self::new(
            &request.title,
            request.date,
            request.description,
            request.max_participants,
        )
        .map_err(|err| {
            let field = match err {
                TourValidationError::EmptyTitle | TourValidationError::TitleTooLong { .. } => {
                    "title"
                }
                TourValidationError::DescriptionTooLong { .. } => "description",
                _ => "maxParticipants",
            };
            Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
        })
    }
}

/// An invitation as listed for administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitationDto {
    pub token: String,
    #[schema(example = "guest@club.example")]
    pub email: String,
    #[schema(value_type = RoleSchema)]
    pub role: Role,
    pub invited_by: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[schema(example = "pending")]
    pub status: String,
    pub accepted_user_id: Option<String>,
}

impl InvitationDto {
    pub fn at(invitation: &Invitation, now: DateTime<Utc>) -> Self {
        let status = match invitation.status(now) {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Expired => "expired",
        };
        Self {
            token: invitation.token.to_string(),
            email: invitation.email.to_string(),
            role: invitation.role,
            invited_by: invitation.invited_by.to_string(),
            created_at: invitation.created_at,
            expires_at: invitation.expires_at,
            status: status.to_owned(),
            accepted_user_id: invitation.accepted_user_id.map(|id| id.to_string()),
        }
    }
}

/// Parse a role name from a request body.
pub(crate) fn parse_role(raw: &str) -> Result<Role, Error> {
    raw.parse().map_err(|err: crate::domain::ParseRoleError| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "role", "value": raw }))
    })
}
