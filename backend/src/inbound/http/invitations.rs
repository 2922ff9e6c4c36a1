//! Invitation handlers.
//!
//! Admins issue and list invitations; accepting one needs no session and
//! signs the new account in.

use actix_web::{HttpResponse, get, post, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Email, Error, InvitationToken};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{InvitationDto, UserDto, parse_role};
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::schemas::ErrorEnvelopeSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::parse_display_name;

/// Body for `POST /api/v1/invitations`.
#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateInvitationRequest {
    #[schema(example = "guest@club.example")]
    pub email: String,
    #[schema(example = "member")]
    pub role: String,
}

/// Body for `POST /api/v1/invitations/{token}/accept`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitationRequest {
    #[schema(example = "Nina Keller")]
    pub display_name: String,
}

fn parse_email(raw: &str) -> Result<Email, Error> {
    Email::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": "email" }))
    })
}

fn parse_token(raw: &str) -> Result<InvitationToken, Error> {
    InvitationToken::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": "token" }))
    })
}

/// Invitations issued so far, newest first. Admins only.
#[utoipa::path(
    get,
    path = "/api/v1/invitations",
    responses(
        (status = 200, description = "Invitations", body = Envelope<Vec<InvitationDto>>),
        (status = 401, description = "Unauthorised", body = ErrorEnvelopeSchema),
        (status = 403, description = "Not an admin", body = ErrorEnvelopeSchema)
    ),
    tags = ["invitations"],
    operation_id = "listInvitations"
)]
#[get("/invitations")]
pub async fn list_invitations(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Envelope<Vec<InvitationDto>>>> {
    let actor = session.actor(state.users.as_ref()).await?;
    let invitations = state.invitations.list_invitations(&actor).await?;
    let now = Utc::now();
    Ok(Envelope::ok(
        invitations
            .iter()
            .map(|invitation| InvitationDto::at(invitation, now))
            .collect(),
    ))
}

/// Issue an invitation. Admins only.
#[utoipa::path(
    post,
    path = "/api/v1/invitations",
    request_body = CreateInvitationRequest,
    responses(
        (status = 201, description = "Invitation issued", body = Envelope<InvitationDto>),
        (status = 400, description = "Invalid email or role", body = ErrorEnvelopeSchema),
        (status = 403, description = "Not an admin", body = ErrorEnvelopeSchema)
    ),
    tags = ["invitations"],
    operation_id = "createInvitation"
)]
#[post("/invitations")]
pub async fn create_invitation(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateInvitationRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.actor(state.users.as_ref()).await?;
    let CreateInvitationRequest { email, role } = payload.into_inner();
    let email = parse_email(&email)?;
    let role = parse_role(&role)?;
    let invitation = state
        .invitations
        .create_invitation(&actor, email, role)
        .await?;
    Ok(HttpResponse::Created().json(Envelope {
        success: true,
        data: InvitationDto::at(&invitation, Utc::now()),
    }))
}

/// Redeem an invitation, creating the account and signing it in.
#[utoipa::path(
    post,
    path = "/api/v1/invitations/{token}/accept",
    params(("token" = String, Path, description = "Invitation token")),
    request_body = AcceptInvitationRequest,
    responses(
        (status = 200, description = "Account created", body = Envelope<UserDto>,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid name or expired invitation", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown invitation", body = ErrorEnvelopeSchema),
        (status = 409, description = "Already accepted", body = ErrorEnvelopeSchema)
    ),
    tags = ["invitations"],
    operation_id = "acceptInvitation",
    security([])
)]
#[post("/invitations/{token}/accept")]
pub async fn accept_invitation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AcceptInvitationRequest>,
) -> ApiResult<web::Json<Envelope<UserDto>>> {
    let token = parse_token(&path)?;
    let display_name = parse_display_name(payload.into_inner().display_name)?;
    let user = state
        .invitations
        .accept_invitation(&token, display_name)
        .await?;
    session.persist_user(user.id())?;
    Ok(Envelope::ok(UserDto::from(user)))
}
