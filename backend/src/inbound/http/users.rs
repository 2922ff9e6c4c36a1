//! Session and account handlers.
//!
//! ```text
//! POST /api/v1/login {"username":"admin","password":"…"}
//! GET /api/v1/users/me
//! PUT /api/v1/users/{id}/role {"role":"leader"}
//! ```

use actix_web::{HttpResponse, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{DisplayName, Error, LoginCredentials, LoginValidationError, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{UserDto, parse_role};
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::schemas::ErrorEnvelopeSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Body for `PATCH /api/v1/users/me`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[schema(example = "Lea Brunner")]
    pub display_name: String,
}

/// Body for `PUT /api/v1/users/{id}/role`.
#[derive(Deserialize, Serialize, ToSchema)]
pub struct ChangeRoleRequest {
    #[schema(example = "leader")]
    pub role: String,
}

/// Body for `PUT /api/v1/users/{id}/active`.
#[derive(Deserialize, Serialize, ToSchema)]
pub struct SetActiveRequest {
    pub active: bool,
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": "id", "value": raw }))
    })
}

pub(crate) fn parse_display_name(raw: String) -> Result<DisplayName, Error> {
    DisplayName::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": "displayName" }))
    })
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = Envelope<UserDto>,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorEnvelopeSchema),
        (status = 401, description = "Invalid credentials", body = ErrorEnvelopeSchema),
        (status = 503, description = "Store unavailable", body = ErrorEnvelopeSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<Envelope<UserDto>>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user_id = state.login.authenticate(&credentials).await?;
    let user = state.users.resolve_actor(&user_id).await?;
    session.persist_user(&user_id)?;
    Ok(Envelope::ok(UserDto::from(user)))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// The signed-in account.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = Envelope<UserDto>),
        (status = 401, description = "Unauthorised", body = ErrorEnvelopeSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Envelope<UserDto>>> {
    let user = session.user(state.users.as_ref()).await?;
    Ok(Envelope::ok(UserDto::from(user)))
}

/// Change the signed-in account's display name.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = Envelope<UserDto>),
        (status = 400, description = "Invalid display name", body = ErrorEnvelopeSchema),
        (status = 401, description = "Unauthorised", body = ErrorEnvelopeSchema)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
#[patch("/users/me")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<Envelope<UserDto>>> {
    let actor = session.actor(state.users.as_ref()).await?;
    let display_name = parse_display_name(payload.into_inner().display_name)?;
    let user = state.accounts.update_profile(&actor, display_name).await?;
    Ok(Envelope::ok(UserDto::from(user)))
}

/// The club roster.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = Envelope<Vec<UserDto>>),
        (status = 401, description = "Unauthorised", body = ErrorEnvelopeSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Envelope<Vec<UserDto>>>> {
    let actor = session.actor(state.users.as_ref()).await?;
    let users = state.users.list_users(&actor).await?;
    Ok(Envelope::ok(users.iter().map(UserDto::from).collect()))
}

/// Assign a role. Admins only.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/role",
    params(("id" = String, Path, description = "User id")),
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "Updated user", body = Envelope<UserDto>),
        (status = 400, description = "Unknown role", body = ErrorEnvelopeSchema),
        (status = 403, description = "Not an admin", body = ErrorEnvelopeSchema),
        (status = 404, description = "No such user", body = ErrorEnvelopeSchema),
        (status = 409, description = "Would remove the last admin", body = ErrorEnvelopeSchema)
    ),
    tags = ["users"],
    operation_id = "changeRole"
)]
#[put("/users/{id}/role")]
pub async fn change_role(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ChangeRoleRequest>,
) -> ApiResult<web::Json<Envelope<UserDto>>> {
    let actor = session.actor(state.users.as_ref()).await?;
    let target = parse_user_id(&path)?;
    let role = parse_role(&payload.role)?;
    let user = state.accounts.change_role(&actor, &target, role).await?;
    Ok(Envelope::ok(UserDto::from(user)))
}

/// Activate or deactivate an account. Admins only.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/active",
    params(("id" = String, Path, description = "User id")),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Updated user", body = Envelope<UserDto>),
        (status = 403, description = "Not an admin", body = ErrorEnvelopeSchema),
        (status = 404, description = "No such user", body = ErrorEnvelopeSchema),
        (status = 409, description = "Would remove the last admin", body = ErrorEnvelopeSchema)
    ),
    tags = ["users"],
    operation_id = "setActive"
)]
#[put("/users/{id}/active")]
pub async fn set_active(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SetActiveRequest>,
) -> ApiResult<web::Json<Envelope<UserDto>>> {
    let actor = session.actor(state.users.as_ref()).await?;
    let target = parse_user_id(&path)?;
    let user = state
        .accounts
        .set_active(&actor, &target, payload.active)
        .await?;
    Ok(Envelope::ok(UserDto::from(user)))
}

#[cfg(test)]
mod tests;
