//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer, the
//! schema mirrors from [`crate::inbound::http::schemas`] and the DTOs, and
//! the session cookie security scheme. Swagger UI serves it in debug builds
//! and `openapi-dump` prints it for external tooling.

use crate::inbound::http::dto::{InvitationDto, TourDto, TourRequest, UserDto};
use crate::inbound::http::invitations::{AcceptInvitationRequest, CreateInvitationRequest};
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorEnvelopeSchema, ErrorSchema, RoleSchema, TourStatusSchema,
};
use crate::inbound::http::users::{
    ChangeRoleRequest, LoginRequest, SetActiveRequest, UpdateProfileRequest,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login or invitation acceptance.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Ski club backend API",
        description = "Club accounts, tour planning and sign-ups behind session authentication."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::change_role,
        crate::inbound::http::users::set_active,
        crate::inbound::http::tours::list_tours,
        crate::inbound::http::tours::create_tour,
        crate::inbound::http::tours::get_tour,
        crate::inbound::http::tours::edit_tour,
        crate::inbound::http::tours::delete_tour,
        crate::inbound::http::tours::publish_tour,
        crate::inbound::http::tours::cancel_tour,
        crate::inbound::http::tours::reopen_tour,
        crate::inbound::http::tours::join_tour,
        crate::inbound::http::tours::leave_tour,
        crate::inbound::http::invitations::list_invitations,
        crate::inbound::http::invitations::create_invitation,
        crate::inbound::http::invitations::accept_invitation,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorCodeSchema,
        ErrorSchema,
        ErrorEnvelopeSchema,
        RoleSchema,
        TourStatusSchema,
        UserDto,
        TourDto,
        TourRequest,
        InvitationDto,
        LoginRequest,
        UpdateProfileRequest,
        ChangeRoleRequest,
        SetActiveRequest,
        CreateInvitationRequest,
        AcceptInvitationRequest,
    )),
    tags(
        (name = "users", description = "Sign-in, profiles and account administration"),
        (name = "tours", description = "Tour planning, lifecycle and sign-ups"),
        (name = "invitations", description = "Joining the club by invitation"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[test]
    fn tour_schema_is_camel_case() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let tour_schema = schemas.get("TourDto").expect("TourDto schema");

        assert_object_schema_has_field(tour_schema, "leaderId");
        assert_object_schema_has_field(tour_schema, "maxParticipants");
        assert_object_schema_has_field(tour_schema, "isFull");
    }

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/login",
            "/api/v1/logout",
            "/api/v1/users",
            "/api/v1/users/me",
            "/api/v1/users/{id}/role",
            "/api/v1/users/{id}/active",
            "/api/v1/tours",
            "/api/v1/tours/{id}",
            "/api/v1/tours/{id}/publish",
            "/api/v1/tours/{id}/cancel",
            "/api/v1/tours/{id}/reopen",
            "/api/v1/tours/{id}/participants",
            "/api/v1/invitations",
            "/api/v1/invitations/{token}/accept",
            "/health/ready",
            "/health/live",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
