//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay free of `utoipa`. These mirrors live in the adapter layer
//! and exist only for document generation.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = ErrorCode)]
pub enum ErrorCodeSchema {
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    #[schema(rename = "unauthorized")]
    Unauthorized,
    #[schema(rename = "permission_denied")]
    PermissionDenied,
    #[schema(rename = "not_found")]
    NotFound,
    #[schema(rename = "invalid_transition")]
    InvalidTransition,
    #[schema(rename = "last_admin_violation")]
    LastAdminViolation,
    #[schema(rename = "conflict")]
    Conflict,
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = Error, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "permission_denied")]
    code: ErrorCodeSchema,
    /// Human-readable message.
    #[schema(example = "member accounts may not create tours")]
    message: String,
    /// Correlates the failure with server logs and the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Structured context, e.g. `{"from": "draft", "to": "cancelled"}`.
    details: Option<serde_json::Value>,
}

/// Body of every failed request.
#[derive(ToSchema)]
#[schema(as = ErrorEnvelope)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct ErrorEnvelopeSchema {
    /// Always `false`.
    #[schema(example = false)]
    success: bool,
    error: ErrorSchema,
}

/// OpenAPI schema for [`crate::domain::Role`].
#[derive(ToSchema)]
#[schema(as = Role)]
pub enum RoleSchema {
    #[schema(rename = "admin")]
    Admin,
    #[schema(rename = "leader")]
    Leader,
    #[schema(rename = "member")]
    Member,
}

/// OpenAPI schema for [`crate::domain::TourStatus`].
#[derive(ToSchema)]
#[schema(as = TourStatus)]
pub enum TourStatusSchema {
    #[schema(rename = "draft")]
    Draft,
    #[schema(rename = "published")]
    Published,
    #[schema(rename = "cancelled")]
    Cancelled,
}
