//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay free of utoipa derives; these mirrors carry the
//! documentation instead and are registered under the domain type names.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The resource does not exist or belongs to another user.
    #[schema(rename = "not_found")]
    NotFound,
    /// Concurrent modification prevented the update.
    #[schema(rename = "conflict")]
    Conflict,
    /// The request is well formed but breaks a business rule.
    #[schema(rename = "validation_failed")]
    ValidationFailed,
    /// A dependency such as the database is unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "validation_failed")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "all recipients must be verified")]
    message: String,
    /// Correlation identifier, also sent in the `trace-id` header.
    #[schema(example = "5f0c7a2e-8f1b-4f7e-9d1c-2b3a4c5d6e7f")]
    trace_id: Option<String>,
    /// Field-level context such as `{"field": "recipient_ids", "code": "too_many_recipients"}`.
    details: Option<serde_json::Value>,
}
