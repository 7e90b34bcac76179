//! Response envelope and error mapping.
//!
//! Both services answer `{ "success": bool, "message"?, "data"?,
//! "errors"? }`. Error responses carry a machine-readable kind under
//! `errors.kind` so clients can distinguish, e.g., an expired token from a
//! revoked one without parsing prose.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{json, Value};

use netbill_core::CoreError;

pub fn ok(message: impl Into<String>, data: Value) -> axum::response::Response {
    envelope(StatusCode::OK, message, data)
}

pub fn created(message: impl Into<String>, data: Value) -> axum::response::Response {
    envelope(StatusCode::CREATED, message, data)
}

fn envelope(status: StatusCode, message: impl Into<String>, data: Value) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": true,
            "message": message.into(),
            "data": data,
        })),
    )
        .into_response()
}

pub fn fail(
    status: StatusCode,
    kind: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "message": message.into(),
            "errors": { "kind": kind },
        })),
    )
        .into_response()
}

/// Map a platform error to its HTTP status and kind.
///
/// Authentication failures are all 401 but keep their distinct kinds;
/// `OrganizationUnreachable` is the lone 503 so callers can tell "your
/// request is invalid" apart from "try again later".
pub fn error_response(err: CoreError) -> axum::response::Response {
    let (status, kind) = match &err {
        CoreError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
        CoreError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "invalid_token"),
        CoreError::ExpiredToken => (StatusCode::UNAUTHORIZED, "expired_token"),
        CoreError::RevokedToken => (StatusCode::UNAUTHORIZED, "revoked_token"),
        CoreError::AccountLocked => (StatusCode::FORBIDDEN, "account_locked"),
        CoreError::AccountInactive => (StatusCode::FORBIDDEN, "account_inactive"),
        CoreError::OrganizationNotFound => (StatusCode::BAD_REQUEST, "organization_not_found"),
        CoreError::OrganizationUnreachable(_) => {
            (StatusCode::SERVICE_UNAVAILABLE, "organization_unreachable")
        }
        CoreError::DuplicateRoleName { .. } => (StatusCode::BAD_REQUEST, "duplicate_role_name"),
        CoreError::CrossOrganizationViolation { .. } => {
            (StatusCode::BAD_REQUEST, "cross_organization_violation")
        }
        CoreError::InsufficientPermission(_) => (StatusCode::FORBIDDEN, "insufficient_permission"),
        CoreError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
        CoreError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        CoreError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        CoreError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    };

    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }
    fail(status, kind, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_maps_to_503_and_not_found_to_400() {
        let unreachable = error_response(CoreError::unreachable("timeout"));
        assert_eq!(unreachable.status(), StatusCode::SERVICE_UNAVAILABLE);

        let invalid = error_response(CoreError::OrganizationNotFound);
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn token_kinds_stay_distinct_at_401() {
        for err in [
            CoreError::InvalidToken("sig".into()),
            CoreError::ExpiredToken,
            CoreError::RevokedToken,
        ] {
            assert_eq!(error_response(err).status(), StatusCode::UNAUTHORIZED);
        }
    }
}
