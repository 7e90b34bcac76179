//! Authentication endpoints: login, refresh, logout, verify.

use axum::extract::Extension;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::json;

use netbill_auth::service::LoginInput;
use netbill_auth::user::UserStore;
use netbill_rbac::SecurityContext;

use crate::auth_app::AuthAppState;
use crate::dto::{self, LoginRequest, LogoutRequest, RefreshRequest};
use crate::errors;
use crate::middleware::caller_source;

/// POST /auth/login/
pub async fn login(
    Extension(state): Extension<AuthAppState>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> axum::response::Response {
    let input = LoginInput {
        login_id: body.login_id,
        password: body.password,
        remember_me: body.remember_me,
        source: caller_source(&headers),
    };

    match state.auth.login(input).await {
        Ok(out) => errors::ok(
            "Login successful",
            json!({
                "user": dto::user_json(&out.user),
                "tokens": dto::tokens_json(&out.tokens),
                "expires_in": out.expires_in,
            }),
        ),
        Err(e) => errors::error_response(e),
    }
}

/// POST /auth/token/refresh/
pub async fn refresh_token(
    Extension(state): Extension<AuthAppState>,
    Json(body): Json<RefreshRequest>,
) -> axum::response::Response {
    match state.auth.refresh(&body.refresh_token).await {
        Ok(grant) => errors::ok(
            "Token refreshed successfully",
            json!({ "access": grant.access, "token_type": "Bearer" }),
        ),
        Err(e) => errors::error_response(e),
    }
}

/// POST /auth/logout/
pub async fn logout(
    Extension(state): Extension<AuthAppState>,
    Extension(_context): Extension<SecurityContext>,
    Json(body): Json<LogoutRequest>,
) -> axum::response::Response {
    match state.auth.logout(&body.refresh_token, body.logout_all_devices) {
        Ok(()) => errors::ok("Logout successful", json!({})),
        Err(e) => errors::error_response(e),
    }
}

/// POST /auth/verify/ - the token already passed the middleware; report
/// the authenticated user back.
pub async fn verify_token(
    Extension(state): Extension<AuthAppState>,
    Extension(context): Extension<SecurityContext>,
) -> axum::response::Response {
    match state.users.get(context.user_id()).await {
        Ok(user) => errors::ok("Token is valid", json!({ "user": dto::user_json(&user) })),
        Err(e) => errors::error_response(e),
    }
}
