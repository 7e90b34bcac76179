//! Bearer-token authentication middleware.
//!
//! The Auth Service resolves role assignments into the context; the
//! Organization Service holds no role store and authorizes from claims
//! alone.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use netbill_auth::token::TokenService;
use netbill_core::CoreError;
use netbill_rbac::store::InMemoryRoleStore;
use netbill_rbac::{context_from_claims, ContextBuilder};

use crate::errors;

/// State for the Auth Service's middleware: full context building.
#[derive(Clone)]
pub struct AuthLayerState {
    pub builder: Arc<ContextBuilder<Arc<InMemoryRoleStore>>>,
}

pub async fn auth_middleware(
    State(state): State<AuthLayerState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = match extract_bearer(req.headers()) {
        Ok(token) => token,
        Err(response) => return response,
    };

    match state.builder.build(token).await {
        Ok(context) => {
            req.extensions_mut().insert(context);
            next.run(req).await
        }
        Err(e) => errors::error_response(e),
    }
}

/// State for the Organization Service's middleware: claims-only.
#[derive(Clone)]
pub struct ClaimsLayerState {
    pub tokens: Arc<TokenService>,
}

pub async fn claims_middleware(
    State(state): State<ClaimsLayerState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = match extract_bearer(req.headers()) {
        Ok(token) => token,
        Err(response) => return response,
    };

    match state.tokens.verify(token) {
        Ok(claims) => {
            req.extensions_mut().insert(context_from_claims(&claims));
            next.run(req).await
        }
        Err(e) => errors::error_response(e),
    }
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, Response> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(missing_bearer)?;

    let header = header.to_str().map_err(|_| missing_bearer())?;
    let token = header.strip_prefix("Bearer ").ok_or_else(missing_bearer)?.trim();
    if token.is_empty() {
        return Err(missing_bearer());
    }
    Ok(token)
}

fn missing_bearer() -> Response {
    errors::error_response(CoreError::InvalidToken(
        "missing or malformed Authorization header".to_string(),
    ))
}

/// Best-effort caller address for rate limiting: first hop of
/// `X-Forwarded-For` when present.
pub fn caller_source(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "direct".to_string())
}
