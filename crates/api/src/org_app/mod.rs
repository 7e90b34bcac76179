//! Organization Service application wiring.
//!
//! Owns the canonical tenant records. Verifies bearer tokens with the
//! shared secret but holds no role store: authorization here is scope +
//! super-admin flag, which covers the whole surface (directory writes are
//! super-admin-only, reads are same-organization).

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router};

use netbill_auth::token::TokenService;
use netbill_auth::AuthConfig;
use netbill_core::Clock;
use netbill_directory::store::InMemoryDirectory;

use crate::middleware::{self, ClaimsLayerState};

pub mod routes;

/// Everything the Organization Service handlers need.
#[derive(Clone)]
pub struct OrgAppState {
    pub directory: Arc<InMemoryDirectory>,
    pub tokens: Arc<TokenService>,
    pub clock: Arc<dyn Clock>,
}

impl OrgAppState {
    pub fn new(config: AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            directory: Arc::new(InMemoryDirectory::new()),
            tokens: Arc::new(TokenService::new(config, clock.clone())),
            clock,
        }
    }
}

/// Build the full Organization Service router.
pub fn build_org_app(state: OrgAppState) -> Router {
    let claims_layer = ClaimsLayerState {
        tokens: state.tokens.clone(),
    };

    // The exists endpoint is public: the Auth Service calls it before it
    // has any token context for the tenant being checked.
    let public = Router::new()
        .route("/health", get(routes::health))
        .route("/organizations/:id/exists/", get(routes::organization_exists));

    let protected = Router::new()
        .route(
            "/organizations/",
            get(routes::list_organizations).post(routes::create_organization),
        )
        .route(
            "/organizations/:id/",
            get(routes::get_organization).delete(routes::deactivate_organization),
        )
        .route("/organizations/:id/verify/", post(routes::verify_organization))
        .layer(axum::middleware::from_fn_with_state(
            claims_layer,
            middleware::claims_middleware,
        ));

    public.merge(protected).layer(Extension(state))
}
