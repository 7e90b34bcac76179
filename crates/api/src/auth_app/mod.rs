//! Auth Service application wiring (Axum router + service wiring).
//!
//! Folder layout:
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - state lives here; request DTOs in `crate::dto`; envelope in
//!   `crate::errors`

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router};

use netbill_auth::provision::UserProvisioner;
use netbill_auth::service::AuthService;
use netbill_auth::user::InMemoryUserStore;
use netbill_auth::AuthConfig;
use netbill_core::Clock;
use netbill_directory::resolver::{HttpDirectoryClient, OrganizationResolver};
use netbill_rbac::store::InMemoryRoleStore;
use netbill_rbac::ContextBuilder;

use crate::middleware::{self, AuthLayerState};

pub mod routes;

type Resolver = Arc<OrganizationResolver<HttpDirectoryClient>>;

/// Everything the Auth Service handlers need, shared per process.
#[derive(Clone)]
pub struct AuthAppState {
    pub auth: Arc<AuthService<Arc<InMemoryUserStore>>>,
    pub users: Arc<InMemoryUserStore>,
    pub roles: Arc<InMemoryRoleStore>,
    pub provisioner: Arc<UserProvisioner<Resolver, Arc<InMemoryUserStore>>>,
    pub clock: Arc<dyn Clock>,
}

impl AuthAppState {
    /// Wire the service against a Directory resolver and a fresh set of
    /// in-memory stores.
    pub fn new(config: AuthConfig, resolver: Resolver, clock: Arc<dyn Clock>) -> Self {
        let users = Arc::new(InMemoryUserStore::new());
        let roles = Arc::new(InMemoryRoleStore::default());
        let pepper = config.pepper.clone();
        let auth = Arc::new(AuthService::new(users.clone(), config, clock.clone()));
        let provisioner = Arc::new(UserProvisioner::new(resolver, users.clone(), pepper));
        Self {
            auth,
            users,
            roles,
            provisioner,
            clock,
        }
    }
}

/// Build the full Auth Service router.
pub fn build_auth_app(state: AuthAppState) -> Router {
    let auth_layer = AuthLayerState {
        builder: Arc::new(ContextBuilder::new(state.auth.tokens(), state.roles.clone())),
    };

    let public = Router::new()
        .route("/health", get(routes::health))
        .route("/auth/login/", post(routes::auth::login))
        .route("/auth/token/refresh/", post(routes::auth::refresh_token));

    // Protected routes: bearer token required, security context attached.
    let protected = Router::new()
        .route("/auth/logout/", post(routes::auth::logout))
        .route("/auth/verify/", post(routes::auth::verify_token))
        .route(
            "/users/",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route("/users/me/", get(routes::users::me))
        .route("/users/permissions/", get(routes::users::my_permissions))
        .route(
            "/users/:id/organization/",
            post(routes::users::reassign_organization),
        )
        .route(
            "/roles/",
            get(routes::roles::list_roles).post(routes::roles::create_role),
        )
        .route("/roles/assign/", post(routes::roles::assign_role))
        .route(
            "/roles/assignments/:id/revoke/",
            post(routes::roles::revoke_assignment),
        )
        .layer(axum::middleware::from_fn_with_state(
            auth_layer,
            middleware::auth_middleware,
        ));

    public.merge(protected).layer(Extension(state))
}
