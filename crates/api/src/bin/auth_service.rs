use std::sync::Arc;
use std::time::Duration;

use netbill_api::auth_app::{build_auth_app, AuthAppState};
use netbill_auth::user::{User, UserStore};
use netbill_auth::{password, AuthConfig};
use netbill_core::{Clock, OrganizationId, SystemClock, UserId};
use netbill_directory::resolver::{HttpDirectoryClient, OrganizationResolver};

#[tokio::main]
async fn main() {
    netbill_observability::init("auth-service");

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });
    let org_service_url =
        std::env::var("ORG_SERVICE_URL").unwrap_or_else(|_| "http://127.0.0.1:8002".to_string());

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let config = AuthConfig {
        jwt_secret,
        ..AuthConfig::default()
    };

    let client = HttpDirectoryClient::new(org_service_url, Duration::from_secs(10))
        .expect("failed to build directory client");
    let resolver = Arc::new(OrganizationResolver::new(client, clock.clone()));

    let state = AuthAppState::new(config, resolver, clock);
    seed_super_admin(&state).await;

    let app = build_auth_app(state);
    let listener = tokio::net::TcpListener::bind("0.0.0.0:8000")
        .await
        .expect("failed to bind 0.0.0.0:8000");

    tracing::info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
}

/// Bootstrap super admin, the counterpart of the directory's first
/// organization. Super admins are not tenant-anchored, so the seed gets a
/// fresh organization id without consulting the Directory.
async fn seed_super_admin(state: &AuthAppState) {
    let Ok(login_id) = std::env::var("NETBILL_SEED_ADMIN_LOGIN") else {
        return;
    };
    let Ok(seed_password) = std::env::var("NETBILL_SEED_ADMIN_PASSWORD") else {
        tracing::warn!("NETBILL_SEED_ADMIN_LOGIN set without NETBILL_SEED_ADMIN_PASSWORD; skipping seed");
        return;
    };

    let password_hash = match password::hash_password(&seed_password, None) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!(error = %e, "failed to hash seed password");
            return;
        }
    };

    let now = state.clock.now();
    let user = User {
        id: UserId::new(),
        login_id: login_id.clone(),
        email: login_id.clone(),
        name: "Super Admin".to_string(),
        password_hash,
        organization_id: OrganizationId::new(),
        is_active: true,
        is_super_admin: true,
        mobile: None,
        address: None,
        employee_id: None,
        failed_login_attempts: 0,
        locked_until: None,
        created_at: now,
        updated_at: now,
    };

    match state.users.insert(user).await {
        Ok(user) => tracing::info!(user_id = %user.id, login_id, "seeded super admin"),
        Err(e) => tracing::warn!(error = %e, "seed super admin skipped"),
    }
}
