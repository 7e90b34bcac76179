use std::sync::Arc;

use netbill_api::org_app::{build_org_app, OrgAppState};
use netbill_auth::AuthConfig;
use netbill_core::{Clock, SystemClock};

#[tokio::main]
async fn main() {
    netbill_observability::init("organization-service");

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let config = AuthConfig {
        jwt_secret,
        ..AuthConfig::default()
    };

    let app = build_org_app(OrgAppState::new(config, clock));
    let listener = tokio::net::TcpListener::bind("0.0.0.0:8002")
        .await
        .expect("failed to bind 0.0.0.0:8002");

    tracing::info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
}
