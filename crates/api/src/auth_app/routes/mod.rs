pub mod auth;
pub mod roles;
pub mod users;

use serde_json::json;

use crate::errors;

pub async fn health() -> axum::response::Response {
    errors::ok("ok", json!({ "service": "auth" }))
}
