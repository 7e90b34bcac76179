//! Request bodies and response shaping.

use serde::Deserialize;
use serde_json::{json, Value};

use netbill_auth::token::TokenPair;
use netbill_auth::user::User;
use netbill_core::{OrganizationId, RoleId, UserId};
use netbill_rbac::{PermissionId, RoleLevel};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login_id: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
    #[serde(default)]
    pub logout_all_devices: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub role_level: RoleLevel,
    #[serde(default)]
    pub permissions: Vec<PermissionId>,
    /// Defaults to the caller's organization; only super admins may
    /// target another one.
    #[serde(default)]
    pub organization_id: Option<OrganizationId>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub user_id: UserId,
    pub role_id: RoleId,
}

#[derive(Debug, Deserialize)]
pub struct ReassignOrganizationRequest {
    pub organization_id: OrganizationId,
}

pub fn user_json(user: &User) -> Value {
    // `User` skips the credential hash in serde, so it is safe on the wire.
    serde_json::to_value(user).unwrap_or_else(|_| json!({ "id": user.id }))
}

pub fn tokens_json(tokens: &TokenPair) -> Value {
    json!({
        "access": tokens.access,
        "refresh": tokens.refresh,
        "token_type": tokens.token_type,
    })
}
