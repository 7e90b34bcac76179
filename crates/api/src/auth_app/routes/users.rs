//! User management endpoints.

use std::collections::BTreeMap;

use axum::extract::{Extension, Path};
use axum::Json;
use serde_json::json;

use netbill_auth::user::{NewUser, UserStore};
use netbill_core::UserId;
use netbill_rbac::store::RoleStore;
use netbill_rbac::{authorize, OrgScope, Requirement, RoleLevel, SecurityContext};

use crate::auth_app::AuthAppState;
use crate::dto::{self, ReassignOrganizationRequest};
use crate::errors;

/// GET /users/ - non-super-admins see only their own organization.
pub async fn list_users(
    Extension(state): Extension<AuthAppState>,
    Extension(context): Extension<SecurityContext>,
) -> axum::response::Response {
    let filter = match context.scope() {
        OrgScope::Unrestricted => None,
        OrgScope::Organization(org) => Some(org),
    };

    match state.users.list(filter).await {
        Ok(users) => errors::ok(
            "Users",
            json!({ "users": users.iter().map(dto::user_json).collect::<Vec<_>>() }),
        ),
        Err(e) => errors::error_response(e),
    }
}

/// POST /users/ - admin only; the organization reference must resolve
/// against the Directory before anything is committed.
pub async fn create_user(
    Extension(state): Extension<AuthAppState>,
    Extension(context): Extension<SecurityContext>,
    Json(body): Json<NewUser>,
) -> axum::response::Response {
    if let Err(e) = authorize(&context, &Requirement::MinAuthority(RoleLevel::ADMIN)) {
        return errors::error_response(e);
    }
    // Admins provision inside their own tenant; super admins anywhere.
    if let Err(e) = authorize(&context, &Requirement::SameOrganization(body.organization_id)) {
        return errors::error_response(e);
    }
    if body.is_super_admin && !context.is_super_admin() {
        return errors::error_response(netbill_core::CoreError::InsufficientPermission(
            "only a super admin may create super admins".to_string(),
        ));
    }

    match state.provisioner.create_user(body, state.clock.now()).await {
        Ok(user) => errors::created("User created", json!({ "user": dto::user_json(&user) })),
        Err(e) => errors::error_response(e),
    }
}

/// GET /users/me/
pub async fn me(
    Extension(state): Extension<AuthAppState>,
    Extension(context): Extension<SecurityContext>,
) -> axum::response::Response {
    match state.users.get(context.user_id()).await {
        Ok(user) => errors::ok("Profile", json!({ "user": dto::user_json(&user) })),
        Err(e) => errors::error_response(e),
    }
}

/// GET /users/permissions/ - effective permissions and roles for the
/// current user, grouped by module prefix.
pub async fn my_permissions(
    Extension(state): Extension<AuthAppState>,
    Extension(context): Extension<SecurityContext>,
) -> axum::response::Response {
    let grants = match state.roles.active_grants_for(context.user_id()).await {
        Ok(grants) => grants,
        Err(e) => return errors::error_response(e),
    };

    let mut permissions: Vec<String> = context
        .permissions()
        .iter()
        .map(|p| p.as_str().to_string())
        .collect();
    permissions.sort();

    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for permission in &permissions {
        let module = permission
            .split_once('.')
            .map_or("general", |(module, _)| module);
        grouped.entry(module.to_string()).or_default().push(permission.clone());
    }

    errors::ok(
        "Permissions",
        json!({
            "is_super_admin": context.is_super_admin(),
            "permissions": permissions,
            "grouped_permissions": grouped,
            "roles": grants
                .iter()
                .map(|r| json!({
                    "id": r.id,
                    "name": r.name,
                    "display_name": r.display_name,
                    "role_level": r.role_level,
                }))
                .collect::<Vec<_>>(),
        }),
    )
}

/// POST /users/:id/organization/ - re-point a user at another tenant,
/// gated on the Directory exactly like creation.
pub async fn reassign_organization(
    Extension(state): Extension<AuthAppState>,
    Extension(context): Extension<SecurityContext>,
    Path(user_id): Path<UserId>,
    Json(body): Json<ReassignOrganizationRequest>,
) -> axum::response::Response {
    if let Err(e) = authorize(&context, &Requirement::MinAuthority(RoleLevel::ADMIN)) {
        return errors::error_response(e);
    }
    if let Err(e) = authorize(&context, &Requirement::SameOrganization(body.organization_id)) {
        return errors::error_response(e);
    }

    match state
        .provisioner
        .reassign_organization(user_id, body.organization_id, state.clock.now())
        .await
    {
        Ok(user) => errors::ok("User reassigned", json!({ "user": dto::user_json(&user) })),
        Err(e) => errors::error_response(e),
    }
}
