//! Role management endpoints.

use axum::extract::{Extension, Path};
use axum::Json;
use serde_json::json;

use netbill_auth::user::UserStore;
use netbill_core::AssignmentId;
use netbill_rbac::store::RoleStore;
use netbill_rbac::{
    authorize, NewRole, Requirement, RoleLevel, SecurityContext, UserRef,
};

use crate::auth_app::AuthAppState;
use crate::dto::{AssignRoleRequest, CreateRoleRequest};
use crate::errors;

/// GET /roles/ - roles of the caller's organization.
pub async fn list_roles(
    Extension(state): Extension<AuthAppState>,
    Extension(context): Extension<SecurityContext>,
) -> axum::response::Response {
    match state.roles.list_roles(context.organization_id()).await {
        Ok(roles) => errors::ok("Roles", json!({ "roles": roles })),
        Err(e) => errors::error_response(e),
    }
}

/// POST /roles/ - admin only; name must be unique within the organization.
pub async fn create_role(
    Extension(state): Extension<AuthAppState>,
    Extension(context): Extension<SecurityContext>,
    Json(body): Json<CreateRoleRequest>,
) -> axum::response::Response {
    if let Err(e) = authorize(&context, &Requirement::MinAuthority(RoleLevel::ADMIN)) {
        return errors::error_response(e);
    }

    let organization_id = body.organization_id.unwrap_or_else(|| context.organization_id());
    if let Err(e) = authorize(&context, &Requirement::SameOrganization(organization_id)) {
        return errors::error_response(e);
    }

    let input = NewRole {
        organization_id,
        display_name: body.display_name.unwrap_or_else(|| body.name.clone()),
        name: body.name,
        role_level: body.role_level,
        permissions: body.permissions,
        created_by: Some(context.user_id()),
    };

    match state.roles.create_role(input, state.clock.now()).await {
        Ok(role) => errors::created("Role created", json!({ "role": role })),
        Err(e) => errors::error_response(e),
    }
}

/// POST /roles/assign/ - admin only; the store enforces the
/// cross-organization invariant.
pub async fn assign_role(
    Extension(state): Extension<AuthAppState>,
    Extension(context): Extension<SecurityContext>,
    Json(body): Json<AssignRoleRequest>,
) -> axum::response::Response {
    if let Err(e) = authorize(&context, &Requirement::MinAuthority(RoleLevel::ADMIN)) {
        return errors::error_response(e);
    }

    let user = match state.users.get(body.user_id).await {
        Ok(user) => user,
        Err(e) => return errors::error_response(e),
    };
    if let Err(e) = authorize(&context, &Requirement::SameOrganization(user.organization_id)) {
        return errors::error_response(e);
    }

    let user_ref = UserRef {
        id: user.id,
        organization_id: user.organization_id,
        is_super_admin: user.is_super_admin,
    };

    match state
        .roles
        .assign_role(user_ref, body.role_id, context.user_id(), state.clock.now())
        .await
    {
        Ok(assignment) => errors::created("Role assigned", json!({ "assignment": assignment })),
        Err(e) => errors::error_response(e),
    }
}

/// POST /roles/assignments/:id/revoke/ - admin only; flips the audit row's
/// active flag, never deletes it.
pub async fn revoke_assignment(
    Extension(state): Extension<AuthAppState>,
    Extension(context): Extension<SecurityContext>,
    Path(assignment_id): Path<AssignmentId>,
) -> axum::response::Response {
    if let Err(e) = authorize(&context, &Requirement::MinAuthority(RoleLevel::ADMIN)) {
        return errors::error_response(e);
    }

    match state
        .roles
        .revoke_assignment(assignment_id, context.user_id(), state.clock.now())
        .await
    {
        Ok(assignment) => errors::ok("Role revoked", json!({ "assignment": assignment })),
        Err(e) => errors::error_response(e),
    }
}
