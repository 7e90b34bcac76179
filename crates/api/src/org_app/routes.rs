//! Organization directory endpoints.

use axum::extract::{Extension, Path};
use axum::Json;
use serde_json::json;

use netbill_core::OrganizationId;
use netbill_directory::model::NewOrganization;
use netbill_directory::store::DirectoryStore;
use netbill_rbac::{authorize, OrgScope, Requirement, RoleLevel, SecurityContext};

use crate::errors;
use crate::org_app::OrgAppState;

pub async fn health() -> axum::response::Response {
    errors::ok("ok", json!({ "service": "organization" }))
}

/// GET /organizations/:id/exists/ - public; consumed by the Auth Service's
/// resolver. `exists` is true only for active organizations.
pub async fn organization_exists(
    Extension(state): Extension<OrgAppState>,
    Path(id): Path<OrganizationId>,
) -> axum::response::Response {
    match state.directory.get(id).await {
        Ok(Some(organization)) if organization.is_active => errors::ok(
            "Organization found",
            json!({ "exists": true, "organization": organization.summary() }),
        ),
        Ok(_) => errors::ok("Organization not found", json!({ "exists": false })),
        Err(e) => errors::error_response(e),
    }
}

/// POST /organizations/ - super admin only.
pub async fn create_organization(
    Extension(state): Extension<OrgAppState>,
    Extension(context): Extension<SecurityContext>,
    Json(body): Json<NewOrganization>,
) -> axum::response::Response {
    if let Err(e) = authorize(&context, &Requirement::MinAuthority(RoleLevel::SUPER_ADMIN)) {
        return errors::error_response(e);
    }

    let mut input = body;
    input.created_by = Some(context.user_id());

    match state.directory.create(input, state.clock.now()).await {
        Ok(organization) => {
            errors::created("Organization created", json!({ "organization": organization }))
        }
        Err(e) => errors::error_response(e),
    }
}

/// GET /organizations/ - super admins see the whole directory; everyone
/// else sees only their own record.
pub async fn list_organizations(
    Extension(state): Extension<OrgAppState>,
    Extension(context): Extension<SecurityContext>,
) -> axum::response::Response {
    let organizations = match state.directory.list().await {
        Ok(organizations) => organizations,
        Err(e) => return errors::error_response(e),
    };

    let visible: Vec<_> = match context.scope() {
        OrgScope::Unrestricted => organizations,
        OrgScope::Organization(org) => organizations
            .into_iter()
            .filter(|o| o.id == org)
            .collect(),
    };

    errors::ok("Organizations", json!({ "organizations": visible }))
}

/// GET /organizations/:id/ - same organization or super admin.
pub async fn get_organization(
    Extension(state): Extension<OrgAppState>,
    Extension(context): Extension<SecurityContext>,
    Path(id): Path<OrganizationId>,
) -> axum::response::Response {
    if let Err(e) = authorize(&context, &Requirement::SameOrganization(id)) {
        return errors::error_response(e);
    }

    match state.directory.get(id).await {
        Ok(Some(organization)) => {
            errors::ok("Organization", json!({ "organization": organization }))
        }
        Ok(None) => errors::error_response(netbill_core::CoreError::not_found("organization")),
        Err(e) => errors::error_response(e),
    }
}

/// DELETE /organizations/:id/ - super admin only; soft delete.
pub async fn deactivate_organization(
    Extension(state): Extension<OrgAppState>,
    Extension(context): Extension<SecurityContext>,
    Path(id): Path<OrganizationId>,
) -> axum::response::Response {
    if let Err(e) = authorize(&context, &Requirement::MinAuthority(RoleLevel::SUPER_ADMIN)) {
        return errors::error_response(e);
    }

    match state.directory.deactivate(id, state.clock.now()).await {
        Ok(organization) => {
            tracing::info!(organization_id = %organization.id, "organization deactivated");
            errors::ok("Organization deactivated", json!({ "organization": organization }))
        }
        Err(e) => errors::error_response(e),
    }
}

/// POST /organizations/:id/verify/ - super admin only; one-way.
pub async fn verify_organization(
    Extension(state): Extension<OrgAppState>,
    Extension(context): Extension<SecurityContext>,
    Path(id): Path<OrganizationId>,
) -> axum::response::Response {
    if let Err(e) = authorize(&context, &Requirement::MinAuthority(RoleLevel::SUPER_ADMIN)) {
        return errors::error_response(e);
    }

    match state.directory.verify(id, state.clock.now()).await {
        Ok(organization) => errors::ok(
            "Organization verified successfully",
            json!({ "organization": organization }),
        ),
        Err(e) => errors::error_response(e),
    }
}
