//! Role and assignment models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use netbill_core::{AssignmentId, OrganizationId, RoleId, UserId};

use crate::level::RoleLevel;
use crate::permissions::PermissionId;

/// Organization-scoped authorization template.
///
/// `name` is unique within the owning organization only; two organizations
/// may each define their own `admin`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub organization_id: OrganizationId,
    pub name: String,
    pub display_name: String,
    pub role_level: RoleLevel,
    pub permissions: Vec<PermissionId>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
}

/// Fields required to create a role.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRole {
    pub organization_id: OrganizationId,
    pub name: String,
    pub display_name: String,
    pub role_level: RoleLevel,
    pub permissions: Vec<PermissionId>,
    #[serde(default)]
    pub created_by: Option<UserId>,
}

/// Audit row linking a user to a role.
///
/// Rows are immutable history: revocation flips `is_active` and stamps the
/// revocation fields, it never rewrites or deletes the row.
#[derive(Debug, Clone, Serialize)]
pub struct RoleAssignment {
    pub id: AssignmentId,
    pub user_id: UserId,
    pub role_id: RoleId,
    pub assigned_by: UserId,
    pub assigned_at: DateTime<Utc>,
    pub is_active: bool,
    pub revoked_by: Option<UserId>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// The slice of a user the assignment invariant needs. Kept small so the
/// role store does not depend on the identity store.
#[derive(Debug, Clone, Copy)]
pub struct UserRef {
    pub id: UserId,
    pub organization_id: OrganizationId,
    pub is_super_admin: bool,
}
