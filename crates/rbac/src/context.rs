//! Request-scoped security context.
//!
//! Built once per request from a verified token (plus role assignments on
//! the Auth Service side), consumed by the evaluator, and dropped with the
//! request. Never cached, never persisted.

use std::collections::HashSet;

use netbill_core::{OrganizationId, UserId};

use crate::level::RoleLevel;
use crate::permissions::PermissionId;

/// Organization scope enforced for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrgScope {
    /// Super admin: organization filters are bypassed downstream.
    Unrestricted,
    /// All queries are pinned to this single organization.
    Organization(OrganizationId),
}

/// Immutable bundle of verified identity, scope, and effective grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityContext {
    user_id: UserId,
    organization_id: OrganizationId,
    role_level: Option<RoleLevel>,
    permissions: HashSet<PermissionId>,
    is_super_admin: bool,
}

impl SecurityContext {
    /// Context for a super admin: unrestricted scope, no assignment lookup
    /// needed.
    pub fn super_admin(user_id: UserId, organization_id: OrganizationId) -> Self {
        Self {
            user_id,
            organization_id,
            role_level: Some(RoleLevel::SUPER_ADMIN),
            permissions: HashSet::new(),
            is_super_admin: true,
        }
    }

    /// Context scoped to one organization with the given effective grants.
    pub fn scoped(
        user_id: UserId,
        organization_id: OrganizationId,
        role_level: Option<RoleLevel>,
        permissions: HashSet<PermissionId>,
    ) -> Self {
        Self {
            user_id,
            organization_id,
            role_level,
            permissions,
            is_super_admin: false,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// The organization the token was issued for. Present even for super
    /// admins (their home organization), but not enforced for them.
    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    pub fn scope(&self) -> OrgScope {
        if self.is_super_admin {
            OrgScope::Unrestricted
        } else {
            OrgScope::Organization(self.organization_id)
        }
    }

    /// Most authoritative (numerically smallest) level across active
    /// assignments; `None` when the user holds no active role.
    pub fn role_level(&self) -> Option<RoleLevel> {
        self.role_level
    }

    pub fn permissions(&self) -> &HashSet<PermissionId> {
        &self.permissions
    }

    pub fn has_permission(&self, permission: &PermissionId) -> bool {
        self.permissions.contains(permission)
    }

    pub fn is_super_admin(&self) -> bool {
        self.is_super_admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn super_admin_scope_is_unrestricted() {
        let ctx = SecurityContext::super_admin(UserId::new(), OrganizationId::new());
        assert_eq!(ctx.scope(), OrgScope::Unrestricted);
        assert!(ctx.is_super_admin());
    }

    #[test]
    fn scoped_context_pins_its_organization() {
        let org = OrganizationId::new();
        let ctx = SecurityContext::scoped(UserId::new(), org, None, HashSet::new());
        assert_eq!(ctx.scope(), OrgScope::Organization(org));
        assert_eq!(ctx.role_level(), None);
    }
}
