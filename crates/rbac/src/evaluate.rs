//! Requirement evaluation — the allow/deny decision point.
//!
//! Pure policy: no IO, no panics, no business logic. Every denial is
//! terminal for the request; there is no partial authorization.

use netbill_core::{CoreError, CoreResult, OrganizationId};

use crate::context::SecurityContext;
use crate::level::RoleLevel;
use crate::permissions::PermissionId;

/// What an operation demands of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// The permission identifier must be in the context's effective set.
    Permission(PermissionId),
    /// The context's best role level must be at least this authoritative
    /// (numerically `<=` the threshold).
    MinAuthority(RoleLevel),
    /// The resource must belong to the caller's organization.
    SameOrganization(OrganizationId),
}

impl Requirement {
    /// Whether the super-admin flag satisfies this requirement outright.
    ///
    /// Hook for future requirements that must hold even for super admins;
    /// every current requirement is overridable.
    pub fn overridable(&self) -> bool {
        true
    }
}

/// Decide a requirement against a security context.
pub fn authorize(context: &SecurityContext, requirement: &Requirement) -> CoreResult<()> {
    if context.is_super_admin() && requirement.overridable() {
        return Ok(());
    }

    match requirement {
        Requirement::Permission(permission) => {
            if context.has_permission(permission) {
                Ok(())
            } else {
                Err(CoreError::InsufficientPermission(format!(
                    "missing permission '{permission}'"
                )))
            }
        }
        Requirement::MinAuthority(threshold) => match context.role_level() {
            Some(level) if level.at_least(*threshold) => Ok(()),
            _ => Err(CoreError::InsufficientPermission(format!(
                "requires role level {threshold} or better"
            ))),
        },
        Requirement::SameOrganization(resource_org) => {
            if context.organization_id() == *resource_org {
                Ok(())
            } else {
                Err(CoreError::InsufficientPermission(
                    "resource belongs to another organization".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use netbill_core::UserId;

    use crate::permissions::well_known;

    fn scoped(
        org: OrganizationId,
        level: Option<RoleLevel>,
        permissions: &[PermissionId],
    ) -> SecurityContext {
        SecurityContext::scoped(
            UserId::new(),
            org,
            level,
            permissions.iter().cloned().collect::<HashSet<_>>(),
        )
    }

    #[test]
    fn permission_check_consults_the_effective_set() {
        let org = OrganizationId::new();
        let ctx = scoped(org, None, &[well_known::USERS_READ]);

        assert!(authorize(&ctx, &Requirement::Permission(well_known::USERS_READ)).is_ok());
        assert!(matches!(
            authorize(&ctx, &Requirement::Permission(well_known::USERS_WRITE)),
            Err(CoreError::InsufficientPermission(_))
        ));
    }

    #[test]
    fn min_authority_is_a_numeric_threshold() {
        let org = OrganizationId::new();
        let admin = scoped(org, Some(RoleLevel::ADMIN), &[]);
        let customer = scoped(org, Some(RoleLevel::CUSTOMER), &[]);
        let roleless = scoped(org, None, &[]);

        let requirement = Requirement::MinAuthority(RoleLevel::RESELLER);
        assert!(authorize(&admin, &requirement).is_ok());
        assert!(authorize(&customer, &requirement).is_err());
        assert!(authorize(&roleless, &requirement).is_err());
    }

    #[test]
    fn same_organization_denies_across_the_boundary() {
        let mine = OrganizationId::new();
        let theirs = OrganizationId::new();
        let ctx = scoped(mine, Some(RoleLevel::ADMIN), &[well_known::USERS_READ]);

        assert!(authorize(&ctx, &Requirement::SameOrganization(mine)).is_ok());
        assert!(authorize(&ctx, &Requirement::SameOrganization(theirs)).is_err());
    }

    #[test]
    fn super_admin_short_circuits_every_requirement() {
        let ctx = SecurityContext::super_admin(UserId::new(), OrganizationId::new());

        assert!(authorize(&ctx, &Requirement::Permission(well_known::BILLING_WRITE)).is_ok());
        assert!(authorize(&ctx, &Requirement::MinAuthority(RoleLevel::SUPER_ADMIN)).is_ok());
        assert!(
            authorize(&ctx, &Requirement::SameOrganization(OrganizationId::new())).is_ok()
        );
    }
}

#[cfg(test)]
mod properties {
    use super::*;
    use std::collections::HashSet;

    use proptest::prelude::*;

    use netbill_core::UserId;

    proptest! {
        /// Cross-organization access is denied for every non-super-admin,
        /// whatever roles or permissions they hold.
        #[test]
        fn same_org_requirement_never_leaks_across_tenants(
            level in proptest::option::of(1u8..=10),
            perm_count in 0usize..8,
        ) {
            let mine = OrganizationId::new();
            let theirs = OrganizationId::new();
            let permissions: HashSet<_> = (0..perm_count)
                .map(|i| PermissionId::new(format!("module{i}.action")))
                .collect();
            let ctx = SecurityContext::scoped(
                UserId::new(),
                mine,
                level.map(RoleLevel::new),
                permissions,
            );

            prop_assert!(authorize(&ctx, &Requirement::SameOrganization(theirs)).is_err());
            prop_assert!(authorize(&ctx, &Requirement::SameOrganization(mine)).is_ok());
        }

        /// Authority comparisons are total and branch-free: allow iff
        /// level <= threshold.
        #[test]
        fn min_authority_matches_integer_order(level in 1u8..=10, threshold in 1u8..=10) {
            let ctx = SecurityContext::scoped(
                UserId::new(),
                OrganizationId::new(),
                Some(RoleLevel::new(level)),
                HashSet::new(),
            );
            let allowed =
                authorize(&ctx, &Requirement::MinAuthority(RoleLevel::new(threshold))).is_ok();
            prop_assert_eq!(allowed, level <= threshold);
        }
    }
}
