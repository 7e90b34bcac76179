//! Role & assignment store.
//!
//! Enforces the two tenancy invariants before any write: role names are
//! unique per organization, and a user may only hold roles from their own
//! organization (super admins excepted).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use netbill_core::{AssignmentId, CoreError, CoreResult, OrganizationId, RoleId, UserId};

use crate::permissions::PermissionRegistry;
use crate::role::{NewRole, Role, RoleAssignment, UserRef};

pub trait RoleStore: Send + Sync {
    fn create_role(
        &self,
        input: NewRole,
        now: DateTime<Utc>,
    ) -> impl Future<Output = CoreResult<Role>> + Send;

    fn get_role(&self, id: RoleId) -> impl Future<Output = CoreResult<Role>> + Send;

    fn list_roles(
        &self,
        organization_id: OrganizationId,
    ) -> impl Future<Output = CoreResult<Vec<Role>>> + Send;

    fn assign_role(
        &self,
        user: UserRef,
        role_id: RoleId,
        actor_id: UserId,
        now: DateTime<Utc>,
    ) -> impl Future<Output = CoreResult<RoleAssignment>> + Send;

    fn revoke_assignment(
        &self,
        assignment_id: AssignmentId,
        actor_id: UserId,
        now: DateTime<Utc>,
    ) -> impl Future<Output = CoreResult<RoleAssignment>> + Send;

    fn assignments_for(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = CoreResult<Vec<RoleAssignment>>> + Send;

    /// Roles the user effectively holds: active assignments whose role is
    /// itself still active.
    fn active_grants_for(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = CoreResult<Vec<Role>>> + Send;
}

impl<T: RoleStore> RoleStore for Arc<T> {
    fn create_role(
        &self,
        input: NewRole,
        now: DateTime<Utc>,
    ) -> impl Future<Output = CoreResult<Role>> + Send {
        (**self).create_role(input, now)
    }

    fn get_role(&self, id: RoleId) -> impl Future<Output = CoreResult<Role>> + Send {
        (**self).get_role(id)
    }

    fn list_roles(
        &self,
        organization_id: OrganizationId,
    ) -> impl Future<Output = CoreResult<Vec<Role>>> + Send {
        (**self).list_roles(organization_id)
    }

    fn assign_role(
        &self,
        user: UserRef,
        role_id: RoleId,
        actor_id: UserId,
        now: DateTime<Utc>,
    ) -> impl Future<Output = CoreResult<RoleAssignment>> + Send {
        (**self).assign_role(user, role_id, actor_id, now)
    }

    fn revoke_assignment(
        &self,
        assignment_id: AssignmentId,
        actor_id: UserId,
        now: DateTime<Utc>,
    ) -> impl Future<Output = CoreResult<RoleAssignment>> + Send {
        (**self).revoke_assignment(assignment_id, actor_id, now)
    }

    fn assignments_for(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = CoreResult<Vec<RoleAssignment>>> + Send {
        (**self).assignments_for(user_id)
    }

    fn active_grants_for(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = CoreResult<Vec<Role>>> + Send {
        (**self).active_grants_for(user_id)
    }
}

#[derive(Debug, Default)]
struct Inner {
    roles: HashMap<RoleId, Role>,
    assignments: HashMap<AssignmentId, RoleAssignment>,
}

/// In-memory role store. Intended for tests/dev.
#[derive(Debug)]
pub struct InMemoryRoleStore {
    registry: PermissionRegistry,
    inner: RwLock<Inner>,
}

impl InMemoryRoleStore {
    pub fn new(registry: PermissionRegistry) -> Self {
        Self {
            registry,
            inner: RwLock::new(Inner::default()),
        }
    }

    fn read(&self) -> CoreResult<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| CoreError::internal("role store lock poisoned"))
    }

    fn write(&self) -> CoreResult<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| CoreError::internal("role store lock poisoned"))
    }
}

impl Default for InMemoryRoleStore {
    fn default() -> Self {
        Self::new(PermissionRegistry::with_defaults())
    }
}

impl RoleStore for InMemoryRoleStore {
    async fn create_role(&self, input: NewRole, now: DateTime<Utc>) -> CoreResult<Role> {
        if input.name.trim().is_empty() {
            return Err(CoreError::validation("role name cannot be empty"));
        }
        self.registry.validate(&input.permissions)?;

        let mut inner = self.write()?;
        let duplicate = inner.roles.values().any(|r| {
            r.organization_id == input.organization_id && r.name == input.name
        });
        if duplicate {
            return Err(CoreError::DuplicateRoleName {
                organization: input.organization_id,
                name: input.name,
            });
        }

        let role = Role {
            id: RoleId::new(),
            organization_id: input.organization_id,
            name: input.name,
            display_name: input.display_name,
            role_level: input.role_level,
            permissions: input.permissions,
            is_active: true,
            created_at: now,
            updated_at: now,
            created_by: input.created_by,
        };
        inner.roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn get_role(&self, id: RoleId) -> CoreResult<Role> {
        self.read()?
            .roles
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("role"))
    }

    async fn list_roles(&self, organization_id: OrganizationId) -> CoreResult<Vec<Role>> {
        let inner = self.read()?;
        let mut roles: Vec<Role> = inner
            .roles
            .values()
            .filter(|r| r.organization_id == organization_id)
            .cloned()
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn assign_role(
        &self,
        user: UserRef,
        role_id: RoleId,
        actor_id: UserId,
        now: DateTime<Utc>,
    ) -> CoreResult<RoleAssignment> {
        let mut inner = self.write()?;
        let role = inner
            .roles
            .get(&role_id)
            .ok_or_else(|| CoreError::not_found("role"))?;

        // A user may not hold a role from another tenant; super admins are
        // the only exception.
        if role.organization_id != user.organization_id && !user.is_super_admin {
            return Err(CoreError::CrossOrganizationViolation {
                user_org: user.organization_id,
                role_org: role.organization_id,
            });
        }

        let assignment = RoleAssignment {
            id: AssignmentId::new(),
            user_id: user.id,
            role_id,
            assigned_by: actor_id,
            assigned_at: now,
            is_active: true,
            revoked_by: None,
            revoked_at: None,
        };
        inner.assignments.insert(assignment.id, assignment.clone());
        tracing::info!(
            user_id = %user.id,
            role_id = %role_id,
            assigned_by = %actor_id,
            "role assigned"
        );
        Ok(assignment)
    }

    async fn revoke_assignment(
        &self,
        assignment_id: AssignmentId,
        actor_id: UserId,
        now: DateTime<Utc>,
    ) -> CoreResult<RoleAssignment> {
        let mut inner = self.write()?;
        let assignment = inner
            .assignments
            .get_mut(&assignment_id)
            .ok_or_else(|| CoreError::not_found("assignment"))?;

        if assignment.is_active {
            assignment.is_active = false;
            assignment.revoked_by = Some(actor_id);
            assignment.revoked_at = Some(now);
        }
        Ok(assignment.clone())
    }

    async fn assignments_for(&self, user_id: UserId) -> CoreResult<Vec<RoleAssignment>> {
        let inner = self.read()?;
        let mut assignments: Vec<RoleAssignment> = inner
            .assignments
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        assignments.sort_by_key(|a| a.assigned_at);
        Ok(assignments)
    }

    async fn active_grants_for(&self, user_id: UserId) -> CoreResult<Vec<Role>> {
        let inner = self.read()?;
        let mut grants = Vec::new();
        for assignment in inner.assignments.values() {
            if assignment.user_id != user_id || !assignment.is_active {
                continue;
            }
            if let Some(role) = inner.roles.get(&assignment.role_id) {
                if role.is_active {
                    grants.push(role.clone());
                }
            }
        }
        Ok(grants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::level::RoleLevel;
    use crate::permissions::well_known;

    fn new_role(org: OrganizationId, name: &str, level: RoleLevel) -> NewRole {
        NewRole {
            organization_id: org,
            name: name.to_string(),
            display_name: name.to_string(),
            role_level: level,
            permissions: vec![well_known::USERS_READ],
            created_by: None,
        }
    }

    fn member(org: OrganizationId) -> UserRef {
        UserRef {
            id: UserId::new(),
            organization_id: org,
            is_super_admin: false,
        }
    }

    #[tokio::test]
    async fn duplicate_role_name_in_one_organization_fails() {
        let store = InMemoryRoleStore::default();
        let org = OrganizationId::new();
        let now = Utc::now();

        store
            .create_role(new_role(org, "admin", RoleLevel::ADMIN), now)
            .await
            .unwrap();
        let err = store
            .create_role(new_role(org, "admin", RoleLevel::ADMIN), now)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateRoleName { .. }));
    }

    #[tokio::test]
    async fn same_role_name_coexists_across_organizations() {
        let store = InMemoryRoleStore::default();
        let now = Utc::now();

        let a = store
            .create_role(new_role(OrganizationId::new(), "admin", RoleLevel::ADMIN), now)
            .await
            .unwrap();
        let b = store
            .create_role(new_role(OrganizationId::new(), "admin", RoleLevel::ADMIN), now)
            .await
            .unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn unknown_permission_is_rejected_at_creation() {
        let store = InMemoryRoleStore::default();
        let mut input = new_role(OrganizationId::new(), "ops", RoleLevel::ADMIN);
        input
            .permissions
            .push(crate::permissions::PermissionId::new("flux.capacitor"));

        assert!(matches!(
            store.create_role(input, Utc::now()).await,
            Err(CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn cross_organization_assignment_always_fails() {
        let store = InMemoryRoleStore::default();
        let now = Utc::now();
        let org_a = OrganizationId::new();
        let org_b = OrganizationId::new();

        let role_b = store
            .create_role(new_role(org_b, "admin", RoleLevel::ADMIN), now)
            .await
            .unwrap();

        let err = store
            .assign_role(member(org_a), role_b.id, UserId::new(), now)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::CrossOrganizationViolation { .. }));
    }

    #[tokio::test]
    async fn super_admin_may_hold_a_foreign_role() {
        let store = InMemoryRoleStore::default();
        let now = Utc::now();
        let role = store
            .create_role(new_role(OrganizationId::new(), "auditor", RoleLevel::ADMIN), now)
            .await
            .unwrap();

        let user = UserRef {
            id: UserId::new(),
            organization_id: OrganizationId::new(),
            is_super_admin: true,
        };
        assert!(store.assign_role(user, role.id, UserId::new(), now).await.is_ok());
    }

    #[tokio::test]
    async fn revocation_preserves_the_audit_row() {
        let store = InMemoryRoleStore::default();
        let now = Utc::now();
        let org = OrganizationId::new();
        let role = store
            .create_role(new_role(org, "billing", RoleLevel::RESELLER), now)
            .await
            .unwrap();
        let user = member(org);
        let actor = UserId::new();

        let assignment = store.assign_role(user, role.id, actor, now).await.unwrap();
        let revoked = store
            .revoke_assignment(assignment.id, actor, now)
            .await
            .unwrap();

        assert!(!revoked.is_active);
        assert_eq!(revoked.revoked_by, Some(actor));
        assert!(revoked.revoked_at.is_some());

        // History remains queryable after revocation.
        let history = store.assignments_for(user.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(store.active_grants_for(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn grants_exclude_deactivated_roles() {
        let store = InMemoryRoleStore::default();
        let now = Utc::now();
        let org = OrganizationId::new();
        let role = store
            .create_role(new_role(org, "support", RoleLevel::CUSTOMER), now)
            .await
            .unwrap();
        let user = member(org);
        store.assign_role(user, role.id, UserId::new(), now).await.unwrap();

        assert_eq!(store.active_grants_for(user.id).await.unwrap().len(), 1);

        // Deactivate the role definition out from under the assignment.
        {
            let mut inner = store.inner.write().unwrap();
            inner.roles.get_mut(&role.id).unwrap().is_active = false;
        }
        assert!(store.active_grants_for(user.id).await.unwrap().is_empty());
    }
}
