//! User provisioning — the only place a user's organization reference is
//! created or changed.
//!
//! Cross-service consistency is validate-then-commit: the organization is
//! confirmed against the Directory BEFORE the local write. There is no
//! compensating delete; if the Directory cannot answer, the operation
//! fails with `OrganizationUnreachable` and nothing is committed.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use netbill_core::{CoreError, CoreResult, OrganizationId, UserId};

use crate::password;
use crate::user::{validate_email, validate_login_id, NewUser, User, UserStore};

/// Answers "is this organization real and active?" for provisioning.
///
/// Implemented by the Organization Resolver. `Ok(false)` means the
/// Directory answered and said no; `Err(OrganizationUnreachable)` means it
/// could not answer — the two must never be conflated.
pub trait OrganizationGate: Send + Sync {
    fn confirm_active(
        &self,
        organization_id: OrganizationId,
    ) -> impl Future<Output = CoreResult<bool>> + Send;
}

impl<T: OrganizationGate> OrganizationGate for Arc<T> {
    fn confirm_active(
        &self,
        organization_id: OrganizationId,
    ) -> impl Future<Output = CoreResult<bool>> + Send {
        (**self).confirm_active(organization_id)
    }
}

pub struct UserProvisioner<G: OrganizationGate, S: UserStore> {
    gate: G,
    users: S,
    pepper: Option<String>,
}

impl<G: OrganizationGate, S: UserStore> UserProvisioner<G, S> {
    pub fn new(gate: G, users: S, pepper: Option<String>) -> Self {
        Self { gate, users, pepper }
    }

    /// Create a user anchored to a confirmed-active organization.
    pub async fn create_user(&self, input: NewUser, now: DateTime<Utc>) -> CoreResult<User> {
        validate_login_id(&input.login_id)?;
        validate_email(&input.email)?;
        if input.name.trim().is_empty() {
            return Err(CoreError::validation("name cannot be empty"));
        }
        if input.password.is_empty() {
            return Err(CoreError::validation("password cannot be empty"));
        }

        if !self.gate.confirm_active(input.organization_id).await? {
            return Err(CoreError::OrganizationNotFound);
        }

        let password_hash = password::hash_password(&input.password, self.pepper.as_deref())?;
        let user = User {
            id: UserId::new(),
            login_id: input.login_id,
            email: input.email.trim().to_lowercase(),
            name: input.name.trim().to_string(),
            password_hash,
            organization_id: input.organization_id,
            is_active: true,
            is_super_admin: input.is_super_admin,
            mobile: input.mobile,
            address: input.address,
            employee_id: input.employee_id,
            failed_login_attempts: 0,
            locked_until: None,
            created_at: now,
            updated_at: now,
        };

        let user = self.users.insert(user).await?;
        tracing::info!(user_id = %user.id, organization_id = %user.organization_id, "user created");
        Ok(user)
    }

    /// Re-point an existing user at another organization. Same gate, same
    /// ordering: confirm first, commit second.
    pub async fn reassign_organization(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        now: DateTime<Utc>,
    ) -> CoreResult<User> {
        if !self.gate.confirm_active(organization_id).await? {
            return Err(CoreError::OrganizationNotFound);
        }

        let mut user = self.users.get(user_id).await?;
        user.organization_id = organization_id;
        user.updated_at = now;
        self.users.update(user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::user::InMemoryUserStore;

    /// Gate stub: `Some(bool)` answers, `None` simulates the Directory
    /// being unreachable.
    struct StubGate(Option<bool>);

    impl OrganizationGate for StubGate {
        async fn confirm_active(&self, _organization_id: OrganizationId) -> CoreResult<bool> {
            self.0.ok_or_else(|| CoreError::unreachable("connection refused"))
        }
    }

    fn new_user(org: OrganizationId) -> NewUser {
        NewUser {
            login_id: "alice".to_string(),
            email: "Alice@Example.com".to_string(),
            name: " Alice ".to_string(),
            password: "s3cret-enough".to_string(),
            organization_id: org,
            is_super_admin: false,
            mobile: None,
            address: None,
            employee_id: None,
        }
    }

    #[tokio::test]
    async fn creates_user_when_organization_is_confirmed() {
        let store = Arc::new(InMemoryUserStore::new());
        let provisioner = UserProvisioner::new(StubGate(Some(true)), store.clone(), None);
        let org = OrganizationId::new();

        let user = provisioner.create_user(new_user(org), Utc::now()).await.unwrap();
        assert_eq!(user.organization_id, org);
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.name, "Alice");
        assert!(store.get(user.id).await.is_ok());
    }

    #[tokio::test]
    async fn inactive_organization_rejects_with_not_found() {
        let store = Arc::new(InMemoryUserStore::new());
        let provisioner = UserProvisioner::new(StubGate(Some(false)), store.clone(), None);

        let err = provisioner
            .create_user(new_user(OrganizationId::new()), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err, CoreError::OrganizationNotFound);
        assert!(store.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreachable_directory_rejects_and_commits_nothing() {
        let store = Arc::new(InMemoryUserStore::new());
        let provisioner = UserProvisioner::new(StubGate(None), store.clone(), None);

        let err = provisioner
            .create_user(new_user(OrganizationId::new()), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::OrganizationUnreachable(_)));
        // Validate-then-commit: the store never saw the user.
        assert!(store.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reassignment_is_gated_the_same_way() {
        let store = Arc::new(InMemoryUserStore::new());
        let provisioner = UserProvisioner::new(StubGate(Some(true)), store.clone(), None);
        let user = provisioner
            .create_user(new_user(OrganizationId::new()), Utc::now())
            .await
            .unwrap();

        let blocked = UserProvisioner::new(StubGate(None), store.clone(), None);
        let err = blocked
            .reassign_organization(user.id, OrganizationId::new(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::OrganizationUnreachable(_)));

        // Original anchor untouched.
        let unchanged = store.get(user.id).await.unwrap();
        assert_eq!(unchanged.organization_id, user.organization_id);
    }
}
