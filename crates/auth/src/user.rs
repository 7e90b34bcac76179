//! User identity model and store.
//!
//! A user belongs to exactly one organization by reference —
//! `organization_id` is validated against the Directory at provisioning
//! time (see `provision`), never re-checked on the read path.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use netbill_core::{CoreError, CoreResult, OrganizationId, UserId};

/// Identity record. The password credential is stored only as an Argon2id
/// PHC hash and is excluded from serialization.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    /// Unique login identifier (letters, digits, `@`, `_`, `-`).
    pub login_id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub organization_id: OrganizationId,
    pub is_active: bool,
    /// Global override flag: exempt from organization-scoped filtering
    /// everywhere.
    pub is_super_admin: bool,
    pub mobile: Option<String>,
    pub address: Option<String>,
    pub employee_id: Option<String>,
    pub failed_login_attempts: u32,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to provision a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub login_id: String,
    pub email: String,
    pub name: String,
    /// Raw password; hashed before storage, never persisted.
    pub password: String,
    pub organization_id: OrganizationId,
    #[serde(default)]
    pub is_super_admin: bool,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub employee_id: Option<String>,
}

/// Login ids may contain letters, numbers, `@`, `.`, `_`, and `-` only
/// (email-shaped login ids are common for staff accounts).
pub fn validate_login_id(login_id: &str) -> CoreResult<()> {
    if login_id.is_empty() {
        return Err(CoreError::validation("login_id cannot be empty"));
    }
    if !login_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '_' | '-'))
    {
        return Err(CoreError::validation(
            "login_id can only contain letters, numbers, @, ., _, and - characters",
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> CoreResult<()> {
    let trimmed = email.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(CoreError::validation("invalid email format"));
    }
    Ok(())
}

pub trait UserStore: Send + Sync {
    fn insert(&self, user: User) -> impl Future<Output = CoreResult<User>> + Send;
    fn get(&self, id: UserId) -> impl Future<Output = CoreResult<User>> + Send;
    fn find_by_login_id(
        &self,
        login_id: &str,
    ) -> impl Future<Output = CoreResult<Option<User>>> + Send;
    fn update(&self, user: User) -> impl Future<Output = CoreResult<User>> + Send;
    fn list(
        &self,
        organization_id: Option<OrganizationId>,
    ) -> impl Future<Output = CoreResult<Vec<User>>> + Send;
}

impl<T: UserStore> UserStore for Arc<T> {
    fn insert(&self, user: User) -> impl Future<Output = CoreResult<User>> + Send {
        (**self).insert(user)
    }

    fn get(&self, id: UserId) -> impl Future<Output = CoreResult<User>> + Send {
        (**self).get(id)
    }

    fn find_by_login_id(
        &self,
        login_id: &str,
    ) -> impl Future<Output = CoreResult<Option<User>>> + Send {
        (**self).find_by_login_id(login_id)
    }

    fn update(&self, user: User) -> impl Future<Output = CoreResult<User>> + Send {
        (**self).update(user)
    }

    fn list(
        &self,
        organization_id: Option<OrganizationId>,
    ) -> impl Future<Output = CoreResult<Vec<User>>> + Send {
        (**self).list(organization_id)
    }
}

/// In-memory user store. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: User) -> CoreResult<User> {
        let mut users = self
            .users
            .write()
            .map_err(|_| CoreError::internal("user store lock poisoned"))?;

        for existing in users.values() {
            if existing.login_id == user.login_id {
                return Err(CoreError::validation("login_id already in use"));
            }
            if existing.email.eq_ignore_ascii_case(&user.email) {
                return Err(CoreError::validation("email already in use"));
            }
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: UserId) -> CoreResult<User> {
        self.users
            .read()
            .map_err(|_| CoreError::internal("user store lock poisoned"))?
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("user"))
    }

    async fn find_by_login_id(&self, login_id: &str) -> CoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .map_err(|_| CoreError::internal("user store lock poisoned"))?
            .values()
            .find(|u| u.login_id == login_id)
            .cloned())
    }

    async fn update(&self, user: User) -> CoreResult<User> {
        let mut users = self
            .users
            .write()
            .map_err(|_| CoreError::internal("user store lock poisoned"))?;
        if !users.contains_key(&user.id) {
            return Err(CoreError::not_found("user"));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list(&self, organization_id: Option<OrganizationId>) -> CoreResult<Vec<User>> {
        let users = self
            .users
            .read()
            .map_err(|_| CoreError::internal("user store lock poisoned"))?;
        let mut out: Vec<User> = users
            .values()
            .filter(|u| organization_id.is_none_or(|org| u.organization_id == org))
            .cloned()
            .collect();
        out.sort_by_key(|u| u.created_at);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_user(organization_id: OrganizationId) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            login_id: "alice".to_string(),
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            organization_id,
            is_active: true,
            is_super_admin: false,
            mobile: None,
            address: None,
            employee_id: None,
            failed_login_attempts: 0,
            locked_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn login_id_charset_is_enforced() {
        assert!(validate_login_id("admin@ktl.com").is_ok());
        assert!(validate_login_id("user-01").is_ok());
        assert!(validate_login_id("").is_err());
        assert!(validate_login_id("no spaces").is_err());
        assert!(validate_login_id("semi;colon").is_err());
    }

    #[tokio::test]
    async fn duplicate_login_id_is_rejected() {
        let store = InMemoryUserStore::new();
        let org = OrganizationId::new();
        store.insert(sample_user(org)).await.unwrap();

        let mut dup = sample_user(org);
        dup.email = "other@example.com".to_string();
        assert!(matches!(
            store.insert(dup).await,
            Err(CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn list_filters_by_organization() {
        let store = InMemoryUserStore::new();
        let org_a = OrganizationId::new();
        let org_b = OrganizationId::new();

        store.insert(sample_user(org_a)).await.unwrap();
        let mut other = sample_user(org_b);
        other.login_id = "bob".to_string();
        other.email = "bob@example.com".to_string();
        store.insert(other).await.unwrap();

        assert_eq!(store.list(Some(org_a)).await.unwrap().len(), 1);
        assert_eq!(store.list(None).await.unwrap().len(), 2);
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let user = sample_user(OrganizationId::new());
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("login_id").is_some());
    }
}
