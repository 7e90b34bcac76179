//! Canonical organization store (Organization Service side).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use netbill_core::{CoreError, CoreResult, OrganizationId};

use crate::model::{validate_code, NewOrganization, Organization};

pub trait DirectoryStore: Send + Sync {
    fn create(
        &self,
        input: NewOrganization,
        now: DateTime<Utc>,
    ) -> impl Future<Output = CoreResult<Organization>> + Send;

    fn get(
        &self,
        id: OrganizationId,
    ) -> impl Future<Output = CoreResult<Option<Organization>>> + Send;

    fn list(&self) -> impl Future<Output = CoreResult<Vec<Organization>>> + Send;

    /// Soft delete. The record stays; `is_active` flips.
    fn deactivate(
        &self,
        id: OrganizationId,
        now: DateTime<Utc>,
    ) -> impl Future<Output = CoreResult<Organization>> + Send;

    /// One-way verification transition.
    fn verify(
        &self,
        id: OrganizationId,
        now: DateTime<Utc>,
    ) -> impl Future<Output = CoreResult<Organization>> + Send;
}

impl<T: DirectoryStore> DirectoryStore for Arc<T> {
    fn create(
        &self,
        input: NewOrganization,
        now: DateTime<Utc>,
    ) -> impl Future<Output = CoreResult<Organization>> + Send {
        (**self).create(input, now)
    }

    fn get(
        &self,
        id: OrganizationId,
    ) -> impl Future<Output = CoreResult<Option<Organization>>> + Send {
        (**self).get(id)
    }

    fn list(&self) -> impl Future<Output = CoreResult<Vec<Organization>>> + Send {
        (**self).list()
    }

    fn deactivate(
        &self,
        id: OrganizationId,
        now: DateTime<Utc>,
    ) -> impl Future<Output = CoreResult<Organization>> + Send {
        (**self).deactivate(id, now)
    }

    fn verify(
        &self,
        id: OrganizationId,
        now: DateTime<Utc>,
    ) -> impl Future<Output = CoreResult<Organization>> + Send {
        (**self).verify(id, now)
    }
}

/// In-memory directory. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    organizations: RwLock<HashMap<OrganizationId, Organization>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(
        &self,
    ) -> CoreResult<std::sync::RwLockWriteGuard<'_, HashMap<OrganizationId, Organization>>> {
        self.organizations
            .write()
            .map_err(|_| CoreError::internal("directory lock poisoned"))
    }

    fn read(
        &self,
    ) -> CoreResult<std::sync::RwLockReadGuard<'_, HashMap<OrganizationId, Organization>>> {
        self.organizations
            .read()
            .map_err(|_| CoreError::internal("directory lock poisoned"))
    }
}

impl DirectoryStore for InMemoryDirectory {
    async fn create(&self, input: NewOrganization, now: DateTime<Utc>) -> CoreResult<Organization> {
        validate_code(&input.code)?;
        if input.name.trim().is_empty() {
            return Err(CoreError::validation("organization name cannot be empty"));
        }
        let revenue_share = input.revenue_share.unwrap_or_default();
        revenue_share.validate()?;

        let mut organizations = self.write()?;
        if organizations.values().any(|o| o.code == input.code) {
            return Err(CoreError::validation(format!(
                "organization code '{}' already in use",
                input.code
            )));
        }
        if organizations.values().any(|o| o.name == input.name) {
            return Err(CoreError::validation(format!(
                "organization name '{}' already in use",
                input.name
            )));
        }

        let organization = Organization {
            id: OrganizationId::new(),
            code: input.code,
            name: input.name,
            org_type: input.org_type,
            email: input.email,
            phone: input.phone,
            mobile: input.mobile,
            website: input.website,
            address: input.address,
            city: input.city,
            postal_code: input.postal_code,
            country: input.country,
            revenue_share,
            is_active: true,
            is_verified: false,
            created_at: now,
            updated_at: now,
            created_by: input.created_by,
        };
        organizations.insert(organization.id, organization.clone());
        tracing::info!(organization_id = %organization.id, code = %organization.code, "organization created");
        Ok(organization)
    }

    async fn get(&self, id: OrganizationId) -> CoreResult<Option<Organization>> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn list(&self) -> CoreResult<Vec<Organization>> {
        let organizations = self.read()?;
        let mut out: Vec<Organization> = organizations.values().cloned().collect();
        out.sort_by_key(|o| o.created_at);
        Ok(out)
    }

    async fn deactivate(&self, id: OrganizationId, now: DateTime<Utc>) -> CoreResult<Organization> {
        let mut organizations = self.write()?;
        let organization = organizations
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found("organization"))?;
        organization.is_active = false;
        organization.updated_at = now;
        Ok(organization.clone())
    }

    async fn verify(&self, id: OrganizationId, now: DateTime<Utc>) -> CoreResult<Organization> {
        let mut organizations = self.write()?;
        let organization = organizations
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found("organization"))?;
        organization.is_verified = true;
        organization.updated_at = now;
        Ok(organization.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrgType;

    pub(crate) fn new_org(code: &str, name: &str) -> NewOrganization {
        NewOrganization {
            code: code.to_string(),
            name: name.to_string(),
            org_type: OrgType::Isp,
            email: "info@example.com".to_string(),
            phone: "+8801000000000".to_string(),
            mobile: None,
            website: None,
            address: "House 1, Road 1".to_string(),
            city: "Dhaka".to_string(),
            postal_code: None,
            country: "Bangladesh".to_string(),
            revenue_share: None,
            created_by: None,
        }
    }

    #[tokio::test]
    async fn duplicate_code_is_rejected() {
        let directory = InMemoryDirectory::new();
        let now = Utc::now();
        directory.create(new_org("KTL", "Kloud"), now).await.unwrap();

        let err = directory
            .create(new_org("KTL", "Other"), now)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("KTL"));
    }

    #[tokio::test]
    async fn deactivate_is_soft() {
        let directory = InMemoryDirectory::new();
        let now = Utc::now();
        let org = directory.create(new_org("KTL", "Kloud"), now).await.unwrap();

        directory.deactivate(org.id, now).await.unwrap();
        let fetched = directory.get(org.id).await.unwrap().unwrap();
        assert!(!fetched.is_active);
    }

    #[tokio::test]
    async fn verification_is_one_way() {
        let directory = InMemoryDirectory::new();
        let now = Utc::now();
        let org = directory.create(new_org("KTL", "Kloud"), now).await.unwrap();
        assert!(!org.is_verified);

        let verified = directory.verify(org.id, now).await.unwrap();
        assert!(verified.is_verified);
        // Deactivation does not clear verification.
        let deactivated = directory.deactivate(org.id, now).await.unwrap();
        assert!(deactivated.is_verified);
    }
}
