//! Permission identifiers and the registry they are validated against.
//!
//! Identifiers follow the `module.action` convention. The registry is a
//! closed enumeration with an explicit extension point: unknown
//! identifiers are rejected at role-creation time, never interpreted at
//! request time.

use std::borrow::Cow;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use netbill_core::{CoreError, CoreResult};

/// Permission identifier (e.g. `"users.read"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(Cow<'static, str>);

impl PermissionId {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn borrowed(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PermissionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Permissions the platform ships with.
pub mod well_known {
    use super::PermissionId;

    pub const USERS_READ: PermissionId = PermissionId::borrowed("users.read");
    pub const USERS_WRITE: PermissionId = PermissionId::borrowed("users.write");
    pub const ROLES_READ: PermissionId = PermissionId::borrowed("roles.read");
    pub const ROLES_WRITE: PermissionId = PermissionId::borrowed("roles.write");
    pub const ROLES_ASSIGN: PermissionId = PermissionId::borrowed("roles.assign");
    pub const ORGANIZATIONS_READ: PermissionId = PermissionId::borrowed("organizations.read");
    pub const ORGANIZATIONS_WRITE: PermissionId = PermissionId::borrowed("organizations.write");
    pub const ORGANIZATIONS_VERIFY: PermissionId = PermissionId::borrowed("organizations.verify");
    pub const CUSTOMERS_READ: PermissionId = PermissionId::borrowed("customers.read");
    pub const CUSTOMERS_WRITE: PermissionId = PermissionId::borrowed("customers.write");
    pub const BILLING_READ: PermissionId = PermissionId::borrowed("billing.read");
    pub const BILLING_WRITE: PermissionId = PermissionId::borrowed("billing.write");

    pub const ALL: &[PermissionId] = &[
        USERS_READ,
        USERS_WRITE,
        ROLES_READ,
        ROLES_WRITE,
        ROLES_ASSIGN,
        ORGANIZATIONS_READ,
        ORGANIZATIONS_WRITE,
        ORGANIZATIONS_VERIFY,
        CUSTOMERS_READ,
        CUSTOMERS_WRITE,
        BILLING_READ,
        BILLING_WRITE,
    ];
}

/// Registry of permission identifiers roles may grant.
#[derive(Debug, Clone)]
pub struct PermissionRegistry {
    known: BTreeSet<PermissionId>,
}

impl PermissionRegistry {
    /// Registry seeded with the platform's `well_known` permissions.
    pub fn with_defaults() -> Self {
        Self {
            known: well_known::ALL.iter().cloned().collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            known: BTreeSet::new(),
        }
    }

    /// Extension point: deployments may register additional identifiers
    /// before any role is created.
    pub fn register(&mut self, permission: PermissionId) {
        self.known.insert(permission);
    }

    pub fn contains(&self, permission: &PermissionId) -> bool {
        self.known.contains(permission)
    }

    /// Reject any identifier the registry does not know.
    pub fn validate(&self, permissions: &[PermissionId]) -> CoreResult<()> {
        for permission in permissions {
            if !self.contains(permission) {
                return Err(CoreError::validation(format!(
                    "unknown permission '{permission}'"
                )));
            }
        }
        Ok(())
    }
}

impl Default for PermissionRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
