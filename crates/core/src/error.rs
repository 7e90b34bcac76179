//! Platform error model.
//!
//! One enum for both services so failure kinds survive crate boundaries
//! intact. Authentication and authorization failures are never collapsed
//! into a generic "unauthorized": callers (and the HTTP layer) need the
//! distinguishing kind. Dependency failures (`OrganizationUnreachable`)
//! stay distinct from validation failures (`OrganizationNotFound`).

use thiserror::Error;

use crate::id::OrganizationId;

/// Result type used across the platform.
pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Login identifier / password pair did not authenticate.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Token is malformed or its signature does not verify.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Token was valid once but is past its expiry.
    #[error("token has expired")]
    ExpiredToken,

    /// Refresh token was revoked (or was never issued by this registry).
    #[error("token has been revoked")]
    RevokedToken,

    /// Account is locked after repeated failed logins.
    #[error("account is locked")]
    AccountLocked,

    /// Account has been deactivated.
    #[error("account is inactive")]
    AccountInactive,

    /// The referenced organization does not exist or is not active.
    #[error("organization not found or inactive")]
    OrganizationNotFound,

    /// The Organization Directory could not be reached. Transient:
    /// the caller may retry; the dependent operation must not proceed.
    #[error("organization directory unreachable: {0}")]
    OrganizationUnreachable(String),

    /// A role with this name already exists in the organization.
    #[error("role '{name}' already exists in organization {organization}")]
    DuplicateRoleName {
        organization: OrganizationId,
        name: String,
    },

    /// A role from one organization was offered to a user of another.
    #[error("role belongs to organization {role_org}, user to {user_org}")]
    CrossOrganizationViolation {
        user_org: OrganizationId,
        role_org: OrganizationId,
    },

    /// The security context does not satisfy the requirement.
    #[error("insufficient permission: {0}")]
    InsufficientPermission(String),

    /// Too many attempts from this identifier/source in the window.
    #[error("rate limited")]
    RateLimited,

    /// A value failed validation (malformed input, bad reference, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested entity was not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Unexpected internal failure (lock poisoning, crypto setup, ...).
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound(entity.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self::OrganizationUnreachable(reason.into())
    }

    /// True for failures of the shared dependency rather than of the
    /// request itself; surfaced as 503 so callers know to retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::OrganizationUnreachable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_is_transient_not_found_is_not() {
        assert!(CoreError::unreachable("timeout").is_transient());
        assert!(!CoreError::OrganizationNotFound.is_transient());
    }

    #[test]
    fn duplicate_role_message_names_the_collision() {
        let org = OrganizationId::new();
        let err = CoreError::DuplicateRoleName {
            organization: org,
            name: "admin".to_string(),
        };
        assert!(err.to_string().contains("admin"));
        assert!(err.to_string().contains(&org.to_string()));
    }
}
