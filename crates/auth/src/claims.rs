//! JWT claims carried by every access token.

use serde::{Deserialize, Serialize};

use netbill_core::{OrganizationId, UserId};

/// Claims embedded in an access token.
///
/// Everything downstream authorization needs without a store round-trip:
/// identity, tenant scope, and the super-admin override flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject — user id.
    pub sub: UserId,
    /// Organization (tenant) the token is scoped to.
    pub organization_id: OrganizationId,
    /// Global override flag; bypasses organization filtering downstream.
    pub is_super_admin: bool,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token id.
    pub jti: String,
}
