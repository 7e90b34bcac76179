//! Authorization context builder — claims in, security context out.
//!
//! The build path never calls the Organization Directory: organization
//! existence is validated when users are created or re-pointed, not on
//! every authenticated read. That decoupling is what keeps the two
//! services independently available.

use std::collections::HashSet;
use std::sync::Arc;

use netbill_auth::claims::AccessClaims;
use netbill_auth::token::TokenService;
use netbill_core::CoreResult;

use crate::context::SecurityContext;
use crate::store::RoleStore;

pub struct ContextBuilder<R: RoleStore> {
    tokens: Arc<TokenService>,
    roles: R,
}

impl<R: RoleStore> ContextBuilder<R> {
    pub fn new(tokens: Arc<TokenService>, roles: R) -> Self {
        Self { tokens, roles }
    }

    /// Verify a bearer token and assemble the request's security context.
    ///
    /// Token failures propagate with their kind unchanged (`InvalidToken`,
    /// `ExpiredToken`).
    pub async fn build(&self, bearer: &str) -> CoreResult<SecurityContext> {
        let claims = self.tokens.verify(bearer)?;
        self.from_claims_with_grants(&claims).await
    }

    async fn from_claims_with_grants(&self, claims: &AccessClaims) -> CoreResult<SecurityContext> {
        if claims.is_super_admin {
            return Ok(SecurityContext::super_admin(
                claims.sub,
                claims.organization_id,
            ));
        }

        let grants = self.roles.active_grants_for(claims.sub).await?;
        let role_level = grants.iter().map(|r| r.role_level).min();
        let permissions: HashSet<_> = grants
            .into_iter()
            .flat_map(|r| r.permissions.into_iter())
            .collect();

        Ok(SecurityContext::scoped(
            claims.sub,
            claims.organization_id,
            role_level,
            permissions,
        ))
    }
}

/// Claims-only context, for services that verify tokens but hold no role
/// store (the Organization Service). Non-super-admins get an empty
/// permission set — such services authorize on scope and the super-admin
/// flag alone.
pub fn context_from_claims(claims: &AccessClaims) -> SecurityContext {
    if claims.is_super_admin {
        SecurityContext::super_admin(claims.sub, claims.organization_id)
    } else {
        SecurityContext::scoped(claims.sub, claims.organization_id, None, HashSet::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use netbill_auth::config::AuthConfig;
    use netbill_core::{ManualClock, OrganizationId, UserId};

    use crate::level::RoleLevel;
    use crate::permissions::well_known;
    use crate::role::{NewRole, UserRef};
    use crate::store::InMemoryRoleStore;

    fn token_service() -> Arc<TokenService> {
        Arc::new(TokenService::new(
            AuthConfig {
                jwt_secret: "test-secret".into(),
                ..AuthConfig::default()
            },
            Arc::new(ManualClock::new(Utc::now())),
        ))
    }

    fn new_role(org: OrganizationId, name: &str, level: RoleLevel, perms: &[crate::PermissionId]) -> NewRole {
        NewRole {
            organization_id: org,
            name: name.to_string(),
            display_name: name.to_string(),
            role_level: level,
            permissions: perms.to_vec(),
            created_by: None,
        }
    }

    #[tokio::test]
    async fn context_unions_permissions_and_takes_the_best_level() {
        let tokens = token_service();
        let roles = Arc::new(InMemoryRoleStore::default());
        let builder = ContextBuilder::new(tokens.clone(), roles.clone());

        let org = OrganizationId::new();
        let user_id = UserId::new();
        let now = Utc::now();

        let admin = roles
            .create_role(
                new_role(org, "admin", RoleLevel::ADMIN, &[well_known::USERS_WRITE]),
                now,
            )
            .await
            .unwrap();
        let billing = roles
            .create_role(
                new_role(org, "billing", RoleLevel::RESELLER, &[well_known::BILLING_READ]),
                now,
            )
            .await
            .unwrap();
        let user = UserRef {
            id: user_id,
            organization_id: org,
            is_super_admin: false,
        };
        roles.assign_role(user, admin.id, user_id, now).await.unwrap();
        roles.assign_role(user, billing.id, user_id, now).await.unwrap();

        let pair = tokens.issue(user_id, org, false, false).unwrap();
        let ctx = builder.build(&pair.access).await.unwrap();

        assert_eq!(ctx.role_level(), Some(RoleLevel::ADMIN));
        assert!(ctx.has_permission(&well_known::USERS_WRITE));
        assert!(ctx.has_permission(&well_known::BILLING_READ));
        assert!(!ctx.is_super_admin());
    }

    #[tokio::test]
    async fn super_admin_claims_skip_the_role_store() {
        let tokens = token_service();
        let builder = ContextBuilder::new(tokens.clone(), Arc::new(InMemoryRoleStore::default()));

        let user_id = UserId::new();
        let org = OrganizationId::new();
        let pair = tokens.issue(user_id, org, true, false).unwrap();

        let ctx = builder.build(&pair.access).await.unwrap();
        assert!(ctx.is_super_admin());
        assert_eq!(ctx.scope(), crate::OrgScope::Unrestricted);
    }

    #[tokio::test]
    async fn token_failure_kind_propagates_unchanged() {
        let tokens = token_service();
        let builder = ContextBuilder::new(tokens, Arc::new(InMemoryRoleStore::default()));

        let err = builder.build("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, netbill_core::CoreError::InvalidToken(_)));
    }
}
