//! Access/refresh token issuance, verification, and revocation.
//!
//! Access tokens are short-lived HS256 JWTs verified locally — no store
//! round-trip on the request path. Refresh tokens are opaque and live in
//! the revocation registry so they can be invalidated individually or
//! en masse.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use uuid::Uuid;

use netbill_core::{Clock, CoreError, CoreResult, OrganizationId, UserId};

use crate::claims::AccessClaims;
use crate::config::AuthConfig;
use crate::refresh::{self, RefreshRecord, RefreshTokenRegistry};

/// The pair returned by login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    pub token_type: String,
}

/// Scope of a refresh-token revocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationScope {
    /// Revoke the presented token only.
    Single,
    /// Revoke every live refresh token of the same user.
    AllDevices,
}

/// Access granted by redeeming a refresh token.
#[derive(Debug, Clone)]
pub struct RefreshGrant {
    pub access: String,
    pub user_id: UserId,
    pub organization_id: OrganizationId,
}

pub struct TokenService {
    config: AuthConfig,
    clock: Arc<dyn Clock>,
    registry: RefreshTokenRegistry,
}

impl TokenService {
    pub fn new(config: AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            registry: RefreshTokenRegistry::new(),
        }
    }

    /// Issue an access/refresh pair for a verified identity.
    ///
    /// `remember_me` extends the refresh lifetime only; the access lifetime
    /// is fixed by configuration.
    pub fn issue(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        is_super_admin: bool,
        remember_me: bool,
    ) -> CoreResult<TokenPair> {
        let access = self.issue_access(user_id, organization_id, is_super_admin)?;

        let now = self.clock.now();
        let refresh_ttl = if remember_me {
            self.config.remember_me_refresh_ttl_secs
        } else {
            self.config.refresh_token_ttl_secs
        };
        let raw_refresh = refresh::generate_refresh_token();
        self.registry.insert(
            refresh::digest(&raw_refresh),
            RefreshRecord {
                user_id,
                organization_id,
                is_super_admin,
                issued_at: now,
                expires_at: now + Duration::seconds(refresh_ttl as i64),
                revoked: false,
            },
        )?;

        Ok(TokenPair {
            access,
            refresh: raw_refresh,
            token_type: "Bearer".to_string(),
        })
    }

    /// Decode and verify an access token: signature, issuer, then expiry
    /// against the injected clock. Each failure keeps its distinct kind.
    pub fn verify(&self, token: &str) -> CoreResult<AccessClaims> {
        let key = DecodingKey::from_secret(self.config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.jwt_issuer]);
        // Expiry is checked below against the injected clock, not the
        // library's wall clock.
        validation.validate_exp = false;

        let claims = jsonwebtoken::decode::<AccessClaims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| CoreError::InvalidToken(e.to_string()))?;

        if claims.exp <= self.clock.now().timestamp() {
            return Err(CoreError::ExpiredToken);
        }

        Ok(claims)
    }

    /// Redeem a refresh token for a new access token.
    ///
    /// The refresh token itself is not rotated; it stays valid until
    /// expiry or revocation.
    pub fn refresh(&self, raw_refresh: &str) -> CoreResult<RefreshGrant> {
        let record = self.registry.redeem(raw_refresh, self.clock.now())?;
        let access =
            self.issue_access(record.user_id, record.organization_id, record.is_super_admin)?;
        Ok(RefreshGrant {
            access,
            user_id: record.user_id,
            organization_id: record.organization_id,
        })
    }

    /// Revoke the presented refresh token, or all of the owning user's
    /// tokens. Revoking an unknown token is a no-op.
    pub fn revoke(&self, raw_refresh: &str, scope: RevocationScope) -> CoreResult<()> {
        let record = self.registry.revoke(raw_refresh)?;
        if scope == RevocationScope::AllDevices {
            if let Some(record) = record {
                let n = self.registry.revoke_all_for(record.user_id)?;
                tracing::info!(user_id = %record.user_id, revoked = n, "logout all devices");
            }
        }
        Ok(())
    }

    fn issue_access(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        is_super_admin: bool,
    ) -> CoreResult<String> {
        let now = self.clock.now().timestamp();
        let claims = AccessClaims {
            sub: user_id,
            organization_id,
            is_super_admin,
            iss: self.config.jwt_issuer.clone(),
            iat: now,
            exp: now + self.config.access_token_ttl_secs as i64,
            jti: Uuid::now_v7().to_string(),
        };

        let key = EncodingKey::from_secret(self.config.jwt_secret.as_bytes());
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
            .map_err(|e| CoreError::internal(format!("JWT encode: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use netbill_core::ManualClock;

    fn service() -> (TokenService, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let config = AuthConfig {
            jwt_secret: "test-secret".into(),
            ..AuthConfig::default()
        };
        (TokenService::new(config, clock.clone()), clock)
    }

    #[test]
    fn issue_then_verify_round_trips_identity_and_organization() {
        let (svc, _clock) = service();
        let user_id = UserId::new();
        let org_id = OrganizationId::new();

        let pair = svc.issue(user_id, org_id, false, false).unwrap();
        let claims = svc.verify(&pair.access).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.organization_id, org_id);
        assert!(!claims.is_super_admin);
        assert_eq!(claims.iss, "netbill");
        assert_eq!(pair.token_type, "Bearer");
    }

    #[test]
    fn expired_access_token_reports_expired_not_invalid() {
        let (svc, clock) = service();
        let pair = svc
            .issue(UserId::new(), OrganizationId::new(), false, false)
            .unwrap();

        clock.advance(Duration::seconds(901));
        assert_eq!(svc.verify(&pair.access), Err(CoreError::ExpiredToken));
    }

    #[test]
    fn tampered_token_reports_invalid() {
        let (svc, _clock) = service();
        let pair = svc
            .issue(UserId::new(), OrganizationId::new(), false, false)
            .unwrap();

        let mut tampered = pair.access.clone();
        tampered.pop();
        assert!(matches!(
            svc.verify(&tampered),
            Err(CoreError::InvalidToken(_))
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let (svc, _clock) = service();
        let other = TokenService::new(
            AuthConfig {
                jwt_secret: "other-secret".into(),
                ..AuthConfig::default()
            },
            Arc::new(ManualClock::new(Utc::now())),
        );
        let pair = other
            .issue(UserId::new(), OrganizationId::new(), false, false)
            .unwrap();
        assert!(matches!(
            svc.verify(&pair.access),
            Err(CoreError::InvalidToken(_))
        ));
    }

    #[test]
    fn refresh_yields_access_for_the_same_identity() {
        let (svc, _clock) = service();
        let user_id = UserId::new();
        let org_id = OrganizationId::new();
        let pair = svc.issue(user_id, org_id, true, false).unwrap();

        let grant = svc.refresh(&pair.refresh).unwrap();
        let claims = svc.verify(&grant.access).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.organization_id, org_id);
        assert!(claims.is_super_admin);
    }

    #[test]
    fn revoked_refresh_token_cannot_be_redeemed() {
        let (svc, _clock) = service();
        let pair = svc
            .issue(UserId::new(), OrganizationId::new(), false, false)
            .unwrap();

        svc.revoke(&pair.refresh, RevocationScope::Single).unwrap();
        assert!(matches!(
            svc.refresh(&pair.refresh),
            Err(CoreError::RevokedToken)
        ));
    }

    #[test]
    fn logout_all_devices_kills_every_session() {
        let (svc, _clock) = service();
        let user_id = UserId::new();
        let org_id = OrganizationId::new();
        let a = svc.issue(user_id, org_id, false, false).unwrap();
        let b = svc.issue(user_id, org_id, false, true).unwrap();

        svc.revoke(&a.refresh, RevocationScope::AllDevices).unwrap();
        assert!(svc.refresh(&a.refresh).is_err());
        assert!(svc.refresh(&b.refresh).is_err());
    }

    #[test]
    fn remember_me_extends_refresh_not_access() {
        let (svc, clock) = service();
        let pair = svc
            .issue(UserId::new(), OrganizationId::new(), false, true)
            .unwrap();

        // Access expiry is unchanged by remember_me.
        clock.advance(Duration::seconds(901));
        assert_eq!(svc.verify(&pair.access), Err(CoreError::ExpiredToken));

        // Refresh survives well past the default one-day lifetime.
        clock.advance(Duration::days(10));
        assert!(svc.refresh(&pair.refresh).is_ok());
    }

    #[test]
    fn plain_refresh_expires_after_default_lifetime() {
        let (svc, clock) = service();
        let pair = svc
            .issue(UserId::new(), OrganizationId::new(), false, false)
            .unwrap();

        clock.advance(Duration::days(2));
        assert!(matches!(
            svc.refresh(&pair.refresh),
            Err(CoreError::ExpiredToken)
        ));
    }
}
