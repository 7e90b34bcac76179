//! Refresh-token revocation registry.
//!
//! Refresh tokens are opaque; only their SHA-256 digest is kept here,
//! together with the identity snapshot needed to mint a new access token.
//! The registry must be immediately consistent: redeem and revoke are
//! serialized on a single lock, so once `revoke` returns, no racing redeem
//! of that token can succeed.

use std::collections::HashMap;
use std::sync::Mutex;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use netbill_core::{CoreError, CoreResult, OrganizationId, UserId};

/// Generate a cryptographically random opaque refresh token
/// (32 bytes, base64url-encoded, no padding).
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 digest of a raw refresh token, hex-encoded. The registry key.
pub fn digest(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

/// Identity snapshot stored per refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRecord {
    pub user_id: UserId,
    pub organization_id: OrganizationId,
    pub is_super_admin: bool,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

#[derive(Debug, Default)]
pub struct RefreshTokenRegistry {
    records: Mutex<HashMap<String, RefreshRecord>>,
}

impl RefreshTokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, token_digest: String, record: RefreshRecord) -> CoreResult<()> {
        let mut records = self.lock()?;
        records.insert(token_digest, record);
        Ok(())
    }

    /// Validate a presented token for redemption.
    ///
    /// Unknown and revoked digests both fail `RevokedToken` (an unknown
    /// token is indistinguishable from one pruned after revocation);
    /// a known-but-expired one fails `ExpiredToken`. The whole check runs
    /// under the registry lock.
    pub fn redeem(&self, raw: &str, now: DateTime<Utc>) -> CoreResult<RefreshRecord> {
        let records = self.lock()?;
        let record = records.get(&digest(raw)).ok_or(CoreError::RevokedToken)?;
        if record.revoked {
            return Err(CoreError::RevokedToken);
        }
        if record.expires_at <= now {
            return Err(CoreError::ExpiredToken);
        }
        Ok(record.clone())
    }

    /// Mark one token revoked. Returns the record snapshot when the digest
    /// was known, `None` otherwise (revoking an unknown token is a no-op).
    pub fn revoke(&self, raw: &str) -> CoreResult<Option<RefreshRecord>> {
        let mut records = self.lock()?;
        Ok(records.get_mut(&digest(raw)).map(|record| {
            record.revoked = true;
            record.clone()
        }))
    }

    /// Revoke every live token of a user ("logout all devices").
    pub fn revoke_all_for(&self, user_id: UserId) -> CoreResult<usize> {
        let mut records = self.lock()?;
        let mut revoked = 0;
        for record in records.values_mut() {
            if record.user_id == user_id && !record.revoked {
                record.revoked = true;
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    /// Drop entries past expiry. Revoked-but-unexpired entries are kept so
    /// redeeming them still reports `RevokedToken`.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> CoreResult<usize> {
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|_, r| r.expires_at > now);
        Ok(before - records.len())
    }

    fn lock(&self) -> CoreResult<std::sync::MutexGuard<'_, HashMap<String, RefreshRecord>>> {
        self.records
            .lock()
            .map_err(|_| CoreError::internal("refresh registry lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(user_id: UserId, expires_at: DateTime<Utc>) -> RefreshRecord {
        RefreshRecord {
            user_id,
            organization_id: OrganizationId::new(),
            is_super_admin: false,
            issued_at: Utc::now(),
            expires_at,
            revoked: false,
        }
    }

    #[test]
    fn refresh_token_is_url_safe() {
        let token = generate_refresh_token();
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        // 32 bytes -> 43 base64url chars.
        assert_eq!(token.len(), 43);
    }

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(digest("some-token"), digest("some-token"));
        assert_ne!(digest("token-a"), digest("token-b"));
    }

    #[test]
    fn redeem_after_revoke_fails_revoked() {
        let registry = RefreshTokenRegistry::new();
        let now = Utc::now();
        let raw = generate_refresh_token();
        registry
            .insert(digest(&raw), record(UserId::new(), now + Duration::days(1)))
            .unwrap();

        assert!(registry.redeem(&raw, now).is_ok());
        registry.revoke(&raw).unwrap();
        assert_eq!(registry.redeem(&raw, now), Err(CoreError::RevokedToken));
    }

    #[test]
    fn unknown_token_reports_revoked() {
        let registry = RefreshTokenRegistry::new();
        assert_eq!(
            registry.redeem("never-issued", Utc::now()),
            Err(CoreError::RevokedToken)
        );
    }

    #[test]
    fn expired_token_reports_expired() {
        let registry = RefreshTokenRegistry::new();
        let now = Utc::now();
        let raw = generate_refresh_token();
        registry
            .insert(digest(&raw), record(UserId::new(), now - Duration::seconds(1)))
            .unwrap();
        assert_eq!(registry.redeem(&raw, now), Err(CoreError::ExpiredToken));
    }

    #[test]
    fn revoke_all_hits_every_live_token_of_the_user() {
        let registry = RefreshTokenRegistry::new();
        let now = Utc::now();
        let user = UserId::new();
        let other = UserId::new();

        let mine_a = generate_refresh_token();
        let mine_b = generate_refresh_token();
        let theirs = generate_refresh_token();
        for (raw, uid) in [(&mine_a, user), (&mine_b, user), (&theirs, other)] {
            registry
                .insert(digest(raw), record(uid, now + Duration::days(1)))
                .unwrap();
        }

        assert_eq!(registry.revoke_all_for(user).unwrap(), 2);
        assert_eq!(registry.redeem(&mine_a, now), Err(CoreError::RevokedToken));
        assert_eq!(registry.redeem(&mine_b, now), Err(CoreError::RevokedToken));
        assert!(registry.redeem(&theirs, now).is_ok());
    }

    #[test]
    fn purge_keeps_revoked_unexpired_entries() {
        let registry = RefreshTokenRegistry::new();
        let now = Utc::now();
        let revoked = generate_refresh_token();
        let stale = generate_refresh_token();
        registry
            .insert(digest(&revoked), record(UserId::new(), now + Duration::days(1)))
            .unwrap();
        registry
            .insert(digest(&stale), record(UserId::new(), now - Duration::days(1)))
            .unwrap();
        registry.revoke(&revoked).unwrap();

        assert_eq!(registry.purge_expired(now).unwrap(), 1);
        assert_eq!(registry.redeem(&revoked, now), Err(CoreError::RevokedToken));
    }

    #[test]
    fn concurrent_revoke_and_redeem_never_let_a_revoked_token_pass() {
        use std::sync::Arc;

        let registry = Arc::new(RefreshTokenRegistry::new());
        let now = Utc::now();

        for _ in 0..50 {
            let raw = generate_refresh_token();
            registry
                .insert(digest(&raw), record(UserId::new(), now + Duration::days(1)))
                .unwrap();

            let revoker = {
                let registry = Arc::clone(&registry);
                let raw = raw.clone();
                std::thread::spawn(move || {
                    registry.revoke(&raw).unwrap();
                })
            };
            let redeemer = {
                let registry = Arc::clone(&registry);
                let raw = raw.clone();
                std::thread::spawn(move || registry.redeem(&raw, now))
            };

            revoker.join().unwrap();
            let after_revoke = registry.redeem(&raw, now);
            // The racing redeem may have won or lost; after revoke returns,
            // the token must be dead.
            let _ = redeemer.join().unwrap();
            assert_eq!(after_revoke, Err(CoreError::RevokedToken));
        }
    }
}
