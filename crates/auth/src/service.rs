//! Authentication service — login, refresh, and logout orchestration.

use std::sync::Arc;

use chrono::Duration;

use netbill_core::{Clock, CoreError, CoreResult};

use crate::claims::AccessClaims;
use crate::config::AuthConfig;
use crate::password;
use crate::ratelimit::LoginRateLimiter;
use crate::token::{RefreshGrant, RevocationScope, TokenPair, TokenService};
use crate::user::{User, UserStore};

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub login_id: String,
    pub password: String,
    pub remember_me: bool,
    /// Caller address, used only for rate limiting.
    pub source: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    pub user: User,
    pub tokens: TokenPair,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Authentication service.
///
/// Generic over the user store so this crate carries no storage engine.
pub struct AuthService<S: UserStore> {
    users: S,
    tokens: Arc<TokenService>,
    limiter: LoginRateLimiter,
    config: AuthConfig,
    clock: Arc<dyn Clock>,
}

impl<S: UserStore> AuthService<S> {
    pub fn new(users: S, config: AuthConfig, clock: Arc<dyn Clock>) -> Self {
        let tokens = Arc::new(TokenService::new(config.clone(), clock.clone()));
        let limiter = LoginRateLimiter::new(
            config.max_login_attempts,
            Duration::seconds(config.login_window_secs as i64),
            clock.clone(),
        );
        Self {
            users,
            tokens,
            limiter,
            config,
            clock,
        }
    }

    /// Shared token service (the verification side is also used by the
    /// request middleware).
    pub fn tokens(&self) -> Arc<TokenService> {
        self.tokens.clone()
    }

    /// Authenticate a login_id/password pair and issue a token pair.
    ///
    /// Ordering is deliberate: the Argon2id comparison always runs before
    /// the rate-limit verdict or any account-state check is applied, so
    /// `RateLimited`, `InvalidCredentials`, and unknown-user responses all
    /// cost the same hashing work.
    pub async fn login(&self, input: LoginInput) -> CoreResult<LoginOutput> {
        let found = self.users.find_by_login_id(&input.login_id).await?;

        let pepper = self.config.pepper.as_deref();
        let password_ok = match &found {
            Some(user) => password::verify_password(&input.password, &user.password_hash, pepper)?,
            None => {
                password::dummy_verify(&input.password, pepper);
                false
            }
        };

        if !self.limiter.record(&input.login_id, &input.source) {
            tracing::warn!(login_id = %input.login_id, source = %input.source, "login rate limited");
            return Err(CoreError::RateLimited);
        }

        let mut user = found.ok_or(CoreError::InvalidCredentials)?;
        let now = self.clock.now();

        if let Some(locked_until) = user.locked_until {
            if locked_until > now {
                return Err(CoreError::AccountLocked);
            }
        }

        if !password_ok {
            user.failed_login_attempts += 1;
            if user.failed_login_attempts >= self.config.max_failed_logins {
                user.locked_until =
                    Some(now + Duration::seconds(self.config.lockout_duration_secs as i64));
                tracing::warn!(user_id = %user.id, "account locked after repeated failures");
            }
            user.updated_at = now;
            self.users.update(user).await?;
            return Err(CoreError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(CoreError::AccountInactive);
        }

        if user.failed_login_attempts > 0 || user.locked_until.is_some() {
            user.failed_login_attempts = 0;
            user.locked_until = None;
            user.updated_at = now;
            user = self.users.update(user).await?;
        }

        let tokens = self.tokens.issue(
            user.id,
            user.organization_id,
            user.is_super_admin,
            input.remember_me,
        )?;

        tracing::info!(user_id = %user.id, organization_id = %user.organization_id, "login");
        Ok(LoginOutput {
            user,
            tokens,
            expires_in: self.config.access_token_ttl_secs,
        })
    }

    /// Redeem a refresh token for a new access token.
    ///
    /// The owning account must still be active; a refresh presented for a
    /// deactivated account is revoked on the spot.
    pub async fn refresh(&self, raw_refresh: &str) -> CoreResult<RefreshGrant> {
        let grant = self.tokens.refresh(raw_refresh)?;

        let user = self.users.get(grant.user_id).await?;
        if !user.is_active {
            self.tokens.revoke(raw_refresh, RevocationScope::Single)?;
            return Err(CoreError::AccountInactive);
        }

        Ok(grant)
    }

    /// Invalidate the presented refresh token, optionally across all of
    /// the user's devices.
    pub fn logout(&self, raw_refresh: &str, all_devices: bool) -> CoreResult<()> {
        let scope = if all_devices {
            RevocationScope::AllDevices
        } else {
            RevocationScope::Single
        };
        self.tokens.revoke(raw_refresh, scope)
    }

    /// Verify an access token (delegates to the token service).
    pub fn verify(&self, token: &str) -> CoreResult<AccessClaims> {
        self.tokens.verify(token)
    }
}
