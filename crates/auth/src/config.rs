//! Authentication configuration.

/// Configuration for token issuance and login policy.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret shared by both services.
    pub jwt_secret: String,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Access token lifetime in seconds (default: 900 = 15 minutes).
    pub access_token_ttl_secs: u64,
    /// Refresh token lifetime in seconds (default: 86_400 = 1 day).
    pub refresh_token_ttl_secs: u64,
    /// Refresh token lifetime when the client asked to be remembered
    /// (default: 2_592_000 = 30 days). Never affects access tokens.
    pub remember_me_refresh_ttl_secs: u64,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    /// Login attempts allowed per (login_id, source) in the rolling window
    /// (default: 5).
    pub max_login_attempts: u32,
    /// Rolling rate-limit window in seconds (default: 60).
    pub login_window_secs: u64,
    /// Consecutive failed logins before the account locks (default: 5).
    pub max_failed_logins: u32,
    /// Lockout duration in seconds (default: 1800 = 30 minutes).
    pub lockout_duration_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: "netbill".into(),
            access_token_ttl_secs: 900,
            refresh_token_ttl_secs: 86_400,
            remember_me_refresh_ttl_secs: 2_592_000,
            pepper: None,
            max_login_attempts: 5,
            login_window_secs: 60,
            max_failed_logins: 5,
            lockout_duration_secs: 1_800,
        }
    }
}
