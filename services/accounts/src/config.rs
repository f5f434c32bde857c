use anyhow::{bail, ensure};
use chrono::Duration;
use serde::Deserialize;

use inkpost_core::config::Config;

use crate::domain::types::LockoutPolicy;

/// Accounts service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountsConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing bearer tokens.
    pub jwt_secret: String,
    /// TCP port to listen on (default 3114). Env var: `ACCOUNTS_PORT`.
    #[serde(default = "default_port")]
    pub accounts_port: u16,
    /// Server-side secret mixed into every password hash.
    #[serde(default)]
    pub password_pepper: Option<String>,
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,
    /// Consecutive failures that trigger a lockout.
    #[serde(default = "default_max_failed_login_attempts")]
    pub max_failed_login_attempts: i32,
    #[serde(default = "default_lockout_minutes")]
    pub lockout_minutes: i64,
    #[serde(default = "default_access_token_ttl_secs")]
    pub access_token_ttl_secs: u64,
}

fn default_port() -> u16 {
    3114
}

fn default_argon2_memory_kib() -> u32 {
    19_456
}

fn default_argon2_iterations() -> u32 {
    2
}

fn default_max_failed_login_attempts() -> i32 {
    5
}

fn default_lockout_minutes() -> i64 {
    30
}

fn default_access_token_ttl_secs() -> u64 {
    86_400
}

impl Config for AccountsConfig {}

impl AccountsConfig {
    /// Lockout rule from `MAX_FAILED_LOGIN_ATTEMPTS` and `LOCKOUT_MINUTES`.
    pub fn lockout_policy(&self) -> Result<LockoutPolicy, anyhow::Error> {
        ensure!(
            self.max_failed_login_attempts >= 1,
            "MAX_FAILED_LOGIN_ATTEMPTS must be at least 1, got {}",
            self.max_failed_login_attempts
        );
        let Some(lock_duration) = Duration::try_minutes(self.lockout_minutes) else {
            bail!("LOCKOUT_MINUTES out of range: {}", self.lockout_minutes);
        };
        ensure!(
            lock_duration > Duration::zero(),
            "LOCKOUT_MINUTES must be positive, got {}",
            self.lockout_minutes
        );
        Ok(LockoutPolicy {
            max_failed_attempts: self.max_failed_login_attempts,
            lock_duration,
        })
    }
}
