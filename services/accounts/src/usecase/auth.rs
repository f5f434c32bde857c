use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::repository::{AccountRepository, CredentialRepository, StatusLedger};
use crate::domain::types::{Account, LockoutPolicy, NewAccount, ProfileAttrs};
use crate::domain::validation::{validate_password, validate_profile};
use crate::error::AccountsServiceError;
use crate::password::CredentialHasher;
use crate::usecase::credential::check_email;

// ── Signup ───────────────────────────────────────────────────────────────────

pub struct SignupInput {
    pub email: String,
    pub password: String,
    pub password_confirmation: Option<String>,
    pub profile: ProfileAttrs,
}

pub struct SignupUseCase<A: AccountRepository, C: CredentialRepository> {
    pub accounts: A,
    pub credentials: C,
    pub hasher: CredentialHasher,
}

impl<A: AccountRepository, C: CredentialRepository> SignupUseCase<A, C> {
    /// Validate everything up front, then create the user, credential,
    /// profile and initial status record as one unit.
    pub async fn execute(
        &self,
        input: SignupInput,
        now: DateTime<Utc>,
    ) -> Result<Account, AccountsServiceError> {
        let mut errors = check_email(&self.credentials, &input.email, None).await?;
        errors.extend(validate_password(
            &input.password,
            input.password_confirmation.as_deref(),
        ));
        errors.extend(validate_profile(&input.profile, now.date_naive()));
        if !errors.is_empty() {
            return Err(AccountsServiceError::Validation(errors));
        }

        let password_digest = self.hasher.hash(&input.password)?;
        let account = self
            .accounts
            .create(&NewAccount {
                user_id: Uuid::now_v7(),
                email: input.email,
                password_digest,
                profile: input.profile,
                created_at: now,
            })
            .await?;

        tracing::info!(user_id = %account.id(), "user signed up");
        Ok(account)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginUseCase<C: CredentialRepository, S: StatusLedger> {
    pub credentials: C,
    pub ledger: S,
    pub hasher: CredentialHasher,
    pub policy: LockoutPolicy,
}

impl<C: CredentialRepository, S: StatusLedger> LoginUseCase<C, S> {
    /// Returns the authenticated user id.
    ///
    /// Unknown email, an active lock and a wrong password all fail with the
    /// same `InvalidCredentials`. `AccountNotActive` is only reported once
    /// the password has been proven.
    pub async fn execute(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Uuid, AccountsServiceError> {
        let Some(credential) = self.credentials.find_by_email(email).await? else {
            self.hasher.verify_decoy(password);
            tracing::debug!("login rejected: unknown email");
            return Err(AccountsServiceError::InvalidCredentials);
        };
        let user_id = credential.user_id;

        if credential.is_locked(now) {
            tracing::info!(%user_id, "login rejected: account locked");
            return Err(AccountsServiceError::InvalidCredentials);
        }

        if !self.hasher.verify(password, &credential.password_digest)? {
            let locked = self
                .credentials
                .record_failure(user_id, now, &self.policy)
                .await?;
            if locked {
                tracing::warn!(
                    %user_id,
                    lock_minutes = self.policy.lock_duration.num_minutes(),
                    "account locked after repeated login failures"
                );
            } else {
                tracing::debug!(%user_id, "login rejected: wrong password");
            }
            return Err(AccountsServiceError::InvalidCredentials);
        }

        self.credentials.record_success(user_id, now).await?;

        let current = self.ledger.current(user_id).await?;
        if !current.is_some_and(|r| r.status.is_active()) {
            tracing::info!(%user_id, "login rejected: account not active");
            return Err(AccountsServiceError::AccountNotActive);
        }

        tracing::info!(%user_id, "user logged in");
        Ok(user_id)
    }
}

// ── CanLogin ─────────────────────────────────────────────────────────────────

pub struct CanLoginUseCase<C: CredentialRepository, S: StatusLedger> {
    pub credentials: C,
    pub ledger: S,
}

/// Why a user may not log in right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginBlock {
    /// Current status is not active, or the ledger is empty.
    NotActive,
    /// The credential is inside its lockout window.
    Locked,
}

impl<C: CredentialRepository, S: StatusLedger> CanLoginUseCase<C, S> {
    /// Current status is active and the credential is not locked at `now`.
    pub async fn execute(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, AccountsServiceError> {
        Ok(self.blocked_by(user_id, now).await?.is_none())
    }

    /// The reason login is refused, status first, or `None` if it is allowed.
    pub async fn blocked_by(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<LoginBlock>, AccountsServiceError> {
        let active = self
            .ledger
            .current(user_id)
            .await?
            .is_some_and(|r| r.status.is_active());
        if !active {
            return Ok(Some(LoginBlock::NotActive));
        }
        if self.credentials.is_locked(user_id, now).await? {
            return Ok(Some(LoginBlock::Locked));
        }
        Ok(None)
    }
}
