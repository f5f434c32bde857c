#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use inkpost_domain::pagination::PageRequest;

use crate::domain::types::{
    Account, AccountUpdate, Credential, LockoutPolicy, NewAccount, NewStatusRecord, StatusRecord,
    UserFilter,
};
use crate::error::AccountsServiceError;

/// Repository for users and the records they own.
pub trait AccountRepository: Send + Sync {
    /// Insert the user, credential, profile and initial active status record
    /// in one transaction. A duplicate email fails with
    /// `Validation(["Email has already been taken"])` and persists nothing.
    async fn create(&self, account: &NewAccount) -> Result<Account, AccountsServiceError>;

    async fn find(&self, user_id: Uuid) -> Result<Option<Account>, AccountsServiceError>;

    async fn exists(&self, user_id: Uuid) -> Result<bool, AccountsServiceError>;

    /// Users matching every present filter, oldest first.
    async fn list(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<Vec<Account>, AccountsServiceError>;

    /// Apply email and profile changes in one transaction.
    async fn update(
        &self,
        user_id: Uuid,
        update: &AccountUpdate,
    ) -> Result<Account, AccountsServiceError>;

    /// Delete the user and, by cascade, everything it owns. Returns `false`
    /// if there was no such user.
    async fn delete(&self, user_id: Uuid) -> Result<bool, AccountsServiceError>;
}

/// Repository for email/password credentials and their lockout counters.
pub trait CredentialRepository: Send + Sync {
    /// Exact, case-sensitive match.
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, AccountsServiceError>;

    async fn find_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Credential>, AccountsServiceError>;

    /// True if another user's credential already uses `email`.
    async fn email_taken(
        &self,
        email: &str,
        except: Option<Uuid>,
    ) -> Result<bool, AccountsServiceError>;

    async fn update_email(
        &self,
        user_id: Uuid,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AccountsServiceError>;

    /// Reset the failure counter, clear any lock and stamp `last_login_at`.
    async fn record_success(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), AccountsServiceError>;

    /// Increment the failure counter and, once it reaches the policy
    /// threshold, set the lock expiry. Must be a single atomic write.
    /// Returns `true` if the account is locked by this failure.
    async fn record_failure(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
        policy: &LockoutPolicy,
    ) -> Result<bool, AccountsServiceError>;

    /// Clear the lock expiry and reset the failure counter.
    async fn unlock(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<(), AccountsServiceError>;

    async fn is_locked(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, AccountsServiceError> {
        Ok(self
            .find_by_user_id(user_id)
            .await?
            .is_some_and(|c| c.is_locked(now)))
    }
}

/// Append-only status ledger. Insert and read only.
pub trait StatusLedger: Send + Sync {
    async fn append(&self, record: &NewStatusRecord) -> Result<StatusRecord, AccountsServiceError>;

    /// Most recently appended record (highest id), if any.
    async fn current(&self, user_id: Uuid) -> Result<Option<StatusRecord>, AccountsServiceError>;

    /// Every record for `user_id`, most recent first.
    async fn history(&self, user_id: Uuid) -> Result<Vec<StatusRecord>, AccountsServiceError>;

    async fn append_initial(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
        actor: Option<Uuid>,
    ) -> Result<StatusRecord, AccountsServiceError> {
        self.append(&NewStatusRecord::initial(user_id, now, actor))
            .await
    }
}
