use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::repository::CredentialRepository;
use crate::domain::validation::{EMAIL_TAKEN, validate_email};
use crate::error::AccountsServiceError;

/// Format and uniqueness messages for `email`. `owner` is ignored when
/// checking uniqueness, so a user may keep their own address.
pub async fn check_email<C: CredentialRepository>(
    credentials: &C,
    email: &str,
    owner: Option<Uuid>,
) -> Result<Vec<String>, AccountsServiceError> {
    let mut errors = validate_email(email);
    if errors.is_empty() && credentials.email_taken(email, owner).await? {
        errors.push(EMAIL_TAKEN.to_owned());
    }
    Ok(errors)
}

// ── UpdateEmail ──────────────────────────────────────────────────────────────

pub struct UpdateEmailUseCase<C: CredentialRepository> {
    pub credentials: C,
}

impl<C: CredentialRepository> UpdateEmailUseCase<C> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AccountsServiceError> {
        if self.credentials.find_by_user_id(user_id).await?.is_none() {
            return Err(AccountsServiceError::UserNotFound);
        }
        let errors = check_email(&self.credentials, email, Some(user_id)).await?;
        if !errors.is_empty() {
            return Err(AccountsServiceError::Validation(errors));
        }
        self.credentials.update_email(user_id, email, now).await
    }
}

// ── Unlock ───────────────────────────────────────────────────────────────────

pub struct UnlockAccountUseCase<C: CredentialRepository> {
    pub credentials: C,
}

impl<C: CredentialRepository> UnlockAccountUseCase<C> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), AccountsServiceError> {
        if self.credentials.find_by_user_id(user_id).await?.is_none() {
            return Err(AccountsServiceError::UserNotFound);
        }
        self.credentials.unlock(user_id, now).await?;
        tracing::info!(%user_id, "account unlocked");
        Ok(())
    }
}
