use chrono::{DateTime, Utc};
use uuid::Uuid;

use inkpost_domain::pagination::PageRequest;

use crate::domain::repository::{AccountRepository, CredentialRepository};
use crate::domain::types::{Account, AccountUpdate, ProfileChanges, UserFilter};
use crate::domain::validation::validate_profile;
use crate::error::AccountsServiceError;
use crate::usecase::credential::check_email;

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> GetUserUseCase<A> {
    pub async fn execute(&self, user_id: Uuid) -> Result<Account, AccountsServiceError> {
        self.accounts
            .find(user_id)
            .await?
            .ok_or(AccountsServiceError::UserNotFound)
    }
}

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> ListUsersUseCase<A> {
    pub async fn execute(
        &self,
        filter: UserFilter,
        page: PageRequest,
    ) -> Result<Vec<Account>, AccountsServiceError> {
        let filter = UserFilter {
            query: filter.query.filter(|q| !q.is_empty()),
            ..filter
        };
        self.accounts.list(&filter, page.clamped()).await
    }
}

// ── UpdateUser ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct UpdateUserInput {
    pub email: Option<String>,
    pub profile: ProfileChanges,
}

pub struct UpdateUserUseCase<A: AccountRepository, C: CredentialRepository> {
    pub accounts: A,
    pub credentials: C,
}

impl<A: AccountRepository, C: CredentialRepository> UpdateUserUseCase<A, C> {
    /// Validate the new email and the resulting profile together; apply
    /// both or neither.
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: UpdateUserInput,
        now: DateTime<Utc>,
    ) -> Result<Account, AccountsServiceError> {
        let account = self
            .accounts
            .find(user_id)
            .await?
            .ok_or(AccountsServiceError::UserNotFound)?;

        let email = input
            .email
            .filter(|email| *email != account.credential.email);

        let mut errors = match &email {
            Some(email) => check_email(&self.credentials, email, Some(user_id)).await?,
            None => vec![],
        };
        let profile = input.profile.apply(account.profile.attrs());
        errors.extend(validate_profile(&profile, now.date_naive()));
        if !errors.is_empty() {
            return Err(AccountsServiceError::Validation(errors));
        }

        self.accounts
            .update(
                user_id,
                &AccountUpdate {
                    email,
                    profile,
                    updated_at: now,
                },
            )
            .await
    }
}

// ── DeleteUser ───────────────────────────────────────────────────────────────

pub struct DeleteUserUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> DeleteUserUseCase<A> {
    /// Removes the credential, profile and status ledger with the user.
    pub async fn execute(&self, user_id: Uuid) -> Result<(), AccountsServiceError> {
        if !self.accounts.delete(user_id).await? {
            return Err(AccountsServiceError::UserNotFound);
        }
        tracing::info!(%user_id, "user deleted");
        Ok(())
    }
}
