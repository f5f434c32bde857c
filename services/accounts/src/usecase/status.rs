use chrono::{DateTime, Utc};
use uuid::Uuid;

use inkpost_domain::user::UserStatus;

use crate::domain::repository::{AccountRepository, StatusLedger};
use crate::domain::types::{NewStatusRecord, StatusRecord};
use crate::error::AccountsServiceError;

// ── ChangeStatus ─────────────────────────────────────────────────────────────

pub struct ChangeStatusInput {
    pub status: UserStatus,
    pub reason: Option<String>,
    /// Acting user, if any. May be the subject themself.
    pub actor: Option<Uuid>,
}

pub struct ChangeStatusUseCase<A: AccountRepository, S: StatusLedger> {
    pub accounts: A,
    pub ledger: S,
}

impl<A: AccountRepository, S: StatusLedger> ChangeStatusUseCase<A, S> {
    /// Append a new ledger entry. Repeating the current status is allowed.
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: ChangeStatusInput,
        now: DateTime<Utc>,
    ) -> Result<StatusRecord, AccountsServiceError> {
        if !self.accounts.exists(user_id).await? {
            return Err(AccountsServiceError::UserNotFound);
        }
        let reason = input.reason.filter(|r| !r.trim().is_empty());
        let record = self
            .ledger
            .append(&NewStatusRecord {
                user_id,
                status: input.status,
                reason,
                changed_by_user_id: input.actor,
                effective_at: now,
            })
            .await?;

        tracing::info!(
            %user_id,
            status = %record.status,
            actor = ?record.changed_by_user_id,
            "user status changed"
        );
        Ok(record)
    }
}

// ── GetCurrentStatus ─────────────────────────────────────────────────────────

pub struct GetCurrentStatusUseCase<A: AccountRepository, S: StatusLedger> {
    pub accounts: A,
    pub ledger: S,
}

impl<A: AccountRepository, S: StatusLedger> GetCurrentStatusUseCase<A, S> {
    /// `None` if the user exists but the ledger is empty.
    pub async fn execute(
        &self,
        user_id: Uuid,
    ) -> Result<Option<StatusRecord>, AccountsServiceError> {
        if !self.accounts.exists(user_id).await? {
            return Err(AccountsServiceError::UserNotFound);
        }
        self.ledger.current(user_id).await
    }
}

// ── GetStatusHistory ─────────────────────────────────────────────────────────

pub struct GetStatusHistoryUseCase<A: AccountRepository, S: StatusLedger> {
    pub accounts: A,
    pub ledger: S,
}

impl<A: AccountRepository, S: StatusLedger> GetStatusHistoryUseCase<A, S> {
    /// Most recent first.
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<StatusRecord>, AccountsServiceError> {
        if !self.accounts.exists(user_id).await? {
            return Err(AccountsServiceError::UserNotFound);
        }
        self.ledger.history(user_id).await
    }
}
