use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use inkpost_auth_types::identity::BearerToken;
use inkpost_auth_types::token::validate_access_token;

use crate::domain::repository::AccountRepository;
use crate::error::AccountsServiceError;
use crate::state::AppState;
use crate::usecase::auth::{CanLoginUseCase, LoginBlock};

/// The authenticated caller.
///
/// The bearer token must validate, name an existing user, and that user must
/// currently be allowed to log in. Otherwise the request is rejected with
/// `Unauthorized` (bad token, unknown user, locked credential) or
/// `AccountNotActive` (suspended or deleted).
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AccountsServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = BearerToken::from_request_parts(parts, state)
            .await
            .map_err(|_| AccountsServiceError::Unauthorized)?;

        let info = validate_access_token(token.as_str(), &state.jwt_secret).map_err(|e| {
            tracing::debug!(error = %e, "bearer token rejected");
            AccountsServiceError::Unauthorized
        })?;

        if !state.account_repo().exists(info.user_id).await? {
            return Err(AccountsServiceError::Unauthorized);
        }

        let usecase = CanLoginUseCase {
            credentials: state.credential_repo(),
            ledger: state.status_ledger(),
        };
        if let Some(block) = usecase.blocked_by(info.user_id, state.now()).await? {
            tracing::debug!(user_id = %info.user_id, ?block, "session refused");
            return Err(session_rejection(block));
        }

        Ok(Self {
            user_id: info.user_id,
        })
    }
}

fn session_rejection(block: LoginBlock) -> AccountsServiceError {
    match block {
        LoginBlock::NotActive => AccountsServiceError::AccountNotActive,
        LoginBlock::Locked => AccountsServiceError::Unauthorized,
    }
}

impl CurrentUser {
    /// Allow only the subject to act on `target`. A missing target is
    /// reported as not found before ownership is considered.
    pub async fn ensure_self(
        &self,
        state: &AppState,
        target: Uuid,
    ) -> Result<(), AccountsServiceError> {
        if self.user_id == target {
            return Ok(());
        }
        if state.account_repo().exists(target).await? {
            Err(AccountsServiceError::Forbidden)
        } else {
            Err(AccountsServiceError::UserNotFound)
        }
    }
}
