use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Accounts service error variants.
#[derive(Debug, thiserror::Error)]
pub enum AccountsServiceError {
    /// Every violated-field message, in credential-then-profile order.
    #[error("validation failed")]
    Validation(Vec<String>),
    /// Unknown email, wrong password and active lockout all map here.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account is suspended or deleted")]
    AccountNotActive,
    #[error("user not found")]
    UserNotFound,
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("status records are immutable")]
    ImmutableRecord,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AccountsServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountNotActive => "ACCOUNT_NOT_ACTIVE",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::ImmutableRecord => "IMMUTABLE_RECORD",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }
}

impl IntoResponse for AccountsServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::AccountNotActive | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::ImmutableRecord | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // 4xx are expected outcomes and already visible through TraceLayer.
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = %e, kind = "INTERNAL", "internal error");
            }
            Self::ImmutableRecord => {
                tracing::error!(kind = "IMMUTABLE_RECORD", "attempted to mutate a status record");
            }
            _ => {}
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Self::Validation(errors) = &self {
            body["errors"] = serde_json::json!(errors);
        }
        (status, axum::Json(body)).into_response()
    }
}
