use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use inkpost_domain::user::UserStatus;

use crate::domain::types::StatusRecord;
use crate::error::AccountsServiceError;
use crate::handlers::session::CurrentUser;
use crate::handlers::user::STATUS_NOT_IN_LIST;
use crate::state::AppState;
use crate::usecase::status::{
    ChangeStatusInput, ChangeStatusUseCase, GetCurrentStatusUseCase, GetStatusHistoryUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StatusRecordResponse {
    pub id: i64,
    pub user_id: Uuid,
    pub status: UserStatus,
    pub reason: Option<String>,
    pub changed_by_user_id: Option<Uuid>,
    #[serde(serialize_with = "inkpost_core::serde::to_rfc3339_ms")]
    pub effective_at: DateTime<Utc>,
    #[serde(serialize_with = "inkpost_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<StatusRecord> for StatusRecordResponse {
    fn from(r: StatusRecord) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            status: r.status,
            reason: r.reason,
            changed_by_user_id: r.changed_by_user_id,
            effective_at: r.effective_at,
            created_at: r.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct StatusesResponse {
    pub statuses: Vec<StatusRecordResponse>,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: Option<StatusRecordResponse>,
}

// ── GET /api/v1/users/{id}/statuses ──────────────────────────────────────────

pub async fn list_statuses(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusesResponse>, AccountsServiceError> {
    let usecase = GetStatusHistoryUseCase {
        accounts: state.account_repo(),
        ledger: state.status_ledger(),
    };
    let history = usecase.execute(id).await?;
    Ok(Json(StatusesResponse {
        statuses: history.into_iter().map(Into::into).collect(),
    }))
}

// ── GET /api/v1/users/{id}/statuses/current ──────────────────────────────────

pub async fn current_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, AccountsServiceError> {
    let usecase = GetCurrentStatusUseCase {
        accounts: state.account_repo(),
        ledger: state.status_ledger(),
    };
    let current = usecase.execute(id).await?;
    Ok(Json(StatusResponse {
        status: current.map(Into::into),
    }))
}

// ── POST /api/v1/users/{id}/statuses ─────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateStatusRequest {
    #[serde(default)]
    pub status: String,
    pub reason: Option<String>,
}

pub async fn create_status(
    current: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateStatusRequest>,
) -> Result<(StatusCode, Json<StatusResponse>), AccountsServiceError> {
    current.ensure_self(&state, id).await?;

    let status: UserStatus = body
        .status
        .parse()
        .map_err(|_| AccountsServiceError::validation(STATUS_NOT_IN_LIST))?;

    let usecase = ChangeStatusUseCase {
        accounts: state.account_repo(),
        ledger: state.status_ledger(),
    };
    let record = usecase
        .execute(
            id,
            ChangeStatusInput {
                status,
                reason: body.reason,
                actor: Some(current.user_id),
            },
            state.now(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(StatusResponse {
            status: Some(record.into()),
        }),
    ))
}
