use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use inkpost_auth_types::token::issue_access_token;

use crate::domain::types::{Account, FullProfile, ProfileAttrs};
use crate::error::AccountsServiceError;
use crate::handlers::session::CurrentUser;
use crate::state::AppState;
use crate::usecase::auth::{LoginUseCase, SignupInput, SignupUseCase};
use crate::usecase::user::GetUserUseCase;

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    /// Seconds since epoch.
    pub expires_at: u64,
    pub user: FullProfile,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub user: FullProfile,
}

fn auth_response(
    state: &AppState,
    account: &Account,
    now: DateTime<Utc>,
) -> Result<AuthResponse, AccountsServiceError> {
    let issued = issue_access_token(
        account.id(),
        now,
        state.access_token_ttl_secs,
        &state.jwt_secret,
    )
    .map_err(|e| AccountsServiceError::Internal(anyhow::Error::new(e)))?;
    Ok(AuthResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user: account.full_profile(now.date_naive()),
    })
}

// ── POST /api/v1/auth/signup ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SignupRequest {
    pub user: SignupUser,
}

// Missing fields default to empty so they surface as validation messages.
#[derive(Deserialize)]
pub struct SignupUser {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub password_confirmation: Option<String>,
    #[serde(default)]
    pub username: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub website_url: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AccountsServiceError> {
    let now = state.now();
    let usecase = SignupUseCase {
        accounts: state.account_repo(),
        credentials: state.credential_repo(),
        hasher: state.hasher.clone(),
    };
    let user = body.user;
    let account = usecase
        .execute(
            SignupInput {
                email: user.email,
                password: user.password,
                password_confirmation: user.password_confirmation,
                profile: ProfileAttrs {
                    username: user.username,
                    bio: user.bio,
                    avatar_url: user.avatar_url,
                    website_url: user.website_url,
                    birth_date: user.birth_date,
                },
            },
            now,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(auth_response(&state, &account, now)?)))
}

// ── POST /api/v1/auth/login ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AccountsServiceError> {
    let now = state.now();
    let usecase = LoginUseCase {
        credentials: state.credential_repo(),
        ledger: state.status_ledger(),
        hasher: state.hasher.clone(),
        policy: state.lockout,
    };
    let user_id = usecase.execute(&body.email, &body.password, now).await?;

    let account = GetUserUseCase {
        accounts: state.account_repo(),
    }
    .execute(user_id)
    .await?;

    Ok(Json(auth_response(&state, &account, now)?))
}

// ── DELETE /api/v1/auth/logout ───────────────────────────────────────────────

/// Tokens are stateless; the client discards its copy.
pub async fn logout(_current: CurrentUser) -> StatusCode {
    StatusCode::NO_CONTENT
}

// ── GET /api/v1/auth/me ──────────────────────────────────────────────────────

pub async fn me(
    current: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AccountsServiceError> {
    let account = GetUserUseCase {
        accounts: state.account_repo(),
    }
    .execute(current.user_id)
    .await?;
    Ok(Json(UserResponse {
        user: account.full_profile(state.now().date_naive()),
    }))
}
