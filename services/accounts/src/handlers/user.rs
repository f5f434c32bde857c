use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use inkpost_domain::pagination::PageRequest;
use inkpost_domain::user::UserStatus;

use crate::domain::types::{FullProfile, ProfileChanges, UserFilter};
use crate::error::AccountsServiceError;
use crate::handlers::auth::UserResponse;
use crate::handlers::session::CurrentUser;
use crate::state::AppState;
use crate::usecase::user::{
    DeleteUserUseCase, GetUserUseCase, ListUsersUseCase, UpdateUserInput, UpdateUserUseCase,
};

pub(crate) const STATUS_NOT_IN_LIST: &str = "Status is not included in the list";

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ── GET /api/v1/users ────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct ListUsersQuery {
    pub status: Option<String>,
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<FullProfile>,
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<UsersResponse>, AccountsServiceError> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<UserStatus>)
        .transpose()
        .map_err(|_| AccountsServiceError::validation(STATUS_NOT_IN_LIST))?;

    let defaults = PageRequest::default();
    let page = PageRequest {
        per_page: query.per_page.unwrap_or(defaults.per_page),
        page: query.page.unwrap_or(defaults.page),
    };

    let usecase = ListUsersUseCase {
        accounts: state.account_repo(),
    };
    let accounts = usecase
        .execute(
            UserFilter {
                status,
                query: query.q,
            },
            page,
        )
        .await?;

    let today = state.now().date_naive();
    Ok(Json(UsersResponse {
        users: accounts.iter().map(|a| a.full_profile(today)).collect(),
    }))
}

// ── GET /api/v1/users/{id} ───────────────────────────────────────────────────

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AccountsServiceError> {
    let account = GetUserUseCase {
        accounts: state.account_repo(),
    }
    .execute(id)
    .await?;
    Ok(Json(UserResponse {
        user: account.full_profile(state.now().date_naive()),
    }))
}

// ── PATCH /api/v1/users/{id} ─────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub user: Option<UserChangesRequest>,
    #[serde(default)]
    pub profile: Option<ProfileChangesRequest>,
}

#[derive(Deserialize, Default)]
pub struct UserChangesRequest {
    pub email: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct ProfileChangesRequest {
    pub username: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub avatar_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub website_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub birth_date: Option<Option<NaiveDate>>,
}

impl From<ProfileChangesRequest> for ProfileChanges {
    fn from(req: ProfileChangesRequest) -> Self {
        Self {
            username: req.username,
            bio: req.bio,
            avatar_url: req.avatar_url,
            website_url: req.website_url,
            birth_date: req.birth_date,
        }
    }
}

pub async fn update_user(
    current: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AccountsServiceError> {
    current.ensure_self(&state, id).await?;

    let now = state.now();
    let usecase = UpdateUserUseCase {
        accounts: state.account_repo(),
        credentials: state.credential_repo(),
    };
    let account = usecase
        .execute(
            id,
            UpdateUserInput {
                email: body.user.and_then(|u| u.email),
                profile: body.profile.map(Into::into).unwrap_or_default(),
            },
            now,
        )
        .await?;

    Ok(Json(UserResponse {
        user: account.full_profile(now.date_naive()),
    }))
}

// ── DELETE /api/v1/users/{id} ────────────────────────────────────────────────

pub async fn delete_user(
    current: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AccountsServiceError> {
    current.ensure_self(&state, id).await?;
    DeleteUserUseCase {
        accounts: state.account_repo(),
    }
    .execute(id)
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
