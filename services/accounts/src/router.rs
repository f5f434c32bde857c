use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use inkpost_core::health::{database_ready, healthz};
use inkpost_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    auth::{login, logout, me, signup},
    status::{create_status, current_status, list_statuses},
    user::{delete_user, get_user, list_users, update_user},
};
use crate::state::AppState;

async fn readyz(State(state): State<AppState>) -> StatusCode {
    database_ready(&state.db).await
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Auth
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", delete(logout))
        .route("/auth/me", get(me))
        // Users
        .route("/users", get(list_users))
        .route(
            "/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        // Status ledger
        .route(
            "/users/{id}/statuses",
            get(list_statuses).post(create_status),
        )
        .route("/users/{id}/statuses/current", get(current_status));

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api/v1", api)
        // Outermost last: assign request id, trace, then echo the id back.
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
