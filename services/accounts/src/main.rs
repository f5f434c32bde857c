use std::sync::Arc;

use sea_orm::Database;
use tracing::info;

use inkpost_accounts::config::AccountsConfig;
use inkpost_accounts::password::CredentialHasher;
use inkpost_accounts::router::build_router;
use inkpost_accounts::state::AppState;
use inkpost_core::clock::SystemClock;
use inkpost_core::config::Config;
use inkpost_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AccountsConfig::from_env();
    let lockout = config
        .lockout_policy()
        .expect("invalid lockout configuration");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let hasher = CredentialHasher::new(
        config.argon2_memory_kib,
        config.argon2_iterations,
        config.password_pepper.clone(),
    )
    .expect("invalid argon2 configuration");

    let state = AppState {
        db,
        jwt_secret: config.jwt_secret,
        access_token_ttl_secs: config.access_token_ttl_secs,
        hasher,
        lockout,
        clock: Arc::new(SystemClock),
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.accounts_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("accounts service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
