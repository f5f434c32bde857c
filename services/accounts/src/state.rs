use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

use inkpost_core::clock::Clock;

use crate::domain::types::LockoutPolicy;
use crate::infra::db::{DbAccountRepository, DbCredentialRepository, DbStatusLedger};
use crate::password::CredentialHasher;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: String,
    pub access_token_ttl_secs: u64,
    pub hasher: CredentialHasher,
    pub lockout: LockoutPolicy,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn account_repo(&self) -> DbAccountRepository {
        DbAccountRepository {
            db: self.db.clone(),
        }
    }

    pub fn credential_repo(&self) -> DbCredentialRepository {
        DbCredentialRepository {
            db: self.db.clone(),
        }
    }

    pub fn status_ledger(&self) -> DbStatusLedger {
        DbStatusLedger {
            db: self.db.clone(),
        }
    }

    /// Read once per request and pass down.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
