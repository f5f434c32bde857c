//! Mock auth helpers for integration tests.
//!
//! Protected routes expect `Authorization: Bearer <jwt>`. `MockAuth` signs a
//! token with the same secret the app under test is configured with, so no
//! signup round-trip is needed to reach an authenticated route.

use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
use chrono::Utc;
use inkpost_auth_types::token::issue_access_token;
use uuid::Uuid;

/// Secret shared between test apps and `MockAuth`.
pub const TEST_JWT_SECRET: &str = "inkpost-test-secret";

/// Configurable identity injected into test requests.
pub struct MockAuth {
    pub user_id: Uuid,
    pub secret: String,
}

impl MockAuth {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            secret: TEST_JWT_SECRET.to_owned(),
        }
    }

    pub fn with_secret(user_id: Uuid, secret: impl Into<String>) -> Self {
        Self {
            user_id,
            secret: secret.into(),
        }
    }

    /// A signed token valid for one hour.
    pub fn token(&self) -> String {
        issue_access_token(self.user_id, Utc::now(), 3600, &self.secret)
            .unwrap()
            .token
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token())
    }

    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&self.bearer()).unwrap(),
        );
        map
    }
}
