//! `Authorization: Bearer` extractor.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::header::AUTHORIZATION;
use http::request::Parts;

/// Raw bearer token taken from the `Authorization` header.
///
/// Only the header shape is checked here: the last whitespace-separated word
/// is the token. Signature and expiry are checked by the handler against the
/// service's secret. Returns 401 when the header is absent or empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn parse_authorization(value: &str) -> Option<String> {
    value
        .split_whitespace()
        .last()
        .filter(|token| !token.eq_ignore_ascii_case("bearer"))
        .map(str::to_owned)
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // axum-core 0.5 defines this as `fn -> impl Future + Send`; extract the
    // header synchronously and return a 'static async block.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_authorization);

        async move { token.map(Self).ok_or(StatusCode::UNAUTHORIZED) }
    }
}
