//! Bearer-token issuance and validation (HS256 JWT).

#[cfg(any(feature = "ISSUER", test))]
use chrono::{DateTime, Utc};
#[cfg(any(feature = "ISSUER", test))]
use jsonwebtoken::{EncodingKey, Header, encode};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "ISSUER", test))]
use serde::Serialize;
use uuid::Uuid;

/// User identity extracted from a validated bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub user_id: Uuid,
    /// Expiration, seconds since UNIX epoch.
    pub expires_at: u64,
}

/// Errors returned by token issuance and [`validate_access_token`].
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// JWT claims payload.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | user id (UUID string) |
/// | `iat` | `iat` | issued at, seconds since epoch |
/// | `exp` | `exp` | expiration, seconds since epoch |
///
/// [`Serialize`] requires the **`ISSUER`** cargo feature.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "ISSUER", test), derive(Serialize))]
pub struct JwtClaims {
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
}

/// A freshly signed token and its expiration.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: u64,
}

fn validation() -> Validation {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);
    validation
}

/// Validate a bearer token, returning the identity it carries.
///
/// Default leeway = 60s.
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenInfo, TokenError> {
    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    })?;

    let user_id = data
        .claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| TokenError::Malformed)?;
    Ok(TokenInfo {
        user_id,
        expires_at: data.claims.exp,
    })
}

/// Sign a bearer token for `user_id`, valid for `ttl_secs` from `issued_at`.
///
/// Requires the `ISSUER` feature.
#[cfg(any(feature = "ISSUER", test))]
pub fn issue_access_token(
    user_id: Uuid,
    issued_at: DateTime<Utc>,
    ttl_secs: u64,
    secret: &str,
) -> Result<IssuedToken, TokenError> {
    let iat = u64::try_from(issued_at.timestamp()).unwrap_or(0);
    let exp = iat
        .checked_add(ttl_secs)
        .ok_or_else(|| TokenError::Encoding(format!("ttl of {ttl_secs}s overflows expiry")))?;
    let claims = JwtClaims {
        sub: user_id.to_string(),
        iat,
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Encoding(e.to_string()))?;
    Ok(IssuedToken {
        token,
        expires_at: exp,
    })
}
