//! Field validation. Each function returns every violated-field message so
//! callers can aggregate them into one response.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use url::Url;

use crate::domain::types::ProfileAttrs;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_USERNAME_LEN: usize = 50;
pub const MAX_BIO_LEN: usize = 500;

pub const EMAIL_TAKEN: &str = "Email has already been taken";

// Same grammar as Ruby's URI::MailTo::EMAIL_REGEXP.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\A[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*\z",
    )
    .expect("email pattern compiles")
});

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

pub fn validate_email(email: &str) -> Vec<String> {
    if is_blank(email) {
        vec!["Email can't be blank".to_owned()]
    } else if !EMAIL_RE.is_match(email) {
        vec!["Email is invalid".to_owned()]
    } else {
        vec![]
    }
}

pub fn validate_password(password: &str, confirmation: Option<&str>) -> Vec<String> {
    let mut errors = Vec::new();
    if password.is_empty() {
        errors.push("Password can't be blank".to_owned());
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!(
            "Password is too short (minimum is {MIN_PASSWORD_LEN} characters)"
        ));
    }
    if confirmation.is_some_and(|c| c != password) {
        errors.push("Password confirmation doesn't match Password".to_owned());
    }
    errors
}

fn is_http_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| {
        matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty())
    })
}

pub fn validate_profile(attrs: &ProfileAttrs, today: NaiveDate) -> Vec<String> {
    let mut errors = Vec::new();

    if is_blank(&attrs.username) {
        errors.push("Username can't be blank".to_owned());
    } else if attrs.username.chars().count() > MAX_USERNAME_LEN {
        errors.push(format!(
            "Username is too long (maximum is {MAX_USERNAME_LEN} characters)"
        ));
    }

    if attrs
        .bio
        .as_deref()
        .is_some_and(|bio| bio.chars().count() > MAX_BIO_LEN)
    {
        errors.push(format!(
            "Bio is too long (maximum is {MAX_BIO_LEN} characters)"
        ));
    }

    let bad_url = |value: &Option<String>| {
        value
            .as_deref()
            .is_some_and(|v| !is_blank(v) && !is_http_url(v))
    };
    if bad_url(&attrs.avatar_url) {
        errors.push("Avatar url is invalid".to_owned());
    }
    if bad_url(&attrs.website_url) {
        errors.push("Website url is invalid".to_owned());
    }

    if attrs.birth_date.is_some_and(|d| d >= today) {
        errors.push("Birth date must be in the past".to_owned());
    }

    errors
}
