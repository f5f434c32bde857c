use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use inkpost_domain::user::UserStatus;

/// Reason recorded on the ledger entry appended at signup.
pub const INITIAL_STATUS_REASON: &str = "Initial status";

/// Identity anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Email/password credential. One per user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub user_id: Uuid,
    pub email: String,
    pub password_digest: String,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    /// True iff a lock expiry is set and still in the future.
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user_id: Uuid,
    pub username: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub website_url: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Age in whole years on `today`, or `None` without a birth date.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let born = self.birth_date?;
        let had_birthday = (today.month(), today.day()) >= (born.month(), born.day());
        let years = today.year() - born.year() - if had_birthday { 0 } else { 1 };
        u32::try_from(years).ok()
    }

    pub fn attrs(&self) -> ProfileAttrs {
        ProfileAttrs {
            username: self.username.clone(),
            bio: self.bio.clone(),
            avatar_url: self.avatar_url.clone(),
            website_url: self.website_url.clone(),
            birth_date: self.birth_date,
        }
    }
}

/// Editable profile fields, as supplied at signup or after applying changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileAttrs {
    pub username: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub website_url: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

/// Partial profile update. `None` leaves a field alone; `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub bio: Option<Option<String>>,
    pub avatar_url: Option<Option<String>>,
    pub website_url: Option<Option<String>>,
    pub birth_date: Option<Option<NaiveDate>>,
}

impl ProfileChanges {
    pub fn apply(self, mut attrs: ProfileAttrs) -> ProfileAttrs {
        if let Some(username) = self.username {
            attrs.username = username;
        }
        if let Some(bio) = self.bio {
            attrs.bio = bio;
        }
        if let Some(avatar_url) = self.avatar_url {
            attrs.avatar_url = avatar_url;
        }
        if let Some(website_url) = self.website_url {
            attrs.website_url = website_url;
        }
        if let Some(birth_date) = self.birth_date {
            attrs.birth_date = birth_date;
        }
        attrs
    }
}

/// One entry of the append-only status ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    /// Storage-assigned, strictly increasing per insert. Defines ledger order.
    pub id: i64,
    pub user_id: Uuid,
    pub status: UserStatus,
    pub reason: Option<String>,
    pub changed_by_user_id: Option<Uuid>,
    pub effective_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A ledger entry not yet appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStatusRecord {
    pub user_id: Uuid,
    pub status: UserStatus,
    pub reason: Option<String>,
    pub changed_by_user_id: Option<Uuid>,
    pub effective_at: DateTime<Utc>,
}

impl NewStatusRecord {
    pub fn initial(user_id: Uuid, now: DateTime<Utc>, actor: Option<Uuid>) -> Self {
        Self {
            user_id,
            status: UserStatus::Active,
            reason: Some(INITIAL_STATUS_REASON.to_owned()),
            changed_by_user_id: actor,
            effective_at: now,
        }
    }
}

/// Everything persisted atomically at signup.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user_id: Uuid,
    pub email: String,
    pub password_digest: String,
    pub profile: ProfileAttrs,
    pub created_at: DateTime<Utc>,
}

/// Changes persisted atomically by an account update.
#[derive(Debug, Clone)]
pub struct AccountUpdate {
    pub email: Option<String>,
    pub profile: ProfileAttrs,
    pub updated_at: DateTime<Utc>,
}

/// A user together with everything it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub user: User,
    pub credential: Credential,
    pub profile: Profile,
    /// `None` only if the ledger is empty, which signup never leaves behind.
    pub current_status: Option<StatusRecord>,
}

impl Account {
    pub fn id(&self) -> Uuid {
        self.user.id
    }

    pub fn status(&self) -> Option<UserStatus> {
        self.current_status.as_ref().map(|r| r.status)
    }

    /// Current status is active and the credential is not locked.
    pub fn can_login(&self, now: DateTime<Utc>) -> bool {
        self.status().is_some_and(UserStatus::is_active) && !self.credential.is_locked(now)
    }

    /// Public projection returned by every user-facing endpoint.
    pub fn full_profile(&self, today: NaiveDate) -> FullProfile {
        FullProfile {
            id: self.user.id,
            email: self.credential.email.clone(),
            username: self.profile.username.clone(),
            status: self.status(),
            profile: ProfileView {
                username: self.profile.username.clone(),
                bio: self.profile.bio.clone(),
                avatar_url: self.profile.avatar_url.clone(),
                website_url: self.profile.website_url.clone(),
                birth_date: self.profile.birth_date,
                age: self.profile.age_on(today),
            },
            created_at: self.user.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FullProfile {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub status: Option<UserStatus>,
    pub profile: ProfileView,
    #[serde(serialize_with = "inkpost_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileView {
    pub username: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub website_url: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub age: Option<u32>,
}

/// Consecutive-failure lockout rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_failed_attempts: i32,
    pub lock_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lock_duration: Duration::minutes(30),
        }
    }
}

impl LockoutPolicy {
    /// Lock expiry to record after the `failed_attempts`-th consecutive
    /// failure at `now`, or `None` while under the threshold.
    pub fn lock_expiry(&self, failed_attempts: i32, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        (failed_attempts >= self.max_failed_attempts).then(|| now + self.lock_duration)
    }
}

/// Optional filters for listing users. Absent fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Matches the *current* status only.
    pub status: Option<UserStatus>,
    /// Case-sensitive substring of email or username.
    pub query: Option<String>,
}
