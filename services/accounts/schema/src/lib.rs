//! sea-orm entities for the accounts service.

pub mod user_credentials;
pub mod user_profiles;
pub mod user_statuses;
pub mod users;

/// Message carried by every rejected write against `user_statuses`, both from
/// the entity hooks and from the database trigger.
pub const IMMUTABLE_RECORD_MESSAGE: &str = "user_statuses records are immutable";

/// True when `err` is a rejected update/delete of a status record.
pub fn is_immutable_violation(err: &sea_orm::DbErr) -> bool {
    err.to_string().contains(IMMUTABLE_RECORD_MESSAGE)
}
