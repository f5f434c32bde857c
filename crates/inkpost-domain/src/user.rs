//! User domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Account status recorded in the status ledger.
///
/// Wire format: lowercase name (`"active"`, `"suspended"`, `"deleted"`).
/// Storage format: `i16` (0 = Active, 1 = Suspended, 2 = Deleted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active = 0,
    Suspended = 1,
    Deleted = 2,
}

impl UserStatus {
    /// Convert from the stored `i16` value. Returns `None` for unknown values.
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(Self::Active),
            1 => Some(Self::Suspended),
            2 => Some(Self::Deleted),
            _ => None,
        }
    }

    /// Convert to the stored `i16` value.
    pub fn as_i16(self) -> i16 {
        self as i16
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Deleted => "deleted",
        }
    }

    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string cannot be parsed as a [`UserStatus`].
#[derive(Debug, Error)]
#[error("unknown user status: {0:?}")]
pub struct UnknownUserStatus(pub String);

impl FromStr for UserStatus {
    type Err = UnknownUserStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            "deleted" => Ok(Self::Deleted),
            other => Err(UnknownUserStatus(other.to_owned())),
        }
    }
}
