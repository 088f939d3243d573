use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Numeric user identifier.
///
/// Tokens carry the id as a decimal string subject; conversion in both
/// directions happens only through [`UserId::to_subject`] and
/// [`UserId::from_subject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i32);

impl UserId {
    pub fn to_subject(self) -> String {
        self.0.to_string()
    }

    pub fn from_subject(subject: &str) -> Option<Self> {
        subject.parse().ok()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i32>().map(UserId)
    }
}

/// Registration input. Fields are optional so that absence can be reported
/// as a validation error naming the field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterInput {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

/// Login input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Domain user (business view). Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored password hash for a user
#[derive(Clone)]
pub struct Credentials {
    pub user_id: UserId,
    pub password_hash: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Validated, normalized account ready to be persisted
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Result of a successful register or login
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub token: String,
}

/// Emails are compared case-insensitively; this is the single place that
/// decides the stored form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
