use std::fmt;

use thiserror::Error;

/// Which unique field a registration collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    Email,
    Username,
}

impl fmt::Display for ConflictField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictField::Email => f.write_str("Email already registered"),
            ConflictField::Username => f.write_str("Username already taken"),
        }
    }
}

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(ConflictField),
    #[error("user not found")]
    NotFound,
    #[error("invalid credentials")]
    Unauthorized,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Conflict(_) => 1002,
            AuthError::NotFound => 1003,
            AuthError::Unauthorized => 1004,
            AuthError::InvalidToken(_) => 1005,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
            AuthError::Repository(_) => 1200,
        }
    }

    /// Faults the caller cannot fix; these are logged and never echoed.
    pub fn is_internal(&self) -> bool {
        matches!(self, AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_))
    }

    pub fn missing_field(field: &str) -> Self {
        AuthError::Validation(format!("Missing required field: {field}"))
    }
}

impl From<models::errors::ModelError> for AuthError {
    fn from(e: models::errors::ModelError) -> Self {
        use models::errors::ModelError;
        match e {
            ModelError::Validation(msg) => AuthError::Validation(msg),
            // The driver message names the violated index or column.
            ModelError::UniqueViolation(msg) if msg.contains("username") => AuthError::Conflict(ConflictField::Username),
            ModelError::UniqueViolation(_) => AuthError::Conflict(ConflictField::Email),
            ModelError::Db(msg) => AuthError::Repository(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::errors::ModelError;

    #[test]
    fn conflict_messages_name_the_field() {
        assert_eq!(AuthError::Conflict(ConflictField::Email).to_string(), "Email already registered");
        assert_eq!(AuthError::Conflict(ConflictField::Username).to_string(), "Username already taken");
    }

    #[test]
    fn unique_violation_maps_to_field_conflict() {
        let pg = ModelError::UniqueViolation("duplicate key value violates unique constraint \"uniq_users_username\"".into());
        assert!(matches!(AuthError::from(pg), AuthError::Conflict(ConflictField::Username)));

        let sqlite = ModelError::UniqueViolation("UNIQUE constraint failed: users.email".into());
        assert!(matches!(AuthError::from(sqlite), AuthError::Conflict(ConflictField::Email)));
    }

    #[test]
    fn only_infrastructure_faults_are_internal() {
        assert!(AuthError::Repository("boom".into()).is_internal());
        assert!(AuthError::HashError("bad".into()).is_internal());
        assert!(!AuthError::Unauthorized.is_internal());
        assert!(!AuthError::missing_field("email").is_internal());
        assert_eq!(AuthError::missing_field("email").to_string(), "Missing required field: email");
    }
}
