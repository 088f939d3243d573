use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    /// A unique index rejected the write; carries the driver message, which
    /// names the violated constraint or column.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("database error: {0}")]
    Db(String),
}

impl From<DbErr> for ModelError {
    fn from(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => ModelError::UniqueViolation(msg),
            _ => ModelError::Db(e.to_string()),
        }
    }
}
