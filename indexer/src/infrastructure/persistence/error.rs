use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Error type for database operations
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SeaORM
    #[error("Database error: {0}")]
    SeaOrmError(DbErr),
    /// A document with the same key already exists
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl From<DbErr> for DbError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => DbError::DuplicateKey(msg),
            _ => DbError::SeaOrmError(err),
        }
    }
}
