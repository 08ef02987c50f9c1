//! Error types for the watering engine and its storage layer

use thiserror::Error;

/// Errors raised by the watering engine.
///
/// All of these are synchronous input failures; nothing here is transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WateringError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl WateringError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn schedule_not_found(id: &str) -> Self {
        Self::NotFound {
            entity: "Schedule",
            id: id.to_string(),
        }
    }
}

/// Errors raised by the SQLite store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Database file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Corrupt row in {table}: {message}")]
    Corrupt { table: &'static str, message: String },
}

pub type WateringResult<T> = Result<T, WateringError>;
pub type StoreResult<T> = Result<T, StoreError>;
