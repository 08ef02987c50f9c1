//! Command handlers for Riego
//!
//! Thin wrappers a presentation layer calls. Errors are flattened to strings
//! and, when a database is configured, every change is written through before
//! the engine applies it. A failed write leaves the engine unchanged.

pub mod schedules;
pub mod watering;

// Re-export all commands
pub use schedules::*;
pub use watering::*;

use diesel::sqlite::SqliteConnection;
use thiserror::Error;

use crate::error::{StoreError, StoreResult, WateringError};
use crate::state::AppState;
use crate::watering::Clock;

#[derive(Debug, Error)]
enum CommandError {
    #[error(transparent)]
    Watering(#[from] WateringError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Run `write` against the database, if there is one.
fn persist<C: Clock>(
    state: &AppState<C>,
    write: impl FnOnce(&mut SqliteConnection) -> StoreResult<()>,
) -> Result<(), CommandError> {
    let Some(pool) = &state.db else {
        return Ok(());
    };
    pool.get()
        .map_err(StoreError::from)
        .and_then(|mut conn| write(&mut conn))
        .map_err(|e| {
            log::error!("Failed to persist watering change: {}", e);
            e.into()
        })
}
