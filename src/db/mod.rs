//! Database module for Riego
//!
//! Provides SQLite persistence for the watering ledger via Diesel ORM.
//! The engine itself stays in memory; this module only loads and stores it.

pub mod models;
pub mod repository;
pub mod schema;

use diesel::r2d2::{self, ConnectionManager};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Default database location in the user's data directory
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("riego")
        .join("riego.db")
}

/// Establish a connection pool to the SQLite database
pub fn establish_connection(database_url: &str) -> Result<DbPool, r2d2::PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    r2d2::Pool::builder().max_size(5).build(manager)
}

/// Run pending database migrations
pub fn run_migrations(conn: &mut SqliteConnection) -> StoreResult<()> {
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| StoreError::Migration(e.to_string()))?;
    Ok(())
}

/// Initialize the database with a connection pool
pub fn init_database(database_path: &Path) -> StoreResult<DbPool> {
    if let Some(parent) = database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let database_url = database_path.to_string_lossy().to_string();
    let pool = establish_connection(&database_url)?;

    // Run migrations
    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;
    log::info!("Opened watering database at {}", database_path.display());

    Ok(pool)
}
