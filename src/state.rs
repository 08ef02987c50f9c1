//! Application state management

use anyhow::{Context, Result};

use crate::config::Settings;
use crate::db::{self, repository, DbPool};
use crate::seed;
use crate::watering::{Clock, InMemoryCatalog, SystemClock, WateringEngine};

pub type GardenEngine<C = SystemClock> = WateringEngine<InMemoryCatalog, C>;

/// Application state shared across commands
pub struct AppState<C: Clock = SystemClock> {
    /// Watering engine holding the live ledger
    pub engine: GardenEngine<C>,
    /// Database connection pool; `None` keeps everything in memory
    pub db: Option<DbPool>,
}

impl<C: Clock> AppState<C> {
    pub fn new(engine: GardenEngine<C>, db: Option<DbPool>) -> Self {
        Self { engine, db }
    }

    /// Memory-only state, as used by tests and previews.
    pub fn in_memory(engine: GardenEngine<C>) -> Self {
        Self::new(engine, None)
    }
}

impl AppState<SystemClock> {
    /// Open the database, load the stored ledger and build the engine.
    pub fn load(settings: &Settings) -> Result<Self> {
        let pool = db::init_database(&settings.database_path).with_context(|| {
            format!(
                "Failed to initialize database at {}",
                settings.database_path.display()
            )
        })?;
        let mut conn = pool.get().context("Failed to get database connection")?;

        let mut ledger =
            repository::load_ledger(&mut conn).context("Failed to load watering ledger")?;
        if ledger.is_empty() && settings.seed_demo {
            log::info!("Empty database, seeding demo garden");
            ledger = seed::demo_ledger().context("Failed to build demo garden")?;
            repository::sync_ledger(&mut conn, &ledger).context("Failed to store demo garden")?;
        }

        let catalog = InMemoryCatalog::new(seed::demo_plants());
        let engine = WateringEngine::restore(catalog, SystemClock, settings.engine, ledger)
            .context("Stored watering ledger is invalid")?;
        Ok(Self::new(engine, Some(pool)))
    }
}
