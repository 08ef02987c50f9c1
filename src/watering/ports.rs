//! Ports the engine depends on: a clock and a plant catalog.
//!
//! The engine is generic over both, so tests drive time with a
//! [`ManualClock`] and production wires in [`SystemClock`].

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Clock
// ----------------------------------------------------------------------------

/// Source of "now" for mutating operations.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

// ----------------------------------------------------------------------------
// Plant catalog
// ----------------------------------------------------------------------------

/// A plant as the catalog knows it. The engine only ever holds its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: String,
    pub name: String,
    pub variety: String,
    pub bed_id: Option<String>,
}

/// Read-side view of the garden inventory.
pub trait PlantCatalog {
    fn exists(&self, plant_id: &str) -> bool;

    /// All known plants, in catalog order.
    fn plants(&self) -> Vec<Plant>;
}

/// Catalog held in memory, used by the app and by tests.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    plants: Vec<Plant>,
}

impl InMemoryCatalog {
    pub fn new(plants: Vec<Plant>) -> Self {
        Self { plants }
    }
}

impl PlantCatalog for InMemoryCatalog {
    fn exists(&self, plant_id: &str) -> bool {
        self.plants.iter().any(|p| p.id == plant_id)
    }

    fn plants(&self) -> Vec<Plant> {
        self.plants.clone()
    }
}

impl<P: PlantCatalog + ?Sized> PlantCatalog for std::sync::Arc<P> {
    fn exists(&self, plant_id: &str) -> bool {
        (**self).exists(plant_id)
    }

    fn plants(&self) -> Vec<Plant> {
        (**self).plants()
    }
}
