//! Watering schedules, watering history and the status derived from them.

pub mod calendar;
pub mod engine;
pub mod models;
pub mod ports;
pub mod status;

pub use calendar::CalendarDay;
pub use engine::{EngineOptions, WateringEngine};
pub use models::{Ledger, ScheduleUpdate, WateringAmount, WateringRecord, WateringSchedule};
pub use ports::{Clock, InMemoryCatalog, ManualClock, Plant, PlantCatalog, SystemClock};
pub use status::{PlantWateringStatus, PlantWithWatering, SkewPolicy, Urgency};
