//! Demo garden used on first start

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{WateringError, WateringResult};
use crate::watering::models::next_due;
use crate::watering::{Ledger, Plant, WateringAmount, WateringRecord, WateringSchedule};

fn at(year: i32, month: u32, day: u32, hour: u32) -> WateringResult<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            WateringError::validation(format!(
                "invalid demo date {}-{:02}-{:02} {:02}:00",
                year, month, day, hour
            ))
        })
}

fn plant(id: &str, name: &str, variety: &str, bed_id: Option<&str>) -> Plant {
    Plant {
        id: id.to_string(),
        name: name.to_string(),
        variety: variety.to_string(),
        bed_id: bed_id.map(str::to_string),
    }
}

pub fn demo_plants() -> Vec<Plant> {
    vec![
        plant("1", "Rosa Roja", "Rosa gallica", Some("bancal-1")),
        plant("2", "Lavanda", "Lavandula angustifolia", Some("bancal-2")),
        plant("3", "Margaritas", "Bellis perennis", None),
        plant("4", "Tulipanes", "Tulipa gesneriana", None),
    ]
}

fn schedule(
    id: &str,
    plant_id: &str,
    frequency_days: i32,
    last_watered_at: DateTime<Utc>,
    amount: WateringAmount,
    notes: &str,
    created_at: DateTime<Utc>,
) -> WateringResult<WateringSchedule> {
    Ok(WateringSchedule {
        id: id.to_string(),
        plant_id: plant_id.to_string(),
        frequency_days,
        last_watered_at,
        next_due_at: next_due(last_watered_at, frequency_days)?,
        amount,
        notes: Some(notes.to_string()),
        active: true,
        created_at,
        updated_at: last_watered_at,
    })
}

fn record(
    id: &str,
    plant_id: &str,
    watered_at: DateTime<Utc>,
    amount: WateringAmount,
    observations: &str,
) -> WateringRecord {
    WateringRecord {
        id: id.to_string(),
        plant_id: plant_id.to_string(),
        watered_at,
        amount,
        observations: Some(observations.to_string()),
        created_at: watered_at,
    }
}

/// Two scheduled plants and their last waterings.
pub fn demo_ledger() -> WateringResult<Ledger> {
    Ok(Ledger {
        schedules: vec![
            schedule(
                "demo-schedule-1",
                "1",
                3,
                at(2025, 1, 4, 10)?,
                WateringAmount::Moderate,
                "Water in the morning",
                at(2025, 1, 1, 10)?,
            )?,
            schedule(
                "demo-schedule-2",
                "2",
                2,
                at(2025, 1, 5, 8)?,
                WateringAmount::Light,
                "Avoid waterlogging",
                at(2025, 1, 2, 8)?,
            )?,
        ],
        records: vec![
            record(
                "demo-record-1",
                "1",
                at(2025, 1, 4, 10)?,
                WateringAmount::Moderate,
                "Soil a little dry",
            ),
            record(
                "demo-record-2",
                "2",
                at(2025, 1, 5, 8)?,
                WateringAmount::Light,
                "Moisture looks good",
            ),
        ],
    })
}
