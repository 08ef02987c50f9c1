//! Database models for Riego
//!
//! These structs map to the database tables defined in schema.rs.
//! Timestamps are stored as fixed-width RFC 3339 text so that string order
//! matches time order.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::schema::*;
use crate::error::StoreError;
use crate::watering::{WateringAmount, WateringRecord, WateringSchedule};

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(table: &'static str, value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt {
            table,
            message: format!("bad timestamp '{}': {}", value, e),
        })
}

fn parse_amount(table: &'static str, value: &str) -> Result<WateringAmount, StoreError> {
    value.parse().map_err(|e| StoreError::Corrupt {
        table,
        message: format!("{}", e),
    })
}

// ============================================================================
// WateringSchedule
// ============================================================================

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = watering_schedules)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ScheduleRow {
    pub id: String,
    pub plant_id: String,
    pub frequency_days: i32,
    pub last_watered_at: String,
    pub next_due_at: String,
    pub amount: String,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&WateringSchedule> for ScheduleRow {
    fn from(schedule: &WateringSchedule) -> Self {
        Self {
            id: schedule.id.clone(),
            plant_id: schedule.plant_id.clone(),
            frequency_days: schedule.frequency_days,
            last_watered_at: format_timestamp(schedule.last_watered_at),
            next_due_at: format_timestamp(schedule.next_due_at),
            amount: schedule.amount.to_string(),
            notes: schedule.notes.clone(),
            active: schedule.active,
            created_at: format_timestamp(schedule.created_at),
            updated_at: format_timestamp(schedule.updated_at),
        }
    }
}

impl TryFrom<ScheduleRow> for WateringSchedule {
    type Error = StoreError;

    fn try_from(row: ScheduleRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "watering_schedules";
        Ok(Self {
            last_watered_at: parse_timestamp(TABLE, &row.last_watered_at)?,
            next_due_at: parse_timestamp(TABLE, &row.next_due_at)?,
            amount: parse_amount(TABLE, &row.amount)?,
            created_at: parse_timestamp(TABLE, &row.created_at)?,
            updated_at: parse_timestamp(TABLE, &row.updated_at)?,
            id: row.id,
            plant_id: row.plant_id,
            frequency_days: row.frequency_days,
            notes: row.notes,
            active: row.active,
        })
    }
}

// ============================================================================
// WateringRecord
// ============================================================================

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = watering_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecordRow {
    pub id: String,
    pub plant_id: String,
    pub watered_at: String,
    pub amount: String,
    pub observations: Option<String>,
    pub created_at: String,
}

impl From<&WateringRecord> for RecordRow {
    fn from(record: &WateringRecord) -> Self {
        Self {
            id: record.id.clone(),
            plant_id: record.plant_id.clone(),
            watered_at: format_timestamp(record.watered_at),
            amount: record.amount.to_string(),
            observations: record.observations.clone(),
            created_at: format_timestamp(record.created_at),
        }
    }
}

impl TryFrom<RecordRow> for WateringRecord {
    type Error = StoreError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "watering_records";
        Ok(Self {
            watered_at: parse_timestamp(TABLE, &row.watered_at)?,
            amount: parse_amount(TABLE, &row.amount)?,
            created_at: parse_timestamp(TABLE, &row.created_at)?,
            id: row.id,
            plant_id: row.plant_id,
            observations: row.observations,
        })
    }
}
