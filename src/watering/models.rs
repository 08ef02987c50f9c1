//! Watering schedule and watering record models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{WateringError, WateringResult};

/// Longest interval between waterings a schedule may use (ten years).
pub const MAX_FREQUENCY_DAYS: i32 = 3650;

/// How much water a plant gets per watering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WateringAmount {
    Light,
    Moderate,
    Abundant,
}

impl WateringAmount {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Abundant => "abundant",
        }
    }
}

impl fmt::Display for WateringAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WateringAmount {
    type Err = WateringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "moderate" => Ok(Self::Moderate),
            "abundant" => Ok(Self::Abundant),
            other => Err(WateringError::validation(format!(
                "unrecognized watering amount '{}'",
                other
            ))),
        }
    }
}

/// Watering schedule for a single plant.
///
/// `next_due_at` is always `last_watered_at + frequency_days`. The engine
/// re-derives it on every change, so only clones ever leave the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WateringSchedule {
    pub id: String,
    pub plant_id: String,
    pub frequency_days: i32,
    pub last_watered_at: DateTime<Utc>,
    pub next_due_at: DateTime<Utc>,
    pub amount: WateringAmount,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WateringSchedule {
    /// Recompute `next_due_at` from its inputs.
    /// Fails, leaving the schedule as it was, when the date is out of range.
    pub(crate) fn refresh_next_due(&mut self) -> WateringResult<()> {
        self.next_due_at = next_due(self.last_watered_at, self.frequency_days)?;
        Ok(())
    }
}

pub fn next_due(
    last_watered_at: DateTime<Utc>,
    frequency_days: i32,
) -> WateringResult<DateTime<Utc>> {
    last_watered_at
        .checked_add_signed(Duration::days(i64::from(frequency_days)))
        .ok_or_else(|| {
            WateringError::validation(format!(
                "next watering of {} every {} days is out of range",
                last_watered_at, frequency_days
            ))
        })
}

pub(crate) fn validate_frequency(frequency_days: i32) -> Result<(), WateringError> {
    if !(1..=MAX_FREQUENCY_DAYS).contains(&frequency_days) {
        log::warn!("Rejected watering frequency of {} days", frequency_days);
        return Err(WateringError::validation(format!(
            "frequency_days must be between 1 and {}, got {}",
            MAX_FREQUENCY_DAYS, frequency_days
        )));
    }
    Ok(())
}

/// A single watering event. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WateringRecord {
    pub id: String,
    pub plant_id: String,
    pub watered_at: DateTime<Utc>,
    pub amount: WateringAmount,
    pub observations: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Partial edit of a schedule. `None` leaves a field untouched.
///
/// `notes: Some(None)` clears the notes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleUpdate {
    pub frequency_days: Option<i32>,
    pub amount: Option<WateringAmount>,
    pub notes: Option<Option<String>>,
    pub active: Option<bool>,
}

impl ScheduleUpdate {
    pub fn is_empty(&self) -> bool {
        self.frequency_days.is_none()
            && self.amount.is_none()
            && self.notes.is_none()
            && self.active.is_none()
    }
}

/// Everything the engine owns, captured as one consistent unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub schedules: Vec<WateringSchedule>,
    pub records: Vec<WateringRecord>,
}

impl Ledger {
    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty() && self.records.is_empty()
    }
}
